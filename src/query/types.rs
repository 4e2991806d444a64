// SPDX-License-Identifier: Apache-2.0

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Supported query modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum QueryMode {
    Callers,
    Callees,
    Callstack,
    Callgraph,
    Describe,
}

impl QueryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMode::Callers => "callers",
            QueryMode::Callees => "callees",
            QueryMode::Callstack => "callstack",
            QueryMode::Callgraph => "callgraph",
            QueryMode::Describe => "describe",
        }
    }

    /// Whether the mode needs a `--pos` selection to run.
    pub fn needs_position(&self) -> bool {
        !matches!(self, QueryMode::Callgraph)
    }
}

/// Knobs for a single query, as received from the command line.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub mode: QueryMode,
    /// Raw `FILE:OFFSET[-END]` position string, when the mode takes one.
    pub pos: Option<String>,
    /// Call chain depth for callers/callees queries. 1 = direct only.
    pub depth: u32,
    /// Directory recursion limit for scope traversal. 0 = unlimited.
    pub max_depth: u32,
}

/// A byte range within a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A file and 1-based line, the `pos` half of every plain output line.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct SourcePos {
    pub file: PathBuf,
    pub line: usize,
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.line)
    }
}

/// Everything the indexer extracts from one source file.
#[derive(Debug, Clone, Serialize)]
pub struct FileIndex {
    pub functions: Vec<FunctionDef>,
    pub types: Vec<TypeDef>,
    pub imports: Vec<ImportRef>,
    pub calls: Vec<CallSite>,
    pub line_count: usize,
}

impl FileIndex {
    pub fn empty(line_count: usize) -> Self {
        Self {
            functions: vec![],
            types: vec![],
            imports: vec![],
            calls: vec![],
            line_count,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDef {
    pub name: String,
    pub line: usize,
    /// Byte span of the whole definition, not just the name.
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeDef {
    pub name: String,
    pub line: usize,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportRef {
    pub text: String,
    pub line: usize,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallSite {
    /// Enclosing function, `None` for module-level calls.
    pub caller: Option<String>,
    pub callee: String,
    pub line: usize,
    pub column: usize,
    /// Byte span of the callee name at the call site.
    pub span: Span,
    /// Trimmed source line around the call.
    pub context: String,
}

/// One hop in a call chain: `from` calls `to` at `file:line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallLink {
    pub file: PathBuf,
    pub line: usize,
    pub from: String,
    pub to: String,
}

/// A path through the call graph, outermost hop first.
#[derive(Debug, Clone, Serialize)]
pub struct CallChain {
    pub links: Vec<CallLink>,
}

/// One entry of a callstack result. `pos` is the call site where this
/// frame invokes the next one, or the definition site for the target.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub func: String,
    pub pos: Option<SourcePos>,
}

/// A function node of the call graph with its outgoing edges.
#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub func: String,
    pub defined_at: Vec<SourcePos>,
    pub edges: Vec<CallLink>,
}

/// Kind of syntax element a describe query resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Function,
    Type,
    Call,
    Import,
}

/// The answer to a query, one variant per mode. Serialized as-is for the
/// JSON output branch; the plain branch goes through `write_plain`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum QueryResult {
    Callers {
        target: String,
        defined_at: Vec<SourcePos>,
        chains: Vec<CallChain>,
    },
    Callees {
        target: String,
        defined_at: Vec<SourcePos>,
        chains: Vec<CallChain>,
    },
    Callstack {
        target: String,
        frames: Vec<Frame>,
    },
    Callgraph {
        functions: Vec<GraphNode>,
    },
    Describe {
        kind: ElementKind,
        name: String,
        pos: SourcePos,
        detail: String,
    },
}
