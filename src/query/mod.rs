// SPDX-License-Identifier: Apache-2.0

pub mod cache;
pub mod error;
pub mod format;
pub mod graph;
pub mod languages;
pub mod parser;
pub mod position;
pub mod traversal;
pub mod types;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use rayon::prelude::*;

use self::cache::IndexCache;
use self::error::QueryError;
use self::graph::{CallGraph, MODULE_CALLER};
use self::parser::{FileIndexer, ParserManager};
use self::position::Position;
use self::traversal::ScopeWalker;
use self::types::{
    ElementKind, FileIndex, Frame, QueryMode, QueryOptions, QueryResult, SourcePos,
};

/// Depth bound for the callstack search.
const CALLSTACK_DEPTH: u32 = 64;

/// Helper to safely lock a mutex with poison recovery
pub(crate) fn lock_or_recover<T, F>(mutex: &Mutex<T>, recovery: F) -> MutexGuard<'_, T>
where
    F: FnOnce(&mut T),
{
    mutex.lock().unwrap_or_else(|poisoned| {
        let mut guard = poisoned.into_inner();
        recovery(&mut guard);
        guard
    })
}

/// Best-effort line sink for the `--analysis-log` file.
struct Trace<'a> {
    sink: Option<&'a mut dyn Write>,
}

impl Trace<'_> {
    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        if let Some(sink) = self.sink.as_deref_mut() {
            let _ = writeln!(sink, "{args}");
        }
    }
}

/// Query engine with cached parsers and per-file indexes.
#[derive(Clone)]
pub struct QueryEngine {
    parsers: ParserManager,
    cache: IndexCache,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEngine {
    pub fn new() -> Self {
        Self {
            parsers: ParserManager::new(),
            cache: IndexCache::default(),
        }
    }

    fn index_file(&self, path: &Path) -> Result<Arc<FileIndex>, QueryError> {
        let metadata = fs::metadata(path)?;
        let modified = metadata.modified()?;

        if let Some(hit) = self.cache.get(path, modified) {
            return Ok(hit);
        }

        // Unreadable (e.g. binary) files index as empty rather than fail.
        let Ok(content) = fs::read_to_string(path) else {
            return Ok(Arc::new(FileIndex::empty(0)));
        };

        let language = crate::lang::language_for_path(path);
        if language.is_empty() || languages::language_info(language).is_none() {
            return Ok(Arc::new(FileIndex::empty(content.lines().count())));
        }

        let tree = self.parsers.parse(&content, language)?;
        let index = Arc::new(FileIndexer::index(&tree, &content, language)?);

        self.cache.put(path.to_path_buf(), modified, Arc::clone(&index));
        Ok(index)
    }

    pub fn run(
        &self,
        scope: &[String],
        opts: &QueryOptions,
        trace: Option<&mut dyn Write>,
        cwd: &str,
    ) -> Result<QueryResult, QueryError> {
        let mut trace = Trace { sink: trace };

        if scope.is_empty() {
            return Err(QueryError::EmptyScope);
        }

        let pos = match &opts.pos {
            Some(raw) => {
                let parsed = Position::parse(raw)?;
                Some(Position {
                    file: absolutize(&parsed.file, cwd),
                    ..parsed
                })
            }
            None => None,
        };
        if pos.is_none() && opts.mode.needs_position() {
            return Err(QueryError::PositionRequired(opts.mode.as_str()));
        }

        let walker = ScopeWalker::new();
        let scope_paths: Vec<PathBuf> =
            scope.iter().map(|p| absolutize(Path::new(p), cwd)).collect();
        for path in &scope_paths {
            walker.validate(path)?;
        }

        let mut files = walker.collect(&scope_paths, opts.max_depth)?;
        if let Some(pos) = &pos
            && !files.contains(&pos.file)
        {
            walker.validate(&pos.file)?;
            files.push(pos.file.clone());
            files.sort();
        }

        trace.line(format_args!("analysis scope: {} files", files.len()));
        log::debug!("analysis scope: {} files", files.len());

        let results: Result<Vec<(PathBuf, Arc<FileIndex>)>, QueryError> = files
            .par_iter()
            .map(|file| self.index_file(file).map(|index| (file.clone(), index)))
            .collect();
        let results = results?;

        for (file, index) in &results {
            trace.line(format_args!(
                "{}: {} functions, {} calls",
                file.display(),
                index.functions.len(),
                index.calls.len()
            ));
        }

        let graph = CallGraph::build(&results);
        trace.line(format_args!(
            "call graph: {} functions, {} call sites",
            graph.function_count(),
            graph.call_count()
        ));
        log::info!(
            "call graph contains {} functions and {} call sites",
            graph.function_count(),
            graph.call_count()
        );

        let require_pos =
            |pos: Option<Position>| pos.ok_or(QueryError::PositionRequired(opts.mode.as_str()));

        match opts.mode {
            QueryMode::Callgraph => Ok(QueryResult::Callgraph {
                functions: graph.nodes(),
            }),

            QueryMode::Describe => {
                let pos = require_pos(pos)?;
                describe(&results, &pos)
            }

            QueryMode::Callers => {
                let pos = require_pos(pos)?;
                let target = resolve_function(&results, &pos, &mut trace)?;
                let chains = graph.find_incoming_chains(&target, opts.depth.max(1));
                Ok(QueryResult::Callers {
                    defined_at: graph.definition_sites(&target),
                    target,
                    chains,
                })
            }

            QueryMode::Callees => {
                let pos = require_pos(pos)?;
                let target = resolve_function(&results, &pos, &mut trace)?;
                let chains = graph.find_outgoing_chains(&target, opts.depth.max(1));
                Ok(QueryResult::Callees {
                    defined_at: graph.definition_sites(&target),
                    target,
                    chains,
                })
            }

            QueryMode::Callstack => {
                let pos = require_pos(pos)?;
                let target = resolve_function(&results, &pos, &mut trace)?;
                let path = graph.root_path(&target, CALLSTACK_DEPTH);

                let mut frames = vec![Frame {
                    func: target.clone(),
                    pos: graph.definition_sites(&target).into_iter().next(),
                }];
                for link in path.iter().rev() {
                    frames.push(Frame {
                        func: link.from.clone(),
                        pos: Some(SourcePos {
                            file: link.file.clone(),
                            line: link.line,
                        }),
                    });
                }
                Ok(QueryResult::Callstack { target, frames })
            }
        }
    }
}

/// The innermost function whose definition span contains the position.
fn function_at(results: &[(PathBuf, Arc<FileIndex>)], pos: &Position) -> Option<String> {
    let index = &results.iter().find(|(file, _)| *file == pos.file)?.1;
    index
        .functions
        .iter()
        .filter(|f| f.span.contains(pos.start))
        .min_by_key(|f| f.span.len())
        .map(|f| f.name.clone())
}

fn resolve_function(
    results: &[(PathBuf, Arc<FileIndex>)],
    pos: &Position,
    trace: &mut Trace<'_>,
) -> Result<String, QueryError> {
    let target =
        function_at(results, pos).ok_or_else(|| QueryError::NoFunction(pos.display()))?;
    trace.line(format_args!(
        "resolved {} to function '{}'",
        pos.display(),
        target
    ));
    Ok(target)
}

/// Resolve the innermost syntax element at the position: a call site, else
/// the enclosing function, else the enclosing type, else an import.
fn describe(
    results: &[(PathBuf, Arc<FileIndex>)],
    pos: &Position,
) -> Result<QueryResult, QueryError> {
    let no_element = || QueryError::NoElement(pos.display());

    let index = &results
        .iter()
        .find(|(file, _)| *file == pos.file)
        .ok_or_else(no_element)?
        .1;

    if let Some(call) = index
        .calls
        .iter()
        .filter(|c| c.span.contains(pos.start))
        .min_by_key(|c| c.span.len())
    {
        let caller = call
            .caller
            .clone()
            .unwrap_or_else(|| MODULE_CALLER.to_string());
        return Ok(QueryResult::Describe {
            kind: ElementKind::Call,
            name: call.callee.clone(),
            pos: SourcePos {
                file: pos.file.clone(),
                line: call.line,
            },
            detail: format!("call to {} from {}", call.callee, caller),
        });
    }

    if let Some(func) = index
        .functions
        .iter()
        .filter(|f| f.span.contains(pos.start))
        .min_by_key(|f| f.span.len())
    {
        let outgoing = index
            .calls
            .iter()
            .filter(|c| c.caller.as_deref() == Some(func.name.as_str()))
            .count();
        return Ok(QueryResult::Describe {
            kind: ElementKind::Function,
            name: func.name.clone(),
            pos: SourcePos {
                file: pos.file.clone(),
                line: func.line,
            },
            detail: format!(
                "definition of function {} ({} outgoing calls)",
                func.name, outgoing
            ),
        });
    }

    if let Some(ty) = index
        .types
        .iter()
        .filter(|t| t.span.contains(pos.start))
        .min_by_key(|t| t.span.len())
    {
        return Ok(QueryResult::Describe {
            kind: ElementKind::Type,
            name: ty.name.clone(),
            pos: SourcePos {
                file: pos.file.clone(),
                line: ty.line,
            },
            detail: format!("definition of type {}", ty.name),
        });
    }

    if let Some(import) = index.imports.iter().find(|i| i.span.contains(pos.start)) {
        return Ok(QueryResult::Describe {
            kind: ElementKind::Import,
            name: import.text.clone(),
            pos: SourcePos {
                file: pos.file.clone(),
                line: import.line,
            },
            detail: import.text.clone(),
        });
    }

    Err(no_element())
}

fn absolutize(path: &Path, cwd: &str) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(cwd).join(path)
    }
}

static ENGINE: OnceLock<QueryEngine> = OnceLock::new();

/// Run a query against the given scope. Relative paths, including the one
/// in `opts.pos`, are resolved against `cwd`. When `trace` is given the
/// engine writes its analysis log there.
pub fn query(
    scope: &[String],
    opts: &QueryOptions,
    trace: Option<&mut dyn Write>,
    cwd: &str,
) -> Result<QueryResult, QueryError> {
    ENGINE.get_or_init(QueryEngine::new).run(scope, opts, trace, cwd)
}
