// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, StreamingIterator, Tree};

use super::error::QueryError;
use super::languages;
use super::lock_or_recover;
use super::types::{CallSite, FileIndex, FunctionDef, ImportRef, Span, TypeDef};

/// Per-language tree-sitter parsers, created once and shared.
#[derive(Clone)]
pub struct ParserManager {
    parsers: Arc<Mutex<HashMap<String, Arc<Mutex<Parser>>>>>,
}

impl ParserManager {
    pub fn new() -> Self {
        Self {
            parsers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn get_or_create_parser(&self, language: &str) -> Result<Arc<Mutex<Parser>>, QueryError> {
        let mut cache = lock_or_recover(&self.parsers, |c| c.clear());

        if let Some(parser) = cache.get(language) {
            return Ok(Arc::clone(parser));
        }

        let mut parser = Parser::new();
        let grammar: Language = match language {
            "rust" => tree_sitter_rust::LANGUAGE.into(),
            "go" => tree_sitter_go::LANGUAGE.into(),
            "python" => tree_sitter_python::LANGUAGE.into(),
            "javascript" | "typescript" => tree_sitter_javascript::LANGUAGE.into(),
            _ => {
                return Err(QueryError::UnsupportedLanguage(language.to_string()));
            }
        };

        parser
            .set_language(&grammar)
            .map_err(|e| QueryError::Grammar {
                language: language.to_string(),
                message: e.to_string(),
            })?;

        let parser_arc = Arc::new(Mutex::new(parser));
        cache.insert(language.to_string(), Arc::clone(&parser_arc));
        Ok(parser_arc)
    }

    pub fn parse(&self, content: &str, language: &str) -> Result<Tree, QueryError> {
        let parser_arc = self.get_or_create_parser(language)?;
        let mut parser = lock_or_recover(&parser_arc, |_| {});

        parser
            .parse(content, None)
            .ok_or_else(|| QueryError::Parse(language.to_string()))
    }
}

impl Default for ParserManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts a `FileIndex` from a parsed tree.
pub struct FileIndexer;

impl FileIndexer {
    pub fn index(tree: &Tree, source: &str, language: &str) -> Result<FileIndex, QueryError> {
        let line_count = source.lines().count();

        let Some(info) = languages::language_info(language) else {
            return Ok(FileIndex::empty(line_count));
        };

        let mut index = Self::extract_elements(tree, source, &info, language)?;
        index.calls = Self::extract_calls(tree, source, &info, language)?;
        index.line_count = line_count;

        Ok(index)
    }

    fn extract_elements(
        tree: &Tree,
        source: &str,
        info: &languages::LanguageInfo,
        language: &str,
    ) -> Result<FileIndex, QueryError> {
        let mut index = FileIndex::empty(0);

        let query =
            Query::new(&tree.language(), info.element_query).map_err(|e| QueryError::Grammar {
                language: language.to_string(),
                message: e.to_string(),
            })?;

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, tree.root_node(), source.as_bytes());

        while let Some(match_) = matches.next() {
            let mut def: Option<Node> = None;
            let mut func_name: Option<Node> = None;
            let mut type_name: Option<Node> = None;
            let mut import: Option<Node> = None;

            for capture in match_.captures {
                match query.capture_names()[capture.index as usize] {
                    "func.def" | "type.def" => def = Some(capture.node),
                    "func.name" => func_name = Some(capture.node),
                    "type.name" => type_name = Some(capture.node),
                    "import" => import = Some(capture.node),
                    _ => {}
                }
            }

            if let Some(name_node) = func_name
                && let Some(def_node) = def
                && let Some(name) = source.get(name_node.byte_range())
            {
                index.functions.push(FunctionDef {
                    name: name.to_string(),
                    line: name_node.start_position().row + 1,
                    span: node_span(&def_node),
                });
            } else if let Some(name_node) = type_name
                && let Some(def_node) = def
                && let Some(name) = source.get(name_node.byte_range())
            {
                index.types.push(TypeDef {
                    name: name.to_string(),
                    line: name_node.start_position().row + 1,
                    span: node_span(&def_node),
                });
            } else if let Some(node) = import
                && let Some(text) = source.get(node.byte_range())
            {
                index.imports.push(ImportRef {
                    text: text.trim().to_string(),
                    line: node.start_position().row + 1,
                    span: node_span(&node),
                });
            }
        }

        Ok(index)
    }

    fn extract_calls(
        tree: &Tree,
        source: &str,
        info: &languages::LanguageInfo,
        language: &str,
    ) -> Result<Vec<CallSite>, QueryError> {
        let mut calls = Vec::new();

        let query =
            Query::new(&tree.language(), info.call_query).map_err(|e| QueryError::Grammar {
                language: language.to_string(),
                message: e.to_string(),
            })?;

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, tree.root_node(), source.as_bytes());

        while let Some(match_) = matches.next() {
            for capture in match_.captures {
                let node = capture.node;
                let Some(text) = source.get(node.byte_range()) else {
                    continue;
                };
                let start_pos = node.start_position();

                match query.capture_names()[capture.index as usize] {
                    "function.call" | "method.call" | "scoped.call" | "macro.call"
                    | "constructor.call" => {
                        calls.push(CallSite {
                            caller: Self::find_containing_function(&node, source, info),
                            callee: text.to_string(),
                            line: start_pos.row + 1,
                            column: start_pos.column,
                            span: node_span(&node),
                            context: line_context(source, &node),
                        });
                    }
                    _ => {}
                }
            }
        }

        Ok(calls)
    }

    fn find_containing_function(
        node: &Node,
        source: &str,
        info: &languages::LanguageInfo,
    ) -> Option<String> {
        let mut current = *node;

        while let Some(parent) = current.parent() {
            if info.function_node_kinds.contains(&parent.kind())
                && let Some(name) =
                    Self::extract_text_from_child(&parent, source, info.function_name_kinds)
            {
                return Some(name);
            }
            current = parent;
        }

        None
    }

    fn extract_text_from_child(node: &Node, source: &str, kinds: &[&str]) -> Option<String> {
        (0..node.child_count() as u32)
            .filter_map(|i| node.child(i))
            .find(|child| kinds.contains(&child.kind()))
            .and_then(|child| source.get(child.byte_range()).map(|s| s.to_string()))
    }
}

fn node_span(node: &Node) -> Span {
    Span {
        start: node.start_byte(),
        end: node.end_byte(),
    }
}

/// The trimmed source line containing `node`.
fn line_context(source: &str, node: &Node) -> String {
    let line_start = source
        .get(..node.start_byte())
        .and_then(|s: &str| s.rfind('\n'))
        .map(|i| i + 1)
        .unwrap_or(0);
    let line_end = source
        .get(node.end_byte()..)
        .and_then(|s: &str| s.find('\n'))
        .map(|i| node.end_byte() + i)
        .unwrap_or(source.len());
    source
        .get(line_start..line_end)
        .map(|s: &str| s.trim().to_string())
        .unwrap_or_default()
}
