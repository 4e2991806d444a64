// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;
use std::io::{self, Write};

use super::types::{CallChain, CallLink, QueryResult, SourcePos};

impl QueryResult {
    /// Write the plain rendering: every line is `pos: text`, where `pos`
    /// is `file:line` or `-` if unknown.
    pub fn write_plain<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self {
            QueryResult::Callers {
                target,
                defined_at,
                chains,
            } => {
                write_line(out, defined_at.first(), &format!("callers of {target}"))?;
                if chains.is_empty() {
                    write_line(
                        out,
                        None,
                        &format!("{target} is not called within the analysis scope"),
                    )?;
                }
                for link in unique_links(chains) {
                    write_link(out, link)?;
                }
            }

            QueryResult::Callees {
                target,
                defined_at,
                chains,
            } => {
                write_line(out, defined_at.first(), &format!("calls made by {target}"))?;
                if chains.is_empty() {
                    write_line(
                        out,
                        None,
                        &format!("{target} makes no calls within the analysis scope"),
                    )?;
                }
                for link in unique_links(chains) {
                    write_link(out, link)?;
                }
            }

            QueryResult::Callstack { target, frames } => {
                let root = frames.last().map(|f| f.func.as_str()).unwrap_or(target);
                write_line(out, None, &format!("call path from {root} to {target}"))?;
                for frame in frames {
                    write_line(out, frame.pos.as_ref(), &frame.func)?;
                }
            }

            QueryResult::Callgraph { functions } => {
                let call_sites: usize = functions.iter().map(|n| n.edges.len()).sum();
                write_line(
                    out,
                    None,
                    &format!(
                        "call graph of the analysis scope ({} functions, {} call sites)",
                        functions.len(),
                        call_sites
                    ),
                )?;
                for node in functions {
                    if node.edges.is_empty() {
                        write_line(
                            out,
                            node.defined_at.first(),
                            &format!("{} makes no calls", node.func),
                        )?;
                    }
                    for edge in &node.edges {
                        write_link(out, edge)?;
                    }
                }
            }

            QueryResult::Describe { pos, detail, .. } => {
                write_line(out, Some(pos), detail)?;
            }
        }

        Ok(())
    }
}

fn write_line<W: Write>(out: &mut W, pos: Option<&SourcePos>, text: &str) -> io::Result<()> {
    match pos {
        Some(pos) => writeln!(out, "{pos}: {text}"),
        None => writeln!(out, "-: {text}"),
    }
}

fn write_link<W: Write>(out: &mut W, link: &CallLink) -> io::Result<()> {
    let pos = SourcePos {
        file: link.file.clone(),
        line: link.line,
    };
    write_line(out, Some(&pos), &format!("{} calls {}", link.from, link.to))
}

/// Flatten chains into their links, first occurrence wins, so a hop shared
/// by several chains prints once.
fn unique_links(chains: &[CallChain]) -> Vec<&CallLink> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for chain in chains {
        for link in &chain.links {
            if seen.insert((&link.file, link.line, &link.from, &link.to)) {
                links.push(link);
            }
        }
    }
    links
}
