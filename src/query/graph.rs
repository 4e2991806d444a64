// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;

use super::types::{CallChain, CallLink, FileIndex, GraphNode, SourcePos};

/// Pseudo-caller attributed to calls made outside any function.
pub const MODULE_CALLER: &str = "<module>";

/// Name-keyed call graph over every indexed file in the scope.
#[derive(Debug, Clone, Default)]
pub struct CallGraph {
    callers: HashMap<String, Vec<(PathBuf, usize, String)>>,
    callees: HashMap<String, Vec<(PathBuf, usize, String)>>,
    functions: BTreeMap<String, Vec<SourcePos>>,
    types: BTreeMap<String, Vec<SourcePos>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(results: &[(PathBuf, Arc<FileIndex>)]) -> Self {
        let mut graph = Self::new();

        for (file, index) in results {
            for func in &index.functions {
                graph.functions.entry(func.name.clone()).or_default().push(SourcePos {
                    file: file.clone(),
                    line: func.line,
                });
            }

            for ty in &index.types {
                graph.types.entry(ty.name.clone()).or_default().push(SourcePos {
                    file: file.clone(),
                    line: ty.line,
                });
            }

            for call in &index.calls {
                let caller = call
                    .caller
                    .clone()
                    .unwrap_or_else(|| MODULE_CALLER.to_string());

                graph
                    .callers
                    .entry(call.callee.clone())
                    .or_default()
                    .push((file.clone(), call.line, caller.clone()));

                if caller != MODULE_CALLER {
                    graph.callees.entry(caller).or_default().push((
                        file.clone(),
                        call.line,
                        call.callee.clone(),
                    ));
                }
            }
        }

        graph
    }

    /// Definition sites of a name: function definitions first, then types.
    pub fn definition_sites(&self, name: &str) -> Vec<SourcePos> {
        let mut sites = self.functions.get(name).cloned().unwrap_or_default();
        sites.extend(self.types.get(name).cloned().unwrap_or_default());
        sites
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn call_count(&self) -> usize {
        self.callers.values().map(Vec::len).sum()
    }

    /// A function nothing in the scope calls.
    pub fn is_root(&self, name: &str) -> bool {
        name == MODULE_CALLER || !self.callers.contains_key(name)
    }

    pub fn find_incoming_chains(&self, symbol: &str, max_depth: u32) -> Vec<CallChain> {
        if max_depth == 0 {
            return vec![];
        }

        let mut chains = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();

        if let Some(direct_callers) = self.callers.get(symbol) {
            for (file, line, caller) in direct_callers {
                let initial = vec![link(file, *line, caller, symbol)];

                if max_depth == 1 {
                    chains.push(CallChain { links: initial });
                } else {
                    queue.push_back((caller.clone(), initial, 1));
                }
            }
        }

        while let Some((current, links, depth)) = queue.pop_front() {
            if depth >= max_depth || visited.contains(&current) {
                chains.push(CallChain { links });
                continue;
            }
            visited.insert(current.clone());

            if let Some(callers) = self.callers.get(&current) {
                for (file, line, caller) in callers {
                    let mut extended = vec![link(file, *line, caller, &current)];
                    extended.extend(links.clone());

                    if depth + 1 >= max_depth {
                        chains.push(CallChain { links: extended });
                    } else {
                        queue.push_back((caller.clone(), extended, depth + 1));
                    }
                }
            } else {
                chains.push(CallChain { links });
            }
        }

        chains
    }

    pub fn find_outgoing_chains(&self, symbol: &str, max_depth: u32) -> Vec<CallChain> {
        if max_depth == 0 {
            return vec![];
        }

        let mut chains = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();

        if let Some(direct_callees) = self.callees.get(symbol) {
            for (file, line, callee) in direct_callees {
                let initial = vec![link(file, *line, symbol, callee)];

                if max_depth == 1 {
                    chains.push(CallChain { links: initial });
                } else {
                    queue.push_back((callee.clone(), initial, 1));
                }
            }
        }

        while let Some((current, links, depth)) = queue.pop_front() {
            if depth >= max_depth || visited.contains(&current) {
                chains.push(CallChain { links });
                continue;
            }
            visited.insert(current.clone());

            if let Some(callees) = self.callees.get(&current) {
                for (file, line, callee) in callees {
                    let mut extended = links.clone();
                    extended.push(link(file, *line, &current, callee));

                    if depth + 1 >= max_depth {
                        chains.push(CallChain { links: extended });
                    } else {
                        queue.push_back((callee.clone(), extended, depth + 1));
                    }
                }
            } else {
                chains.push(CallChain { links });
            }
        }

        chains
    }

    /// One arbitrary call path from a root of the graph down to `target`,
    /// outermost caller first. Empty when nothing calls the target.
    pub fn root_path(&self, target: &str, max_depth: u32) -> Vec<CallLink> {
        let chains = self.find_incoming_chains(target, max_depth);

        let rooted = |chain: &&CallChain| {
            chain
                .links
                .first()
                .map(|l| self.is_root(&l.from))
                .unwrap_or(false)
        };

        chains
            .iter()
            .filter(rooted)
            .max_by_key(|c| c.links.len())
            .or_else(|| chains.iter().max_by_key(|c| c.links.len()))
            .map(|c| c.links.clone())
            .unwrap_or_default()
    }

    /// Every defined function with its outgoing edges, sorted by name for
    /// deterministic output.
    pub fn nodes(&self) -> Vec<GraphNode> {
        self.functions
            .iter()
            .map(|(name, defined_at)| {
                let mut edges: Vec<CallLink> = self
                    .callees
                    .get(name)
                    .map(|sites| {
                        sites
                            .iter()
                            .map(|(file, line, callee)| link(file, *line, name, callee))
                            .collect()
                    })
                    .unwrap_or_default();
                edges.sort_by(|a, b| {
                    (&a.file, a.line, &a.to).cmp(&(&b.file, b.line, &b.to))
                });

                GraphNode {
                    func: name.clone(),
                    defined_at: defined_at.clone(),
                    edges,
                }
            })
            .collect()
    }
}

fn link(file: &PathBuf, line: usize, from: &str, to: &str) -> CallLink {
    CallLink {
        file: file.clone(),
        line,
        from: from.to_string(),
        to: to.to_string(),
    }
}
