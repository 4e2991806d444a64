// SPDX-License-Identifier: Apache-2.0

use ignore::WalkBuilder;
use std::io;
use std::path::{Path, PathBuf};

use super::error::QueryError;
use crate::lang;

/// Directories never worth indexing.
const SKIP_DIRS: &[&str] = &["node_modules", "target", "__pycache__", "vendor"];

/// Expands scope paths into the list of source files to index.
pub struct ScopeWalker;

impl Default for ScopeWalker {
    fn default() -> Self {
        Self
    }
}

impl ScopeWalker {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, path: &Path) -> Result<(), QueryError> {
        if !path.exists() {
            return Err(QueryError::MissingPath(path.to_path_buf()));
        }
        Ok(())
    }

    /// Collect indexable files under the scope paths. `max_depth` bounds
    /// directory recursion, 0 = unlimited. The result is sorted and
    /// deduplicated so downstream output is deterministic.
    pub fn collect(&self, paths: &[PathBuf], max_depth: u32) -> Result<Vec<PathBuf>, QueryError> {
        let mut files = Vec::new();

        for path in paths {
            if path.is_file() {
                if !lang::language_for_path(path).is_empty() {
                    files.push(path.clone());
                }
                continue;
            }

            let mut builder = WalkBuilder::new(path);
            builder.standard_filters(false).hidden(true);
            if max_depth > 0 {
                builder.max_depth(Some(max_depth as usize));
            }
            builder.filter_entry(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .map(|name| !SKIP_DIRS.contains(&name))
                    .unwrap_or(true)
            });

            for entry in builder.build() {
                let entry = entry.map_err(io::Error::other)?;
                if entry.file_type().is_some_and(|t| t.is_file()) {
                    let entry_path = entry.into_path();
                    if !lang::language_for_path(&entry_path).is_empty() {
                        files.push(entry_path);
                    }
                }
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }
}
