// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

/// Get the language identifier for a file extension.
///
/// Returns `""` for files the engine cannot index; those are skipped
/// during scope traversal.
pub fn language_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("rs") => "rust",
        Some("go") => "go",
        Some("py") => "python",
        Some("js") | Some("jsx") => "javascript",
        Some("ts") | Some("tsx") => "typescript",
        _ => "",
    }
}
