// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between parsing a query and producing a
/// result. The binary prints the `Display` text and exits with code 1.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("no source paths given")]
    EmptyScope,

    #[error("path '{0}' does not exist")]
    MissingPath(PathBuf),

    #[error("invalid position '{0}': expected file:offset or file:start-end")]
    InvalidPosition(String),

    #[error("the '{0}' query requires the --pos flag")]
    PositionRequired(&'static str),

    #[error("no function found at {0}")]
    NoFunction(String),

    #[error("no syntax element at {0}")]
    NoElement(String),

    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("{language} grammar error: {message}")]
    Grammar { language: String, message: String },

    #[error("failed to parse input as {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}
