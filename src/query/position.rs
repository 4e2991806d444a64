// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use super::error::QueryError;

/// A `--pos` selection: a byte offset or extent within one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub file: PathBuf,
    pub start: usize,
    pub end: usize,
}

impl Position {
    /// Parse `FILE:OFFSET` or `FILE:START-END`. Offsets are byte offsets.
    pub fn parse(s: &str) -> Result<Self, QueryError> {
        let bad = || QueryError::InvalidPosition(s.to_string());

        let (file, range) = s.rsplit_once(':').ok_or_else(bad)?;
        if file.is_empty() {
            return Err(bad());
        }

        let (start, end) = match range.split_once('-') {
            Some((a, b)) => {
                let start = a.parse::<usize>().map_err(|_| bad())?;
                let end = b.parse::<usize>().map_err(|_| bad())?;
                (start, end)
            }
            None => {
                let offset = range.parse::<usize>().map_err(|_| bad())?;
                (offset, offset)
            }
        };
        if end < start {
            return Err(bad());
        }

        Ok(Self {
            file: PathBuf::from(file),
            start,
            end,
        })
    }

    /// `file:offset` rendering for error messages.
    pub fn display(&self) -> String {
        format!("{}:{}", self.file.display(), self.start)
    }
}
