// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! Changed-file sources
//!
//! The selection core only consumes a list of paths. This module provides
//! the collaborators that produce it: a `git diff` between two revisions,
//! a newline-separated list file, or a fixed list.

mod git;
mod list;

pub use git::GitDiff;
pub use list::ListFile;

use async_trait::async_trait;

use crate::errors::CipruneResult;

/// Something that knows which files changed in this run
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// Changed paths, relative to the repository root
    async fn changed_files(&self) -> CipruneResult<Vec<String>>;

    /// Short description for logs
    fn describe(&self) -> String;
}

/// A fixed list of changed files
#[derive(Debug, Clone, Default)]
pub struct StaticChanges(pub Vec<String>);

#[async_trait]
impl ChangeSource for StaticChanges {
    async fn changed_files(&self) -> CipruneResult<Vec<String>> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        format!("{} given file(s)", self.0.len())
    }
}

/// Parse newline-separated paths, skipping blanks and `#` comments
pub(crate) fn parse_path_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
