// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! Changed files from `git diff`

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

use super::ChangeSource;
use crate::errors::{CipruneError, CipruneResult};

/// Files differing between the merge base of `base` and `head`, and `head`
#[derive(Debug, Clone)]
pub struct GitDiff {
    /// Base revision, e.g. `origin/main`
    pub base: String,
    /// Head revision, usually `HEAD`
    pub head: String,
    /// Repository to run in; current directory when `None`
    pub repo: Option<PathBuf>,
}

impl GitDiff {
    /// Diff `base...head` in the current directory
    pub fn new(base: impl Into<String>, head: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            head: head.into(),
            repo: None,
        }
    }

    /// Run in a specific repository
    pub fn in_repo(mut self, repo: impl Into<PathBuf>) -> Self {
        self.repo = Some(repo.into());
        self
    }

    fn range(&self) -> String {
        format!("{}...{}", self.base, self.head)
    }
}

#[async_trait]
impl ChangeSource for GitDiff {
    async fn changed_files(&self) -> CipruneResult<Vec<String>> {
        let git = which::which("git").map_err(|_| CipruneError::tool_not_found("git"))?;

        let mut cmd = Command::new(git);
        // -z prints paths verbatim instead of quoting non-ASCII names
        cmd.args(["diff", "--name-only", "--no-renames", "-z"])
            .arg(self.range());
        if let Some(ref repo) = self.repo {
            cmd.current_dir(repo);
        }

        tracing::debug!("Running git diff --name-only --no-renames -z {}", self.range());

        let output = cmd.output().await.map_err(|e| CipruneError::ChangeDetection {
            message: e.to_string(),
            help: Some("git could not be started".to_string()),
        })?;

        if !output.status.success() {
            return Err(CipruneError::git_failed(&String::from_utf8_lossy(
                &output.stderr,
            )));
        }

        let files = parse_nul_separated(&output.stdout);
        tracing::info!("{} file(s) changed in {}", files.len(), self.range());
        Ok(files)
    }

    fn describe(&self) -> String {
        format!("git diff {}", self.range())
    }
}

/// Split `-z` output into paths
fn parse_nul_separated(stdout: &[u8]) -> Vec<String> {
    stdout
        .split(|&b| b == 0)
        .filter(|path| !path.is_empty())
        .map(|path| String::from_utf8_lossy(path).into_owned())
        .collect()
}
