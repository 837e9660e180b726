// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! Changed files from a list file or stdin

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

use super::{parse_path_lines, ChangeSource};
use crate::errors::{CipruneError, CipruneResult};

/// Newline-separated list of paths; `-` reads stdin
#[derive(Debug, Clone)]
pub struct ListFile {
    pub path: PathBuf,
}

impl ListFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn is_stdin(&self) -> bool {
        self.path.as_os_str() == "-"
    }
}

#[async_trait]
impl ChangeSource for ListFile {
    async fn changed_files(&self) -> CipruneResult<Vec<String>> {
        let content = if self.is_stdin() {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        } else {
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|e| CipruneError::FileReadError {
                    path: self.path.clone(),
                    error: e.to_string(),
                })?
        };

        Ok(parse_path_lines(&content))
    }

    fn describe(&self) -> String {
        if self.is_stdin() {
            "stdin".to_string()
        } else {
            format!("list file {}", self.path.display())
        }
    }
}
