// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! Settings loading
//!
//! Settings come from `.ciprune.yaml` when present, and every field can be
//! overridden from the command line or `CIPRUNE_*` environment variables.
//! The resolved [`Settings`] value is passed explicitly to whatever needs
//! it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::{CipruneError, CipruneResult};
use crate::pipeline::WriteMode;

/// Default settings file name
pub const CONFIG_FILE: &str = ".ciprune.yaml";

/// Settings from .ciprune.yaml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Pipeline document to trim
    #[serde(default = "default_source")]
    pub source: PathBuf,

    /// File-to-job map
    #[serde(default = "default_file_map")]
    pub file_map: PathBuf,

    /// Where the trimmed pipeline is written
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Revision changes are measured against
    #[serde(default = "default_base")]
    pub base: String,

    /// Revision holding the changes
    #[serde(default = "default_head")]
    pub head: String,

    /// How dropped jobs are written
    #[serde(default)]
    pub mode: WriteMode,
}

fn default_source() -> PathBuf {
    PathBuf::from(".gitlab-source.yml")
}

fn default_file_map() -> PathBuf {
    PathBuf::from(".ciprune/filejobs.yaml")
}

fn default_output() -> PathBuf {
    PathBuf::from(".dynamic/gitlab-ci.yml")
}

fn default_base() -> String {
    "origin/main".to_string()
}

fn default_head() -> String {
    "HEAD".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: default_source(),
            file_map: default_file_map(),
            output: default_output(),
            base: default_base(),
            head: default_head(),
            mode: WriteMode::default(),
        }
    }
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub source: Option<PathBuf>,
    pub file_map: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub base: Option<String>,
    pub head: Option<String>,
    pub mode: Option<WriteMode>,
}

impl Settings {
    /// Parse settings from YAML
    pub fn from_yaml(yaml: &str) -> CipruneResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(|e| {
            CipruneError::config_with_help(
                format!("invalid settings: {}", e),
                "Known keys: source, file_map, output, base, head, mode",
            )
        })
    }

    /// Load settings from a file
    pub fn from_file(path: &Path) -> CipruneResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CipruneError::FileReadError {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        Self::from_yaml(&content)
    }

    /// Load settings from `explicit`, or `.ciprune.yaml` in `dir` when it
    /// exists, or defaults
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> CipruneResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            tracing::debug!("Using settings from {}", candidate.display());
            Self::from_file(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply overrides on top of these settings
    pub fn with_overrides(mut self, overrides: SettingsOverrides) -> Self {
        if let Some(source) = overrides.source {
            self.source = source;
        }
        if let Some(file_map) = overrides.file_map {
            self.file_map = file_map;
        }
        if let Some(output) = overrides.output {
            self.output = output;
        }
        if let Some(base) = overrides.base {
            self.base = base;
        }
        if let Some(head) = overrides.head {
            self.head = head;
        }
        if let Some(mode) = overrides.mode {
            self.mode = mode;
        }
        self
    }
}
