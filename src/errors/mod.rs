// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! Error types
//!
//! Every error is fatal to the current run. Each variant names the job,
//! stage or file at fault so the CI log points straight at the culprit.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for ciprune operations
pub type CipruneResult<T> = Result<T, CipruneError>;

/// Main error type for ciprune
#[derive(Error, Debug, Diagnostic)]
pub enum CipruneError {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Invalid configuration: {reason}")]
    #[diagnostic(code(ciprune::config_error))]
    ConfigError {
        reason: String,
        #[help]
        help: Option<String>,
    },

    #[error("Job '{job}' not found in pipeline")]
    #[diagnostic(
        code(ciprune::job_not_found),
        help("Check that '{job}' is defined in the pipeline document ({referenced_by})")
    )]
    JobNotFound { job: String, referenced_by: String },

    #[error("Circular dependency detected between jobs: {}", jobs.join(" → "))]
    #[diagnostic(
        code(ciprune::cycle),
        help("Review the needs/dependencies of these jobs to remove the cycle")
    )]
    CycleError { jobs: Vec<String> },

    // ─────────────────────────────────────────────────────────────────────────
    // Output Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to write pipeline '{path}': {reason}")]
    #[diagnostic(code(ciprune::write_error))]
    WriteError { path: PathBuf, reason: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Change Detection Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Tool '{tool}' not found")]
    #[diagnostic(code(ciprune::tool_not_found), help("{suggestion}"))]
    ToolNotFound { tool: String, suggestion: String },

    #[error("Could not determine changed files: {message}")]
    #[diagnostic(code(ciprune::change_detection))]
    ChangeDetection {
        message: String,
        #[help]
        help: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // IO/System Errors
    // ─────────────────────────────────────────────────────────────────────────
    #[error("Failed to read file '{path}': {error}")]
    #[diagnostic(code(ciprune::file_read_error))]
    FileReadError { path: PathBuf, error: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(ciprune::io_error))]
    Io { message: String },

    #[error("YAML parsing error: {message}")]
    #[diagnostic(code(ciprune::yaml_error))]
    Yaml { message: String },

    #[error("JSON error: {message}")]
    #[diagnostic(code(ciprune::json_error))]
    Json { message: String },
}

impl From<std::io::Error> for CipruneError {
    fn from(e: std::io::Error) -> Self {
        Self::Io { message: e.to_string() }
    }
}

impl From<serde_yaml::Error> for CipruneError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml { message: e.to_string() }
    }
}

impl From<serde_json::Error> for CipruneError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json { message: e.to_string() }
    }
}

impl CipruneError {
    /// Configuration error without a hint
    pub fn config(reason: impl Into<String>) -> Self {
        Self::ConfigError {
            reason: reason.into(),
            help: None,
        }
    }

    /// Configuration error with a hint for the user
    pub fn config_with_help(reason: impl Into<String>, help: impl Into<String>) -> Self {
        Self::ConfigError {
            reason: reason.into(),
            help: Some(help.into()),
        }
    }

    /// Job lookup failure, naming who asked for the job
    pub fn job_not_found(job: &str, referenced_by: impl Into<String>) -> Self {
        Self::JobNotFound {
            job: job.to_string(),
            referenced_by: referenced_by.into(),
        }
    }

    /// Create a tool not found error with installation suggestion
    pub fn tool_not_found(tool: &str) -> Self {
        let suggestion = match tool {
            "git" => "Install git and make sure the pipeline runs inside a clone".to_string(),
            _ => format!("Install {} and ensure it's in your PATH", tool),
        };

        Self::ToolNotFound {
            tool: tool.to_string(),
            suggestion,
        }
    }

    /// Create a change detection error from git's stderr
    pub fn git_failed(stderr: &str) -> Self {
        let help = if stderr.contains("unknown revision") || stderr.contains("bad revision") {
            Some(
                "The base revision is missing locally. Fetch it first (e.g. 'git fetch origin main') \
                 or pass --base explicitly."
                    .to_string(),
            )
        } else if stderr.contains("not a git repository") {
            Some("Run ciprune from inside the repository, or use -C <dir>.".to_string())
        } else {
            None
        };

        Self::ChangeDetection {
            message: stderr.trim().to_string(),
            help,
        }
    }
}
