// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for ciprune.

pub mod changed;
pub mod graph;
pub mod plan;
pub mod run;
pub mod validate;

use clap::{Args, Parser, Subcommand};
use miette::Result;
use std::path::{Path, PathBuf};

use crate::changes::{ChangeSource, GitDiff, ListFile};
use crate::config::{Settings, SettingsOverrides};
use crate::pipeline::WriteMode;
use crate::utils::create_spinner;

/// CI pipeline trimmer
///
/// Keep only the CI jobs a change needs, without breaking stage order or
/// job dependencies.
#[derive(Parser, Debug)]
#[clap(
    name = "ciprune",
    version,
    about = "Trim CI pipeline documents down to the jobs a change actually needs",
    long_about = None,
    after_help = "Examples:\n\
        ciprune run                       Write the trimmed pipeline\n\
        ciprune run --full-pipeline       Write the pipeline with every job\n\
        ciprune plan --format json        Show which jobs would run and why\n\
        ciprune changed-files             Print the files changed since the base\n\
        ciprune graph --format mermaid    Show the resolved job graph\n\n\
        See 'ciprune <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Change to directory before executing
    #[clap(short = 'C', long, global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Settings file (default: .ciprune.yaml when present)
    #[clap(long, global = true, value_name = "FILE", env = "CIPRUNE_CONFIG")]
    pub config: Option<PathBuf>,

    #[clap(flatten)]
    pub settings: SettingsArgs,
}

/// Overrides for values from the settings file
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Pipeline document to trim
    #[clap(long, global = true, value_name = "FILE", env = "CIPRUNE_SOURCE")]
    pub source: Option<PathBuf>,

    /// File-to-job map
    #[clap(long = "map", global = true, value_name = "FILE", env = "CIPRUNE_FILE_MAP")]
    pub file_map: Option<PathBuf>,

    /// Output file for the trimmed pipeline ('-' for stdout)
    #[clap(short, long, global = true, value_name = "FILE", env = "CIPRUNE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Base revision changes are measured against
    #[clap(long, global = true, value_name = "REV", env = "CIPRUNE_BASE")]
    pub base: Option<String>,

    /// Revision holding the changes
    #[clap(long, global = true, value_name = "REV", env = "CIPRUNE_HEAD")]
    pub head: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Select the jobs to run and write the trimmed pipeline
    Run {
        /// Keep every job (no filtering)
        #[clap(long)]
        full_pipeline: bool,

        /// How jobs that should not run are written (remove, disable)
        #[clap(long, env = "CIPRUNE_MODE")]
        mode: Option<WriteMode>,

        /// Read changed files from a list file instead of git ('-' for stdin)
        #[clap(long, value_name = "FILE")]
        changed_files: Option<PathBuf>,
    },

    /// Show which jobs would run and why, without writing anything
    Plan {
        /// Keep every job (no filtering)
        #[clap(long)]
        full_pipeline: bool,

        /// Read changed files from a list file instead of git ('-' for stdin)
        #[clap(long, value_name = "FILE")]
        changed_files: Option<PathBuf>,

        /// Output format (text, json)
        #[clap(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the changed files
    ChangedFiles {
        /// Read changed files from a list file instead of git ('-' for stdin)
        #[clap(long, value_name = "FILE")]
        changed_files: Option<PathBuf>,
    },

    /// Show the resolved job graph
    Graph {
        /// Output format (text, dot, mermaid)
        #[clap(short, long, default_value = "text")]
        format: GraphFormat,
    },

    /// Validate the pipeline document and file-to-job map
    Validate,
}

/// Output format for the plan command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
}

impl std::str::FromStr for GraphFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "dot" => Ok(Self::Dot),
            "mermaid" => Ok(Self::Mermaid),
            _ => Err(format!("Unknown graph format: {}", s)),
        }
    }
}

/// Resolve settings: settings file first, then flags and environment
pub fn load_settings(
    config: Option<&Path>,
    args: SettingsArgs,
    mode: Option<WriteMode>,
) -> Result<Settings> {
    let cwd = std::env::current_dir()
        .map_err(|e| miette::miette!("Failed to get current directory: {}", e))?;
    let settings = Settings::discover(config, &cwd)?;

    Ok(settings.with_overrides(SettingsOverrides {
        source: args.source,
        file_map: args.file_map,
        output: args.output,
        base: args.base,
        head: args.head,
        mode,
    }))
}

/// Pick the change source: a list file when given, git otherwise
pub fn change_source(settings: &Settings, list: Option<PathBuf>) -> Box<dyn ChangeSource> {
    match list {
        Some(path) => Box::new(ListFile::new(path)),
        None => Box::new(GitDiff::new(settings.base.clone(), settings.head.clone())),
    }
}

/// Collect changed files, with a spinner while git runs
pub async fn collect_changes(source: &dyn ChangeSource, verbose: bool) -> Result<Vec<String>> {
    let spinner = create_spinner(&format!("Collecting changes ({})", source.describe()));
    let result = source.changed_files().await;
    spinner.finish_and_clear();

    let files = result?;
    if verbose {
        tracing::info!("Changed files: {}", files.join(", "));
    }
    Ok(files)
}
