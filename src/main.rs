// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! ciprune - CI pipeline trimmer
//!
//! Keep only the CI jobs a change needs.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ciprune::cli::{load_settings, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    let default_filter = if cli.verbose { "ciprune=debug" } else { "ciprune=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Change to specified directory if provided
    if let Some(ref dir) = cli.directory {
        std::env::set_current_dir(dir).map_err(|e| {
            miette::miette!("Failed to change to directory '{}': {}", dir.display(), e)
        })?;
    }

    let mode = match &cli.command {
        Commands::Run { mode, .. } => *mode,
        _ => None,
    };
    let settings = load_settings(cli.config.as_deref(), cli.settings, mode)?;

    // Dispatch to command handlers
    match cli.command {
        Commands::Run {
            full_pipeline,
            changed_files,
            ..
        } => ciprune::cli::run::run(settings, full_pipeline, changed_files, cli.verbose).await,
        Commands::Plan {
            full_pipeline,
            changed_files,
            format,
        } => {
            ciprune::cli::plan::run(settings, full_pipeline, changed_files, format, cli.verbose)
                .await
        }
        Commands::ChangedFiles { changed_files } => {
            ciprune::cli::changed::run(settings, changed_files, cli.verbose).await
        }
        Commands::Graph { format } => ciprune::cli::graph::run(settings, format, cli.verbose).await,
        Commands::Validate => ciprune::cli::validate::run(settings, cli.verbose).await,
    }
}
