// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! Graph command - visualize the resolved job graph

use miette::Result;

use super::GraphFormat;
use crate::config::Settings;
use crate::pipeline::{DependencyGraph, PipelineDocument};

/// Run the graph command
pub async fn run(settings: Settings, format: GraphFormat, verbose: bool) -> Result<()> {
    let doc = PipelineDocument::from_file(&settings.source)?;

    let mut graph = DependencyGraph::build(&doc)?;
    let implicit = graph.resolve_stage_dep()?;

    if verbose {
        tracing::info!(
            jobs = graph.job_count(),
            edges = graph.edge_count(),
            implicit,
            "Resolved job graph"
        );
    }

    let output = match format {
        GraphFormat::Text => graph.to_text()?,
        GraphFormat::Dot => graph.to_dot(),
        GraphFormat::Mermaid => graph.to_mermaid(),
    };

    println!("{}", output);

    Ok(())
}
