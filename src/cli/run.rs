// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! Run command - select jobs and write the trimmed pipeline

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::{change_source, collect_changes};
use crate::config::Settings;
use crate::mapping::FileJobMap;
use crate::pipeline::{PipelineDocument, PipelineWriter, PlanOptions, Planner, WriteMode};

/// Run the full selection flow
pub async fn run(
    settings: Settings,
    full_pipeline: bool,
    changed_files: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    // Everything is loaded and checked before the output is touched
    let doc = PipelineDocument::from_file(&settings.source)?;

    let (map, changed) = if full_pipeline {
        (FileJobMap::default(), Vec::new())
    } else {
        let map = FileJobMap::from_file(&settings.file_map)?;
        let source = change_source(&settings, changed_files);
        let changed = collect_changes(source.as_ref(), verbose).await?;
        (map, changed)
    };

    let plan = Planner::new(&doc, &map).plan(changed, PlanOptions { full_pipeline })?;
    let kept = plan.kept_jobs();
    let writer = PipelineWriter::new(settings.mode);

    if settings.output.as_os_str() == "-" {
        print!("{}", writer.render(&doc, &kept)?);
        return Ok(());
    }

    let report = writer.write(&doc, &kept, &settings.output)?;

    if full_pipeline {
        println!(
            "  {} Full pipeline: all {} jobs kept",
            "✓".green(),
            report.kept
        );
    } else {
        println!(
            "  {} {} of {} jobs kept, {} {}",
            "✓".green(),
            report.kept.to_string().bold(),
            plan.total_jobs,
            report.dropped,
            match writer.mode() {
                WriteMode::Remove => "removed",
                WriteMode::Disable => "disabled",
            }
        );
    }

    let status = if report.unchanged { "unchanged" } else { "written" };
    println!(
        "  {} {} ({})",
        "→".blue(),
        report.path.display(),
        status.dimmed()
    );

    if verbose {
        println!("  {}", format!("blake3:{}", report.digest).dimmed());
    }

    Ok(())
}
