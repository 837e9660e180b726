// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! Plan command - show the job selection without writing it

use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use super::{change_source, collect_changes, OutputFormat};
use crate::config::Settings;
use crate::errors::CipruneError;
use crate::mapping::FileJobMap;
use crate::pipeline::{KeepReason, PipelineDocument, Plan, PlanOptions, Planner};
use crate::utils::{print_bullet, print_info, print_section, print_success};

/// Run the plan command
pub async fn run(
    settings: Settings,
    full_pipeline: bool,
    changed_files: Option<PathBuf>,
    format: OutputFormat,
    verbose: bool,
) -> Result<()> {
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

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&plan).map_err(CipruneError::from)?;
            println!("{}", json);
        }
        OutputFormat::Text => print_text(&plan, verbose),
    }

    Ok(())
}

fn print_text(plan: &Plan, verbose: bool) {
    if plan.full_pipeline {
        println!("{}", "Full pipeline: filtering bypassed".bold());
    } else {
        print_section(&format!("Changed files ({})", plan.changed_files.len()));
        if plan.changed_files.is_empty() {
            println!("  {}", "none".dimmed());
        }
        for file in &plan.changed_files {
            let matched = plan.matches.iter().find(|m| &m.file == file);
            match matched {
                Some(m) => {
                    let prefixes = format!("[{}]", m.prefixes.join(", "));
                    print_bullet(&format!("{} {}", file, prefixes.dimmed()))
                }
                None if verbose => print_bullet(&format!("{}", file.dimmed())),
                None => {}
            }
        }

        print_section(&format!("Jobs implicated by changes ({})", plan.seed.len()));
        for job in &plan.seed {
            print_info(job);
        }
    }

    print_section(&format!(
        "Jobs to run ({} of {})",
        plan.kept.len(),
        plan.total_jobs
    ));
    if plan.kept.is_empty() {
        println!("  {}", "no jobs will run".dimmed());
    }
    for (job, reason) in &plan.kept {
        match reason {
            KeepReason::Seed => print_success(job),
            KeepReason::RequiredBy(by) => {
                print_success(&format!("{} {}", job, format!("(needed by {})", by).dimmed()))
            }
            KeepReason::ExtendedBy(by) => {
                print_success(&format!("{} {}", job, format!("(extended by {})", by).dimmed()))
            }
        }
    }
}
