// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! Validate command - check the pipeline document and file-to-job map

use colored::Colorize;
use miette::Result;

use crate::config::Settings;
use crate::mapping::FileJobMap;
use crate::pipeline::{PipelineDocument, PipelineValidator};
use crate::utils::{print_error, print_success, print_warning};

/// Run the validate command
pub async fn run(settings: Settings, verbose: bool) -> Result<()> {
    println!("{}", "Validating pipeline...".bold());
    println!();

    let doc = match PipelineDocument::from_file(&settings.source) {
        Ok(doc) => doc,
        Err(e) => {
            print_error("Failed to parse pipeline");
            println!();
            return Err(e.into());
        }
    };
    print_success(&format!("{} parsed", settings.source.display()));

    let mut validation = PipelineValidator::validate(&doc);

    if settings.file_map.exists() {
        let map = FileJobMap::from_file(&settings.file_map)?;
        print_success(&format!("{} parsed", settings.file_map.display()));

        for entry in map.entries() {
            for job in &entry.jobs {
                if !doc.contains_job(job) {
                    validation.add_error(&format!(
                        "File map entry '{}' refers to unknown job '{}'",
                        entry.prefix, job
                    ));
                }
            }
        }
    } else {
        validation.add_warning(&format!(
            "File map {} not found; only full-pipeline runs will work",
            settings.file_map.display()
        ));
    }

    if !validation.errors.is_empty() {
        println!();
        println!("{}:", "Errors".red().bold());
        for error in &validation.errors {
            print_error(error);
        }
    }

    if !validation.warnings.is_empty() {
        println!();
        println!("{}:", "Warnings".yellow().bold());
        for warning in &validation.warnings {
            print_warning(warning);
        }
    }

    if verbose {
        println!();
        println!("{}:", "Pipeline summary".bold());
        println!("  Stages: {}", doc.stages().len());
        println!("  Jobs: {}", doc.job_count());
        for stage in doc.stages() {
            let jobs: Vec<&str> = doc
                .jobs()
                .filter(|j| j.stage == stage.name)
                .map(|j| j.name.as_str())
                .collect();
            if !jobs.is_empty() {
                println!("    - {} {}", stage.name, format!("[{}]", jobs.join(", ")).dimmed());
            }
        }
    }

    println!();

    if !validation.is_valid() {
        Err(miette::miette!("Pipeline validation failed"))
    } else if validation.has_warnings() {
        println!("{}", "Pipeline is valid but has warnings.".yellow().bold());
        Ok(())
    } else {
        println!("{}", "Pipeline is valid!".green().bold());
        Ok(())
    }
}
