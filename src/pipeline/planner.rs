// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! Job selection planner
//!
//! Runs the selection flow for one document: changed files → seed jobs →
//! resolved graph → kept jobs.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::CipruneResult;
use crate::mapping::{FileJobMap, FileMatch};
use crate::pipeline::{DependencyGraph, KeepReason, PipelineDocument};

/// Planning options
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    /// Keep every job regardless of changes
    pub full_pipeline: bool,
}

/// Which jobs to keep, and why
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    /// Changed files considered
    pub changed_files: Vec<String>,
    /// Files that matched at least one map prefix
    pub matches: Vec<FileMatch>,
    /// Jobs directly implicated by the changes
    pub seed: Vec<String>,
    /// Jobs to keep with the reason for each
    pub kept: BTreeMap<String, KeepReason>,
    /// Jobs defined in the document
    pub total_jobs: usize,
    /// Filtering was bypassed
    pub full_pipeline: bool,
}

impl Plan {
    /// Names of the kept jobs
    pub fn kept_jobs(&self) -> BTreeSet<String> {
        self.kept.keys().cloned().collect()
    }

    /// Number of jobs that will not run
    pub fn dropped(&self) -> usize {
        self.total_jobs - self.kept.len()
    }
}

/// Plans job selection for one pipeline document
pub struct Planner<'a> {
    doc: &'a PipelineDocument,
    map: &'a FileJobMap,
}

impl<'a> Planner<'a> {
    pub fn new(doc: &'a PipelineDocument, map: &'a FileJobMap) -> Self {
        Self { doc, map }
    }

    /// Compute the plan for a set of changed files.
    ///
    /// The graph is resolved even for full-pipeline runs so configuration
    /// errors and cycles are reported either way.
    pub fn plan(&self, changed_files: Vec<String>, options: PlanOptions) -> CipruneResult<Plan> {
        let mut graph = DependencyGraph::build(self.doc)?;
        graph.resolve_stage_dep()?;

        let matches = self.map.explain(&changed_files);
        let seed = if options.full_pipeline {
            self.doc.job_names().into_iter().map(str::to_string).collect()
        } else {
            self.map.jobs_for(&changed_files)
        };

        tracing::info!("Jobs directly implicated: {}", seed.join(", "));

        let kept = graph.explain_jobs_to_run(&seed)?;

        tracing::info!(
            kept = kept.len(),
            total = self.doc.job_count(),
            "Selected jobs to run"
        );

        Ok(Plan {
            changed_files,
            matches,
            seed,
            kept,
            total_jobs: self.doc.job_count(),
            full_pipeline: options.full_pipeline,
        })
    }
}
