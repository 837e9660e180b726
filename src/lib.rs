// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! # ciprune - CI pipeline trimmer
//!
//! `ciprune` keeps only the CI jobs a change needs, without breaking stage
//! ordering or job dependencies.
//!
//! ## Features
//!
//! - **File-to-job mapping** - Path prefixes decide which jobs a change implicates
//! - **Dependency closure** - Every job a kept job needs is kept too
//! - **Stage ordering** - Jobs without `needs` wait for the previous stage
//! - **Faithful output** - Surviving jobs and pipeline settings are written untouched
//!
//! ## Quick Start
//!
//! ```bash
//! # Write .dynamic/gitlab-ci.yml with only the jobs this branch needs
//! ciprune run --base origin/main
//!
//! # Explain the selection
//! ciprune plan
//!
//! # Keep everything
//! ciprune run --full-pipeline
//! ```
//!
//! ## Library use
//!
//! ```no_run
//! use ciprune::{DependencyGraph, FileJobMap, PipelineDocument};
//!
//! # fn main() -> ciprune::CipruneResult<()> {
//! let doc = PipelineDocument::from_file(".gitlab-source.yml".as_ref())?;
//! let map = FileJobMap::from_file(".ciprune/filejobs.yaml".as_ref())?;
//!
//! let mut graph = DependencyGraph::build(&doc)?;
//! graph.resolve_stage_dep()?;
//! let kept = graph.pipeline_jobs_to_run(map.jobs_for(&["lib/x.go"]))?;
//! # let _ = kept;
//! # Ok(())
//! # }
//! ```

pub mod changes;
pub mod cli;
pub mod config;
pub mod errors;
pub mod mapping;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types
pub use errors::{CipruneError, CipruneResult};
pub use mapping::FileJobMap;
pub use pipeline::{DependencyGraph, PipelineDocument, PipelineWriter, WriteMode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
