// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! Pipeline model, dependency graph and output
//!
//! The document is parsed into a typed job/stage model, the graph decides
//! which jobs must be kept, and the writer applies that decision back onto
//! the document.

mod document;
mod graph;
mod planner;
mod validation;
mod writer;

pub use document::{
    Job, Need, PipelineDocument, Stage, DEFAULT_STAGE, DEFAULT_STAGES, RESERVED_KEYWORDS,
};
pub use graph::{DependencyGraph, EdgeKind, KeepReason};
pub use planner::{Plan, PlanOptions, Planner};
pub use validation::{PipelineValidator, ValidationResult};
pub use writer::{PipelineWriter, WriteMode, WriteReport};
