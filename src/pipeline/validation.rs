// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! Pipeline validation
//!
//! Lints a pipeline document before it is trimmed. Hard failures (unknown
//! references, cycles) become errors; suspicious but legal constructs
//! become warnings.

use std::collections::HashSet;

use crate::errors::CipruneError;
use crate::pipeline::{DependencyGraph, PipelineDocument};

/// Pipeline validator
pub struct PipelineValidator;

impl PipelineValidator {
    /// Validate a pipeline document
    pub fn validate(doc: &PipelineDocument) -> ValidationResult {
        let mut result = ValidationResult::new();

        if doc.job_count() == 0 {
            result.add_warning("Pipeline defines no jobs");
        }

        // Build and resolve the graph: unknown references and cycles
        match DependencyGraph::build(doc) {
            Ok(mut graph) => {
                if let Err(e) = graph.resolve_stage_dep() {
                    result.add_error(&Self::describe(e));
                }
            }
            Err(e) => result.add_error(&Self::describe(e)),
        }

        let used_stages: HashSet<&str> = doc.jobs().map(|j| j.stage.as_str()).collect();
        for stage in doc.stages() {
            if !stage.name.starts_with('.') && !used_stages.contains(stage.name.as_str()) {
                result.add_warning(&format!("Stage '{}' has no jobs", stage.name));
            }
        }

        for job in doc.jobs() {
            let Some(own_stage) = doc.stage(&job.stage).map(|s| s.index) else {
                continue;
            };

            for need in job.local_needs() {
                let Ok(needed) = doc.job(&need.job) else {
                    continue;
                };
                if doc.stage(&needed.stage).map(|s| s.index) > Some(own_stage) {
                    result.add_warning(&format!(
                        "Job '{}' needs '{}', which is in a later stage ({})",
                        job.name, need.job, needed.stage
                    ));
                }
            }

            // With `needs`, artifacts only come from needed jobs
            if let (Some(needs), Some(deps)) = (&job.needs, &job.dependencies) {
                for dep in deps {
                    if !needs.iter().any(|n| &n.job == dep) {
                        result.add_warning(&format!(
                            "Job '{}' lists '{}' in dependencies but not in needs",
                            job.name, dep
                        ));
                    }
                }
            }
        }

        result
    }

    fn describe(error: CipruneError) -> String {
        match error {
            CipruneError::CycleError { jobs } => {
                format!("Circular dependency: {}", jobs.join(" → "))
            }
            CipruneError::JobNotFound { job, referenced_by } => {
                format!("Unknown job '{}' referenced by {}", job, referenced_by)
            }
            other => other.to_string(),
        }
    }
}

/// Result of pipeline validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    pub fn add_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(yaml: &str) -> ValidationResult {
        PipelineValidator::validate(&PipelineDocument::from_yaml(yaml).unwrap())
    }

    #[test]
    fn test_valid_pipeline() {
        let result = validate(
            r#"
stages: [build, test]
compile:
  stage: build
unit:
  stage: test
  needs: [compile]
"#,
        );
        assert!(result.is_valid());
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_empty_pipeline_warns() {
        let result = validate("stages: [build]\n");
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.contains("no jobs")));
    }

    #[test]
    fn test_dangling_need_is_error() {
        let result = validate("unit:\n  needs: [compile]\n");
        assert!(!result.is_valid());
        assert!(result.errors[0].contains("compile"));
    }

    #[test]
    fn test_cycle_is_error() {
        let result = validate("a:\n  needs: [b]\nb:\n  needs: [a]\n");
        assert!(!result.is_valid());
        assert!(result.errors[0].starts_with("Circular dependency"));
    }

    #[test]
    fn test_need_on_later_stage_warns() {
        let result = validate(
            r#"
stages: [build, deploy]
compile:
  stage: build
  needs: [ship]
ship:
  stage: deploy
  needs: []
"#,
        );
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.contains("later stage")));
    }

    #[test]
    fn test_dependencies_outside_needs_warns() {
        let result = validate(
            r#"
stages: [build, test]
compile:
  stage: build
docs:
  stage: build
unit:
  stage: test
  needs: [compile]
  dependencies: [compile, docs]
"#,
        );
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.contains("'docs'")));
    }
}
