// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! Pipeline writer
//!
//! Applies a kept-job set to a document and writes the result. Everything
//! that is not a dropped job (stage list, pipeline settings, templates and
//! surviving jobs) is emitted in its original order with its original
//! content.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::errors::{CipruneError, CipruneResult};
use crate::pipeline::{Job, PipelineDocument};

/// How jobs outside the kept set are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Drop the job from the document
    #[default]
    Remove,
    /// Keep the job but make it never run (`rules: [{when: never}]`)
    Disable,
}

impl std::str::FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remove" => Ok(Self::Remove),
            "disable" => Ok(Self::Disable),
            _ => Err(format!("Unknown write mode: {}", s)),
        }
    }
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remove => write!(f, "remove"),
            Self::Disable => write!(f, "disable"),
        }
    }
}

/// Keys that decide whether a job is created; replaced when disabling
const RUN_CONDITION_KEYS: &[&str] = &["only", "except", "rules", "when", "start_in"];

/// Keys GitLab rejects next to `rules`
const RULES_EXCLUSIVE_KEYS: &[&str] = &["only", "except", "start_in"];

/// Outcome of writing a trimmed pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteReport {
    /// Output file
    pub path: PathBuf,
    /// Jobs left runnable
    pub kept: usize,
    /// Jobs removed or disabled
    pub dropped: usize,
    /// BLAKE3 digest of the written document
    pub digest: String,
    /// The file already had this exact content and was not touched
    pub unchanged: bool,
}

/// Writes trimmed pipeline documents
#[derive(Debug, Clone, Default)]
pub struct PipelineWriter {
    mode: WriteMode,
}

impl PipelineWriter {
    pub fn new(mode: WriteMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// The output document as a mapping.
    ///
    /// Every kept job must exist in `doc`, and every regular job a kept
    /// job extends must be kept too.
    pub fn apply(&self, doc: &PipelineDocument, kept: &BTreeSet<String>) -> CipruneResult<Mapping> {
        for name in kept {
            let job = doc
                .job(name)
                .map_err(|_| CipruneError::job_not_found(name, "the set of jobs to keep"))?;
            if let Some(base) = job.base_jobs.iter().find(|base| !kept.contains(*base)) {
                return Err(CipruneError::config(format!(
                    "kept job '{}' extends '{}', which is not kept",
                    name, base
                )));
            }
        }

        let mut out = Mapping::with_capacity(doc.raw().len());
        for (key, value) in doc.raw() {
            let dropped = key
                .as_str()
                .filter(|name| doc.contains_job(name) && !kept.contains(*name));

            let Some(name) = dropped else {
                out.insert(key.clone(), value.clone());
                continue;
            };

            match self.mode {
                WriteMode::Remove => {}
                WriteMode::Disable => {
                    out.insert(key.clone(), disabled(doc.job(name)?));
                }
            }
        }

        Ok(out)
    }

    /// Render the output document to YAML
    pub fn render(&self, doc: &PipelineDocument, kept: &BTreeSet<String>) -> CipruneResult<String> {
        self.render_for(doc, kept, Path::new("-"))
    }

    fn render_for(
        &self,
        doc: &PipelineDocument,
        kept: &BTreeSet<String>,
        path: &Path,
    ) -> CipruneResult<String> {
        let mapping = self.apply(doc, kept)?;
        serde_yaml::to_string(&Value::Mapping(mapping)).map_err(|e| CipruneError::WriteError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Render and write atomically to `path`.
    ///
    /// The document is rendered completely before anything touches the
    /// filesystem, then written to a sibling temp file and renamed into
    /// place.
    pub fn write(
        &self,
        doc: &PipelineDocument,
        kept: &BTreeSet<String>,
        path: &Path,
    ) -> CipruneResult<WriteReport> {
        let rendered = self.render_for(doc, kept, path)?;
        let hash = blake3::hash(rendered.as_bytes());

        let mut report = WriteReport {
            path: path.to_path_buf(),
            kept: kept.len(),
            dropped: doc.job_count() - kept.len(),
            digest: hash.to_hex().to_string(),
            unchanged: false,
        };

        if let Ok(existing) = std::fs::read(path) {
            if blake3::hash(&existing) == hash {
                tracing::debug!("{} is already up to date", path.display());
                report.unchanged = true;
                return Ok(report);
            }
        }

        let write_error = |e: std::io::Error| CipruneError::WriteError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }

        let tmp = temp_path(path);
        if let Err(e) = std::fs::write(&tmp, rendered.as_bytes())
            .and_then(|_| std::fs::rename(&tmp, path))
        {
            let _ = std::fs::remove_file(&tmp);
            return Err(write_error(e));
        }

        tracing::info!(
            kept = report.kept,
            dropped = report.dropped,
            "Wrote {}",
            path.display()
        );
        Ok(report)
    }
}

/// A copy of the job that GitLab will never create
/// The job with merge keys applied, its run conditions replaced by a
/// never-rule. Conditions it would inherit through `extends` are nulled.
fn disabled(job: &Job) -> Value {
    let mut body = job.payload.clone();
    for key in RUN_CONDITION_KEYS {
        body.shift_remove(*key);
    }
    for key in RULES_EXCLUSIVE_KEYS {
        if job.inherited_keys.contains(*key) {
            body.insert(Value::from(*key), Value::Null);
        }
    }

    let mut never = Mapping::new();
    never.insert(Value::from("when"), Value::from("never"));
    body.insert(Value::from("rules"), Value::Sequence(vec![Value::Mapping(never)]));

    Value::Mapping(body)
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pipeline".to_string());
    path.with_file_name(format!(".{}.ciprune-tmp", name))
}
