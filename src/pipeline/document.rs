// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! Pipeline document model
//!
//! A typed view over a GitLab-style CI document. Only the keys the
//! dependency graph needs (`stages`, `stage`, `needs`, `dependencies`,
//! `extends`) are interpreted; everything else stays in the raw mapping
//! and is written back untouched. The typed model is read after YAML merge
//! keys (`<<: *anchor`) are applied, the way GitLab reads the document.

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::errors::{CipruneError, CipruneResult};

/// Stage a job lands in when it does not declare one
pub const DEFAULT_STAGE: &str = "test";

/// Stage list used when the document has no `stages` key
pub const DEFAULT_STAGES: &[&str] = &[".pre", "build", "test", "deploy", ".post"];

/// Top-level keys that configure the pipeline rather than define a job
pub const RESERVED_KEYWORDS: &[&str] = &[
    "stages",
    "variables",
    "default",
    "include",
    "workflow",
    "image",
    "services",
    "before_script",
    "after_script",
    "cache",
];

/// A pipeline stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    /// Stage name
    pub name: String,
    /// Position in the stage sequence
    pub index: usize,
}

/// One entry of a job's `needs` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Need {
    /// Needed job
    pub job: String,
    /// `optional: true`: tolerated when the job is absent
    pub optional: bool,
    /// Refers to a job of another pipeline or project
    pub cross_pipeline: bool,
}

impl Need {
    fn local(job: &str) -> Self {
        Self {
            job: job.to_string(),
            optional: false,
            cross_pipeline: false,
        }
    }
}

/// A job definition
#[derive(Debug, Clone)]
pub struct Job {
    /// Job name (top-level key)
    pub name: String,
    /// Stage name, after `extends` inheritance
    pub stage: String,
    /// Explicit needs; `None` when the job never declares `needs`
    pub needs: Option<Vec<Need>>,
    /// Artifact consumption list; `None` when absent
    pub dependencies: Option<Vec<String>>,
    /// Templates this job extends, in declaration order
    pub extends: Vec<String>,
    /// Regular jobs anywhere in the `extends` chain; they must stay in the
    /// document for this job to be valid
    pub base_jobs: Vec<String>,
    /// Keys supplied by the `extends` chain
    pub inherited_keys: BTreeSet<String>,
    /// The job mapping with merge keys applied
    pub payload: Mapping,
}

impl Job {
    /// Needs that resolve inside this pipeline
    pub fn local_needs(&self) -> impl Iterator<Item = &Need> {
        self.needs
            .iter()
            .flatten()
            .filter(|need| !need.cross_pipeline)
    }

    /// Whether `needs` was declared, overriding stage ordering
    pub fn has_explicit_needs(&self) -> bool {
        self.needs.is_some()
    }
}

/// In-memory pipeline document
#[derive(Debug, Clone)]
pub struct PipelineDocument {
    stages: Vec<Stage>,
    jobs: Vec<Job>,
    job_index: HashMap<String, usize>,
    raw: Mapping,
}

impl PipelineDocument {
    /// Load a pipeline document from a YAML file
    pub fn from_file(path: &Path) -> CipruneResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CipruneError::FileReadError {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        Self::from_yaml(&content)
    }

    /// Parse a pipeline document from a YAML string
    pub fn from_yaml(yaml: &str) -> CipruneResult<Self> {
        let raw = match serde_yaml::from_str::<Value>(yaml)? {
            Value::Mapping(mapping) => mapping,
            Value::Null => Mapping::new(),
            _ => {
                return Err(CipruneError::config(
                    "pipeline document must be a mapping at the top level",
                ))
            }
        };

        Self::from_mapping(raw)
    }

    /// Build the typed model over an already parsed mapping
    pub fn from_mapping(raw: Mapping) -> CipruneResult<Self> {
        // The parser expands aliases but leaves `<<` keys in place.
        let mut merged = Value::Mapping(raw.clone());
        merged.apply_merge()?;
        let merged = match merged {
            Value::Mapping(mapping) => mapping,
            _ => Mapping::new(),
        };

        let stages = parse_stages(merged.get("stages"))?;

        // Every top-level mapping can be an `extends` target, hidden or not.
        let mut definitions: HashMap<&str, &Mapping> = HashMap::new();
        let mut job_keys = Vec::new();
        for (key, value) in &merged {
            let Some(name) = key.as_str() else {
                return Err(CipruneError::config(format!(
                    "top-level key {:?} is not a string",
                    key
                )));
            };
            if RESERVED_KEYWORDS.contains(&name) {
                continue;
            }
            match value {
                Value::Mapping(body) => {
                    definitions.insert(name, body);
                    if !name.starts_with('.') {
                        job_keys.push(name);
                    }
                }
                _ if name.starts_with('.') => {}
                _ => tracing::warn!("Top-level key '{}' is not a job mapping, passing it through", name),
            }
        }

        let resolver = ExtendsResolver {
            definitions: &definitions,
        };

        let mut jobs = Vec::with_capacity(job_keys.len());
        let mut job_index = HashMap::with_capacity(job_keys.len());
        for name in job_keys {
            let job = resolver.job(name, &stages)?;
            job_index.insert(job.name.clone(), jobs.len());
            jobs.push(job);
        }

        tracing::debug!(
            stages = stages.len(),
            jobs = jobs.len(),
            "Parsed pipeline document"
        );

        Ok(Self {
            stages,
            jobs,
            job_index,
            raw,
        })
    }

    /// Stages in execution order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Look up a stage by name
    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.name == name)
    }

    /// Jobs in document order
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    /// Job names in document order
    pub fn job_names(&self) -> Vec<&str> {
        self.jobs.iter().map(|j| j.name.as_str()).collect()
    }

    /// Number of jobs
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Get a job by name
    pub fn job(&self, name: &str) -> CipruneResult<&Job> {
        self.job_index
            .get(name)
            .map(|&idx| &self.jobs[idx])
            .ok_or_else(|| CipruneError::job_not_found(name, "pipeline document lookup"))
    }

    /// Whether a job with this name exists
    pub fn contains_job(&self, name: &str) -> bool {
        self.job_index.contains_key(name)
    }

    /// The document as parsed, including pipeline-wide settings
    pub fn raw(&self) -> &Mapping {
        &self.raw
    }
}

fn parse_stages(value: Option<&Value>) -> CipruneResult<Vec<Stage>> {
    let mut names: Vec<String> = match value {
        None | Some(Value::Null) => DEFAULT_STAGES.iter().map(|s| s.to_string()).collect(),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    CipruneError::config(format!("stage name {:?} is not a string", item))
                })
            })
            .collect::<CipruneResult<_>>()?,
        Some(other) => {
            return Err(CipruneError::config(format!(
                "'stages' must be a list of stage names, found {:?}",
                other
            )))
        }
    };

    if !names.iter().any(|n| n == ".pre") {
        names.insert(0, ".pre".to_string());
    }
    if !names.iter().any(|n| n == ".post") {
        names.push(".post".to_string());
    }

    let mut stages: Vec<Stage> = Vec::with_capacity(names.len());
    for name in names {
        if stages.iter().any(|s| s.name == name) {
            return Err(CipruneError::config(format!(
                "stage '{}' is declared more than once",
                name
            )));
        }
        stages.push(Stage {
            index: stages.len(),
            name,
        });
    }

    Ok(stages)
}

/// Resolves graph-relevant keys through `extends` chains
struct ExtendsResolver<'a> {
    definitions: &'a HashMap<&'a str, &'a Mapping>,
}

impl<'a> ExtendsResolver<'a> {
    fn job(&self, name: &str, stages: &[Stage]) -> CipruneResult<Job> {
        let payload = self.definitions[name];

        let stage = match self.lookup(name, "stage", &mut Vec::new())? {
            None => DEFAULT_STAGE.to_string(),
            Some(Value::String(s)) => s,
            Some(other) => {
                return Err(CipruneError::config(format!(
                    "job '{}': 'stage' must be a string, found {:?}",
                    name, other
                )))
            }
        };
        if !stages.iter().any(|s| s.name == stage) {
            let known: Vec<&str> = stages.iter().map(|s| s.name.as_str()).collect();
            return Err(CipruneError::config_with_help(
                format!("job '{}' uses unknown stage '{}'", name, stage),
                format!("Declared stages: {}", known.join(", ")),
            ));
        }

        let needs = self
            .lookup(name, "needs", &mut Vec::new())?
            .map(|v| parse_needs(name, &v))
            .transpose()?;
        let dependencies = self
            .lookup(name, "dependencies", &mut Vec::new())?
            .map(|v| parse_string_list(name, "dependencies", &v))
            .transpose()?;
        let extends = extends_of(name, payload)?;

        let ancestors = self.ancestors(name)?;
        let base_jobs = ancestors
            .iter()
            .filter(|a| !a.starts_with('.'))
            .cloned()
            .collect();
        let inherited_keys = ancestors
            .iter()
            .filter_map(|a| self.definitions.get(a.as_str()))
            .flat_map(|body| body.keys().filter_map(Value::as_str))
            .filter(|key| *key != "extends")
            .map(str::to_string)
            .collect();

        Ok(Job {
            name: name.to_string(),
            stage,
            needs,
            dependencies,
            extends,
            base_jobs,
            inherited_keys,
            payload: payload.clone(),
        })
    }

    /// Every definition reached through `extends`, each listed once
    fn ancestors(&self, name: &str) -> CipruneResult<Vec<String>> {
        let mut found: Vec<String> = Vec::new();
        let mut pending = vec![name.to_string()];

        while let Some(current) = pending.pop() {
            let Some(body) = self.definitions.get(current.as_str()) else {
                continue;
            };
            for parent in extends_of(&current, body)? {
                if !self.definitions.contains_key(parent.as_str()) {
                    return Err(CipruneError::config(format!(
                        "'{}' extends unknown template '{}'",
                        current, parent
                    )));
                }
                if parent != name && !found.contains(&parent) {
                    found.push(parent.clone());
                    pending.push(parent);
                }
            }
        }

        Ok(found)
    }

    /// Nearest definition of `key`: the job itself, then its templates,
    /// last `extends` entry first.
    fn lookup(
        &self,
        name: &str,
        key: &str,
        visiting: &mut Vec<String>,
    ) -> CipruneResult<Option<Value>> {
        if visiting.iter().any(|v| v == name) {
            visiting.push(name.to_string());
            return Err(CipruneError::config_with_help(
                format!("circular 'extends' chain: {}", visiting.join(" → ")),
                "A job or template must not extend itself, directly or indirectly",
            ));
        }

        let body = self.definitions.get(name).ok_or_else(|| {
            let origin = visiting.last().cloned().unwrap_or_default();
            CipruneError::config(format!(
                "'{}' extends unknown template '{}'",
                origin, name
            ))
        })?;

        if let Some(value) = body.get(key) {
            return Ok(Some(value.clone()));
        }

        visiting.push(name.to_string());
        for parent in extends_of(name, body)?.iter().rev() {
            if let Some(value) = self.lookup(parent, key, visiting)? {
                return Ok(Some(value));
            }
        }
        visiting.pop();

        Ok(None)
    }
}

fn extends_of(name: &str, body: &Mapping) -> CipruneResult<Vec<String>> {
    match body.get("extends") {
        None => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(other) => parse_string_list(name, "extends", other),
    }
}

fn parse_needs(job: &str, value: &Value) -> CipruneResult<Vec<Need>> {
    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Sequence(items) => items,
        other => {
            return Err(CipruneError::config(format!(
                "job '{}': 'needs' must be a list, found {:?}",
                job, other
            )))
        }
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(Need::local(s)),
            Value::Mapping(m) => {
                let cross_pipeline = m.contains_key("pipeline") || m.contains_key("project");
                let name = m.get("job").and_then(Value::as_str).ok_or_else(|| {
                    CipruneError::config(format!(
                        "job '{}': 'needs' entry {:?} has no 'job' name",
                        job, item
                    ))
                })?;
                Ok(Need {
                    job: name.to_string(),
                    optional: m.get("optional").and_then(Value::as_bool).unwrap_or(false),
                    cross_pipeline,
                })
            }
            other => Err(CipruneError::config(format!(
                "job '{}': unsupported 'needs' entry {:?}",
                job, other
            ))),
        })
        .collect()
}

fn parse_string_list(job: &str, key: &str, value: &Value) -> CipruneResult<Vec<String>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    CipruneError::config(format!(
                        "job '{}': '{}' entry {:?} is not a string",
                        job, key, item
                    ))
                })
            })
            .collect(),
        other => Err(CipruneError::config(format!(
            "job '{}': '{}' must be a list, found {:?}",
            job, key, other
        ))),
    }
}
