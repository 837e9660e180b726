// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! File-to-job mapping
//!
//! Translates changed file paths into the seed jobs they directly
//! implicate. The mapping file is a YAML document of path prefixes:
//!
//! ```yaml
//! lib/:
//!   - build-lib
//!   - test-lib
//! app/:
//!   - build-app
//! ```
//!
//! Prefixes match on path-component boundaries only, and a file collects
//! the jobs of every prefix it matches.

use serde::Serialize;
use serde_yaml::Value;
use std::path::Path;

use crate::errors::{CipruneError, CipruneResult};

/// One prefix entry of the map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    /// Normalized path prefix (no leading `./`, no trailing `/`)
    pub prefix: String,
    /// Jobs triggered by changes under the prefix
    pub jobs: Vec<String>,
}

/// Why a file implicated jobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMatch {
    /// Changed file
    pub file: String,
    /// Prefixes (as normalized) that matched it
    pub prefixes: Vec<String>,
}

/// Static mapping from path prefixes to job names
#[derive(Debug, Clone, Default)]
pub struct FileJobMap {
    entries: Vec<MapEntry>,
}

impl FileJobMap {
    /// Build a map from `(prefix, jobs)` pairs, keeping their order
    pub fn new<P, J>(entries: impl IntoIterator<Item = (P, J)>) -> Self
    where
        P: AsRef<str>,
        J: IntoIterator,
        J::Item: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(prefix, jobs)| MapEntry {
                    prefix: normalize(prefix.as_ref()).to_string(),
                    jobs: jobs.into_iter().map(Into::into).collect(),
                })
                .collect(),
        }
    }

    /// Load the map from a YAML file
    pub fn from_file(path: &Path) -> CipruneResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CipruneError::FileReadError {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;

        Self::from_yaml(&content).map_err(|e| match e {
            CipruneError::ConfigError { reason, help } => CipruneError::ConfigError {
                reason: format!("{}: {}", path.display(), reason),
                help,
            },
            other => other,
        })
    }

    /// Parse the map from a YAML string
    pub fn from_yaml(yaml: &str) -> CipruneResult<Self> {
        let mapping = match serde_yaml::from_str::<Value>(yaml)? {
            Value::Mapping(mapping) => mapping,
            Value::Null => return Ok(Self::default()),
            other => {
                return Err(CipruneError::config_with_help(
                    format!("file-to-job map must be a mapping, found {:?}", other),
                    "Map each path prefix to a list of job names",
                ))
            }
        };

        let mut entries = Vec::with_capacity(mapping.len());
        for (key, value) in &mapping {
            let prefix = key.as_str().ok_or_else(|| {
                CipruneError::config(format!("file-to-job map key {:?} is not a string", key))
            })?;

            let jobs = match value {
                Value::Null => Vec::new(),
                Value::Sequence(items) => items
                    .iter()
                    .map(|item| {
                        item.as_str().map(str::to_string).ok_or_else(|| {
                            CipruneError::config(format!(
                                "file-to-job map entry '{}' lists {:?}, expected a job name",
                                prefix, item
                            ))
                        })
                    })
                    .collect::<CipruneResult<Vec<_>>>()?,
                other => {
                    return Err(CipruneError::config(format!(
                        "file-to-job map entry '{}' must be a list of job names, found {:?}",
                        prefix, other
                    )))
                }
            };

            entries.push(MapEntry {
                prefix: normalize(prefix).to_string(),
                jobs,
            });
        }

        tracing::debug!(entries = entries.len(), "Loaded file-to-job map");
        Ok(Self { entries })
    }

    /// Map entries in file order
    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }

    /// Whether the map has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Jobs implicated by the changed files, deduplicated in first-seen order
    pub fn jobs_for<S: AsRef<str>>(&self, changed_files: &[S]) -> Vec<String> {
        let mut jobs: Vec<String> = Vec::new();

        for file in changed_files {
            for entry in self.matching(file.as_ref()) {
                for job in &entry.jobs {
                    if !jobs.contains(job) {
                        jobs.push(job.clone());
                    }
                }
            }
        }

        jobs
    }

    /// Per changed file, the prefixes it matched; files matching nothing
    /// are left out
    pub fn explain<S: AsRef<str>>(&self, changed_files: &[S]) -> Vec<FileMatch> {
        changed_files
            .iter()
            .filter_map(|file| {
                let prefixes: Vec<String> = self
                    .matching(file.as_ref())
                    .map(|entry| entry.prefix.clone())
                    .collect();
                (!prefixes.is_empty()).then(|| FileMatch {
                    file: file.as_ref().to_string(),
                    prefixes,
                })
            })
            .collect()
    }

    fn matching<'a>(&'a self, file: &'a str) -> impl Iterator<Item = &'a MapEntry> + 'a {
        let file = normalize(file);
        self.entries
            .iter()
            .filter(move |entry| prefix_matches(&entry.prefix, file))
    }
}

/// Whether `file` is `prefix` itself or lies under it.
///
/// Both arguments must already be normalized. An empty prefix is the
/// repository root and matches everything.
pub fn prefix_matches(prefix: &str, file: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match file.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Strip leading `./` and trailing `/`
pub fn normalize(path: &str) -> &str {
    let mut path = path.trim();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    if path == "." {
        return "";
    }
    path.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lib_app_map() -> FileJobMap {
        FileJobMap::from_yaml(
            r#"
lib/:
  - build-lib
  - test-lib
app/:
  - build-app
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_boundary_matching() {
        let map = FileJobMap::new([("src/app", vec!["build-app"])]);
        assert_eq!(map.jobs_for(&["src/app/file.go"]), vec!["build-app"]);
        assert!(map.jobs_for(&["src/application/file.go"]).is_empty());
        assert_eq!(map.jobs_for(&["src/app"]), vec!["build-app"]);
    }

    #[test]
    fn test_trailing_separator_prefix() {
        let map = lib_app_map();
        assert_eq!(map.jobs_for(&["lib/x.go"]), vec!["build-lib", "test-lib"]);
        assert!(map.jobs_for(&["library/x.go"]).is_empty());
    }

    #[test]
    fn test_union_of_all_matching_prefixes() {
        let map = FileJobMap::new([
            ("pkg", vec!["unit"]),
            ("pkg/network", vec!["network-e2e", "unit"]),
            ("docs", vec!["docs"]),
        ]);
        assert_eq!(
            map.jobs_for(&["pkg/network/conn.go"]),
            vec!["unit", "network-e2e"]
        );
    }

    #[test]
    fn test_dedup_first_seen_order() {
        let map = lib_app_map();
        let jobs = map.jobs_for(&["app/main.go", "lib/a.go", "lib/b.go"]);
        assert_eq!(jobs, vec!["build-app", "build-lib", "test-lib"]);
    }

    #[test]
    fn test_no_changes_no_jobs() {
        let map = lib_app_map();
        assert!(map.jobs_for::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_root_prefix_matches_everything() {
        let map = FileJobMap::new([("./", vec!["lint"])]);
        assert_eq!(map.jobs_for(&["README.md"]), vec!["lint"]);
    }

    #[test]
    fn test_dot_slash_paths() {
        let map = FileJobMap::new([("./lib", vec!["build-lib"])]);
        assert_eq!(map.jobs_for(&["./lib/x.go"]), vec!["build-lib"]);
    }

    #[test]
    fn test_explain() {
        let map = lib_app_map();
        let matches = map.explain(&["lib/x.go", "README.md"]);
        assert_eq!(
            matches,
            vec![FileMatch {
                file: "lib/x.go".into(),
                prefixes: vec!["lib".into()],
            }]
        );
    }

    #[test]
    fn test_malformed_map() {
        let err = FileJobMap::from_yaml("lib/: build-lib\n").unwrap_err();
        assert!(matches!(err, CipruneError::ConfigError { .. }));

        let err = FileJobMap::from_yaml("lib/:\n  - {job: x}\n").unwrap_err();
        assert!(err.to_string().contains("lib/"));

        let err = FileJobMap::from_yaml("- lib\n").unwrap_err();
        assert!(matches!(err, CipruneError::ConfigError { .. }));
    }

    #[test]
    fn test_empty_map_file() {
        let map = FileJobMap::from_yaml("").unwrap();
        assert!(map.is_empty());
    }
}
