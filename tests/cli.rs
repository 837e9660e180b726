// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! End-to-end tests for the ciprune binary.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PIPELINE: &str = r#"
stages: [build, test, deploy]
variables:
  GO_VERSION: "1.22"
build-lib:
  stage: build
  script: make lib
build-app:
  stage: build
  needs: [build-lib]
  script: make app
test-lib:
  stage: test
  needs: [build-lib]
  script: make test-lib
test-app:
  stage: test
  needs: [build-app]
  script: make test-app
deploy:
  stage: deploy
  script: make deploy
"#;

const FILE_MAP: &str = r#"
lib/: [build-lib, test-lib]
app/: [build-app, test-app]
"#;

fn ciprune(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ciprune"));
    cmd.current_dir(dir);
    for var in [
        "CIPRUNE_CONFIG",
        "CIPRUNE_SOURCE",
        "CIPRUNE_FILE_MAP",
        "CIPRUNE_OUTPUT",
        "CIPRUNE_BASE",
        "CIPRUNE_HEAD",
        "CIPRUNE_MODE",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("RUST_LOG", "ciprune=warn");
    cmd.env("CLICOLOR", "0");
    cmd.env("NO_COLOR", "1");
    cmd
}

fn project(pipeline: &str) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("pipeline.yml"), pipeline).unwrap();
    fs::write(dir.path().join("filejobs.yaml"), FILE_MAP).unwrap();
    dir
}

fn changes(dir: &Path, files: &[&str]) {
    let mut content = files.join("\n");
    content.push('\n');
    fs::write(dir.join("changes.txt"), content).unwrap();
}

fn run(dir: &Path, extra: &[&str]) -> assert_cmd::assert::Assert {
    ciprune(dir)
        .args([
            "run",
            "--source",
            "pipeline.yml",
            "--map",
            "filejobs.yaml",
            "--output",
            "out.yml",
        ])
        .args(extra)
        .assert()
}

fn output_jobs(dir: &Path) -> Vec<String> {
    let content = fs::read_to_string(dir.join("out.yml")).expect("output written");
    let doc: Mapping = serde_yaml::from_str(&content).expect("output is YAML");
    doc.keys()
        .filter_map(Value::as_str)
        .filter(|k| !["stages", "variables"].contains(k))
        .map(str::to_string)
        .collect()
}

#[test]
fn run_keeps_jobs_for_changed_files() {
    let dir = project(PIPELINE);
    changes(dir.path(), &["lib/x.go"]);

    run(dir.path(), &["--changed-files", "changes.txt"])
        .success()
        .stdout(predicate::str::contains("2 of 5 jobs kept"));

    assert_eq!(output_jobs(dir.path()), vec!["build-lib", "test-lib"]);

    let content = fs::read_to_string(dir.path().join("out.yml")).unwrap();
    assert!(content.contains("GO_VERSION"));
}

#[test]
fn run_pulls_in_dependencies() {
    let dir = project(PIPELINE);
    changes(dir.path(), &["app/main.go"]);

    run(dir.path(), &["--changed-files", "changes.txt"]).success();

    assert_eq!(
        output_jobs(dir.path()),
        vec!["build-lib", "build-app", "test-app"]
    );
}

#[test]
fn run_full_pipeline_keeps_everything() {
    let dir = project(PIPELINE);

    run(dir.path(), &["--full-pipeline"])
        .success()
        .stdout(predicate::str::contains("all 5 jobs kept"));

    assert_eq!(output_jobs(dir.path()).len(), 5);
}

#[test]
fn run_with_no_changes_keeps_no_jobs() {
    let dir = project(PIPELINE);
    fs::write(dir.path().join("changes.txt"), "").unwrap();

    run(dir.path(), &["--changed-files", "changes.txt"]).success();

    assert!(output_jobs(dir.path()).is_empty());
}

#[test]
fn run_disable_mode_keeps_jobs_but_never_runs_them() {
    let dir = project(PIPELINE);
    changes(dir.path(), &["lib/x.go"]);

    run(
        dir.path(),
        &["--changed-files", "changes.txt", "--mode", "disable"],
    )
    .success()
    .stdout(predicate::str::contains("disabled"));

    let content = fs::read_to_string(dir.path().join("out.yml")).unwrap();
    let doc: Mapping = serde_yaml::from_str(&content).unwrap();
    assert_eq!(output_jobs(dir.path()).len(), 5);

    let deploy = doc.get("deploy").and_then(Value::as_mapping).unwrap();
    assert!(deploy.contains_key("rules"));
    let build = doc.get("build-lib").and_then(Value::as_mapping).unwrap();
    assert!(!build.contains_key("rules"));
}

#[test]
fn run_to_stdout() {
    let dir = project(PIPELINE);
    changes(dir.path(), &["lib/x.go"]);

    ciprune(dir.path())
        .args([
            "run",
            "--source",
            "pipeline.yml",
            "--map",
            "filejobs.yaml",
            "--output",
            "-",
            "--changed-files",
            "changes.txt",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("test-lib:"))
        .stdout(predicate::str::contains("deploy:").not());

    assert!(!dir.path().join("-").exists());
}

#[test]
fn run_reports_unchanged_output() {
    let dir = project(PIPELINE);
    changes(dir.path(), &["lib/x.go"]);

    run(dir.path(), &["--changed-files", "changes.txt"])
        .success()
        .stdout(predicate::str::contains("written"));
    run(dir.path(), &["--changed-files", "changes.txt"])
        .success()
        .stdout(predicate::str::contains("unchanged"));
}

#[test]
fn run_uses_settings_file() {
    let dir = project(PIPELINE);
    changes(dir.path(), &["lib/x.go"]);
    fs::write(
        dir.path().join(".ciprune.yaml"),
        "source: pipeline.yml\nfile_map: filejobs.yaml\noutput: out.yml\n",
    )
    .unwrap();

    ciprune(dir.path())
        .args(["run", "--changed-files", "changes.txt"])
        .assert()
        .success();

    assert_eq!(output_jobs(dir.path()), vec!["build-lib", "test-lib"]);
}

#[test]
fn run_fails_on_dangling_need_without_writing() {
    let dir = project(
        r#"
stages: [build, test]
test-lib:
  stage: test
  needs: [build-lib]
"#,
    );
    changes(dir.path(), &["lib/x.go"]);

    run(dir.path(), &["--changed-files", "changes.txt"])
        .failure()
        .stderr(predicate::str::contains("build-lib"));

    assert!(!dir.path().join("out.yml").exists());
}

#[test]
fn changed_files_prints_list() {
    let dir = project(PIPELINE);
    changes(dir.path(), &["lib/x.go", "app/main.go"]);

    ciprune(dir.path())
        .args(["changed-files", "--changed-files", "changes.txt"])
        .assert()
        .success()
        .stdout("lib/x.go\napp/main.go\n");
}

#[test]
fn plan_json_explains_selection() {
    let dir = project(PIPELINE);
    changes(dir.path(), &["app/main.go"]);

    let output = ciprune(dir.path())
        .args([
            "plan",
            "--source",
            "pipeline.yml",
            "--map",
            "filejobs.yaml",
            "--changed-files",
            "changes.txt",
            "--format",
            "json",
        ])
        .output()
        .expect("plan runs");
    assert!(
        output.status.success(),
        "plan failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(plan["total_jobs"], 5);
    assert_eq!(plan["kept"]["build-app"]["reason"], "seed");
    assert_eq!(plan["kept"]["build-lib"]["reason"], "required_by");
    assert!(plan["kept"].get("deploy").is_none());
    assert!(!dir.path().join(".dynamic").exists());
}

#[test]
fn graph_mermaid_lists_jobs() {
    let dir = project(PIPELINE);

    ciprune(dir.path())
        .args(["graph", "--source", "pipeline.yml", "--format", "mermaid"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("graph"))
        .stdout(predicate::str::contains("\"deploy\""));
}

#[test]
fn graph_reports_cycle() {
    let dir = project(
        r#"
stages: [build]
a:
  stage: build
  needs: [b]
b:
  stage: build
  needs: [a]
"#,
    );

    ciprune(dir.path())
        .args(["graph", "--source", "pipeline.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Circular dependency"));
}

#[test]
fn validate_accepts_good_pipeline() {
    let dir = project(PIPELINE);

    ciprune(dir.path())
        .args(["validate", "--source", "pipeline.yml", "--map", "filejobs.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pipeline is valid"));
}

#[test]
fn validate_flags_unknown_map_job() {
    let dir = project(PIPELINE);
    fs::write(dir.path().join("filejobs.yaml"), "docs/: [build-docs]\n").unwrap();

    ciprune(dir.path())
        .args(["validate", "--source", "pipeline.yml", "--map", "filejobs.yaml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("build-docs"));
}

#[test]
fn run_keeps_job_that_is_extended() {
    let dir = project(
        r#"
stages: [build, test]
.go: &go
  image: golang
build-lib:
  <<: *go
  stage: build
  script: make lib
test-lib:
  extends: build-lib
  stage: test
  needs: []
  script: make test
"#,
    );
    fs::write(dir.path().join("filejobs.yaml"), "lib/: [test-lib]\n").unwrap();
    changes(dir.path(), &["lib/x.go"]);

    run(dir.path(), &["--changed-files", "changes.txt"]).success();

    let jobs = output_jobs(dir.path());
    assert!(jobs.contains(&"build-lib".to_string()));
    assert!(jobs.contains(&"test-lib".to_string()));
}
