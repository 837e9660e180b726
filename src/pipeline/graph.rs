// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 ciprune contributors

//! Job dependency graph
//!
//! Nodes are jobs, edges point from a dependency to the job that needs it.
//! Explicit `needs` edges are added when the graph is built; implicit stage
//! edges are added by [`DependencyGraph::resolve_stage_dep`]. Selecting the
//! jobs to keep for a set of seed jobs is a reverse-reachability closure
//! over both kinds of edges. A job that `extends` a regular job is kept
//! together with it, without implying any execution order.

use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use crate::errors::{CipruneError, CipruneResult};
use crate::pipeline::PipelineDocument;

/// Why an edge exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Declared through `needs`
    Needs,
    /// Derived from stage ordering or artifact consumption
    Stage,
}

/// Why a job ended up in the kept set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "by")]
pub enum KeepReason {
    /// Directly implicated by the changed files
    Seed,
    /// A kept job depends on it
    RequiredBy(String),
    /// A kept job extends it
    ExtendedBy(String),
}

/// Which earlier stages a job waits for when it has no explicit needs
#[derive(Debug, Clone)]
enum StageRequirement {
    /// `needs` declared: explicit edges only
    Explicit,
    /// `dependencies` declared: the stages of the named jobs
    Artifacts(BTreeSet<usize>),
    /// Nothing declared: the nearest earlier stage that has jobs
    PreviousStage,
}

#[derive(Debug, Clone)]
struct JobNode {
    name: String,
    stage: String,
    stage_index: usize,
    requirement: StageRequirement,
}

/// Dependency graph over the jobs of one pipeline document
#[derive(Debug)]
pub struct DependencyGraph {
    graph: DiGraph<JobNode, EdgeKind>,
    name_to_index: HashMap<String, NodeIndex>,
    /// Job -> regular jobs in its `extends` chain
    kept_with: HashMap<NodeIndex, Vec<NodeIndex>>,
    resolved: bool,
}

impl DependencyGraph {
    /// Build the graph with explicit `needs` edges
    pub fn build(doc: &PipelineDocument) -> CipruneResult<Self> {
        let mut graph = DiGraph::new();
        let mut name_to_index = HashMap::new();
        let mut kept_with: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();

        for job in doc.jobs() {
            let stage_index = doc
                .stage(&job.stage)
                .map(|s| s.index)
                .ok_or_else(|| {
                    CipruneError::config(format!(
                        "job '{}' uses unknown stage '{}'",
                        job.name, job.stage
                    ))
                })?;

            let node = graph.add_node(JobNode {
                name: job.name.clone(),
                stage: job.stage.clone(),
                stage_index,
                requirement: StageRequirement::Explicit,
            });
            name_to_index.insert(job.name.clone(), node);
        }

        for job in doc.jobs() {
            let job_node = name_to_index[&job.name];

            for need in job.local_needs() {
                let Some(&dep_node) = name_to_index.get(&need.job) else {
                    if need.optional {
                        tracing::debug!(
                            "Optional need '{}' of '{}' is not in the pipeline, skipping",
                            need.job,
                            job.name
                        );
                        continue;
                    }
                    return Err(CipruneError::job_not_found(
                        &need.job,
                        format!("needs of '{}'", job.name),
                    ));
                };

                if !graph.contains_edge(dep_node, job_node) {
                    graph.add_edge(dep_node, job_node, EdgeKind::Needs);
                }
            }

            let bases: Vec<NodeIndex> = job
                .base_jobs
                .iter()
                .filter_map(|base| name_to_index.get(base).copied())
                .collect();
            if !bases.is_empty() {
                kept_with.insert(job_node, bases);
            }

            let requirement = if job.has_explicit_needs() {
                StageRequirement::Explicit
            } else if let Some(ref deps) = job.dependencies {
                let own_stage = graph[job_node].stage_index;
                let mut stages = BTreeSet::new();
                for dep in deps {
                    let dep_node = name_to_index.get(dep).ok_or_else(|| {
                        CipruneError::job_not_found(dep, format!("dependencies of '{}'", job.name))
                    })?;
                    let dep_stage = graph[*dep_node].stage_index;
                    if dep_stage >= own_stage {
                        return Err(CipruneError::config_with_help(
                            format!(
                                "job '{}' depends on artifacts of '{}', which is not in an earlier stage",
                                job.name, dep
                            ),
                            "Use 'needs' to depend on a job of the same stage",
                        ));
                    }
                    stages.insert(dep_stage);
                }
                StageRequirement::Artifacts(stages)
            } else {
                StageRequirement::PreviousStage
            };
            graph[job_node].requirement = requirement;
        }

        tracing::debug!(
            jobs = graph.node_count(),
            needs = graph.edge_count(),
            "Built dependency graph"
        );

        Ok(Self {
            graph,
            name_to_index,
            kept_with,
            resolved: false,
        })
    }

    /// Add implicit stage edges and verify the result is acyclic.
    ///
    /// Jobs with explicit `needs` keep exactly those. Every other job waits
    /// for all jobs of each stage it requires. Returns the number of edges
    /// added; a second call on a resolved graph adds none.
    pub fn resolve_stage_dep(&mut self) -> CipruneResult<usize> {
        let mut by_stage: BTreeMap<usize, Vec<NodeIndex>> = BTreeMap::new();
        for node in self.graph.node_indices() {
            by_stage
                .entry(self.graph[node].stage_index)
                .or_default()
                .push(node);
        }

        let mut added = 0;
        let nodes: Vec<NodeIndex> = self.graph.node_indices().collect();
        for node in nodes {
            let own_stage = self.graph[node].stage_index;
            let required: Vec<usize> = match &self.graph[node].requirement {
                StageRequirement::Explicit => continue,
                StageRequirement::Artifacts(stages) => stages.iter().copied().collect(),
                StageRequirement::PreviousStage => by_stage
                    .range(..own_stage)
                    .next_back()
                    .map(|(&stage, _)| vec![stage])
                    .unwrap_or_default(),
            };

            for stage in required {
                for &dep in by_stage.get(&stage).into_iter().flatten() {
                    if !self.graph.contains_edge(dep, node) {
                        self.graph.add_edge(dep, node, EdgeKind::Stage);
                        added += 1;
                    }
                }
            }
        }

        self.validate_acyclic()?;
        self.resolved = true;

        tracing::debug!(added, total = self.graph.edge_count(), "Resolved stage dependencies");
        Ok(added)
    }

    /// Full set of jobs to keep so that every seed job can run.
    ///
    /// An empty seed gives an empty set. Unknown seed jobs fail before any
    /// traversal.
    pub fn pipeline_jobs_to_run<I, S>(&self, seeds: I) -> CipruneResult<BTreeSet<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self
            .closure(seeds)?
            .into_iter()
            .map(|(node, _)| self.graph[node].name.clone())
            .collect())
    }

    /// Same closure as [`pipeline_jobs_to_run`](Self::pipeline_jobs_to_run),
    /// recording why each job is kept
    pub fn explain_jobs_to_run<I, S>(&self, seeds: I) -> CipruneResult<BTreeMap<String, KeepReason>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(self
            .closure(seeds)?
            .into_iter()
            .map(|(node, reason)| (self.graph[node].name.clone(), reason))
            .collect())
    }

    /// BFS against edge direction and along `extends` links; each visited
    /// node with the reason it was reached
    fn closure<I, S>(&self, seeds: I) -> CipruneResult<Vec<(NodeIndex, KeepReason)>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut starts = Vec::new();
        for seed in seeds {
            let seed = seed.as_ref();
            let node = self
                .name_to_index
                .get(seed)
                .ok_or_else(|| CipruneError::job_not_found(seed, "the changed-file mapping"))?;
            starts.push(*node);
        }

        if !self.resolved && !starts.is_empty() {
            tracing::warn!("Selecting jobs on a graph without stage dependencies resolved");
        }

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        for node in starts {
            if visited.insert(node) {
                order.push((node, KeepReason::Seed));
                queue.push_back(node);
            }
        }

        while let Some(node) = queue.pop_front() {
            let name = &self.graph[node].name;
            let deps = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .map(|dep| (dep, KeepReason::RequiredBy(name.clone())));
            let bases = self
                .kept_with
                .get(&node)
                .into_iter()
                .flatten()
                .map(|&base| (base, KeepReason::ExtendedBy(name.clone())));

            for (next, reason) in deps.chain(bases) {
                if visited.insert(next) {
                    order.push((next, reason));
                    queue.push_back(next);
                }
            }
        }

        Ok(order)
    }

    /// Whether [`resolve_stage_dep`](Self::resolve_stage_dep) has run
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Number of jobs
    pub fn job_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges, explicit and implicit
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Every edge as `(dependency, dependent, kind)`, sorted
    pub fn edges(&self) -> Vec<(String, String, EdgeKind)> {
        let mut edges: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| {
                (
                    self.graph[e.source()].name.clone(),
                    self.graph[e.target()].name.clone(),
                    *e.weight(),
                )
            })
            .collect();
        edges.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
        edges
    }

    /// Jobs that must run before `job`
    pub fn dependencies(&self, job: &str) -> Option<Vec<String>> {
        self.neighbors(job, Direction::Incoming)
    }

    /// Jobs that wait for `job`
    pub fn dependents(&self, job: &str) -> Option<Vec<String>> {
        self.neighbors(job, Direction::Outgoing)
    }

    fn neighbors(&self, job: &str, direction: Direction) -> Option<Vec<String>> {
        let node = self.name_to_index.get(job)?;
        let mut names: Vec<String> = self
            .graph
            .neighbors_directed(*node, direction)
            .map(|n| self.graph[n].name.clone())
            .collect();
        names.sort();
        Some(names)
    }

    /// Check if job A depends (directly or transitively) on job B
    pub fn depends_on(&self, job_a: &str, job_b: &str) -> bool {
        let (Some(a), Some(b)) = (self.name_to_index.get(job_a), self.name_to_index.get(job_b))
        else {
            return false;
        };

        petgraph::algo::has_path_connecting(&self.graph, *b, *a, None)
    }

    /// Jobs in an order where every job follows its dependencies
    pub fn topological_order(&self) -> CipruneResult<Vec<String>> {
        toposort(&self.graph, None)
            .map(|nodes| nodes.into_iter().map(|n| self.graph[n].name.clone()).collect())
            .map_err(|cycle| CipruneError::CycleError {
                jobs: self.cycle_containing(cycle.node_id()),
            })
    }

    fn validate_acyclic(&self) -> CipruneResult<()> {
        self.topological_order().map(|_| ())
    }

    /// A concrete cycle through the strongly connected component of `node`,
    /// starting and ending at the same job
    fn cycle_containing(&self, node: NodeIndex) -> Vec<String> {
        let Some(component) = tarjan_scc(&self.graph)
            .into_iter()
            .find(|scc| scc.contains(&node))
        else {
            return vec![self.graph[node].name.clone()];
        };

        let members: HashSet<NodeIndex> = component.iter().copied().collect();
        let start = component
            .iter()
            .copied()
            .min_by(|a, b| self.graph[*a].name.cmp(&self.graph[*b].name))
            .unwrap_or(node);

        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for next in self.graph.neighbors_directed(current, Direction::Outgoing) {
                if !members.contains(&next) {
                    continue;
                }
                if next == start {
                    let mut path = vec![current];
                    let mut cursor = current;
                    while let Some(&p) = parent.get(&cursor) {
                        path.push(p);
                        cursor = p;
                    }
                    path.reverse();
                    let mut names: Vec<String> =
                        path.iter().map(|n| self.graph[*n].name.clone()).collect();
                    names.push(self.graph[start].name.clone());
                    return names;
                }
                if seen.insert(next) {
                    parent.insert(next, current);
                    queue.push_back(next);
                }
            }
        }

        component.iter().map(|n| self.graph[*n].name.clone()).collect()
    }

    /// Generate Mermaid diagram of the graph
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph TD\n");

        for node in self.graph.node_indices() {
            out.push_str(&format!(
                "    n{}[\"{}\"]\n",
                node.index(),
                mermaid_label(&self.graph[node].name)
            ));
        }

        for edge in self.graph.edge_references() {
            let arrow = match edge.weight() {
                EdgeKind::Needs => "-->",
                EdgeKind::Stage => "-.->",
            };
            out.push_str(&format!(
                "    n{} {} n{}\n",
                edge.source().index(),
                arrow,
                edge.target().index()
            ));
        }

        out
    }

    /// Generate DOT diagram of the graph, one cluster per stage
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph pipeline {\n");
        out.push_str("    rankdir=LR;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        let mut by_stage: BTreeMap<usize, Vec<NodeIndex>> = BTreeMap::new();
        for node in self.graph.node_indices() {
            by_stage
                .entry(self.graph[node].stage_index)
                .or_default()
                .push(node);
        }
        for (index, nodes) in &by_stage {
            out.push_str(&format!("    subgraph cluster_{} {{\n", index));
            out.push_str(&format!("        label={};\n", dot_id(&self.graph[nodes[0]].stage)));
            for node in nodes {
                out.push_str(&format!("        {};\n", dot_id(&self.graph[*node].name)));
            }
            out.push_str("    }\n");
        }
        out.push('\n');

        for edge in self.graph.edge_references() {
            let style = match edge.weight() {
                EdgeKind::Needs => "",
                EdgeKind::Stage => " [style=dashed]",
            };
            out.push_str(&format!(
                "    {} -> {}{};\n",
                dot_id(&self.graph[edge.source()].name),
                dot_id(&self.graph[edge.target()].name),
                style
            ));
        }

        out.push_str("}\n");
        out
    }

    /// Generate text representation of a valid execution order
    pub fn to_text(&self) -> CipruneResult<String> {
        let order = self.topological_order()?;
        let mut out = String::new();

        for (i, name) in order.iter().enumerate() {
            let node = self.name_to_index[name];
            let deps = self.dependencies(name).unwrap_or_default();

            out.push_str(&format!("{}. {} ({})", i + 1, name, self.graph[node].stage));

            if !deps.is_empty() {
                out.push_str(&format!(" [depends: {}]", deps.join(", ")));
            }

            out.push('\n');
        }

        Ok(out)
    }
}

/// Quoted DOT identifier
fn dot_id(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Text safe inside a quoted Mermaid label
fn mermaid_label(name: &str) -> String {
    name.replace('"', "#quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_for(yaml: &str) -> DependencyGraph {
        let doc = PipelineDocument::from_yaml(yaml).unwrap();
        let mut graph = DependencyGraph::build(&doc).unwrap();
        graph.resolve_stage_dep().unwrap();
        graph
    }

    const LIB_APP: &str = r#"
stages: [build, test]
build-lib:
  stage: build
test-lib:
  stage: test
  needs: [build-lib]
build-app:
  stage: build
  needs: [build-lib]
"#;

    #[test]
    fn test_scenario_lib_change() {
        let graph = graph_for(LIB_APP);
        let kept = graph
            .pipeline_jobs_to_run(["build-lib", "test-lib"])
            .unwrap();
        let expected: BTreeSet<String> = ["build-lib", "test-lib"].iter().map(|s| s.to_string()).collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn test_empty_seed_keeps_nothing() {
        let graph = graph_for(LIB_APP);
        let kept = graph.pipeline_jobs_to_run(Vec::<String>::new()).unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn test_unknown_seed_is_job_not_found() {
        let graph = graph_for(LIB_APP);
        let err = graph.pipeline_jobs_to_run(["deploy-prod"]).unwrap_err();
        match err {
            CipruneError::JobNotFound { job, .. } => assert_eq!(job, "deploy-prod"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_dangling_need_is_job_not_found() {
        let yaml = r#"
stages: [build, test]
test-lib:
  stage: test
  needs: [build-lib]
"#;
        let doc = PipelineDocument::from_yaml(yaml).unwrap();
        let err = DependencyGraph::build(&doc).unwrap_err();
        match err {
            CipruneError::JobNotFound { job, referenced_by } => {
                assert_eq!(job, "build-lib");
                assert!(referenced_by.contains("test-lib"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_optional_need_may_be_missing() {
        let yaml = r#"
stages: [build, test]
test-lib:
  stage: test
  needs:
    - job: build-lib
      optional: true
"#;
        let graph = graph_for(yaml);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_previous_stage_dependency() {
        let yaml = r#"
stages: [build, test, deploy]
compile:
  stage: build
vet:
  stage: build
unit:
  stage: test
ship:
  stage: deploy
"#;
        let graph = graph_for(yaml);
        assert_eq!(graph.dependencies("unit").unwrap(), vec!["compile", "vet"]);
        assert_eq!(graph.dependencies("ship").unwrap(), vec!["unit"]);
        assert!(graph.depends_on("ship", "compile"));

        let kept = graph.pipeline_jobs_to_run(["ship"]).unwrap();
        assert_eq!(kept.len(), 4);
    }

    #[test]
    fn test_previous_stage_skips_empty_stages() {
        let yaml = r#"
stages: [build, test, deploy]
compile:
  stage: build
ship:
  stage: deploy
"#;
        let graph = graph_for(yaml);
        assert_eq!(graph.dependencies("ship").unwrap(), vec!["compile"]);
    }

    #[test]
    fn test_explicit_needs_override_stage_rule() {
        let yaml = r#"
stages: [build, test]
compile:
  stage: build
docs:
  stage: build
unit:
  stage: test
  needs: [compile]
lint:
  stage: test
  needs: []
"#;
        let graph = graph_for(yaml);
        assert_eq!(graph.dependencies("unit").unwrap(), vec!["compile"]);
        assert!(graph.dependencies("lint").unwrap().is_empty());
    }

    #[test]
    fn test_artifact_dependencies_pull_whole_stage() {
        let yaml = r#"
stages: [build, package, test]
compile:
  stage: build
assets:
  stage: build
bundle:
  stage: package
unit:
  stage: test
  dependencies: [compile]
"#;
        let graph = graph_for(yaml);
        assert_eq!(graph.dependencies("unit").unwrap(), vec!["assets", "compile"]);
        assert!(!graph.depends_on("unit", "bundle"));
    }

    #[test]
    fn test_artifact_dependency_on_later_stage_rejected() {
        let yaml = r#"
stages: [build, test]
compile:
  stage: build
  dependencies: [unit]
unit:
  stage: test
"#;
        let doc = PipelineDocument::from_yaml(yaml).unwrap();
        let err = DependencyGraph::build(&doc).unwrap_err();
        assert!(matches!(err, CipruneError::ConfigError { .. }));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let yaml = r#"
stages: [build, test]
compile:
  stage: build
unit:
  stage: test
"#;
        let doc = PipelineDocument::from_yaml(yaml).unwrap();
        let mut graph = DependencyGraph::build(&doc).unwrap();
        assert_eq!(graph.resolve_stage_dep().unwrap(), 1);
        assert_eq!(graph.resolve_stage_dep().unwrap(), 0);
        assert!(graph.is_resolved());
    }

    #[test]
    fn test_cycle_detection() {
        let yaml = r#"
stages: [build]
a:
  stage: build
  needs: [b]
b:
  stage: build
  needs: [c]
c:
  stage: build
  needs: [a]
"#;
        let doc = PipelineDocument::from_yaml(yaml).unwrap();
        let mut graph = DependencyGraph::build(&doc).unwrap();
        match graph.resolve_stage_dep() {
            Err(CipruneError::CycleError { jobs }) => {
                assert_eq!(jobs.first(), jobs.last());
                assert_eq!(jobs.len(), 4);
                for job in ["a", "b", "c"] {
                    assert!(jobs.iter().any(|j| j == job));
                }
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_need_is_cycle() {
        let doc = PipelineDocument::from_yaml("a:\n  needs: [a]\n").unwrap();
        let mut graph = DependencyGraph::build(&doc).unwrap();
        match graph.resolve_stage_dep() {
            Err(CipruneError::CycleError { jobs }) => assert_eq!(jobs, vec!["a", "a"]),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_explain_reasons() {
        let graph = graph_for(LIB_APP);
        let reasons = graph.explain_jobs_to_run(["test-lib"]).unwrap();
        assert_eq!(reasons["test-lib"], KeepReason::Seed);
        assert_eq!(
            reasons["build-lib"],
            KeepReason::RequiredBy("test-lib".to_string())
        );
    }

    #[test]
    fn test_to_text_and_diagrams() {
        let graph = graph_for(LIB_APP);
        let text = graph.to_text().unwrap();
        assert!(text.starts_with("1. build-lib (build)"));
        assert!(text.contains("test-lib (test) [depends: build-lib]"));

        let dot = graph.to_dot();
        assert!(dot.contains("\"build-lib\" -> \"test-lib\";"));
        assert!(dot.contains("label=\"build\""));

        let mermaid = graph.to_mermaid();
        assert!(mermaid.contains("graph TD"));
        assert!(mermaid.contains("[\"build-app\"]"));
    }

    #[test]
    fn test_extended_job_kept_together() {
        let yaml = r#"
stages: [build, test]
base-build:
  stage: build
  script: make
.slim:
  extends: base-build
variant:
  extends: .slim
other:
  stage: build
early:
  stage: build
  extends: late
late:
  stage: test
"#;
        let graph = graph_for(yaml);

        let kept = graph.pipeline_jobs_to_run(["variant"]).unwrap();
        let expected: Vec<&str> = vec!["base-build", "variant"];
        assert_eq!(kept.iter().map(String::as_str).collect::<Vec<_>>(), expected);

        let reasons = graph.explain_jobs_to_run(["variant"]).unwrap();
        assert_eq!(
            reasons["base-build"],
            KeepReason::ExtendedBy("variant".to_string())
        );

        // Kept together, but no ordering between them
        assert!(!graph.depends_on("variant", "base-build"));

        // A base in a later stage is not a cycle
        let kept = graph.pipeline_jobs_to_run(["early"]).unwrap();
        assert!(kept.contains("late"));
    }

    #[test]
    fn test_diagram_labels_escaped() {
        let graph = graph_for("'say \"hi\"':\n  stage: build\n'back\\slash':\n  stage: test\n");

        let dot = graph.to_dot();
        assert!(dot.contains(r#""say \"hi\"";"#));
        assert!(dot.contains(r#""back\\slash";"#));

        let mermaid = graph.to_mermaid();
        assert!(mermaid.contains("[\"say #quot;hi#quot;\"]"));
    }
}
