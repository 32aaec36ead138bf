//! Fixed-point discovery loop + dependency graph assembly (§4.D, §4.E).
//!
//! Direct port of the outer `while len(delta) > 0` loop in
//! `AssetForge/core.py::Build`.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::Result;
use walkdir::WalkDir;

use crate::graph::{Graph, NodeId};
use crate::registry::Registry;
use crate::resolve::{resolve_collisions, Candidate};
use crate::tool::ToolContext;

/// A single scheduled unit of work: one tool firing on one primary input.
pub struct Job {
    /// `"<ToolName>_<uuid>"`, matching the original's job-node key.
    pub id: String,
    pub tool_index: usize,
    pub primary_input: PathBuf,
    pub deps: Vec<PathBuf>,
    pub outputs: Vec<PathBuf>,
}

/// The fully discovered bipartite graph, its jobs, and the batch order
/// ready for execution.
pub struct Plan {
    pub jobs: HashMap<String, Job>,
    /// Batches in execution order. Even layers are file-nodes (not
    /// executed); odd layers are job-node keys ready to run.
    pub layers: Vec<Vec<String>>,
}

impl Plan {
    /// The job-layers only (odd-indexed layers of the full bipartite
    /// order), each job-key resolved to its `Job`.
    pub fn job_batches(&self) -> Vec<Vec<&Job>> {
        self.layers
            .iter()
            .skip(1)
            .step_by(2)
            .map(|layer| layer.iter().filter_map(|key| self.jobs.get(key)).collect())
            .collect()
    }

    pub fn total_jobs(&self) -> usize {
        self.jobs.len()
    }
}

/// Walks `input_root`, repeatedly matching tools against the growing
/// frontier of files (sources, then each round's newly declared outputs)
/// until no tool produces anything new, building the bipartite graph as it
/// goes, then layers it with a topological sort.
pub fn discover(registry: &Registry, ctx: &ToolContext, recursive: bool) -> Result<Plan> {
    let mut graph = Graph::new();
    let mut jobs: HashMap<String, Job> = HashMap::new();

    let source_files = walk_input(&ctx.input_root, recursive)?;

    for file in &source_files {
        graph.intern(node_key(file));
    }

    let mut committed_outputs: HashSet<PathBuf> = HashSet::new();
    let mut frontier: Vec<PathBuf> = source_files;

    while !frontier.is_empty() {
        let mut candidates: Vec<Candidate> = Vec::new();
        // file + deps kept alongside each candidate so we don't call
        // `deps`/`outputs` twice per accepted candidate.
        let mut candidate_deps: Vec<Vec<PathBuf>> = Vec::new();

        for file in &frontier {
            for (tool_index, tool) in registry.iter().enumerate() {
                if !tool.matches(file, ctx) {
                    continue;
                }
                let outputs = tool.outputs(file, ctx);
                let deps = tool.deps(file, ctx);

                candidates.push(Candidate {
                    tool_index,
                    priority: tool.priority(),
                    file: file.clone(),
                    outputs,
                });
                candidate_deps.push(deps);
            }
        }

        let accepted = resolve_collisions(&candidates, &committed_outputs);

        let mut new_outputs: HashSet<PathBuf> = HashSet::new();

        for &idx in &accepted {
            let candidate = &candidates[idx];
            let deps = &candidate_deps[idx];
            let tool_name = tool_name_for(registry, candidate.tool_index);

            let job_id = format!("{}_{}", tool_name, uuid::Uuid::new_v4().simple());
            let job_node = graph.intern(job_id.clone());

            let mut job_preds: Vec<PathBuf> = deps.clone();
            job_preds.push(candidate.file.clone());
            for dep_file in &job_preds {
                let dep_node = graph.intern(node_key(dep_file));
                graph.add_edge(job_node, dep_node);
            }

            for output in &candidate.outputs {
                let output_node = graph.intern(node_key(output));
                graph.add_edge(output_node, job_node);
                new_outputs.insert(output.clone());
            }

            jobs.insert(
                job_id.clone(),
                Job {
                    id: job_id,
                    tool_index: candidate.tool_index,
                    primary_input: candidate.file.clone(),
                    deps: deps.clone(),
                    outputs: candidate.outputs.clone(),
                },
            );
        }

        committed_outputs.extend(new_outputs.iter().cloned());
        frontier = new_outputs.into_iter().collect();
    }

    let node_layers = graph.layered_topo_sort().map_err(anyhow::Error::from)?;
    let layers: Vec<Vec<String>> = node_layers
        .into_iter()
        .map(|layer| layer.into_iter().map(|id: NodeId| graph.key(id).to_string()).collect())
        .collect();

    Ok(Plan { jobs, layers })
}

fn tool_name_for(registry: &Registry, index: usize) -> String {
    registry
        .iter()
        .nth(index)
        .map(|t| t.name().to_string())
        .unwrap_or_else(|| "UnknownTool".to_string())
}

fn node_key(path: &Path) -> String {
    path.display().to_string()
}

fn walk_input(input_root: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(input_root)
        .follow_links(true)
        .max_depth(if recursive { usize::MAX } else { 1 });

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.path().to_path_buf());
        }
    }

    Ok(files)
}
