//! The bipartite file/job dependency graph and its batched topological sort.
//!
//! Grounded on `AssetForge/util.py::topological_sort`: build a "dependee"
//! graph (the reverse of the "depends on" graph passed in), track in-degree
//! per node, and repeatedly peel off the set of zero-in-degree nodes as a
//! batch. Re-expressed here with interned integer `NodeId`s (§9 of
//! SPEC_FULL.md) instead of re-hashing stringified paths on every lookup.

use std::collections::HashSet;

use ahash::AHashMap;

use crate::error::PlanError;

/// An interned graph node. Cheap to copy, used as a `HashMap`/`Vec` index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct NodeId(u32);

/// Bidirectional key <-> `NodeId` table plus the adjacency lists.
///
/// Edges point dependent -> dependency, exactly like the Python
/// `graph: Dict[str, Set[str]]` the original threads through `Build`.
#[derive(Default)]
pub struct Graph {
    keys: Vec<String>,
    index: AHashMap<String, NodeId>,
    /// `predecessors[n]` = the set of nodes `n` depends on.
    predecessors: Vec<HashSet<NodeId>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the `NodeId` for `key`, creating an empty-dependency node if
    /// this is the first time `key` is seen.
    pub fn intern(&mut self, key: impl Into<String>) -> NodeId {
        let key = key.into();
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = NodeId(self.keys.len() as u32);
        self.keys.push(key.clone());
        self.index.insert(key, id);
        self.predecessors.push(HashSet::new());
        id
    }

    pub fn key(&self, id: NodeId) -> &str {
        &self.keys[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Declares that `node` depends on `dependency` (a `node -> dependency`
    /// edge). Interns both ends if necessary.
    pub fn add_edge(&mut self, node: NodeId, dependency: NodeId) {
        self.predecessors[node.0 as usize].insert(dependency);
    }

    fn predecessors_of(&self, node: NodeId) -> &HashSet<NodeId> {
        &self.predecessors[node.0 as usize]
    }

    /// Kahn-style layered topological sort.
    ///
    /// Returns a sequence of batches `L0, L1, ...` such that every node in
    /// `Li` has all its predecessors in `L0 union ... union L(i-1)`.
    /// Strictly alternates file-layer/job-layer by construction of the
    /// graph (§3), not by anything this function enforces.
    ///
    /// Errors with [`PlanError::Cycle`] naming every node that never
    /// reached in-degree zero if the graph is not acyclic.
    pub fn layered_topo_sort(&self) -> Result<Vec<Vec<NodeId>>, PlanError> {
        let n = self.len();

        // dependee_graph[d] = { nodes that depend on d }
        let mut dependees: Vec<HashSet<NodeId>> = vec![HashSet::new(); n];
        let mut in_degree: Vec<usize> = vec![0; n];

        for node_idx in 0..n {
            let node = NodeId(node_idx as u32);
            let preds = self.predecessors_of(node);
            in_degree[node_idx] = preds.len();
            for &dep in preds {
                dependees[dep.0 as usize].insert(node);
            }
        }

        let mut added = vec![false; n];
        let mut ready: Vec<NodeId> = (0..n as u32)
            .map(NodeId)
            .filter(|id| in_degree[id.0 as usize] == 0)
            .collect();

        let mut result = Vec::new();
        let mut added_count = 0usize;

        while !ready.is_empty() {
            for &node in &ready {
                added[node.0 as usize] = true;
            }
            added_count += ready.len();

            let mut next_ready = Vec::new();
            for &node in &ready {
                for &dependee in &dependees[node.0 as usize] {
                    let deg = &mut in_degree[dependee.0 as usize];
                    *deg -= 1;
                    if *deg == 0 && !added[dependee.0 as usize] {
                        next_ready.push(dependee);
                    }
                }
            }

            result.push(ready);
            ready = next_ready;
        }

        if added_count != n {
            let nodes = (0..n as u32)
                .map(NodeId)
                .filter(|id| !added[id.0 as usize])
                .map(|id| self.key(id).to_string())
                .collect();
            return Err(PlanError::Cycle { nodes });
        }

        Ok(result)
    }
}
