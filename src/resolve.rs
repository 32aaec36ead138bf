//! Per-round collision arbitration (§4.C).
//!
//! Direct port of the inner `while True: collisions = ...` loop in
//! `AssetForge/core.py::Build`.

use std::collections::HashSet;
use std::path::PathBuf;

/// One `(tool, file)` pair that matched in the current discovery round,
/// plus what it declared.
pub struct Candidate {
    pub tool_index: usize,
    pub priority: i32,
    pub file: PathBuf,
    pub outputs: Vec<PathBuf>,
}

/// Returns the indices (into `candidates`) that survive collision
/// arbitration, in their original relative order.
///
/// A candidate collides if its output set intersects another *surviving*
/// candidate's output set in this round, or intersects `committed_outputs`
/// (the output universe from previous rounds). Among colliding candidates,
/// repeatedly drop the lowest-priority one (ties broken by the lowest
/// original index) until no collisions remain.
pub fn resolve_collisions(candidates: &[Candidate], committed_outputs: &HashSet<PathBuf>) -> Vec<usize> {
    let mut alive: Vec<usize> = (0..candidates.len()).collect();

    loop {
        let mut colliding: HashSet<usize> = HashSet::new();

        for (a_pos, &a) in alive.iter().enumerate() {
            let a_outs = &candidates[a].outputs;

            for &b in alive.iter().skip(a_pos + 1) {
                let b_outs = &candidates[b].outputs;
                if a_outs.iter().any(|o| b_outs.contains(o)) {
                    colliding.insert(a);
                    colliding.insert(b);
                }
            }

            if a_outs.iter().any(|o| committed_outputs.contains(o)) {
                colliding.insert(a);
            }
        }

        if colliding.is_empty() {
            break;
        }

        let to_drop = *colliding
            .iter()
            .min_by_key(|&&idx| (candidates[idx].priority, idx))
            .expect("colliding set is non-empty");

        alive.retain(|&idx| idx != to_drop);
    }

    alive
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(tool_index: usize, priority: i32, file: &str, outputs: &[&str]) -> Candidate {
        Candidate {
            tool_index,
            priority,
            file: PathBuf::from(file),
            outputs: outputs.iter().map(PathBuf::from).collect(),
        }
    }

    #[test]
    fn no_collision_keeps_everyone() {
        let candidates = vec![
            candidate(0, 1, "a.txt", &["out/a.txt"]),
            candidate(1, 1, "b.txt", &["out/b.txt"]),
        ];
        let kept = resolve_collisions(&candidates, &HashSet::new());
        assert_eq!(kept, vec![0, 1]);
    }

    #[test]
    fn higher_priority_survives_collision() {
        let candidates = vec![
            candidate(0, 5, "x.bin", &["out/x.bin.z"]),
            candidate(1, 3, "x.bin", &["out/x.bin.z"]),
        ];
        let kept = resolve_collisions(&candidates, &HashSet::new());
        assert_eq!(kept, vec![0]);
    }

    #[test]
    fn collision_against_committed_outputs_drops_candidate() {
        let candidates = vec![candidate(0, 10, "a.txt", &["out/a.txt"])];
        let mut committed = HashSet::new();
        committed.insert(PathBuf::from("out/a.txt"));
        let kept = resolve_collisions(&candidates, &committed);
        assert!(kept.is_empty());
    }

    #[test]
    fn ties_broken_by_lowest_index() {
        let candidates = vec![
            candidate(0, 1, "x.bin", &["out/x.bin.z"]),
            candidate(1, 1, "x.bin", &["out/x.bin.z"]),
        ];
        let kept = resolve_collisions(&candidates, &HashSet::new());
        assert_eq!(kept, vec![1]);
    }
}
