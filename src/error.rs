//! Structured planning errors.
//!
//! Tool build failures are *not* represented here — they are caught, logged
//! to the build's aggregate log, and never stop the build (see
//! [`crate::exec`]). Only errors that make the plan itself unusable are
//! modeled as a dedicated type so callers can match on them.

use std::fmt;

use thiserror::Error;

/// An error raised while planning a build, before any tool has run.
#[derive(Error, Debug)]
pub enum PlanError {
    /// The file/job dependency graph contains a cycle.
    ///
    /// `nodes` names every node that never reached in-degree zero during
    /// the layered topological sort — i.e. every node reachable only
    /// through the cycle(s).
    #[error("dependency graph contains a cycle; unresolved nodes: {}", DisplayNodes(.nodes))]
    Cycle { nodes: Vec<String> },

    /// A tool's `relative_path` helper was asked about a file that lives
    /// under neither the input nor the output root.
    #[error("{path} is not relative to input root {input_root} or output root {output_root}")]
    NotUnderRoot {
        path: String,
        input_root: String,
        output_root: String,
    },
}

struct DisplayNodes<'a>(&'a [String]);

impl fmt::Display for DisplayNodes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}
