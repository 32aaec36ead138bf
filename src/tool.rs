//! The plugin contract every build tool satisfies.
//!
//! Generalizes this crate's own [`crate::registry`] / orchestration lineage
//! (`DxTool`'s name/priority/execute shape) to the four-method contract the
//! asset pipeline needs: a tool must say whether it claims a file, what
//! other files that claim depends on, what it will produce, and how to
//! actually produce it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::PlanError;
use crate::sink::LogSink;

/// Everything a tool needs to do its job, handed in on every call instead
/// of being injected as mutable fields the way the Python original assigns
/// `tool.input_folder`/`tool.output_folder` before the first `check_match`.
#[derive(Clone)]
pub struct ToolContext {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub log: LogSink,
}

impl ToolContext {
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
            log: LogSink::new(),
        }
    }

    /// Returns `file` relative to whichever root contains it.
    ///
    /// Ports `AssetTool.relative_path`.
    pub fn relative_path(&self, file: &Path) -> Result<PathBuf> {
        if let Ok(rel) = file.strip_prefix(&self.input_root) {
            return Ok(rel.to_path_buf());
        }
        if let Ok(rel) = file.strip_prefix(&self.output_root) {
            return Ok(rel.to_path_buf());
        }
        Err(PlanError::NotUnderRoot {
            path: file.display().to_string(),
            input_root: self.input_root.display().to_string(),
            output_root: self.output_root.display().to_string(),
        }
        .into())
    }

    /// True if `file` lives under `input_root`.
    pub fn in_input(&self, file: &Path) -> bool {
        file.starts_with(&self.input_root)
    }
}

/// A build tool: claims input files, declares their dependencies and
/// outputs, and knows how to build them.
///
/// `matches`, `deps`, and `outputs` must be pure and deterministic for the
/// duration of one build — the planner calls them repeatedly across
/// discovery rounds and relies on getting the same answer each time.
pub trait Tool: Send + Sync {
    /// Human-readable identifier used in progress lines and logs.
    fn name(&self) -> &str;

    /// Collision-arbitration priority; higher wins (§4.C).
    fn priority(&self) -> i32 {
        0
    }

    /// May this tool claim `file`? Must be side-effect free.
    fn matches(&self, file: &Path, ctx: &ToolContext) -> bool;

    /// Extra inputs whose existence (and producing jobs, if any) must
    /// precede `build`. Empty by default.
    fn deps(&self, _file: &Path, _ctx: &ToolContext) -> Vec<PathBuf> {
        Vec::new()
    }

    /// Files this tool will write under the output root.
    fn outputs(&self, file: &Path, ctx: &ToolContext) -> Vec<PathBuf>;

    /// Performs the work. May write files, may write to `ctx.log`.
    /// An `Err` return is recorded as a tool build failure (§7) — the
    /// overall build is not aborted.
    fn build(&self, file: &Path, ctx: &ToolContext) -> Result<()>;

    /// Called exactly once per build, before any other method, so
    /// decorators can precompute state (e.g. the ignore-filter whitelist).
    fn start(&mut self, _ctx: &ToolContext) -> Result<()> {
        Ok(())
    }
}

/// Helper used by built-in tools that write files under a mirrored
/// relative path: creates the parent directory of `path`.
pub(crate) fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    Ok(())
}
