//! The public entry point: a single `Forge` value owning the tool registry
//! and tying the planner (§4.C-F) to the executor (§4.G) for one project.
//!
//! Grounded on the teacher's `core/forge.rs::Forge` for the "one struct
//! constructed once by the driver, holding everything" shape — the
//! contents are entirely replaced; none of the CRDT/watcher/versioning/R2
//! machinery survives, since none of it has a counterpart in this spec.

use std::path::Path;

use anyhow::Result;
use tracing::{info, instrument};

use crate::exec;
use crate::plan;
use crate::registry::Registry;
use crate::tool::{Tool, ToolContext};

/// Owns the tool registry for the lifetime of the process. Constructed
/// once by the driver; `build` may be called repeatedly on the same
/// instance (each call plans and executes independently; the log sink is
/// reset between calls).
#[derive(Default)]
pub struct Forge {
    registry: Registry,
}

impl Forge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `tool` to the registry. Additive only; there is no unregister.
    /// The tool's own `priority()` governs collision arbitration — there
    /// is no separate priority argument at the call site (§4.A).
    pub fn register_tool(&mut self, tool: Box<dyn Tool>) {
        self.registry.register(tool);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Runs the full pipeline: walks `input_root`, discovers the bipartite
    /// file/job graph to a fixed point (§4.D), layers it (§4.F), and
    /// executes every job-layer either on the calling thread or across a
    /// worker pool sized to the widest layer (§4.G, §5).
    ///
    /// Returns `Ok(())` once planning succeeds, regardless of individual
    /// tool build failures — those are recorded in `<output_root>/
    /// output.log` (§7) rather than surfaced here.
    #[instrument(skip(self), fields(input = %input_root.display(), output = %output_root.display()))]
    pub fn build(
        &mut self,
        input_root: &Path,
        output_root: &Path,
        recursive: bool,
        parallel: bool,
    ) -> Result<()> {
        std::fs::create_dir_all(output_root)?;

        let ctx = ToolContext::new(input_root, output_root);

        for tool in self.registry.iter_mut() {
            tool.start(&ctx)?;
        }

        let plan = plan::discover(&self.registry, &ctx, recursive)?;
        info!(
            jobs = plan.total_jobs(),
            layers = plan.layers.len(),
            "plan ready"
        );

        if parallel {
            exec::run_parallel(&self.registry, &plan, &ctx);
        } else {
            exec::run_serial(&self.registry, &plan, &ctx);
        }

        exec::flush_log(&ctx.log, output_root)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::copy::CopyTool;
    use tempfile::tempdir;

    #[test]
    fn pass_through_copies_every_matching_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        std::fs::create_dir_all(input.join("sub")).unwrap();
        std::fs::write(input.join("a.txt"), b"a").unwrap();
        std::fs::write(input.join("sub/b.txt"), b"b").unwrap();

        let mut forge = Forge::new();
        forge.register_tool(Box::new(CopyTool::new(r".*\.txt")));
        forge.build(&input, &output, true, false).unwrap();

        assert_eq!(std::fs::read(output.join("a.txt")).unwrap(), b"a");
        assert_eq!(std::fs::read(output.join("sub/b.txt")).unwrap(), b"b");
        assert!(output.join("output.log").exists());
    }

    #[test]
    fn non_recursive_build_skips_nested_files() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        std::fs::create_dir_all(input.join("sub")).unwrap();
        std::fs::write(input.join("a.txt"), b"a").unwrap();
        std::fs::write(input.join("sub/b.txt"), b"b").unwrap();

        let mut forge = Forge::new();
        forge.register_tool(Box::new(CopyTool::new(r".*\.txt")));
        forge.build(&input, &output, false, false).unwrap();

        assert!(output.join("a.txt").exists());
        assert!(!output.join("sub/b.txt").exists());
    }
}
