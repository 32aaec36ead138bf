//! # asset-forge
//!
//! An asset build pipeline: given an input directory tree of source assets
//! and an output directory, transforms each asset with one or more
//! registered [`Tool`]s into derived artifacts in the output tree.
//!
//! The crate is the build *planner and executor*: starting from the set of
//! source files, it repeatedly asks every registered tool whether it
//! claims each file, resolves output-collisions by tool priority,
//! discovers generated intermediates (outputs of one tool that are
//! themselves inputs to another), builds a bipartite file/job dependency
//! graph, layers that graph by topological sort, and executes each layer
//! either on the calling thread or across a worker pool.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use asset_forge::{Forge, tools::CopyTool};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut forge = Forge::new();
//!     forge.register_tool(Box::new(CopyTool::new(r".*")));
//!     forge.build(Path::new("assets"), Path::new("build"), true, false)?;
//!     Ok(())
//! }
//! ```
//!
//! Writing a custom tool just means implementing [`Tool`]:
//!
//! ```rust,no_run
//! use asset_forge::{Tool, ToolContext};
//! use anyhow::Result;
//! use std::path::{Path, PathBuf};
//!
//! struct Uppercase;
//!
//! impl Tool for Uppercase {
//!     fn name(&self) -> &str { "Uppercase" }
//!
//!     fn matches(&self, file: &Path, ctx: &ToolContext) -> bool {
//!         ctx.in_input(file) && file.extension().map(|e| e == "txt").unwrap_or(false)
//!     }
//!
//!     fn outputs(&self, file: &Path, ctx: &ToolContext) -> Vec<PathBuf> {
//!         match ctx.relative_path(file) {
//!             Ok(rel) => vec![ctx.output_root.join(rel)],
//!             Err(_) => Vec::new(),
//!         }
//!     }
//!
//!     fn build(&self, file: &Path, ctx: &ToolContext) -> Result<()> {
//!         let rel = ctx.relative_path(file)?;
//!         let output = ctx.output_root.join(rel);
//!         std::fs::create_dir_all(output.parent().unwrap())?;
//!         let text = std::fs::read_to_string(file)?.to_uppercase();
//!         std::fs::write(output, text)?;
//!         Ok(())
//!     }
//! }
//! ```

pub mod error;
pub mod exec;
pub mod forge;
pub mod graph;
pub mod ignore;
pub mod plan;
pub mod registry;
pub mod resolve;
pub mod sink;
pub mod tool;
pub mod tools;

pub use error::PlanError;
pub use forge::Forge;
pub use ignore::IgnoreFilter;
pub use registry::Registry;
pub use sink::LogSink;
pub use tool::{Tool, ToolContext};

/// Crate version, re-exported for diagnostics (`forge --version` etc.).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
