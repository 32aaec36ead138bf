//! A minimal custom [`Tool`] registered alongside the built-in ones.
//!
//! Run with `cargo run --example custom_tool -- <input-dir> <output-dir>`.
//! `ManifestTool` matches every `.json` file under the input root and
//! writes a one-line summary (`"<name>: <byte-count> bytes"`) to a
//! `.manifest` sibling under the output root — small enough to show the
//! four-method shape end to end without pulling in a real format.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use asset_forge::{Forge, Tool, ToolContext};

struct ManifestTool;

impl Tool for ManifestTool {
    fn name(&self) -> &str {
        "ManifestTool"
    }

    fn priority(&self) -> i32 {
        1
    }

    fn matches(&self, file: &Path, ctx: &ToolContext) -> bool {
        ctx.in_input(file) && file.extension().map(|e| e == "json").unwrap_or(false)
    }

    fn outputs(&self, file: &Path, ctx: &ToolContext) -> Vec<PathBuf> {
        match ctx.relative_path(file) {
            Ok(rel) => vec![ctx.output_root.join(rel).with_extension("manifest")],
            Err(_) => Vec::new(),
        }
    }

    fn build(&self, file: &Path, ctx: &ToolContext) -> Result<()> {
        let rel = ctx.relative_path(file)?;
        let output_file = ctx.output_root.join(&rel).with_extension("manifest");
        if let Some(parent) = output_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let bytes = std::fs::read(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let name = file.file_name().unwrap_or_default().to_string_lossy();
        std::fs::write(&output_file, format!("{name}: {} bytes\n", bytes.len()))?;

        ctx.log.line(format!("wrote manifest for {}", file.display()));
        Ok(())
    }
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let input = PathBuf::from(args.next().unwrap_or_else(|| "assets".to_string()));
    let output = PathBuf::from(args.next().unwrap_or_else(|| "build".to_string()));

    let mut forge = Forge::new();
    forge.register_tool(Box::new(ManifestTool));
    forge.build(&input, &output, true, false)
}
