//! The zlib compressor.
//!
//! Ports `AssetForge/common.py::CompressionTool` / the standalone
//! `exp/amake/compress.py::CompressTool` — they're byte-identical in
//! behavior. Preserves the original's `.bin`-suffix-counting match quirk
//! verbatim (§9 of SPEC_FULL.md): only paths with exactly one `.bin`
//! suffix component match, so `data.bin` matches but `data.bin.bin` does
//! not.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::tool::{ensure_parent, Tool, ToolContext};

pub struct CompressTool {
    priority: i32,
}

impl CompressTool {
    pub fn new() -> Self {
        Self { priority: 0 }
    }

    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }
}

impl Default for CompressTool {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts suffix *components* the way `pathlib.Path.suffixes` does — not
/// how many times `".bin"` appears as a substring, but how many
/// dot-delimited trailing extension components there are, e.g.
/// `"foo.atlas.bin"` has suffixes `[".atlas", ".bin"]`.
fn suffixes(file_name: &str) -> Vec<&str> {
    if !file_name.contains('.') {
        return Vec::new();
    }
    file_name
        .match_indices('.')
        .map(|(i, _)| &file_name[i..])
        .collect()
}

impl Tool for CompressTool {
    fn name(&self) -> &str {
        "CompressTool"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn matches(&self, file: &Path, _ctx: &ToolContext) -> bool {
        let Some(file_name) = file.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let suffixes = suffixes(file_name);
        suffixes.iter().filter(|s| **s == ".bin").count() == 1
            && suffixes.last().map(|s| *s == ".bin").unwrap_or(false)
    }

    fn outputs(&self, file: &Path, ctx: &ToolContext) -> Vec<PathBuf> {
        match ctx.relative_path(file) {
            Ok(rel) => {
                let mut name = rel.file_name().unwrap_or_default().to_os_string();
                name.push(".z");
                vec![ctx.output_root.join(rel).with_file_name(name)]
            }
            Err(_) => Vec::new(),
        }
    }

    fn build(&self, file: &Path, ctx: &ToolContext) -> Result<()> {
        let rel = ctx.relative_path(file)?;
        let mut name = rel.file_name().unwrap_or_default().to_os_string();
        name.push(".z");
        let output_file = ctx.output_root.join(&rel).with_file_name(name);
        ensure_parent(&output_file)?;

        let data = std::fs::read(file)
            .with_context(|| format!("failed to read {}", file.display()))?;

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&data)
            .context("failed to zlib-compress data")?;
        let compressed = encoder.finish().context("failed to finish zlib stream")?;

        std::fs::write(&output_file, compressed).with_context(|| {
            format!("failed to write compressed output {}", output_file.display())
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ToolContext {
        ToolContext::new("/in", "/out")
    }

    #[test]
    fn matches_single_bin_suffix() {
        let tool = CompressTool::new();
        assert!(tool.matches(Path::new("/in/data.bin"), &ctx()));
        assert!(tool.matches(Path::new("/in/foo.atlas.bin"), &ctx()));
    }

    #[test]
    fn does_not_match_double_bin_suffix() {
        let tool = CompressTool::new();
        assert!(!tool.matches(Path::new("/in/data.bin.bin"), &ctx()));
    }

    #[test]
    fn does_not_match_non_bin() {
        let tool = CompressTool::new();
        assert!(!tool.matches(Path::new("/in/data.txt"), &ctx()));
    }

    #[test]
    fn output_appends_z_suffix() {
        let tool = CompressTool::new();
        let outs = tool.outputs(Path::new("/in/data.bin"), &ctx());
        assert_eq!(outs, vec![PathBuf::from("/out/data.bin.z")]);
    }
}
