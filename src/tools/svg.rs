//! The SVG-to-PNG rasterizer.
//!
//! Ports `exp/amake/svg.py::SVGtoPNGTool`: matches files with exactly one
//! `.svg` suffix component, rasterizes them at their intrinsic size, and
//! writes a PNG next to the mirrored relative path. The original shells out
//! to `cairosvg`; this crate has no such dependency, so rasterization goes
//! through `usvg` (parse) + `resvg` (render) + `tiny-skia` (pixel buffer),
//! matching the stack `najmus-sakib-hossain-zed` already pulls in for its
//! own SVG rendering.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::tool::{ensure_parent, Tool, ToolContext};

pub struct SvgTool {
    priority: i32,
}

impl SvgTool {
    pub fn new() -> Self {
        Self { priority: 0 }
    }

    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }

    fn png_output(rel: &Path) -> PathBuf {
        rel.with_extension("png")
    }
}

impl Default for SvgTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for SvgTool {
    fn name(&self) -> &str {
        "SvgTool"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn matches(&self, file: &Path, ctx: &ToolContext) -> bool {
        let Some(file_name) = file.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        ctx.in_input(file)
            && file_name
                .match_indices('.')
                .map(|(i, _)| &file_name[i..])
                .filter(|s| *s == ".svg")
                .count()
                == 1
    }

    fn outputs(&self, file: &Path, ctx: &ToolContext) -> Vec<PathBuf> {
        match ctx.relative_path(file) {
            Ok(rel) => vec![ctx.output_root.join(Self::png_output(&rel))],
            Err(_) => Vec::new(),
        }
    }

    fn build(&self, file: &Path, ctx: &ToolContext) -> Result<()> {
        let rel = ctx.relative_path(file)?;
        let output_file = ctx.output_root.join(Self::png_output(&rel));
        ensure_parent(&output_file)?;

        let svg_data = std::fs::read(file)
            .with_context(|| format!("failed to read {}", file.display()))?;

        let options = usvg::Options::default();
        let tree = usvg::Tree::from_data(&svg_data, &options)
            .with_context(|| format!("failed to parse SVG {}", file.display()))?;

        let size = tree.size();
        let (width, height) = (size.width().ceil() as u32, size.height().ceil() as u32);
        let (width, height) = (width.max(1), height.max(1));

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("invalid SVG intrinsic size {}x{}", width, height))?;

        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

        let png_bytes = pixmap
            .encode_png()
            .with_context(|| format!("failed to encode PNG for {}", file.display()))?;
        std::fs::write(&output_file, png_bytes).with_context(|| {
            format!("failed to write rasterized output {}", output_file.display())
        })?;

        ctx.log.line(format!(
            "Successfully converted {} to {}",
            file.display(),
            output_file.display()
        ));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="8"><rect width="16" height="8" fill="red"/></svg>"#;

    #[test]
    fn matches_single_svg_suffix() {
        let ctx = ToolContext::new("/in", "/out");
        let tool = SvgTool::new();
        assert!(tool.matches(Path::new("/in/icon.svg"), &ctx));
        assert!(!tool.matches(Path::new("/in/icon.svg.svg"), &ctx));
    }

    #[test]
    fn outputs_same_relative_path_with_png_extension() {
        let ctx = ToolContext::new("/in", "/out");
        let tool = SvgTool::new();
        let outs = tool.outputs(Path::new("/in/sub/icon.svg"), &ctx);
        assert_eq!(outs, vec![PathBuf::from("/out/sub/icon.png")]);
    }

    #[test]
    fn build_rasterizes_to_a_decodable_png_of_expected_size() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        std::fs::create_dir_all(&input).unwrap();

        let svg_path = input.join("icon.svg");
        std::fs::write(&svg_path, SAMPLE_SVG).unwrap();

        let ctx = ToolContext::new(&input, &output);
        let tool = SvgTool::new();
        tool.build(&svg_path, &ctx).unwrap();

        let png_path = output.join("icon.png");
        let decoded = image::open(&png_path).unwrap();
        assert_eq!(decoded.width(), 16);
        assert_eq!(decoded.height(), 8);
    }
}
