//! The texture-atlas packer.
//!
//! Ports `exp/amake/atlas.py::AtlasTool`: reads a `.atlas` JSON manifest
//! naming a sibling image and a list of pixel-space rectangles, and emits
//! a small binary blob of normalized UV rectangles plus a name table, in
//! the exact layout the manifest's own C++ loader comment documents.
//!
//! Binary format:
//! - `u32` (LE): number of entries.
//! - `u32` (LE): size of the text blob, in bytes.
//! - UV data block: 4 `f32`s per entry (`u_min`, `v_min`, `u_max`, `v_max`).
//! - Text blob: a NUL-terminated UTF-8 name per entry, in entry order.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::tool::{ensure_parent, Tool, ToolContext};

#[derive(Deserialize)]
struct AtlasManifest {
    #[serde(rename = "type")]
    kind: String,
    image: Option<String>,
    #[serde(default)]
    entries: Vec<AtlasEntry>,
}

#[derive(Deserialize)]
struct AtlasEntry {
    #[serde(default)]
    id: String,
    #[serde(default)]
    x: u32,
    #[serde(default)]
    y: u32,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

pub struct AtlasTool {
    priority: i32,
}

impl AtlasTool {
    pub fn new() -> Self {
        Self { priority: 0 }
    }

    pub fn with_priority(priority: i32) -> Self {
        Self { priority }
    }

    fn read_manifest(file: &Path) -> Result<AtlasManifest> {
        let contents = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read atlas manifest {}", file.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse atlas manifest {}", file.display()))
    }

    fn image_path(file: &Path, manifest: &AtlasManifest) -> Option<PathBuf> {
        if manifest.kind != "single_image" {
            return None;
        }
        let image = manifest.image.as_ref()?;
        Some(file.parent().unwrap_or(Path::new("")).join(image))
    }

    fn bin_output(file: &Path) -> PathBuf {
        let mut out = file.to_path_buf();
        out.set_extension("atlas.bin");
        out
    }
}

impl Default for AtlasTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for AtlasTool {
    fn name(&self) -> &str {
        "AtlasTool"
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
                .filter(|s| *s == ".atlas")
                .count()
                == 1
    }

    /// Parses the manifest to find the referenced image. Manifest errors
    /// are logged (not propagated) and treated as zero dependencies,
    /// matching the original's `except Exception: print(...); return []`.
    fn deps(&self, file: &Path, ctx: &ToolContext) -> Vec<PathBuf> {
        match Self::read_manifest(file) {
            Ok(manifest) => match Self::image_path(file, &manifest) {
                Some(image) => vec![image],
                None => {
                    ctx.log
                        .line(format!("Atlas Error reading {}: unsupported or missing image", file.display()));
                    Vec::new()
                }
            },
            Err(err) => {
                ctx.log.line(format!("Atlas Error reading {}: {err:#}", file.display()));
                Vec::new()
            }
        }
    }

    fn outputs(&self, file: &Path, ctx: &ToolContext) -> Vec<PathBuf> {
        match ctx.relative_path(file) {
            Ok(rel) => {
                let rel_bin = Self::bin_output(&rel);
                vec![ctx.output_root.join(rel_bin)]
            }
            Err(_) => Vec::new(),
        }
    }

    fn build(&self, file: &Path, ctx: &ToolContext) -> Result<()> {
        let manifest = Self::read_manifest(file)?;

        let image_filename = manifest
            .image
            .as_ref()
            .with_context(|| format!("no image specified in {}", file.display()))?;
        let image_path = file.parent().unwrap_or(Path::new("")).join(image_filename);

        let dimensions = image::image_dimensions(&image_path)
            .with_context(|| format!("failed to open image {}", image_path.display()))?;
        let (img_width, img_height) = (dimensions.0 as f32, dimensions.1 as f32);

        let mut uv_data = Vec::with_capacity(manifest.entries.len() * 16);
        for entry in &manifest.entries {
            let u_min = entry.x as f32 / img_width;
            let v_min = entry.y as f32 / img_height;
            let u_max = (entry.x + entry.width) as f32 / img_width;
            let v_max = (entry.y + entry.height) as f32 / img_height;
            uv_data.extend_from_slice(&u_min.to_le_bytes());
            uv_data.extend_from_slice(&v_min.to_le_bytes());
            uv_data.extend_from_slice(&u_max.to_le_bytes());
            uv_data.extend_from_slice(&v_max.to_le_bytes());
        }

        let mut text_blob = Vec::new();
        for entry in &manifest.entries {
            text_blob.extend_from_slice(entry.id.as_bytes());
            text_blob.push(0);
        }

        let mut output_bytes = Vec::with_capacity(8 + uv_data.len() + text_blob.len());
        output_bytes.extend_from_slice(&(manifest.entries.len() as u32).to_le_bytes());
        output_bytes.extend_from_slice(&(text_blob.len() as u32).to_le_bytes());
        output_bytes.extend_from_slice(&uv_data);
        output_bytes.extend_from_slice(&text_blob);

        let rel = ctx.relative_path(file)?;
        let output_bin_file = ctx.output_root.join(Self::bin_output(&rel));
        ensure_parent(&output_bin_file)?;

        let mut f = std::fs::File::create(&output_bin_file)
            .with_context(|| format!("failed to create {}", output_bin_file.display()))?;
        f.write_all(&output_bytes)
            .with_context(|| format!("failed to write {}", output_bin_file.display()))?;

        ctx.log
            .line(format!("Atlas binary written to {}", output_bin_file.display()));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn matches_single_atlas_suffix() {
        let ctx = ToolContext::new("/in", "/out");
        let tool = AtlasTool::new();
        assert!(tool.matches(Path::new("/in/foo.atlas"), &ctx));
        assert!(!tool.matches(Path::new("/in/foo.atlas.atlas"), &ctx));
    }

    #[test]
    fn build_writes_documented_binary_layout() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        std::fs::create_dir_all(&input).unwrap();

        let png_bytes = {
            let img = image::RgbaImage::new(100, 50);
            let path = input.join("sheet.png");
            img.save(&path).unwrap();
            path
        };
        let _ = png_bytes;

        let manifest = r#"{
            "type": "single_image",
            "image": "sheet.png",
            "entries": [
                {"id": "a", "x": 0, "y": 0, "width": 50, "height": 50},
                {"id": "bb", "x": 50, "y": 0, "width": 50, "height": 50}
            ]
        }"#;
        let atlas_path = input.join("foo.atlas");
        std::fs::write(&atlas_path, manifest).unwrap();

        let ctx = ToolContext::new(&input, &output);
        let tool = AtlasTool::new();
        tool.build(&atlas_path, &ctx).unwrap();

        let bin_path = output.join("foo.atlas.bin");
        let bytes = std::fs::read(&bin_path).unwrap();

        let num_entries = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let text_blob_size = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        assert_eq!(num_entries, 2);
        assert_eq!(text_blob_size, "a\0bb\0".len() as u32);

        let first_u_max = f32::from_le_bytes(bytes[16..20].try_into().unwrap());
        assert!((first_u_max - 0.5).abs() < 1e-6);

        let text_blob_start = 8 + (num_entries as usize) * 16;
        let text_blob = &bytes[text_blob_start..text_blob_start + text_blob_size as usize];
        assert_eq!(text_blob, b"a\0bb\0");
    }
}
