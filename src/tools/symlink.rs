//! The symlinking tool.
//!
//! Ports `AssetForge/common.py::LinkingTool`: creates a symlink in the
//! output tree pointing back at the resolved input file, rather than
//! copying its bytes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

use crate::tool::{ensure_parent, Tool, ToolContext};

pub struct SymlinkTool {
    name: String,
    priority: i32,
    pattern: Regex,
}

impl SymlinkTool {
    pub fn new(pattern: &str) -> Self {
        Self::with_priority(pattern, 0)
    }

    pub fn with_priority(pattern: &str, priority: i32) -> Self {
        let anchored = format!("(?i)^(?:{pattern})");
        Self {
            name: "SymlinkTool".to_string(),
            priority,
            pattern: Regex::new(&anchored).expect("invalid SymlinkTool pattern"),
        }
    }
}

impl Tool for SymlinkTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn matches(&self, file: &Path, ctx: &ToolContext) -> bool {
        ctx.in_input(file) && self.pattern.is_match(&file.to_string_lossy())
    }

    fn outputs(&self, file: &Path, ctx: &ToolContext) -> Vec<PathBuf> {
        match ctx.relative_path(file) {
            Ok(rel) => vec![ctx.output_root.join(rel)],
            Err(_) => Vec::new(),
        }
    }

    fn build(&self, file: &Path, ctx: &ToolContext) -> Result<()> {
        let rel = ctx.relative_path(file)?;
        let output_file = ctx.output_root.join(rel);
        ensure_parent(&output_file)?;

        if output_file.exists() || output_file.symlink_metadata().is_ok() {
            std::fs::remove_file(&output_file).with_context(|| {
                format!("failed to remove existing file at {}", output_file.display())
            })?;
        }

        let target = file
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", file.display()))?;

        symlink(&target, &output_file).with_context(|| {
            format!("failed to create symlink {} -> {}", output_file.display(), target.display())
        })?;

        ctx.log.line(format!(
            "Created symlink: {} -> {}",
            output_file.display(),
            target.display()
        ));

        Ok(())
    }
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
