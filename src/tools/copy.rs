//! The general-purpose byte-for-byte copier.
//!
//! Ports `AssetForge/common.py::CopyingTool`, generalized (per SPEC_FULL
//! §4.J) to also cover the original's hardcoded-`.txt` `TextTool`, since
//! the two differed only in `matches` — both mirror the input tree under
//! the output root unchanged.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

use crate::tool::{ensure_parent, Tool, ToolContext};

pub struct CopyTool {
    name: String,
    priority: i32,
    pattern: Regex,
}

impl CopyTool {
    /// `pattern` is matched case-insensitively against the file's full
    /// path, mirroring `re.match(self.pattern, str(file_path),
    /// re.IGNORECASE)`.
    pub fn new(pattern: &str) -> Self {
        Self::with_priority(pattern, 0)
    }

    pub fn with_priority(pattern: &str, priority: i32) -> Self {
        let anchored = format!("(?i)^(?:{pattern})");
        Self {
            name: "CopyTool".to_string(),
            priority,
            pattern: Regex::new(&anchored).expect("invalid CopyTool pattern"),
        }
    }
}

impl Tool for CopyTool {
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

        std::fs::copy(file, &output_file).with_context(|| {
            format!("failed to copy {} to {}", file.display(), output_file.display())
        })?;

        Ok(())
    }
}
