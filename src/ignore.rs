//! The ignore-filter tool decorator (§4.I).
//!
//! Direct port of `AssetForge/common.py::IgnoreItToolDecorator`: wraps
//! another tool so that files excluded by sibling `.<name>` ignore-files
//! never reach the wrapped tool's `matches`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use walkdir::WalkDir;

use crate::tool::{Tool, ToolContext};

/// Wraps `inner` so that files named or matched by patterns in sibling
/// `.{name}` files are excluded from `matches`, delegating everything else
/// (`deps`, `outputs`, `build`) unchanged.
pub struct IgnoreFilter {
    inner: Box<dyn Tool>,
    ignore_file_name: String,
    whitelist: HashSet<PathBuf>,
}

impl IgnoreFilter {
    /// `name` is the ignore-file's bare name, e.g. `"linkignore"` looks
    /// for files literally named `.linkignore`.
    pub fn new(inner: Box<dyn Tool>, name: impl Into<String>) -> Self {
        Self {
            inner,
            ignore_file_name: name.into(),
            whitelist: HashSet::new(),
        }
    }

    fn dotfile_name(&self) -> String {
        format!(".{}", self.ignore_file_name)
    }

    /// Does `file` (relative to `base`, the directory containing the
    /// ignore-file) match `pattern`?
    ///
    /// Ports `IgnoreItToolDecorator.matches_ignore_pattern`.
    fn matches_ignore_pattern(file: &Path, pattern: &str, base: &Path) -> bool {
        let Ok(rel_path) = file.strip_prefix(base) else {
            return false;
        };
        let rel_str = rel_path.to_string_lossy().replace('\\', "/");

        if let Some(stripped) = pattern.strip_prefix('/') {
            return Pattern::new(stripped)
                .map(|p| p.matches(&rel_str))
                .unwrap_or(false);
        }

        let matches_rel = Pattern::new(pattern).map(|p| p.matches(&rel_str)).unwrap_or(false);
        let name = file.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        let matches_name = Pattern::new(pattern).map(|p| p.matches(&name)).unwrap_or(false);

        matches_rel || matches_name
    }
}

impl Tool for IgnoreFilter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn priority(&self) -> i32 {
        self.inner.priority()
    }

    fn matches(&self, file: &Path, ctx: &ToolContext) -> bool {
        if ctx.in_input(file) {
            self.whitelist.contains(file) && self.inner.matches(file, ctx)
        } else {
            self.inner.matches(file, ctx)
        }
    }

    fn deps(&self, file: &Path, ctx: &ToolContext) -> Vec<PathBuf> {
        self.inner.deps(file, ctx)
    }

    fn outputs(&self, file: &Path, ctx: &ToolContext) -> Vec<PathBuf> {
        self.inner.outputs(file, ctx)
    }

    fn build(&self, file: &Path, ctx: &ToolContext) -> Result<()> {
        self.inner.build(file, ctx)
    }

    fn start(&mut self, ctx: &ToolContext) -> Result<()> {
        let dotfile_name = self.dotfile_name();
        let mut whitelist = HashSet::new();
        let mut dotfiles = Vec::new();

        for entry in WalkDir::new(&ctx.input_root).follow_links(true) {
            let entry = entry.with_context(|| {
                format!("failed to walk input root {}", ctx.input_root.display())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path().to_path_buf();
            if entry.file_name().to_string_lossy() == dotfile_name {
                dotfiles.push(path);
            } else {
                whitelist.insert(path);
            }
        }

        for dotfile in &dotfiles {
            let base_dir = dotfile.parent().unwrap_or(&ctx.input_root).to_path_buf();
            let contents = std::fs::read_to_string(dotfile)
                .with_context(|| format!("failed to read ignore file {}", dotfile.display()))?;

            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }

                whitelist.retain(|candidate| !Self::matches_ignore_pattern(candidate, line, &base_dir));
            }
        }

        self.whitelist = whitelist;
        self.inner.start(ctx)
    }
}
