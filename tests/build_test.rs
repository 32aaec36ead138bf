//! End-to-end build scenarios (SPEC_FULL.md §8), each driving a real
//! [`Forge`] against a `tempfile` tree rather than exercising planner
//! internals directly.

use std::path::{Path, PathBuf};

use anyhow::Result;
use asset_forge::tools::{AtlasTool, CompressTool, CopyTool, SymlinkTool};
use asset_forge::{Forge, IgnoreFilter, Tool, ToolContext};
use tempfile::tempdir;

#[test]
fn collision_by_priority_keeps_only_the_higher_priority_tool() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(input.join("x.bin"), b"payload").unwrap();

    let mut forge = Forge::new();
    forge.register_tool(Box::new(CompressTool::with_priority(5)));
    forge.register_tool(Box::new(StampingTool::new("low", 3)));
    forge.build(&input, &output, true, false).unwrap();

    // The priority-5 CompressTool's zlib output survives...
    assert!(output.join("x.bin.z").exists());
    let compressed = std::fs::read(output.join("x.bin.z")).unwrap();
    assert_ne!(compressed, b"payload");
    // ...and the priority-3 candidate never ran (it would have clobbered
    // x.bin.z with a literal "stamped" marker instead of zlib bytes).
    assert_ne!(compressed, b"stamped");
}

#[test]
fn cycle_is_rejected_and_no_jobs_run() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(input.join("same.x"), b"data").unwrap();

    let mut forge = Forge::new();
    forge.register_tool(Box::new(SelfFeedingTool));
    let result = forge.build(&input, &output, true, false);
    assert!(result.is_err());
}

#[test]
fn ignore_decorator_excludes_listed_files_from_the_wrapped_tool() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(input.join("keep.txt"), b"keep").unwrap();
    std::fs::write(input.join("drop.txt"), b"drop").unwrap();
    std::fs::write(input.join(".linkignore"), b"drop.txt\n").unwrap();

    let mut forge = Forge::new();
    let symlink: Box<dyn Tool> = Box::new(SymlinkTool::new(r".*\.txt"));
    forge.register_tool(Box::new(IgnoreFilter::new(symlink, "linkignore")));
    forge.build(&input, &output, true, false).unwrap();

    assert!(output.join("keep.txt").symlink_metadata().is_ok());
    assert!(!output.join("drop.txt").exists());
}

#[test]
fn intermediate_output_feeds_the_next_tool_in_a_later_batch() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    std::fs::create_dir_all(&input).unwrap();

    let img = image::RgbaImage::new(20, 10);
    img.save(input.join("sheet.png")).unwrap();
    std::fs::write(
        input.join("foo.atlas"),
        r#"{"type":"single_image","image":"sheet.png","entries":[{"id":"a","x":0,"y":0,"width":10,"height":10}]}"#,
    )
    .unwrap();

    let mut forge = Forge::new();
    forge.register_tool(Box::new(AtlasTool::with_priority(2)));
    forge.register_tool(Box::new(CompressTool::with_priority(3)));
    forge.build(&input, &output, true, false).unwrap();

    assert!(output.join("foo.atlas.bin").exists());
    assert!(output.join("foo.atlas.bin.z").exists());
}

#[test]
fn parallel_and_serial_builds_produce_byte_identical_output_trees() -> Result<()> {
    let dir = tempdir().unwrap();
    let input = dir.path().join("in");
    std::fs::create_dir_all(&input).unwrap();
    for i in 0..50 {
        std::fs::write(input.join(format!("file_{i}.txt")), format!("contents {i}"))?;
    }

    let serial_out = dir.path().join("out-serial");
    let mut serial_forge = Forge::new();
    serial_forge.register_tool(Box::new(CopyTool::new(r".*")));
    serial_forge.build(&input, &serial_out, true, false)?;

    let parallel_out = dir.path().join("out-parallel");
    let mut parallel_forge = Forge::new();
    parallel_forge.register_tool(Box::new(CopyTool::new(r".*")));
    parallel_forge.build(&input, &parallel_out, true, true)?;

    for i in 0..50 {
        let name = format!("file_{i}.txt");
        assert_eq!(
            std::fs::read(serial_out.join(&name))?,
            std::fs::read(parallel_out.join(&name))?
        );
    }
    Ok(())
}

/// A synthetic low-priority tool that would stamp a literal marker over
/// [`CompressTool`]'s zlib output if collision arbitration ever let it
/// run alongside a higher-priority candidate for the same output.
struct StampingTool {
    name: String,
    priority: i32,
}

impl StampingTool {
    fn new(name: &str, priority: i32) -> Self {
        Self {
            name: name.to_string(),
            priority,
        }
    }
}

impl Tool for StampingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn matches(&self, file: &Path, ctx: &ToolContext) -> bool {
        ctx.in_input(file) && file.extension().map(|e| e == "bin").unwrap_or(false)
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
        std::fs::create_dir_all(output_file.parent().unwrap())?;
        std::fs::write(output_file, b"stamped")?;
        Ok(())
    }
}

/// A synthetic tool whose declared output is its own input, forcing a
/// graph cycle (§4.D's "if a tool's output matches itself" case).
struct SelfFeedingTool;

impl Tool for SelfFeedingTool {
    fn name(&self) -> &str {
        "SelfFeedingTool"
    }

    fn matches(&self, file: &Path, ctx: &ToolContext) -> bool {
        file.extension().map(|e| e == "x").unwrap_or(false) && ctx.in_input(file)
    }

    fn outputs(&self, file: &Path, _ctx: &ToolContext) -> Vec<PathBuf> {
        vec![file.to_path_buf()]
    }

    fn build(&self, _file: &Path, _ctx: &ToolContext) -> Result<()> {
        Ok(())
    }
}
