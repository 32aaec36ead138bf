//! Driver binary: the Rust analogue of the reference `Amake.py` script.
//!
//! Registers the built-in tools at the priorities the original driver
//! hard-codes (compress=3, atlas=2, svg/copy=1, fallback copy=0), reads
//! `input`/`output`/`--parallel`/`--recursive` from the command line (or
//! an optional `forge.toml`), and calls `Forge::build`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use colored::Colorize;
use serde::Deserialize;

use asset_forge::tools::{AtlasTool, CompressTool, CopyTool, SvgTool, SymlinkTool};
use asset_forge::{Forge, IgnoreFilter};

/// Asset build pipeline: transforms a source tree into derived artifacts.
#[derive(Parser, Debug)]
#[command(name = "forge", version, about)]
struct Cli {
    /// Directory to read source assets from.
    #[arg(default_value = "assets")]
    input: PathBuf,

    /// Directory to write derived artifacts to.
    #[arg(default_value = "build")]
    output: PathBuf,

    /// Run jobs across a worker pool instead of the calling thread.
    #[arg(long)]
    parallel: bool,

    /// Walk `input` recursively. Pass `--recursive=false` to only build
    /// `input`'s direct children.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    recursive: bool,

    /// Symlink instead of copy for plain pass-through files.
    #[arg(long)]
    symlink: bool,

    /// Ignore-file name for the pass-through tool's `IgnoreFilter`
    /// decorator (looks for sibling `.<name>` files). Disabled if absent.
    #[arg(long)]
    ignore_file: Option<String>,

    /// Path to a `forge.toml` config file; CLI flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (`-v` info, `-vv` debug, `-vvv` trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Deserialize, Default)]
struct FileConfig {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    parallel: Option<bool>,
    recursive: Option<bool>,
    symlink: Option<bool>,
    ignore_file: Option<String>,
}

fn load_config(path: Option<&Path>) -> Result<FileConfig> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_config = load_config(cli.config.as_deref())?;

    let input = file_config.input.unwrap_or(cli.input);
    let output = file_config.output.unwrap_or(cli.output);
    let parallel = file_config.parallel.unwrap_or(cli.parallel);
    let recursive = file_config.recursive.unwrap_or(cli.recursive);
    let symlink = file_config.symlink.unwrap_or(cli.symlink);
    let ignore_file = file_config.ignore_file.or(cli.ignore_file);

    let mut forge = Forge::new();
    forge.register_tool(Box::new(CompressTool::with_priority(3)));
    forge.register_tool(Box::new(AtlasTool::with_priority(2)));
    forge.register_tool(Box::new(SvgTool::with_priority(1)));

    let pass_through: Box<dyn asset_forge::Tool> = if symlink {
        Box::new(SymlinkTool::with_priority(0))
    } else {
        Box::new(CopyTool::with_priority(r".*", 0))
    };
    let pass_through = match ignore_file {
        Some(name) => Box::new(IgnoreFilter::new(pass_through, name)) as Box<dyn asset_forge::Tool>,
        None => pass_through,
    };
    forge.register_tool(pass_through);

    if let Err(err) = forge.build(&input, &output, recursive, parallel) {
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(1);
    }

    Ok(())
}
