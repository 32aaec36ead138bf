//! Batch executor: serial (single calling thread, captured stdio) or
//! parallel (fixed worker pool, progress buffered and drained per layer).
//!
//! Ports `_call_build`/`_call_build_parallel` and the batch-execution
//! loop in `AssetForge/core.py::Build`.

mod pool;

pub use pool::WorkerPool;

use std::path::Path;

use parking_lot::Mutex;

use crate::plan::{Job, Plan};
use crate::registry::Registry;
use crate::sink::LogSink;
use crate::tool::ToolContext;

/// `done`/`todo`/`progress_buf`, guarded by one lock so a job completion
/// updates the counter and appends its progress line atomically with
/// respect to every other job (§5) — mirroring the single
/// `with forge.lock:` block the reference implementation wraps both in.
struct ExecState {
    done: usize,
    todo: usize,
    progress_buf: Vec<String>,
}

/// Formats one progress line: `[NN% ] <ToolName> "<file>"`.
///
/// `NN` is `floor(100 * done / todo)`, left-padded to width 4 the way the
/// original's `str(pct).ljust(4)` does (so `"100%"` fills the field
/// exactly, `"50%"` leaves one trailing space, `"0%"` leaves two).
fn progress_line(done: usize, todo: usize, tool_name: &str, file: &Path) -> String {
    let pct = if todo == 0 { 100 } else { (100 * done) / todo };
    let field = format!("{pct}%");
    format!("[{field:<4}] {} \"{}\"", tool_name, file.display())
}

/// Runs every job-batch of `plan` on the calling thread.
///
/// Each job's `build` is given the shared log sink in `ctx`; its output
/// (and any `Err` it returns) lands in that buffer rather than the real
/// stdout, which only ever sees progress lines.
pub fn run_serial(registry: &Registry, plan: &Plan, ctx: &ToolContext) {
    let todo = plan.total_jobs();
    let mut done = 0usize;

    println!("[0%  ] building ... ");

    for batch in plan.job_batches() {
        for job in batch {
            run_one(registry, job, ctx);
            done += 1;
            let tool = registry.iter().nth(job.tool_index);
            let tool_name = tool.map(|t| t.name()).unwrap_or("UnknownTool");
            println!("{}", progress_line(done, todo, tool_name, &job.primary_input));
        }
    }
}

fn run_one(registry: &Registry, job: &Job, ctx: &ToolContext) {
    let Some(tool) = registry.iter().nth(job.tool_index) else {
        ctx.log
            .line(format!("internal error: no tool at index {}", job.tool_index));
        return;
    };

    if let Err(err) = tool.build(&job.primary_input, ctx) {
        ctx.log.line(format!(
            "{} failed on {}: {err:#}",
            tool.name(),
            job.primary_input.display()
        ));
    }
}

/// Runs every job-batch of `plan` across a fixed worker pool, sized to the
/// widest job-batch in the plan (§5) — not to `num_cpus::get()`.
///
/// Stdout/stderr from tools is *not* captured in this mode, unlike
/// [`run_serial`] — a deliberate asymmetry preserved from the reference
/// implementation (SPEC_FULL.md §9), not a bug to be silently patched.
pub fn run_parallel(registry: &Registry, plan: &Plan, ctx: &ToolContext) {
    let todo = plan.total_jobs();
    let batches = plan.job_batches();
    let widest = batches.iter().map(|b| b.len()).max().unwrap_or(1);

    let state = Mutex::new(ExecState {
        done: 0,
        todo,
        progress_buf: Vec::new(),
    });

    println!("[0%  ] building ... ");

    std::thread::scope(|scope| {
        let pool = WorkerPool::new(scope, widest);

        for batch in batches {
            for job in &batch {
                let tool_index = job.tool_index;
                let primary_input = &job.primary_input;

                pool.submit(move || {
                    let Some(tool) = registry.iter().nth(tool_index) else {
                        return;
                    };

                    if let Err(err) = tool.build(primary_input, ctx) {
                        ctx.log.line(format!(
                            "{} failed on {}: {err:#}",
                            tool.name(),
                            primary_input.display()
                        ));
                    }

                    let mut state = state.lock();
                    state.done += 1;
                    let line = progress_line(state.done, state.todo, tool.name(), primary_input);
                    state.progress_buf.push(line);
                });
            }

            pool.wait_all();

            let mut state = state.lock();
            for line in state.progress_buf.drain(..) {
                println!("{line}");
            }
        }

        pool.shutdown();
    });
}

/// Writes the accumulated captured log (serial mode only has anything
/// interesting here) to `<output_root>/output.log`, then clears the
/// buffer so the same `Forge` can be reused for another build.
pub fn flush_log(log: &LogSink, output_root: &Path) -> std::io::Result<()> {
    let contents = log.take();
    std::fs::write(output_root.join("output.log"), contents)
}
