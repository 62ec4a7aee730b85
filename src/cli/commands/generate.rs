//! Generate Command
//!
//! Runs one documentation batch over the selection with live progress,
//! prints each unit and the cost summary, and optionally writes the
//! markdown files.

use std::path::{Path, PathBuf};

use tracing::info;

use super::{TargetArgs, open_session};
use crate::ai::provider::GenerationMode;
use crate::cli::progress::{ConsoleRenderer, ProgressTracker, format_duration};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, runtime};
use crate::documentation::{UnitBoard, UnitStatus};
use crate::types::Result;

/// Options for one generate run
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub target: TargetArgs,
    pub mode: Option<GenerationMode>,
    pub model: Option<String>,
    /// Directory receiving one markdown file per completed unit
    pub output: Option<PathBuf>,
    pub quiet: bool,
}

pub fn run(ctx: &CommandContext, options: GenerateOptions) -> Result<()> {
    let rt = runtime()?;
    rt.block_on(run_async(ctx, options))
}

async fn run_async(ctx: &CommandContext, options: GenerateOptions) -> Result<()> {
    let out = Output::quiet(options.quiet);
    let session = ctx.session(options.model.as_deref())?;
    let Some(session) = open_session(session, &options.target, &out).await? else {
        return Ok(());
    };

    let mode = options.mode.unwrap_or(ctx.config.generation.mode);
    out.info(&format!(
        "Generating {} documentation with {} for {} file(s)",
        mode,
        session.model(),
        session.selection().len()
    ));

    let tracker = ProgressTracker::new().with_echo(!options.quiet);
    let listener = tracker.listen(session.orchestrator().subscribe());
    let renderer =
        (!options.quiet).then(|| ConsoleRenderer::new(tracker.clone()).start_render_loop());

    let result = session.generate(mode).await;
    // No batch started: nothing will end the background tasks
    if result.is_err() {
        listener.abort();
        if let Some(renderer) = &renderer {
            renderer.abort();
        }
    }
    let _ = listener.await;
    if let Some(renderer) = renderer {
        let _ = renderer.await;
    }
    let board = result?;

    out.section("Results");
    for unit in &board.units {
        out.unit(unit);
    }
    out.cost(&session.cost_summary()?);
    out.info(&format!(
        "Finished in {}",
        format_duration(tracker.state().elapsed_secs)
    ));

    if let Some(dir) = &options.output {
        let written = write_outputs(&board, dir).await?;
        out.success(&format!(
            "Wrote {} file(s) to {}",
            written.len(),
            dir.display()
        ));
    }

    if board.failed_count() > 0 {
        out.warning(&format!("{} unit(s) failed", board.failed_count()));
    }
    Ok(())
}

/// Write every completed unit under `dir`, mirroring source paths
pub async fn write_outputs(board: &UnitBoard, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for unit in &board.units {
        if unit.status != UnitStatus::Completed {
            continue;
        }
        let path = dir.join(unit.id.output_name());
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &unit.content).await?;
        info!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
