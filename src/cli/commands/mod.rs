//! Command Handlers

pub mod config;
pub mod generate;
pub mod models;
pub mod preview;
pub mod scan;

use std::path::PathBuf;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, apply_selection, picker_for};
use crate::documentation::{DocumentationSession, LoadOutcome};
use crate::types::Result;

/// Folder and selection arguments shared by commands
#[derive(Debug, Clone, Default)]
pub struct TargetArgs {
    /// Folder to scan; `None` prompts
    pub path: Option<PathBuf>,
    /// Files or folders to select
    pub select: Vec<String>,
    /// Select every scanned file
    pub all: bool,
}

impl TargetArgs {
    pub fn has_selection(&self) -> bool {
        self.all || !self.select.is_empty()
    }
}

/// Load the folder into a session and apply the selection.
///
/// `None` when the user cancelled the folder prompt.
pub(crate) async fn open_session(
    session: DocumentationSession,
    target: &TargetArgs,
    out: &Output,
) -> Result<Option<DocumentationSession>> {
    let picker = picker_for(target.path.clone());
    match session.load(picker.as_ref()).await? {
        LoadOutcome::Cancelled => {
            out.info("Folder selection cancelled");
            return Ok(None);
        }
        LoadOutcome::Loaded { files } => out.info(&format!("Scanned {} file(s)", files)),
    }
    apply_selection(&session, &target.select, target.all)?;
    Ok(Some(session))
}

/// Session without a generation service, loaded from `target`
pub(crate) async fn open_offline(
    ctx: &CommandContext,
    target: &TargetArgs,
    model: Option<&str>,
    out: &Output,
) -> Result<Option<DocumentationSession>> {
    open_session(ctx.offline_session(model)?, target, out).await
}
