//! Preview Command
//!
//! Exports the selected files as one plain-text bundle with an estimated
//! prompt size.

use std::path::PathBuf;

use super::{TargetArgs, open_offline};
use crate::ai::stream::TokenUsage;
use crate::ai::tokenizer::TokenCounter;
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, runtime};
use crate::types::Result;

pub fn run(
    ctx: &CommandContext,
    target: TargetArgs,
    model: Option<&str>,
    output: Option<PathBuf>,
) -> Result<()> {
    let out = Output::new();
    let rt = runtime()?;
    let Some(session) = rt.block_on(open_offline(ctx, &target, model, &out))? else {
        return Ok(());
    };

    let text = rt.block_on(session.preview())?;
    let tokens = TokenCounter::new().count(&text);
    let pricing = session.pricing().get(&session.model())?;
    let estimate = pricing.cost(&TokenUsage::new(tokens as u64, 0));

    match output {
        Some(path) => {
            std::fs::write(&path, &text)?;
            out.success(&format!("Wrote preview to {}", path.display()));
        }
        None => println!("{}", text),
    }

    out.info(&format!(
        "~{} prompt tokens, about ${:.6} input on {}",
        tokens, estimate, pricing.display_name
    ));
    Ok(())
}
