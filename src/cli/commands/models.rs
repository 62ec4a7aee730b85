//! Models Command
//!
//! Lists the pricing table.

use console::style;

use crate::cli::util::CommandContext;
use crate::types::Result;

pub fn run(ctx: &CommandContext, format: &str) -> Result<()> {
    let pricing = &ctx.config.pricing;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(pricing)?);
        return Ok(());
    }

    for (id, model) in pricing.iter() {
        let marker = if id == ctx.config.generation.model {
            style("*").green().to_string()
        } else {
            " ".to_string()
        };
        println!("{} {}  {}", marker, style(id).bold(), model.rate_label());
        if !model.description.is_empty() {
            println!("    {}", style(&model.description).dim());
        }
    }
    Ok(())
}
