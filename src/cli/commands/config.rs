//! Config Command
//!
//! Usage:
//!   repodoc config show [-f json]
//!   repodoc config path
//!   repodoc config init [-g] [--force]

use crate::cli::ui::Output;
use crate::cli::util::CommandContext;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the merged effective configuration
pub fn show(ctx: &CommandContext, format: &str) -> Result<()> {
    println!("{}", ConfigLoader::render(&ctx.config, format == "json")?);
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Write a default config file
pub fn init(global: bool, force: bool) -> Result<()> {
    let out = Output::new();
    let path = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(force)?
    };
    out.success(&format!("Configuration at {}", path.display()));
    Ok(())
}
