use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repodoc::GenerationMode;
use repodoc::cli::CommandContext;
use repodoc::cli::commands::{self, TargetArgs, generate::GenerateOptions};

/// Parse generation mode from string
fn parse_mode(s: &str) -> Result<GenerationMode, String> {
    s.parse()
}

#[derive(Parser)]
#[command(name = "repodoc")]
#[command(
    version,
    about = "Streamed AI documentation for selected project files"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Read this config file instead of the layered config")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(clap::Args)]
struct Target {
    #[arg(help = "Project folder (prompted when omitted)")]
    path: Option<PathBuf>,
    #[arg(long, short, num_args = 1.., help = "Files or folders to select")]
    select: Vec<String>,
    #[arg(long, short, help = "Select every scanned file")]
    all: bool,
}

impl From<Target> for TargetArgs {
    fn from(target: Target) -> Self {
        Self {
            path: target.path,
            select: target.select,
            all: target.all,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a folder and print the filtered tree
    Scan {
        #[command(flatten)]
        target: Target,
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: String,
    },

    /// Export the selected files as one text bundle
    Preview {
        #[command(flatten)]
        target: Target,
        #[arg(long, help = "Model used for the cost estimate")]
        model: Option<String>,
        #[arg(long, short, help = "Write the bundle to a file")]
        output: Option<PathBuf>,
    },

    /// Generate documentation for the selected files
    Generate {
        #[command(flatten)]
        target: Target,
        #[arg(long, short, value_parser = parse_mode, help = "single, single-with-context, combined-readme")]
        mode: Option<GenerationMode>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
        #[arg(long, short, help = "Directory for the generated markdown files")]
        output: Option<PathBuf>,
    },

    /// List priced models
    Models {
        #[arg(short = 'f', long, default_value = "text", help = "Output format: text, json")]
        format: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'f', long, default_value = "toml", help = "Output format: toml, json")]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mrepodoc encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Call default hook for backtrace (if RUST_BACKTRACE=1)
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Config commands that must work with a broken config
    if let Commands::Config { action } = &cli.command {
        match action {
            ConfigAction::Path => return Ok(commands::config::path()?),
            ConfigAction::Init { global, force } => {
                return Ok(commands::config::init(*global, *force)?);
            }
            ConfigAction::Show { .. } => {}
        }
    }

    let ctx = CommandContext::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan { target, format } => {
            commands::scan::run(&ctx, target.into(), &format)?;
        }
        Commands::Preview {
            target,
            model,
            output,
        } => {
            commands::preview::run(&ctx, target.into(), model.as_deref(), output)?;
        }
        Commands::Generate {
            target,
            mode,
            model,
            output,
        } => {
            commands::generate::run(
                &ctx,
                GenerateOptions {
                    target: target.into(),
                    mode,
                    model,
                    output,
                    quiet: cli.quiet,
                },
            )?;
        }
        Commands::Models { format } => {
            commands::models::run(&ctx, &format)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => commands::config::show(&ctx, &format)?,
            ConfigAction::Path | ConfigAction::Init { .. } => {}
        },
    }

    Ok(())
}
