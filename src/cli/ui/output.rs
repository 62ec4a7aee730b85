use console::style;

use crate::ai::metrics::CostSummary;
use crate::documentation::{Unit, UnitStatus, short_preview};

/// Styled terminal messages
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    /// Suppress informational lines; errors still print
    pub fn quiet(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn section(&self, message: &str) {
        if !self.quiet {
            println!("\n{}", style(message).bold());
            println!("{}", "─".repeat(40));
        }
    }

    /// One line per unit with a content excerpt
    pub fn unit(&self, unit: &Unit) {
        if self.quiet {
            return;
        }
        match &unit.status {
            UnitStatus::Completed => {
                println!("{} {}", style("✓").green(), style(&unit.id).bold());
                println!(
                    "  {}",
                    style(short_preview(&unit.content).replace('\n', " ")).dim()
                );
            }
            UnitStatus::Error(message) => {
                println!("{} {}: {}", style("✗").red(), style(&unit.id).bold(), message)
            }
            other => println!("{} {} ({})", style("·").dim(), unit.id, other),
        }
    }

    pub fn cost(&self, summary: &CostSummary) {
        if self.quiet || summary.is_empty() {
            return;
        }
        self.section("Cost Summary");
        for line in summary.display().lines() {
            println!("  {}", line);
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
