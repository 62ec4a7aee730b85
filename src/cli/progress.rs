//! Real-Time Progress Streaming
//!
//! Console rendering of orchestration events. The tracker folds
//! [`DocumentationEvent`]s into a [`ProgressState`]; the renderer redraws a
//! single status line from it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use console::style;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::documentation::DocumentationEvent;

/// Progress tracker state
#[derive(Debug, Clone, Default)]
pub struct ProgressState {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    /// Unit currently generating
    pub current_item: Option<String>,
    /// Streamed characters of the current unit
    pub current_chars: usize,
    pub is_running: bool,
    pub elapsed_secs: u64,
}

impl ProgressState {
    /// Units in a terminal state
    pub fn finished(&self) -> usize {
        self.completed + self.failed
    }

    /// Fold one event into the state
    pub fn apply(&mut self, event: &DocumentationEvent) {
        match event {
            DocumentationEvent::BatchStarted { total, .. } => {
                *self = Self {
                    total: *total,
                    is_running: true,
                    ..Self::default()
                };
            }
            DocumentationEvent::UnitStarted { id, .. } => {
                self.current_item = Some(id.to_string());
                self.current_chars = 0;
            }
            DocumentationEvent::ContentUpdated { chars, .. } => {
                self.current_chars = *chars;
            }
            DocumentationEvent::UnitCompleted { .. } => {
                self.completed += 1;
                self.current_item = None;
            }
            DocumentationEvent::UnitFailed { .. } => {
                self.failed += 1;
                self.current_item = None;
            }
            DocumentationEvent::BatchFinished { duration_secs, .. } => {
                self.is_running = false;
                self.current_item = None;
                self.elapsed_secs = *duration_secs;
            }
        }
    }
}

/// Real-time progress tracker
#[derive(Clone, Default)]
pub struct ProgressTracker {
    state: Arc<RwLock<ProgressState>>,
    active: Arc<AtomicBool>,
    echo: bool,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print a line for every finished unit
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn state(&self) -> ProgressState {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Apply an event and echo terminal unit transitions
    pub fn handle(&self, event: &DocumentationEvent) {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .apply(event);

        match event {
            DocumentationEvent::BatchStarted { .. } => self.active.store(true, Ordering::SeqCst),
            DocumentationEvent::BatchFinished { .. } => self.active.store(false, Ordering::SeqCst),
            _ => {}
        }

        if self.echo
            && let Some(line) = finished_line(event)
        {
            println!("\r\x1B[K{}", line);
        }
    }

    /// Consume events until the batch finishes or the sender is gone
    pub fn listen(
        &self,
        mut receiver: broadcast::Receiver<DocumentationEvent>,
    ) -> tokio::task::JoinHandle<()> {
        let tracker = self.clone();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        let done = matches!(event, DocumentationEvent::BatchFinished { .. });
                        tracker.handle(&event);
                        if done {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!("Progress listener skipped {} events", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            tracker.active.store(false, Ordering::SeqCst);
        })
    }
}

fn finished_line(event: &DocumentationEvent) -> Option<String> {
    match event {
        DocumentationEvent::UnitCompleted { id, usage } => Some(format!(
            "{} {}{}",
            style("✓").green(),
            id,
            usage
                .map(|u| format!(" ({} tokens)", u.total_tokens))
                .unwrap_or_default()
        )),
        DocumentationEvent::UnitFailed { id, message } => {
            Some(format!("{} {}: {}", style("✗").red(), id, message))
        }
        _ => None,
    }
}

/// Console progress renderer
pub struct ConsoleRenderer {
    tracker: ProgressTracker,
    show_spinner: bool,
}

impl ConsoleRenderer {
    pub fn new(tracker: ProgressTracker) -> Self {
        Self {
            tracker,
            show_spinner: true,
        }
    }

    pub fn with_spinner(mut self, show: bool) -> Self {
        self.show_spinner = show;
        self
    }

    /// Render the status line for a tick
    pub fn render(&self, tick: usize) -> String {
        let state = self.tracker.state();
        if !state.is_running {
            return String::new();
        }

        let spinner = if self.show_spinner {
            let chars = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
            format!("{} ", chars[tick % chars.len()])
        } else {
            String::new()
        };

        let current = state
            .current_item
            .as_deref()
            .map(|item| format!("  {} ({} chars)", item, state.current_chars))
            .unwrap_or_default();

        format!(
            "{}{} {}/{}{}",
            spinner,
            render_progress_bar(state.finished(), state.total, 30),
            state.finished(),
            state.total,
            current
        )
    }

    /// Start rendering loop (non-blocking)
    pub fn start_render_loop(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut tick = 0;
            // Wait for the batch to begin
            while !self.tracker.is_active() && tick < 50 {
                tokio::time::sleep(Duration::from_millis(20)).await;
                tick += 1;
            }
            while self.tracker.is_active() {
                let output = self.render(tick);
                if !output.is_empty() {
                    print!("\r\x1B[K{}", output);
                }
                tick += 1;
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            print!("\r\x1B[K");
        })
    }
}

/// Render a simple progress bar
fn render_progress_bar(completed: usize, total: usize, width: usize) -> String {
    if total == 0 {
        return format!("[{}]", " ".repeat(width));
    }

    let progress = (completed as f32 / total as f32).min(1.0);
    let filled = (progress * width as f32) as usize;
    let empty = width.saturating_sub(filled);

    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

/// Format duration as human-readable string
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
