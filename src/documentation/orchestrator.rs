//! Documentation Orchestrator
//!
//! Sequential generation state machine. Units are built from the selection
//! for the chosen mode and dispatched strictly one at a time: a unit becomes
//! `generating` only after the previous one reached a terminal state, and a
//! failed unit never stops the rest of the queue. Only one batch runs per
//! orchestrator; a second `generate` while one is active is `Busy`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::board::UnitBoard;
use super::bundle::{self, BundleEntry};
use super::unit::UnitId;
use crate::ai::provider::{GenerationMode, GenerationRequest, SharedService};
use crate::ai::stream::{StreamConsumer, StreamUpdate, TokenUsage};
use crate::constants::stream::DEBOUNCE_MS;
use crate::selection::SelectionSet;
use crate::types::{DirectoryNode, DocError, Result, StateCell};

/// Orchestration progress events
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentationEvent {
    BatchStarted {
        batch_id: Uuid,
        mode: GenerationMode,
        total: usize,
    },
    UnitStarted {
        id: UnitId,
        index: usize,
        total: usize,
    },
    /// Coalesced content delivery
    ContentUpdated { id: UnitId, chars: usize },
    UnitCompleted {
        id: UnitId,
        usage: Option<TokenUsage>,
    },
    UnitFailed { id: UnitId, message: String },
    BatchFinished {
        completed: usize,
        failed: usize,
        duration_secs: u64,
    },
}

/// Payload source prepared once per batch
struct BatchInput<'a> {
    tree: &'a [DirectoryNode],
    mode: GenerationMode,
    model: &'a str,
    bundle: String,
    unreadable: Vec<(String, DocError)>,
    file_structure: String,
}

pub struct DocumentationOrchestrator {
    service: SharedService,
    board: Arc<StateCell<UnitBoard>>,
    events: broadcast::Sender<DocumentationEvent>,
    debounce: Duration,
    batch: Mutex<()>,
}

impl DocumentationOrchestrator {
    pub fn new(service: SharedService) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            service,
            board: Arc::new(StateCell::new(UnitBoard::empty())),
            events,
            debounce: Duration::from_millis(DEBOUNCE_MS),
            batch: Mutex::new(()),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Share an externally owned board
    pub fn with_board(mut self, board: Arc<StateCell<UnitBoard>>) -> Self {
        self.board = board;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DocumentationEvent> {
        self.events.subscribe()
    }

    pub fn watch_board(&self) -> watch::Receiver<Arc<UnitBoard>> {
        self.board.subscribe()
    }

    pub fn board(&self) -> Arc<UnitBoard> {
        self.board.snapshot()
    }

    /// Send an event; having no subscribers is normal
    fn emit(&self, event: DocumentationEvent) {
        let _ = self.events.send(event);
    }

    /// Units for a mode, in selection order; empty selection is rejected
    pub fn plan(mode: GenerationMode, selected: &SelectionSet) -> Result<Vec<UnitId>> {
        if selected.is_empty() {
            return Err(DocError::NoSelection);
        }
        Ok(match mode {
            GenerationMode::CombinedReadme => vec![UnitId::Combined],
            GenerationMode::Single | GenerationMode::SingleWithContext => {
                selected.iter().map(UnitId::file).collect()
            }
        })
    }

    /// Run a whole batch to completion.
    ///
    /// Only the empty-selection and running-batch guards fail the call;
    /// every other failure is recorded on the affected unit.
    pub async fn generate(
        &self,
        tree: &[DirectoryNode],
        selected: &SelectionSet,
        mode: GenerationMode,
        model: &str,
    ) -> Result<Arc<UnitBoard>> {
        let ids = Self::plan(mode, selected)?;
        let Ok(_running) = self.batch.try_lock() else {
            warn!("Rejected generation request: a batch is already running");
            return Err(DocError::Busy);
        };
        let started = Instant::now();

        let board = self.board.replace(UnitBoard::new(mode, ids.clone()));
        info!(
            "Generating {} unit(s) in {} mode with {}",
            ids.len(),
            mode,
            model
        );
        if let Some(batch_id) = board.batch_id {
            self.emit(DocumentationEvent::BatchStarted {
                batch_id,
                mode,
                total: ids.len(),
            });
        }

        let input = self.prepare(tree, selected, mode, model).await;

        let total = ids.len();
        for (index, id) in ids.iter().enumerate() {
            match self.build_request(&input, id).await {
                Ok(request) => self.run_unit(id, index, total, &request).await,
                Err(e) => self.fail_unit(id, &e),
            }
        }

        let board = self.board.snapshot();
        info!(
            "Batch finished: {} completed, {} failed",
            board.completed_count(),
            board.failed_count()
        );
        self.emit(DocumentationEvent::BatchFinished {
            completed: board.completed_count(),
            failed: board.failed_count(),
            duration_secs: started.elapsed().as_secs(),
        });
        Ok(board)
    }

    async fn prepare<'a>(
        &self,
        tree: &'a [DirectoryNode],
        selected: &SelectionSet,
        mode: GenerationMode,
        model: &'a str,
    ) -> BatchInput<'a> {
        let (entries, unreadable): (Vec<BundleEntry>, _) = match mode {
            GenerationMode::Single => (Vec::new(), Vec::new()),
            GenerationMode::SingleWithContext | GenerationMode::CombinedReadme => {
                bundle::read_entries(tree, selected.iter()).await
            }
        };

        BatchInput {
            tree,
            mode,
            model,
            bundle: bundle::concatenate(&entries),
            unreadable,
            file_structure: bundle::file_structure(selected.iter()),
        }
    }

    async fn build_request(&self, input: &BatchInput<'_>, id: &UnitId) -> Result<GenerationRequest> {
        let (files, target_file, file_structure) = match (input.mode, id) {
            (GenerationMode::CombinedReadme, _) => {
                if input.bundle.is_empty() {
                    return Err(DocError::FileNotFound(
                        "no readable files in selection".to_string(),
                    ));
                }
                (input.bundle.clone(), None, None)
            }
            (GenerationMode::Single, UnitId::File(path)) => (
                bundle::read_file(input.tree, path).await?,
                None,
                Some(input.file_structure.clone()),
            ),
            (GenerationMode::SingleWithContext, UnitId::File(path)) => {
                if let Some((_, e)) = input.unreadable.iter().find(|(p, _)| p == path) {
                    return Err(DocError::FileNotFound(format!("{} ({})", path, e)));
                }
                (
                    input.bundle.clone(),
                    Some(path.clone()),
                    Some(input.file_structure.clone()),
                )
            }
            (_, UnitId::Combined) => {
                return Err(DocError::Config(format!(
                    "combined unit in {} mode",
                    input.mode
                )));
            }
        };

        Ok(GenerationRequest {
            files,
            target_file,
            mode: input.mode,
            model: input.model.to_string(),
            file_structure,
        })
    }

    async fn run_unit(&self, id: &UnitId, index: usize, total: usize, request: &GenerationRequest) {
        self.board.update(|b| b.start(id));
        self.emit(DocumentationEvent::UnitStarted {
            id: id.clone(),
            index,
            total,
        });
        debug!("Dispatching {} ({}/{})", id, index + 1, total);

        let stream = match self.service.generate(request).await {
            Ok(stream) => stream,
            Err(e) => {
                self.fail_unit(id, &e);
                return;
            }
        };

        let summary = StreamConsumer::new(self.debounce)
            .consume(stream, |update| {
                let chars = match update {
                    StreamUpdate::Content(content) => {
                        self.board.update(|b| b.update_content(id, &content));
                        content.len()
                    }
                    StreamUpdate::Usage { content, usage } => {
                        self.board.update(|b| b.record_usage(id, &content, usage));
                        content.len()
                    }
                };
                self.emit(DocumentationEvent::ContentUpdated {
                    id: id.clone(),
                    chars,
                });
            })
            .await;

        if summary.malformed_records > 0 {
            warn!(
                "{}: skipped {} malformed record(s)",
                id, summary.malformed_records
            );
        }

        match summary.outcome {
            Ok(()) => {
                self.board.update(|b| b.complete(id, &summary.content));
                info!("Completed {}", id);
                self.emit(DocumentationEvent::UnitCompleted {
                    id: id.clone(),
                    usage: summary.usage,
                });
            }
            Err(e) => {
                self.board.update(|b| b.update_content(id, &summary.content));
                self.fail_unit(id, &e);
            }
        }
    }

    fn fail_unit(&self, id: &UnitId, error: &DocError) {
        let message = error.unit_message();
        warn!("Unit {} failed: {}", id, message);
        self.board.update(|b| b.fail(id, message.clone()));
        self.emit(DocumentationEvent::UnitFailed {
            id: id.clone(),
            message,
        });
    }
}
