//! Documentation Session
//!
//! Single logical owner of everything one user works with: the scanned
//! tree, the selection, the selected model, the pricing table and the unit
//! board of the latest batch.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::board::UnitBoard;
use super::orchestrator::DocumentationOrchestrator;
use super::preview::build_preview;
use crate::ai::metrics::CostSummary;
use crate::ai::pricing::PricingTable;
use crate::ai::provider::{GenerationMode, SharedService};
use crate::analyzer::{DirectoryPicker, DirectoryScanner};
use crate::selection::{SelectionSet, SelectionState, SelectionStore, Toggle};
use crate::types::{DirectoryNode, DocError, Result, StateCell, all_files, find_node};

/// Outcome of a non-failing load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { files: usize },
    Cancelled,
}

pub struct DocumentationSession {
    scanner: DirectoryScanner,
    tree: StateCell<Vec<DirectoryNode>>,
    selection: SelectionStore,
    model: StateCell<String>,
    pricing: PricingTable,
    orchestrator: DocumentationOrchestrator,
}

impl DocumentationSession {
    /// `model` must be priced
    pub fn new(
        scanner: DirectoryScanner,
        orchestrator: DocumentationOrchestrator,
        pricing: PricingTable,
        model: &str,
    ) -> Result<Self> {
        pricing.get(model)?;
        Ok(Self {
            scanner,
            tree: StateCell::new(Vec::new()),
            selection: SelectionStore::new(),
            model: StateCell::new(model.to_string()),
            pricing,
            orchestrator,
        })
    }

    /// Session with the built-in scanner and an orchestrator over `service`
    pub fn with_service(service: SharedService, pricing: PricingTable, model: &str) -> Result<Self> {
        Self::new(
            DirectoryScanner::default(),
            DocumentationOrchestrator::new(service),
            pricing,
            model,
        )
    }

    /// Pick and scan a folder.
    ///
    /// A cancelled pick or a failed scan leaves the current tree and
    /// selection untouched; a successful scan replaces the tree and resets
    /// the selection.
    pub async fn load(&self, picker: &dyn DirectoryPicker) -> Result<LoadOutcome> {
        let source = match picker.pick().await {
            Ok(source) => source,
            Err(DocError::IngestionCancelled) => {
                info!("Folder selection cancelled");
                return Ok(LoadOutcome::Cancelled);
            }
            Err(e) => {
                warn!("Folder selection failed: {}", e);
                return Err(e);
            }
        };

        let nodes = self.scanner.scan(source).await?;
        let files = all_files(&nodes).len();
        self.tree.replace(nodes);
        self.selection.clear();
        info!("Loaded {} file(s)", files);
        Ok(LoadOutcome::Loaded { files })
    }

    pub fn tree(&self) -> Arc<Vec<DirectoryNode>> {
        self.tree.snapshot()
    }

    /// Toggle a file or folder by path
    pub fn toggle(&self, path: &str, checked: bool) -> Result<Arc<SelectionSet>> {
        let tree = self.tree.snapshot();
        let node =
            find_node(&tree, path).ok_or_else(|| DocError::FileNotFound(path.to_string()))?;
        Ok(self.selection.toggle(&Toggle::for_node(node, checked)))
    }

    pub fn select_all(&self) -> Arc<SelectionSet> {
        self.selection.select_all(&self.tree.snapshot())
    }

    pub fn clear_selection(&self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> Arc<SelectionSet> {
        self.selection.snapshot()
    }

    /// Tri-state annotation of the current tree
    pub fn selection_states(&self) -> HashMap<String, SelectionState> {
        self.selection.annotate(&self.tree.snapshot())
    }

    pub fn model(&self) -> String {
        self.model.snapshot().to_string()
    }

    /// Switch the model used for new batches and for pricing
    pub fn set_model(&self, model: &str) -> Result<()> {
        self.pricing.get(model)?;
        self.model.replace(model.to_string());
        Ok(())
    }

    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    pub fn orchestrator(&self) -> &DocumentationOrchestrator {
        &self.orchestrator
    }

    pub fn board(&self) -> Arc<UnitBoard> {
        self.orchestrator.board()
    }

    /// Run a batch over the current selection with the current model
    pub async fn generate(&self, mode: GenerationMode) -> Result<Arc<UnitBoard>> {
        let tree = self.tree.snapshot();
        let selected = self.selection.snapshot();
        let model = self.model();
        self.orchestrator
            .generate(&tree, &selected, mode, &model)
            .await
    }

    /// Selected-files export of the current selection
    pub async fn preview(&self) -> Result<String> {
        build_preview(&self.tree.snapshot(), &self.selection.snapshot()).await
    }

    /// Usage of the latest batch priced under the currently selected model
    pub fn cost_summary(&self) -> Result<CostSummary> {
        let board = self.orchestrator.board();
        CostSummary::summarize(board.usages(), &self.model(), &self.pricing)
    }
}
