use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use super::set::SelectionSet;
use super::state::{SelectionState, Toggle, annotate, apply_toggle};
use crate::types::{DirectoryNode, StateCell};

/// Owner of the live selection.
///
/// Every toggle is derived from the latest snapshot, so concurrent toggles
/// on sibling subtrees are never lost.
#[derive(Debug, Default)]
pub struct SelectionStore {
    cell: StateCell<SelectionSet>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<SelectionSet> {
        self.cell.snapshot()
    }

    pub fn toggle(&self, toggle: &Toggle) -> Arc<SelectionSet> {
        let next = self.cell.update(|current| apply_toggle(current, toggle));
        debug!(
            "Toggled {} ({}) -> {} selected",
            toggle.path,
            if toggle.checked { "on" } else { "off" },
            next.len()
        );
        next
    }

    /// Select every file in a forest
    pub fn select_all(&self, nodes: &[DirectoryNode]) -> Arc<SelectionSet> {
        let files = crate::types::all_files(nodes);
        self.cell.update(|current| {
            let mut next = current.clone();
            for path in &files {
                next.insert(path.clone());
            }
            next
        })
    }

    /// Empty the selection (a new scan)
    pub fn clear(&self) {
        self.cell.replace(SelectionSet::new());
    }

    pub fn annotate(&self, nodes: &[DirectoryNode]) -> HashMap<String, SelectionState> {
        annotate(nodes, &self.snapshot())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SelectionSet>> {
        self.cell.subscribe()
    }
}
