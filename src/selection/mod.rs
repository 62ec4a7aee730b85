//! Selection Model
//!
//! Tri-state multi-selection over a scanned tree, exposed as a flat set of
//! selected file paths.

pub mod set;
pub mod state;
pub mod store;

pub use set::SelectionSet;
pub use state::{SelectionState, Toggle, annotate, apply_toggle, node_state};
pub use store::SelectionStore;
