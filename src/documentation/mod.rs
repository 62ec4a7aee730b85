//! Documentation Generation
//!
//! Units, the unit board, multi-file bundles, the sequential orchestrator
//! and the session that owns them.

pub mod board;
pub mod bundle;
pub mod orchestrator;
pub mod preview;
pub mod session;
pub mod unit;

#[cfg(test)]
pub(crate) mod testing;

pub use board::UnitBoard;
pub use bundle::{BundleEntry, concatenate};
pub use orchestrator::{DocumentationEvent, DocumentationOrchestrator};
pub use preview::{build_preview, content_preview, short_preview};
pub use session::{DocumentationSession, LoadOutcome};
pub use unit::{Unit, UnitId, UnitStatus};
