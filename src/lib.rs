//! repodoc - Streamed AI Documentation for Selected Project Files
//!
//! Scans a project folder, keeps a tri-state selection over the scanned
//! tree, and drives a sequential, fault-tolerant documentation batch over
//! the selection while decoding each streamed response incrementally.
//!
//! ## Core Features
//!
//! - **Filtered Ingestion**: built-in exclusion rules plus `.gitignore` patterns
//! - **Tri-State Selection**: folder state derived bottom-up from selected files
//! - **Sequential Orchestration**: one unit in flight, failures scoped to the unit
//! - **Streaming Decoder**: line-buffered event records with coalesced updates
//! - **Cost Accounting**: per-model pricing of reported token usage
//!
//! ## Quick Start
//!
//! ```ignore
//! use repodoc::{DocumentationSession, GenerationMode, PathPicker, PricingTable};
//!
//! let service = repodoc::create_service(&config.service)?;
//! let session = DocumentationSession::with_service(service, PricingTable::builtin(), "gpt-4o-mini")?;
//! session.load(&PathPicker::new(Some(project_path))).await?;
//! session.toggle("src", true)?;
//! let board = session.generate(GenerationMode::Single).await?;
//! println!("{}", session.cost_summary()?.display());
//! ```
//!
//! ## Modules
//!
//! - [`analyzer`]: Folder ingestion and exclusion rules
//! - [`selection`]: Selection set, tri-state annotation, selection store
//! - [`ai`]: Generation services, stream decoding, prompts, pricing
//! - [`documentation`]: Units, orchestrator and session
//! - [`config`]: Layered configuration

pub mod ai;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod documentation;
pub mod selection;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::{DocError, ErrorKind, Result};

// Domain Types
pub use types::{ContentAccessor, DirectoryNode, NodeKind, StateCell};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use analyzer::{DirectoryPicker, DirectoryScanner, ExclusionRules, IngestionSource, PathPicker};
pub use documentation::{
    DocumentationEvent, DocumentationOrchestrator, DocumentationSession, LoadOutcome, Unit,
    UnitBoard, UnitId, UnitStatus,
};
pub use selection::{SelectionSet, SelectionState, SelectionStore, Toggle};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    CostSummary, GenerationMode, GenerationRequest, GenerationService, ModelPricing,
    PricingTable, ServiceConfig, SharedService, StreamEvent, TokenUsage, create_service,
};
