//! Repository Ingestion
//!
//! Turns a picked folder (or a flat file list) into a filtered, ordered
//! directory tree:
//! - Built-in exclusion rules plus translated `.gitignore` patterns
//! - Directory-handle and flat-list ingestion sources
//! - Deterministic ordering (directories first, then by name)

pub mod scanner;

pub use scanner::{DirectoryPicker, DirectoryScanner, ExclusionRules, IngestionSource, PathPicker};
