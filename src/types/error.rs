//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! ## Error Kinds
//!
//! - **IngestionCancelled**: User aborted folder selection (not a failure)
//! - **IngestionFailed**: Directory enumeration failed, previous tree retained
//! - **NoSelection**: Generation requested with nothing selected, or while
//!   another batch is still running
//! - **RequestFailed**: Generation service answered with a non-success status
//! - **StreamDecode**: A malformed event record (logged and skipped)
//! - **ServiceReported**: In-band `error` envelope from the service
//!
//! Failures are scoped to the smallest affected unit: a unit-level error
//! never aborts its siblings.

use thiserror::Error;

// =============================================================================
// Error Kinds
// =============================================================================

/// Error taxonomy used for scoping and reporting decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    IngestionCancelled,
    IngestionFailed,
    NoSelection,
    RequestFailed,
    StreamDecode,
    ServiceReported,
    Config,
    System,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IngestionCancelled => write!(f, "INGESTION_CANCELLED"),
            Self::IngestionFailed => write!(f, "INGESTION_FAILED"),
            Self::NoSelection => write!(f, "NO_SELECTION"),
            Self::RequestFailed => write!(f, "REQUEST_FAILED"),
            Self::StreamDecode => write!(f, "STREAM_DECODE"),
            Self::ServiceReported => write!(f, "SERVICE_REPORTED"),
            Self::Config => write!(f, "CONFIG"),
            Self::System => write!(f, "SYSTEM"),
        }
    }
}

impl ErrorKind {
    /// Whether the failure leaves the application in a usable state
    /// (the user can simply try again).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config | Self::System)
    }

    /// Whether the failure should be surfaced as an error to the user
    pub fn is_reportable(&self) -> bool {
        !matches!(self, Self::IngestionCancelled | Self::StreamDecode)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum DocError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Ingestion Errors
    // -------------------------------------------------------------------------
    #[error("Folder selection cancelled")]
    IngestionCancelled,

    #[error("Failed to load folder structure: {0}")]
    IngestionFailed(String),

    // -------------------------------------------------------------------------
    // Generation Errors
    // -------------------------------------------------------------------------
    #[error("Please select at least one file")]
    NoSelection,

    #[error("Documentation generation is already running")]
    Busy,

    #[error("Failed to generate: {message}")]
    RequestFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("Malformed event record: {message}")]
    Decode { line: String, message: String },

    #[error("{0}")]
    ServiceReported(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("File not found in scanned tree: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, DocError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl DocError {
    /// Create a request failure from an HTTP status and body
    pub fn request_failed(status: u16, message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Create a request failure that never reached a status line
    pub fn transport(message: impl Into<String>) -> Self {
        Self::RequestFailed {
            status: None,
            message: message.into(),
        }
    }

    /// Create a scan failure
    pub fn scan_failed(message: impl Into<String>) -> Self {
        Self::IngestionFailed(message.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IngestionCancelled => ErrorKind::IngestionCancelled,
            Self::IngestionFailed(_) => ErrorKind::IngestionFailed,
            Self::NoSelection | Self::Busy => ErrorKind::NoSelection,
            Self::RequestFailed { .. } | Self::Http(_) => ErrorKind::RequestFailed,
            Self::Decode { .. } => ErrorKind::StreamDecode,
            Self::ServiceReported(_) | Self::Stream(_) => ErrorKind::ServiceReported,
            Self::Config(_) | Self::UnknownModel(_) => ErrorKind::Config,
            Self::Io(_) | Self::Json(_) | Self::FileNotFound(_) => ErrorKind::System,
        }
    }

    /// Check if this error is scoped to a single scan or unit
    pub fn is_recoverable(&self) -> bool {
        self.kind().is_recoverable()
    }

    /// Message stored on a failed unit
    pub fn unit_message(&self) -> String {
        match self {
            Self::ServiceReported(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
