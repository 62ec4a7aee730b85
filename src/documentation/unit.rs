use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::ai::stream::TokenUsage;
use crate::constants::bundle::COMBINED_UNIT_ID;

/// Output file name of the combined unit
pub const COMBINED_OUTPUT_NAME: &str = "README.md";

/// Generation target: one file, or the whole selection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UnitId {
    File(String),
    Combined,
}

impl UnitId {
    pub fn file(path: impl Into<String>) -> Self {
        Self::File(path.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::File(path) => path,
            Self::Combined => COMBINED_UNIT_ID,
        }
    }

    pub fn is_combined(&self) -> bool {
        matches!(self, Self::Combined)
    }

    /// Relative path the unit's markdown is written to
    pub fn output_name(&self) -> String {
        match self {
            Self::File(path) => format!("{}.md", path),
            Self::Combined => COMBINED_OUTPUT_NAME.to_string(),
        }
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for UnitId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Unit lifecycle: pending → generating → completed | error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum UnitStatus {
    Pending,
    Generating,
    Completed,
    Error(String),
}

impl UnitStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Generating => "generating",
            Self::Completed => "completed",
            Self::Error(_) => "error",
        }
    }
}

impl std::fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error(message) => write!(f, "error: {}", message),
            other => f.write_str(other.label()),
        }
    }
}

/// One generation target and its accumulated result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: UnitId,
    pub status: UnitStatus,
    /// Reset at dispatch, then only appended to
    pub content: String,
    /// Set at most once, near stream end
    pub usage: Option<TokenUsage>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Unit {
    pub fn pending(id: UnitId) -> Self {
        Self {
            id,
            status: UnitStatus::Pending,
            content: String::new(),
            usage: None,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            UnitStatus::Error(message) => Some(message),
            _ => None,
        }
    }

    /// Wall time between dispatch and terminal state
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        Some(self.finished_at? - self.started_at?)
    }
}
