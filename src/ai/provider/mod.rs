//! Generation Service Abstraction
//!
//! One request/response streaming contract: a JSON [`GenerationRequest`] in,
//! a byte stream of `data: <json>` event records out.
//!
//! ## Implementations
//!
//! - `http`: posts the request to a remote documentation endpoint
//! - `openai`: talks to an OpenAI-compatible chat completions API directly
//!   and re-encodes its deltas as event records

mod http;
mod openai;

pub use http::HttpGenerationService;
pub use openai::{OpenAiGenerationService, translate_completion_stream};

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;

use crate::constants::network::{CONNECTION_TIMEOUT_SECS, DEFAULT_API_BASE, DEFAULT_ENDPOINT};
use crate::types::{DocError, Result};

// =============================================================================
// Generation Mode
// =============================================================================

/// How selected files map to generation units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMode {
    /// One unit per file; payload is the raw file
    #[default]
    Single,
    /// One unit per file; payload is the whole bundle plus a target
    SingleWithContext,
    /// One combined unit over the whole bundle
    CombinedReadme,
}

impl GenerationMode {
    pub const ALL: [GenerationMode; 3] = [
        Self::Single,
        Self::SingleWithContext,
        Self::CombinedReadme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::SingleWithContext => "single-with-context",
            Self::CombinedReadme => "combined-readme",
        }
    }

    /// Whether each selected file becomes its own unit
    pub fn is_per_file(&self) -> bool {
        !matches!(self, Self::CombinedReadme)
    }
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "single-with-context" | "context" => Ok(Self::SingleWithContext),
            "combined-readme" | "combined" | "readme" => Ok(Self::CombinedReadme),
            _ => Err(format!(
                "Invalid generation mode: '{}'. Valid options: single, single-with-context, combined-readme",
                s
            )),
        }
    }
}

// =============================================================================
// Request / Stream
// =============================================================================

/// Outbound request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Raw file text or a marker-delimited bundle
    pub files: String,
    /// Set only for single-with-context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_file: Option<String>,
    pub mode: GenerationMode,
    pub model: String,
    /// Newline-joined selected paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_structure: Option<String>,
}

/// Raw response body chunks
pub type ByteStream = BoxStream<'static, Result<Vec<u8>>>;

/// External text-generation service
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Dispatch a request.
    ///
    /// A non-success response before streaming starts is `RequestFailed`;
    /// failures after that surface in-band or as stream items.
    async fn generate(&self, request: &GenerationRequest) -> Result<ByteStream>;

    /// Service name for logging
    fn name(&self) -> &str;
}

/// Shared service handle
pub type SharedService = Arc<dyn GenerationService>;

// =============================================================================
// Service Configuration
// =============================================================================

/// Configuration for the generation service
///
/// The API key is never serialized and is redacted in debug output; services
/// hold it as a `SecretString`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// `openai` or `http`
    pub provider: String,
    /// Remote route for the `http` service
    pub endpoint: String,
    /// OpenAI-compatible API base
    pub api_base: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub connect_timeout_secs: u64,
    pub temperature: f32,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("provider", &self.provider)
            .field("endpoint", &self.endpoint)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            connect_timeout_secs: CONNECTION_TIMEOUT_SECS,
            temperature: 0.7,
        }
    }
}

/// Create a shared service from configuration
pub fn create_service(config: &ServiceConfig) -> Result<SharedService> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiGenerationService::new(config.clone())?)),
        "http" => Ok(Arc::new(HttpGenerationService::new(config)?)),
        _ => Err(DocError::Config(format!(
            "Unknown provider: {}. Supported: openai, http",
            config.provider
        ))),
    }
}
