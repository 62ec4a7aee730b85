//! CLI Common Utilities
//!
//! Shared initialization and context management for CLI commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::runtime::Runtime;
use tracing::debug;

use crate::ai::provider::{
    ByteStream, GenerationRequest, GenerationService, SharedService, create_service,
};
use crate::analyzer::{DirectoryPicker, IngestionSource, PathPicker};
use crate::config::{Config, ConfigLoader};
use crate::documentation::{DocumentationOrchestrator, DocumentationSession};
use crate::types::{DocError, Result};

/// Command execution context
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Loaded configuration
    pub config: Config,
}

impl CommandContext {
    /// Resolve configuration, or read exactly one file when given
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        Ok(Self { config })
    }

    /// Session over the configured generation service
    pub fn session(&self, model: Option<&str>) -> Result<DocumentationSession> {
        let service = create_service(&self.config.service)?;
        debug!("Using generation service: {}", service.name());
        self.session_with(service, model)
    }

    /// Session for commands that never generate; no credentials needed
    pub fn offline_session(&self, model: Option<&str>) -> Result<DocumentationSession> {
        self.session_with(Arc::new(Offline), model)
    }

    fn session_with(&self, service: SharedService, model: Option<&str>) -> Result<DocumentationSession> {
        let orchestrator = DocumentationOrchestrator::new(service)
            .with_debounce(self.config.generation.debounce());
        DocumentationSession::new(
            self.config.scan.scanner()?,
            orchestrator,
            self.config.pricing.clone(),
            model.unwrap_or(self.config.generation.model.as_str()),
        )
    }
}

struct Offline;

#[async_trait]
impl GenerationService for Offline {
    async fn generate(&self, _request: &GenerationRequest) -> Result<ByteStream> {
        Err(DocError::Config(
            "generation is not available for this command".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "offline"
    }
}

/// Fresh runtime for one command
pub fn runtime() -> Result<Runtime> {
    Runtime::new().map_err(DocError::Io)
}

/// Picker for an optional command-line path; no path prompts on stdin
pub fn picker_for(path: Option<PathBuf>) -> Box<dyn DirectoryPicker> {
    match path {
        Some(path) => Box::new(PathPicker::new(Some(path))),
        None => Box::new(PromptPicker),
    }
}

/// Asks for a folder on the terminal; an empty answer cancels
pub struct PromptPicker;

#[async_trait]
impl DirectoryPicker for PromptPicker {
    async fn pick(&self) -> Result<IngestionSource> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(b"Project folder (empty to cancel): ").await?;
        stdout.flush().await?;

        let mut answer = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut answer)
            .await?;
        PathPicker::new(parse_answer(&answer)).pick().await
    }
}

/// Trimmed folder answer; blank means cancelled
pub fn parse_answer(answer: &str) -> Option<PathBuf> {
    let trimmed = answer.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

/// Normalize a `--select` argument to a tree path
pub fn normalize_selection(path: &str) -> String {
    let path = path.trim().replace('\\', "/");
    let path = path.strip_prefix("./").unwrap_or(&path);
    path.trim_end_matches('/').to_string()
}

/// Apply `--select`/`--all` to a loaded session
pub fn apply_selection(session: &DocumentationSession, select: &[String], all: bool) -> Result<()> {
    if all {
        session.select_all();
        return Ok(());
    }
    for raw in select {
        session.toggle(&normalize_selection(raw), true)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("  \n"), None);
        assert_eq!(parse_answer("./proj\n"), Some(PathBuf::from("./proj")));
    }

    #[test]
    fn test_normalize_selection() {
        assert_eq!(normalize_selection("./src/"), "src");
        assert_eq!(normalize_selection("src\\lib\\a.ts"), "src/lib/a.ts");
        assert_eq!(normalize_selection("a.ts"), "a.ts");
    }

    #[test]
    fn test_context_session_uses_configured_model() {
        let mut config = Config::default();
        config.service.provider = "http".into();
        let ctx = CommandContext { config };

        let session = ctx.session(None).unwrap();
        assert_eq!(session.model(), "gpt-4o-mini");
        assert!(ctx.session(Some("gpt-unknown")).is_err());
    }

    #[tokio::test]
    async fn test_offline_session_refuses_generation() {
        let ctx = CommandContext {
            config: Config::default(),
        };
        let session = ctx.offline_session(Some("gpt-4o-2024-11-20")).unwrap();
        assert_eq!(session.model(), "gpt-4o-2024-11-20");

        let request = GenerationRequest {
            files: String::new(),
            target_file: None,
            mode: crate::ai::provider::GenerationMode::Single,
            model: session.model(),
            file_structure: None,
        };
        assert!(matches!(
            Offline.generate(&request).await,
            Err(DocError::Config(_))
        ));
    }
}
