//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/repodoc/) and project (.repodoc/) level configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::ai::pricing::PricingTable;
use crate::ai::provider::{GenerationMode, ServiceConfig};
use crate::analyzer::{DirectoryScanner, ExclusionRules};
use crate::constants::models::DEFAULT_MODEL;
use crate::constants::stream::DEBOUNCE_MS;
use crate::types::{DocError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Generation service settings
    pub service: ServiceConfig,

    /// Batch defaults
    pub generation: GenerationConfig,

    /// Directory scanning settings
    pub scan: ScanConfig,

    /// Model id → prices per million tokens
    pub pricing: PricingTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            service: ServiceConfig::default(),
            generation: GenerationConfig::default(),
            scan: ScanConfig::default(),
            pricing: PricingTable::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `DocError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.pricing.is_empty() {
            return Err(DocError::Config(
                "Pricing table must contain at least one model".to_string(),
            ));
        }

        if !self.pricing.contains(&self.generation.model) {
            return Err(DocError::Config(format!(
                "Default model '{}' has no pricing entry",
                self.generation.model
            )));
        }

        if self.generation.debounce_ms == 0 {
            return Err(DocError::Config(
                "generation.debounce_ms must be greater than 0".to_string(),
            ));
        }

        if self.service.connect_timeout_secs == 0 {
            return Err(DocError::Config(
                "service.connect_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.service.temperature) {
            return Err(DocError::Config(format!(
                "service.temperature must be between 0.0 and 2.0, got {}",
                self.service.temperature
            )));
        }

        for (key, value) in [
            ("service.endpoint", &self.service.endpoint),
            ("service.api_base", &self.service.api_base),
        ] {
            Url::parse(value)
                .map_err(|e| DocError::Config(format!("{} '{}' is not a URL: {}", key, value, e)))?;
        }

        self.scan.exclusion_rules()?;
        Ok(())
    }
}

// =============================================================================
// Generation Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Model used unless overridden on the command line
    pub model: String,

    /// Default generation mode
    pub mode: GenerationMode,

    /// Coalescing delay for streamed content (milliseconds)
    pub debounce_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            mode: GenerationMode::default(),
            debounce_ms: DEBOUNCE_MS,
        }
    }
}

impl GenerationConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

// =============================================================================
// Scan Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Extra regex patterns excluded on top of the built-in list
    pub extra_exclude: Vec<String>,

    /// Union the root `.gitignore` into the exclusion rules
    pub respect_gitignore: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extra_exclude: Vec::new(),
            respect_gitignore: true,
        }
    }
}

impl ScanConfig {
    /// Built-in rules plus `extra_exclude`
    pub fn exclusion_rules(&self) -> Result<ExclusionRules> {
        ExclusionRules::builtin().with_patterns(&self.extra_exclude)
    }

    pub fn scanner(&self) -> Result<DirectoryScanner> {
        Ok(DirectoryScanner::new(self.exclusion_rules()?).with_gitignore(self.respect_gitignore))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::models::PREMIUM_MODEL;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.generation.model, DEFAULT_MODEL);
        assert!(config.pricing.contains(PREMIUM_MODEL));
        assert_eq!(config.generation.debounce(), Duration::from_millis(100));
    }

    #[test]
    fn test_unpriced_default_model() {
        let mut config = Config::default();
        config.generation.model = "gpt-nope".into();
        assert!(matches!(config.validate(), Err(DocError::Config(_))));
    }

    #[test]
    fn test_empty_pricing_rejected() {
        let mut config = Config::default();
        config.pricing = PricingTable::empty();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at least one model"));
    }

    #[test]
    fn test_range_checks() {
        let mut config = Config::default();
        config.service.temperature = 2.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.generation.debounce_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.service.connect_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.service.endpoint = "not a url".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_extra_exclude() {
        let mut config = Config::default();
        config.scan.extra_exclude = vec!["(".into()];
        assert!(config.validate().is_err());
        assert!(config.scan.scanner().is_err());
    }

    #[test]
    fn test_toml_round_trip_keeps_mode() {
        let mut config = Config::default();
        config.generation.mode = GenerationMode::CombinedReadme;
        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("mode = \"combined-readme\""));
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.generation.mode, GenerationMode::CombinedReadme);
        assert_eq!(parsed.pricing.len(), config.pricing.len());
    }
}
