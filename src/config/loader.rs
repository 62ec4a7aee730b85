//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/repodoc/config.toml)
//! 3. Project config (.repodoc/config.toml)
//! 4. Environment variables (REPODOC_* prefix, `__` between nested keys)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{DocError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_layered(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Resolution chain with explicit file locations
    pub fn load_layered(global: Option<&Path>, project: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // REPODOC_GENERATION__MODEL -> generation.model
        figment = figment.merge(Env::prefixed("REPODOC_").split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| DocError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| DocError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/repodoc/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("repodoc"))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_dir() -> PathBuf {
        PathBuf::from(".repodoc")
    }

    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Render the effective configuration
    pub fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| DocError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write a commented config file, keeping an existing one unless `force`
    pub fn init_at(path: &Path, force: bool) -> Result<bool> {
        if path.exists() && !force {
            info!("Config exists: {}", path.display());
            return Ok(false);
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, Self::default_config())?;
        info!("Created config: {}", path.display());
        Ok(true)
    }

    pub fn init_global(force: bool) -> Result<PathBuf> {
        let path = Self::global_config_path().ok_or_else(|| {
            DocError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::init_at(&path, force)?;
        Ok(path)
    }

    pub fn init_project(force: bool) -> Result<PathBuf> {
        let path = Self::project_config_path();
        Self::init_at(&path, force)?;
        Ok(path)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn default_config() -> String {
        r#"# repodoc configuration
# Project settings in .repodoc/config.toml override ~/.config/repodoc/config.toml.
# Environment variables use REPODOC_ with `__` between keys,
# e.g. REPODOC_GENERATION__MODEL=gpt-4o-2024-11-20.

version = "1.0"

[service]
# "openai" talks to the chat completions API directly (needs OPENAI_API_KEY);
# "http" posts requests to a remote generation endpoint.
provider = "openai"
endpoint = "http://localhost:3000/api/openai"
api_base = "https://api.openai.com/v1"
connect_timeout_secs = 30
temperature = 0.7

[generation]
model = "gpt-4o-mini"
mode = "single"
debounce_ms = 100

[scan]
extra_exclude = []
respect_gitignore = true

# Prices in USD per million tokens
# [pricing."my-model"]
# display_name = "My Model"
# input_price = 1.0
# output_price = 2.0
"#
        .to_string()
    }
}
