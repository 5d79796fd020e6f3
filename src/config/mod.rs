//! Configuration for the search server

mod index;
mod logging;
mod scoring;
mod server;

pub use index::IndexConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use scoring::ScoringConfig;
pub use server::ServerConfig;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the current directory
pub const DEFAULT_CONFIG_FILE: &str = "spidersearch.toml";

/// Main configuration, built once at startup and never mutated afterwards
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listening socket and process configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Web index source
    #[serde(default)]
    pub index: IndexConfig,
    /// Ranking coefficients
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| {
                anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
            })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| {
                anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Server validation
        if self.server.socket_path.as_os_str().is_empty() {
            errors.push("socket_path must not be empty".to_string());
        }
        if self.server.listen_backlog == 0 {
            errors.push("listen_backlog must be positive".to_string());
        }
        if self.server.listen_backlog > i32::MAX as u32 {
            errors.push("listen_backlog is too large".to_string());
        }
        if let Some(mode) = self.server.socket_permissions {
            if mode > 0o7777 {
                errors.push(format!("socket_permissions must be <= 0o7777, got {:o}", mode));
            }
        }

        // Index validation
        if self.index.path.as_os_str().is_empty() {
            errors.push("index path must not be empty".to_string());
        }

        // Scoring validation
        if !self.scoring.minimal_score.is_finite() {
            errors.push("minimal_score must be finite".to_string());
        }
        for (name, weight) in self.scoring.weights() {
            if !weight.is_finite() || weight < 0.0 {
                errors.push(format!("{} weight must be a finite non-negative number", name));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }

    /// Render the configuration as a commented TOML document
    pub fn to_toml_document(&self) -> Result<String> {
        let body = toml::to_string_pretty(self)?;
        Ok(format!("# spidersearch configuration\n\n{}", body))
    }
}
