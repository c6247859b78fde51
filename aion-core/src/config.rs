//! Configuration
//!
//! TOML-based configuration: Gemini credentials, loop settings, storage
//! location. Includes startup validation.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// ---------------------------------------------------------------------------
// Configuration structures
// ---------------------------------------------------------------------------

/// Top-level configuration (maps to TOML).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AionConfig {
    /// Gemini provider settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Orchestration loop settings.
    #[serde(default)]
    pub agent: AgentSettings,

    /// Storage settings.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Gemini provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key. If absent, falls back to the GEMINI_API_KEY env var.
    pub api_key: Option<String>,
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

/// Orchestration loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Maximum model round trips per user message.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
        }
    }
}

fn default_max_rounds() -> usize {
    5
}

/// Storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Data directory override. Defaults to `<platform data dir>/aion`.
    pub data_dir: Option<PathBuf>,
    /// User the stores are scoped to.
    #[serde(default = "default_user")]
    pub user: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            user: default_user(),
        }
    }
}

fn default_user() -> String {
    "default".to_string()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

impl AionConfig {
    /// Load config from the default location: `~/.config/aion/config.toml`.
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            info!("no config file found at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        info!(path = %path.display(), model = %config.gemini.model, "loaded config");
        Ok(config)
    }

    /// Default config file path.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
        Ok(dir.join("aion").join("config.toml"))
    }

    /// Resolve the Gemini API key, checking config and then the env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.gemini
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
    }

    /// Resolved data directory for the configured user.
    pub fn user_data_dir(&self) -> Result<PathBuf> {
        let base = match &self.storage.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .ok_or_else(|| anyhow::anyhow!("could not determine data directory"))?
                .join("aion"),
        };
        Ok(base.join(&self.storage.user))
    }

    /// Validate the config on startup.
    pub fn validate(&self) -> Result<()> {
        if self.resolve_api_key().is_none() {
            bail!(
                "No Gemini API key. Set the GEMINI_API_KEY environment variable or add \
                 api_key under [gemini] in {}",
                Self::default_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "the config file".to_string())
            );
        }
        if self.agent.max_rounds == 0 {
            bail!("[agent] max_rounds must be at least 1");
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config generation (for `config init`)
// ---------------------------------------------------------------------------

/// Generate a sample config TOML string.
pub fn sample_config() -> String {
    r#"# Aion Assistant Configuration

[gemini]
# api_key = "..."  # Or set GEMINI_API_KEY env var
model = "gemini-2.0-flash"

[agent]
# Maximum model round trips per user message
max_rounds = 5

[storage]
# data_dir = "/path/to/data"  # Defaults to the platform data directory
user = "default"
"#
    .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let config: AionConfig = toml::from_str("").unwrap();
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.agent.max_rounds, 5);
        assert_eq!(config.storage.user, "default");
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
            [gemini]
            api_key = "test-key"
            model = "gemini-2.5-pro"

            [agent]
            max_rounds = 8

            [storage]
            data_dir = "/tmp/aion-data"
            user = "alex"
        "#;
        let config: AionConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gemini.model, "gemini-2.5-pro");
        assert_eq!(config.agent.max_rounds, 8);
        assert_eq!(
            config.user_data_dir().unwrap(),
            PathBuf::from("/tmp/aion-data/alex")
        );
    }

    #[test]
    fn api_key_from_config_wins() {
        let config = AionConfig {
            gemini: GeminiConfig {
                api_key: Some("from-config".to_string()),
                model: default_model(),
            },
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key(), Some("from-config".to_string()));
    }

    #[test]
    fn zero_rounds_fails_validation() {
        let config = AionConfig {
            gemini: GeminiConfig {
                api_key: Some("key".to_string()),
                model: default_model(),
            },
            agent: AgentSettings { max_rounds: 0 },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn sample_config_parses() {
        let sample = sample_config();
        let config: AionConfig = toml::from_str(&sample).unwrap();
        assert_eq!(config.agent.max_rounds, 5);
    }
}
