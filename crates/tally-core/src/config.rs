//! Configuration
//!
//! Two layers: an optional `config.toml` in the platform config directory
//! (`~/.config/tally/config.toml` on Linux), then environment variables on
//! top. Everything has a default, so no file is required.
//!
//! ```toml
//! state = "/home/me/tally/state.json"
//!
//! [ai]
//! backend = "ollama"
//! host = "http://localhost:11434"
//! model = "llama3.2"
//! timeout_secs = 30
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BACKEND: &str = "ollama";

/// Resolved configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Snapshot file to read
    #[serde(rename = "state")]
    pub state_path: Option<PathBuf>,
    pub ai: AiConfig,
}

/// Commentary backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub backend: String,
    pub host: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND.to_string(),
            host: None,
            model: None,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AiConfig {
    fn is_openai_compatible(&self) -> bool {
        matches!(
            self.backend.to_lowercase().as_str(),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp"
        )
    }

    /// Override fields from environment-style lookups
    ///
    /// Host and model variables are read for the selected backend only.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = var("AI_BACKEND") {
            self.backend = backend;
        }

        let (host_var, model_var) = if self.is_openai_compatible() {
            ("OPENAI_COMPATIBLE_HOST", "OPENAI_COMPATIBLE_MODEL")
        } else {
            ("OLLAMA_HOST", "OLLAMA_MODEL")
        };

        if let Some(host) = var(host_var) {
            self.host = Some(host);
        }
        if let Some(model) = var(model_var) {
            self.model = Some(model);
        }
        if self.is_openai_compatible() {
            if let Some(key) = var("OPENAI_COMPATIBLE_API_KEY") {
                self.api_key = Some(key);
            }
        }
        if let Some(timeout) = var("TALLY_AI_TIMEOUT_SECS").and_then(|t| t.parse().ok()) {
            self.timeout_secs = timeout;
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply the process environment
    pub fn load() -> Result<Self> {
        let mut config = match default_config_path() {
            Some(path) if path.exists() => Self::from_path(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a config file without applying the environment
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Override fields from environment-style lookups
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = var("TALLY_STATE") {
            self.state_path = Some(PathBuf::from(path));
        }
        self.ai.apply_env(var);
    }

    /// Snapshot path, falling back to the platform data directory
    pub fn state_path(&self) -> PathBuf {
        self.state_path
            .clone()
            .or_else(default_state_path)
            .unwrap_or_else(|| PathBuf::from("state.json"))
    }
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tally").join("config.toml"))
}

/// Default snapshot location
pub fn default_state_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("state.json"))
}
