use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Base URL used when the config file doesn't override it. Matches the
/// default Ollama listen address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Model requested when the config file doesn't name one.
pub const DEFAULT_MODEL: &str = "llama3.2:latest";

/// Command used to start the inference runtime when it isn't running.
pub fn default_serve_command() -> Vec<String> {
    vec!["ollama".to_string(), "serve".to_string()]
}

/// Application configuration, loaded from `<config dir>/xinchao/config.json`.
/// Every field is optional; call sites fall back to the defaults above so a
/// missing or partial file still works.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Base URL of the OpenAI-compatible inference gateway
    pub base_url: Option<String>,
    /// Model name passed on every chat request
    pub model: Option<String>,
    /// Command and arguments used to launch the runtime if it's down
    pub serve_command: Option<Vec<String>>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from disk, or return defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let contents = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        Ok(config)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the config file
    fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("xinchao").join("config.json"))
    }
}
