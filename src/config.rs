use crate::api::DEFAULT_API_VERSION;
use crate::origin::DEFAULT_TRUSTED_SUFFIX;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default lifetime of a status message, in seconds
pub const DEFAULT_MESSAGE_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Hosts must end with this suffix to be queried
    pub trusted_domain_suffix: String,
    /// Web API version segment, e.g. "v9.1"
    pub api_version: String,
    /// Seconds before a status message clears itself
    pub message_timeout_secs: u64,
    pub environments: Vec<String>,
    pub current_env: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trusted_domain_suffix: DEFAULT_TRUSTED_SUFFIX.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            message_timeout_secs: DEFAULT_MESSAGE_TIMEOUT_SECS,
            environments: Vec::new(),
            current_env: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir().context("Could not find config directory")?;
        path.push("rolelens");
        path.push("config.toml");
        Ok(path)
    }

    /// Remember an environment and make it the current one
    pub fn add_environment(&mut self, url: String) {
        if !self.environments.contains(&url) {
            self.environments.push(url.clone());
        }
        self.current_env = Some(url);
    }
}
