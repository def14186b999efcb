use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DefaultsConfig {
    /// Two-letter region code applied to contacts that arrive without one.
    #[serde(default = "default_state")]
    pub state: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            state: default_state(),
        }
    }
}

fn default_state() -> String {
    "AR".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SyncConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Remote follow-up endpoint. The push is best-effort: a single attempt
    /// per intake, bounded by `timeout_secs`, failures discarded.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_sync_timeout")]
    pub timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            timeout_secs: default_sync_timeout(),
        }
    }
}

fn default_sync_timeout() -> u64 {
    5
}

impl SyncConfig {
    pub fn is_active(&self) -> bool {
        self.enabled && self.endpoint.is_some()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.defaults.state.trim().is_empty() {
        anyhow::bail!("defaults.state must not be empty");
    }

    if config.sync.timeout_secs == 0 {
        anyhow::bail!("sync.timeout_secs must be > 0");
    }

    if config.sync.enabled && config.sync.endpoint.is_none() {
        anyhow::bail!("sync.endpoint must be set when sync.enabled = true");
    }

    Ok(config)
}
