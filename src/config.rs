use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::net::RSYNC_DEFAULT_FLAGS;

const CONFIG_DIR_NAME: &str = "relnet";
const CONFIG_FILE_NAME: &str = "config.toml";
const TOOL_ENV_PREFIX: &str = "RELNET_";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelnetConfig {
    /// Tool name -> path, checked before searching PATH
    pub tools: HashMap<String, PathBuf>,
    /// Extra rsync flags used by the CLI when none are passed
    pub rsync_flags: Vec<String>,
    pub http_timeout_secs: u64,
}

impl Default for RelnetConfig {
    fn default() -> Self {
        Self {
            tools: HashMap::new(),
            rsync_flags: RSYNC_DEFAULT_FLAGS.iter().map(|f| f.to_string()).collect(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl RelnetConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Apply `RELNET_<TOOL>=<path>` overrides, e.g. `RELNET_SSH=/opt/bin/ssh`
    pub fn apply_env_overrides<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(tool) = key.strip_prefix(TOOL_ENV_PREFIX) else {
                continue;
            };
            if tool.is_empty() || value.trim().is_empty() {
                continue;
            }
            self.tools
                .insert(tool.to_lowercase(), PathBuf::from(value.trim()));
        }
    }
}

pub fn get_config_dir() -> Result<PathBuf> {
    let home = get_home_dir()?;
    Ok(home.join(".config").join(CONFIG_DIR_NAME))
}

pub fn get_config_file_path() -> Result<PathBuf> {
    let config_dir = get_config_dir()?;
    Ok(config_dir.join(CONFIG_FILE_NAME))
}

pub fn get_home_dir() -> Result<PathBuf> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE")) // Windows fallback
        .map(PathBuf::from)
        .with_context(|| "Could not determine home directory")
}

/// Load a config file, falling back to defaults when it does not exist
pub fn load_config_from(config_path: &Path) -> Result<RelnetConfig> {
    if !config_path.exists() {
        return Ok(RelnetConfig::default());
    }

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

    let config: RelnetConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

    Ok(config)
}

/// Load configuration: config file (explicit path or the default location),
/// then `.env` in the working directory, then `RELNET_*` environment variables.
pub fn load_config(config_path: Option<&Path>) -> Result<RelnetConfig> {
    let mut config = match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            load_config_from(path)?
        }
        None => match get_config_file_path() {
            Ok(path) => load_config_from(&path)?,
            Err(e) => {
                tracing::debug!(error = %e, "no home directory, using default config");
                RelnetConfig::default()
            }
        },
    };

    // .env is optional
    if let Ok(path) = dotenv::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env");
    }
    config.apply_env_overrides(std::env::vars());

    Ok(config)
}
