use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Global configuration loaded from `~/.config/rget/config.toml`.
/// Command-line flags override these per invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RgetConfig {
    /// Default request timeout in seconds.
    pub timeout_secs: u64,
    /// Default progress update interval in milliseconds.
    pub update_interval_ms: u64,
    /// User-Agent sent when a request does not set one explicitly.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for RgetConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            update_interval_ms: 1000,
            user_agent: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RgetConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RgetConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: RgetConfig = toml::from_str(&data)?;
    Ok(cfg)
}
