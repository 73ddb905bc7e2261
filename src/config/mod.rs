//! Application Configuration
//!
//! User settings stored in TOML format.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,
    /// Directory overrides
    #[serde(default)]
    pub paths: PathsConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// General application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Library theme applied at startup; `None` keeps the built-in default
    pub theme: Option<String>,
}

/// Directory overrides; unset entries use the per-user config directory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Theme library directory
    pub themes_dir: Option<PathBuf>,
    /// Per-user raw dialog directory
    pub dialogs_dir: Option<PathBuf>,
    /// Bundled raw dialog directory, searched before the per-user one
    pub bundled_dialogs_dir: Option<PathBuf>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level, overridden by `RUST_LOG`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
