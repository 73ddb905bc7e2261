//! Storage locations
//!
//! Resolves the per-user directories holding the config file, theme library
//! and dialog files.

use anyhow::Result;
use std::path::PathBuf;

/// Get the configuration directory, creating it if needed
pub fn get_config_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "customct", "BulletinBoard")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    let config_dir = proj_dirs.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Default location of the config file
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

/// Default theme library directory
pub fn default_themes_dir() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("themes"))
}

/// Default dialog directory
pub fn default_dialogs_dir() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("dialogs"))
}

/// Dialogs shipped with the application bundle, next to the executable
pub fn bundled_dialogs_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join("../Resources/dialogs"))
}
