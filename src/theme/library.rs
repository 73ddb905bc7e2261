//! Theme library
//!
//! Read-only access to a directory of `<name>.json` theme files. Each file is
//! merged over the default theme, so a file only needs the keys it changes.

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{Theme, ThemePatch, ThemeState};
use crate::error::{StateError, Validate};

/// A directory of theme files
#[derive(Debug, Clone)]
pub struct ThemeLibrary {
    dir: PathBuf,
}

impl ThemeLibrary {
    /// Create a library rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Library directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the theme file named `name`
    pub fn theme_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Sorted names of the available themes
    ///
    /// A missing directory is an empty library.
    pub fn list(&self) -> Result<Vec<String>, StateError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.dir).map_err(|e| StateError::io(&self.dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StateError::io(&self.dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Load and validate the theme named `name`
    pub fn load(&self, name: &str) -> Result<Theme, StateError> {
        let path = self.theme_path(name);
        if !path.exists() {
            return Err(StateError::ThemeNotFound(name.to_string()));
        }

        let content = std::fs::read_to_string(&path).map_err(|e| StateError::io(&path, e))?;
        let patch: ThemePatch = serde_json::from_str(&content)?;
        let theme = Theme::default().merged(&patch);
        theme.validate()?;

        debug!("Loaded theme {:?} from {:?}", theme.name, path);
        Ok(theme)
    }

    /// Load the theme named `name` and make it the active theme of `state`
    pub fn apply(&self, name: &str, state: &ThemeState) -> Result<(), StateError> {
        let theme = self.load(name)?;
        state.try_set(theme)?;
        info!("Applied theme {}", name);
        Ok(())
    }
}
