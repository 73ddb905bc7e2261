//! Application Coordinator
//!
//! Owns the configuration and the board state, resolves the file-backed
//! sources and keeps a tracing observer on each store.

use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::capture::{dialog, RawCapture};
use crate::config::AppConfig;
use crate::shared::{BoardState, Subscription};
use crate::storage;
use crate::theme::library::ThemeLibrary;
use crate::theme::Theme;

/// Main application coordinator
pub struct BulletinApp {
    /// Loaded configuration
    pub config: AppConfig,
    /// Observable board state handed to consumers
    pub state: BoardState,
    themes: ThemeLibrary,
    dialog_dirs: Vec<PathBuf>,
    /// Tracing observers, removed when the app is dropped
    _watchers: Vec<Subscription>,
}

impl BulletinApp {
    /// Create a coordinator using the per-user directories for unset paths
    pub fn new(config: AppConfig) -> Result<Self> {
        let themes_dir = match &config.paths.themes_dir {
            Some(dir) => dir.clone(),
            None => storage::default_themes_dir()?,
        };
        let user_dialogs = match &config.paths.dialogs_dir {
            Some(dir) => dir.clone(),
            None => storage::default_dialogs_dir()?,
        };

        let mut dialog_dirs = Vec::new();
        if let Some(bundled) = config
            .paths
            .bundled_dialogs_dir
            .clone()
            .or_else(storage::bundled_dialogs_dir)
        {
            dialog_dirs.push(bundled);
        }
        dialog_dirs.push(user_dialogs);

        Ok(Self::with_dirs(config, themes_dir, dialog_dirs))
    }

    /// Create a coordinator with an explicit theme directory and dialog search path
    pub fn with_dirs(config: AppConfig, themes_dir: PathBuf, dialog_dirs: Vec<PathBuf>) -> Self {
        let state = BoardState::new();
        let watchers = vec![
            state.raw.subscribe(|raw: &RawCapture| {
                debug!(
                    "Raw capture now {}x{} at ({}, {}), {} bytes of html",
                    raw.width,
                    raw.height,
                    raw.x,
                    raw.y,
                    raw.html.len()
                );
            }),
            state.theme.subscribe(|theme: &Theme| {
                debug!("Active theme now {:?}", theme.name);
            }),
        ];

        let app = Self {
            config,
            state,
            themes: ThemeLibrary::new(themes_dir),
            dialog_dirs,
            _watchers: watchers,
        };
        app.apply_startup_theme();
        app
    }

    /// Apply the configured theme, keeping the default if it cannot be loaded
    fn apply_startup_theme(&self) {
        let Some(name) = self.config.general.theme.clone() else {
            info!("Using default theme");
            return;
        };

        if let Err(e) = self.themes.apply(&name, &self.state.theme) {
            warn!("Could not apply startup theme {}: {}", name, e);
        }
    }

    /// Theme library backing this app
    pub fn themes(&self) -> &ThemeLibrary {
        &self.themes
    }

    /// Directories searched for raw dialog files, in order
    pub fn dialog_dirs(&self) -> &[PathBuf] {
        &self.dialog_dirs
    }

    /// Make the library theme `name` the active theme
    pub fn load_theme(&self, name: &str) -> Result<Theme> {
        self.themes.apply(name, &self.state.theme)?;
        Ok(self.state.theme.get())
    }

    /// Render the dialog `name` with `data` and publish it as the current raw capture
    pub fn show_dialog(&self, name: &str, data: &[String]) -> Result<RawCapture> {
        dialog::show_dialog(&self.dialog_dirs, name, data, &self.state.raw)?;
        Ok(self.state.raw.get())
    }
}
