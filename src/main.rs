//! Command line front end for the BulletinBoard state stores

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use bulletin_state::app::BulletinApp;
use bulletin_state::config::{self, AppConfig};
use bulletin_state::storage;
use bulletin_state::{RawCapture, Theme};

/// BulletinBoard state inspector
#[derive(Parser, Debug)]
#[command(name = "bulletin-state")]
#[command(about = "Inspect and load BulletinBoard capture and theme state")]
struct Args {
    /// Config file (defaults to the per-user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the built-in capture and theme defaults
    Defaults,
    /// List the themes in the theme library
    Themes,
    /// Apply a library theme and print the resulting theme
    Theme {
        /// Theme name, without the .json extension
        name: String,
    },
    /// Render a raw dialog and print the resulting capture
    Dialog {
        /// Dialog name, without the .json extension
        name: String,
        /// Template values, available as data1, data2, ...
        data: Vec<String>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => storage::default_config_path()?,
    };
    let config = load_or_default_config(&config_path)?;

    // Initialize logging; stdout is reserved for command output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Configuration from {:?}", config_path);

    match args.command {
        Command::Defaults => {
            let defaults = serde_json::json!({
                "raw": RawCapture::default(),
                "theme": Theme::default(),
            });
            println!("{}", serde_json::to_string_pretty(&defaults)?);
        }
        Command::Themes => {
            let app = BulletinApp::new(config)?;
            let names = app.themes().list()?;
            println!("{}", serde_json::json!({ "themes": names }));
        }
        Command::Theme { name } => {
            let app = BulletinApp::new(config)?;
            let theme = app.load_theme(&name)?;
            println!("{}", serde_json::to_string_pretty(&theme)?);
        }
        Command::Dialog { name, data } => {
            let app = BulletinApp::new(config)?;
            let raw = app.show_dialog(&name, &data)?;
            println!("{}", serde_json::to_string_pretty(&raw)?);
        }
    }

    Ok(())
}

/// Load configuration from file, falling back to defaults when it is absent
fn load_or_default_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        config::load_config(path)
    } else {
        Ok(AppConfig::default())
    }
}
