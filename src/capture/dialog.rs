//! Raw dialog files
//!
//! A raw dialog is stored as `<name>.json` holding a [`RawCapture`] record.
//! The file text is a handlebars template: `{{data1}}` .. `{{dataN}}` are
//! filled from the caller's arguments before the JSON is parsed. Leading
//! lines starting with `#` are comments, and line breaks in the file are
//! flattened to spaces so the html may span several lines.

use handlebars::Handlebars;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{RawCapture, RawCaptureState};
use crate::error::StateError;

/// Path of the dialog file named `name` inside `dir`
pub fn dialog_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.json"))
}

/// First existing dialog file named `name`, searching `dirs` in order
pub fn find_dialog(dirs: &[PathBuf], name: &str) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dialog_path(dir, name))
        .find(|path| path.exists())
}

/// Fill a dialog template with `data`, exposed as `data1`, `data2`, ...
pub fn render_dialog(template: &str, data: &[String]) -> Result<String, StateError> {
    let values: BTreeMap<String, &str> = data
        .iter()
        .enumerate()
        .map(|(i, value)| (format!("data{}", i + 1), value.as_str()))
        .collect();

    let text = flatten_lines(strip_header(template));
    let rendered = Handlebars::new().render_template(&text, &values)?;
    Ok(rendered)
}

/// Load the dialog named `name` from the first directory in `dirs` holding it
///
/// A dialog missing from every directory yields [`RawCapture::not_found`].
pub fn load_dialog(dirs: &[PathBuf], name: &str, data: &[String]) -> Result<RawCapture, StateError> {
    let Some(path) = find_dialog(dirs, name) else {
        warn!("Dialog {} not found in {:?}, using placeholder", name, dirs);
        return Ok(RawCapture::not_found());
    };

    let content = std::fs::read_to_string(&path).map_err(|e| StateError::io(&path, e))?;
    let rendered = render_dialog(&content, data)?;
    let raw: RawCapture = serde_json::from_str(&rendered)?;
    debug!("Loaded dialog {:?} ({}x{})", path, raw.width, raw.height);
    Ok(raw)
}

/// Load a dialog and publish it to `state`
pub fn show_dialog(
    dirs: &[PathBuf],
    name: &str,
    data: &[String],
    state: &RawCaptureState,
) -> Result<(), StateError> {
    let raw = load_dialog(dirs, name, data)?;
    state.set(raw);
    Ok(())
}

fn strip_header(content: &str) -> &str {
    let mut rest = content;
    while rest.starts_with('#') {
        rest = match rest.find('\n') {
            Some(end) => &rest[end + 1..],
            None => "",
        };
    }
    rest
}

fn flatten_lines(text: &str) -> String {
    text.replace("\r\n", " ").replace('\n', " ")
}
