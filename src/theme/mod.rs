//! Theme state
//!
//! A theme is a named set of fonts and colors used by the board renderer.
//! The store always holds a complete [`Theme`]; partial themes only exist as
//! a [`ThemePatch`] that is merged over a full record.

pub mod library;

use serde::{Deserialize, Serialize};

use crate::error::{StateError, Validate};
use crate::shared::Store;

/// Observable holder of the active [`Theme`]
pub type ThemeState = Store<Theme>;

/// Built-in default palette
pub struct DefaultPalette;

impl DefaultPalette {
    pub const NAME: &'static str = "Default";
    pub const FONT: &'static str = "Fira Code, Menlo";
    pub const FONT_SIZE: &'static str = "16pt";

    // Surface colors
    pub const TEXT_AREA: &'static str = "#454158";
    pub const BACKGROUND: &'static str = "#22212C";
    pub const TEXT: &'static str = "#80ffea";
    pub const BORDER: &'static str = "#1B1A23";

    // Accent colors
    pub const CYAN: &'static str = "#80FFEA";
    pub const GREEN: &'static str = "#8AFF80";
    pub const ORANGE: &'static str = "#FFCA80";
    pub const PINK: &'static str = "#FF80BF";
    pub const PURPLE: &'static str = "#9580FF";
    pub const RED: &'static str = "#FF9580";
    pub const YELLOW: &'static str = "#FFFF80";
}

/// Complete theme record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Display name
    pub name: String,
    /// Font family list
    pub font: String,
    /// Font size descriptor, e.g. `16pt`
    #[serde(rename = "fontSize")]
    pub font_size: String,
    /// Fill of text input areas
    #[serde(rename = "textAreaColor")]
    pub text_area_color: String,
    /// Dialog background
    #[serde(rename = "backgroundColor")]
    pub background_color: String,
    /// Body text
    #[serde(rename = "textColor")]
    pub text_color: String,
    /// Dialog border
    #[serde(rename = "borderColor")]
    pub border_color: String,
    /// Cyan accent
    #[serde(rename = "Cyan")]
    pub cyan: String,
    /// Green accent
    #[serde(rename = "Green")]
    pub green: String,
    /// Orange accent
    #[serde(rename = "Orange")]
    pub orange: String,
    /// Pink accent
    #[serde(rename = "Pink")]
    pub pink: String,
    /// Purple accent
    #[serde(rename = "Purple")]
    pub purple: String,
    /// Red accent
    #[serde(rename = "Red")]
    pub red: String,
    /// Yellow accent
    #[serde(rename = "Yellow")]
    pub yellow: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: DefaultPalette::NAME.to_string(),
            font: DefaultPalette::FONT.to_string(),
            font_size: DefaultPalette::FONT_SIZE.to_string(),
            text_area_color: DefaultPalette::TEXT_AREA.to_string(),
            background_color: DefaultPalette::BACKGROUND.to_string(),
            text_color: DefaultPalette::TEXT.to_string(),
            border_color: DefaultPalette::BORDER.to_string(),
            cyan: DefaultPalette::CYAN.to_string(),
            green: DefaultPalette::GREEN.to_string(),
            orange: DefaultPalette::ORANGE.to_string(),
            pink: DefaultPalette::PINK.to_string(),
            purple: DefaultPalette::PURPLE.to_string(),
            red: DefaultPalette::RED.to_string(),
            yellow: DefaultPalette::YELLOW.to_string(),
        }
    }
}

impl Theme {
    /// Shallow merge: fields set in `patch` win, the rest are kept
    pub fn merged(&self, patch: &ThemePatch) -> Theme {
        let pick = |new: &Option<String>, old: &String| new.clone().unwrap_or_else(|| old.clone());
        Theme {
            name: pick(&patch.name, &self.name),
            font: pick(&patch.font, &self.font),
            font_size: pick(&patch.font_size, &self.font_size),
            text_area_color: pick(&patch.text_area_color, &self.text_area_color),
            background_color: pick(&patch.background_color, &self.background_color),
            text_color: pick(&patch.text_color, &self.text_color),
            border_color: pick(&patch.border_color, &self.border_color),
            cyan: pick(&patch.cyan, &self.cyan),
            green: pick(&patch.green, &self.green),
            orange: pick(&patch.orange, &self.orange),
            pink: pick(&patch.pink, &self.pink),
            purple: pick(&patch.purple, &self.purple),
            red: pick(&patch.red, &self.red),
            yellow: pick(&patch.yellow, &self.yellow),
        }
    }

    /// All color fields as (field, value) pairs
    pub fn colors(&self) -> [(&'static str, &str); 11] {
        [
            ("textAreaColor", self.text_area_color.as_str()),
            ("backgroundColor", self.background_color.as_str()),
            ("textColor", self.text_color.as_str()),
            ("borderColor", self.border_color.as_str()),
            ("Cyan", self.cyan.as_str()),
            ("Green", self.green.as_str()),
            ("Orange", self.orange.as_str()),
            ("Pink", self.pink.as_str()),
            ("Purple", self.purple.as_str()),
            ("Red", self.red.as_str()),
            ("Yellow", self.yellow.as_str()),
        ]
    }
}

impl Validate for Theme {
    fn validate(&self) -> Result<(), StateError> {
        for (field, value) in [
            ("name", &self.name),
            ("font", &self.font),
            ("fontSize", &self.font_size),
        ] {
            if value.trim().is_empty() {
                return Err(StateError::invalid_shape(field, "must not be empty"));
            }
        }

        for (field, value) in self.colors() {
            if !is_hex_color(value) {
                return Err(StateError::invalid_shape(
                    field,
                    format!("'{value}' is not a #RGB, #RRGGBB or #RRGGBBAA color"),
                ));
            }
        }

        Ok(())
    }
}

/// Partial theme; unset fields are taken from the theme it is merged over
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(rename = "fontSize", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(rename = "textAreaColor", skip_serializing_if = "Option::is_none")]
    pub text_area_color: Option<String>,
    #[serde(rename = "backgroundColor", skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(rename = "textColor", skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(rename = "borderColor", skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(rename = "Cyan", skip_serializing_if = "Option::is_none")]
    pub cyan: Option<String>,
    #[serde(rename = "Green", skip_serializing_if = "Option::is_none")]
    pub green: Option<String>,
    #[serde(rename = "Orange", skip_serializing_if = "Option::is_none")]
    pub orange: Option<String>,
    #[serde(rename = "Pink", skip_serializing_if = "Option::is_none")]
    pub pink: Option<String>,
    #[serde(rename = "Purple", skip_serializing_if = "Option::is_none")]
    pub purple: Option<String>,
    #[serde(rename = "Red", skip_serializing_if = "Option::is_none")]
    pub red: Option<String>,
    #[serde(rename = "Yellow", skip_serializing_if = "Option::is_none")]
    pub yellow: Option<String>,
}

/// Merge `patch` into the active theme of `state`
pub fn apply_patch(state: &ThemeState, patch: ThemePatch) -> Result<(), StateError> {
    state.try_update(|current| current.merged(&patch))
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(digits) => {
            matches!(digits.len(), 3 | 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}
