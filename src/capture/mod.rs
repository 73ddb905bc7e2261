//! Raw capture state
//!
//! Holds the most recently captured dialog: an HTML fragment plus the geometry
//! it was captured at. The producer that captures it lives outside this crate.

pub mod dialog;

use serde::{Deserialize, Serialize};

use crate::shared::Store;

/// Observable holder of the latest [`RawCapture`]
pub type RawCaptureState = Store<RawCapture>;

/// Markup and on-screen geometry of a captured dialog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCapture {
    /// Captured HTML fragment
    pub html: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Horizontal position, may be negative relative to a scroll offset
    pub x: i32,
    /// Vertical position, may be negative relative to a scroll offset
    pub y: i32,
}

impl RawCapture {
    /// Create a capture from markup and geometry
    pub fn new(html: impl Into<String>, width: u32, height: u32, x: i32, y: i32) -> Self {
        Self {
            html: html.into(),
            width,
            height,
            x,
            y,
        }
    }

    /// Placeholder shown when a requested dialog cannot be found
    pub fn not_found() -> Self {
        Self::new("<h1>Dialog not found.<h1>", 100, 200, 200, 200)
    }

    /// Copy of this capture moved to `(x, y)`
    pub fn with_position(&self, x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            ..self.clone()
        }
    }

    /// Copy of this capture resized to `width` x `height`
    pub fn with_size(&self, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..self.clone()
        }
    }

    /// Get capture dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether nothing has been captured yet
    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}
