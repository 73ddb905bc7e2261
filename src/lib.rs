//! BulletinBoard state - observable capture and theme stores
//!
//! Holds the raw dialog capture and the active theme of the BulletinBoard
//! overlay, and notifies renderers synchronously when either changes.
//! Construct a [`BoardState`] and hand it to every consumer; there is no
//! global instance.

pub mod app;
pub mod capture;
pub mod config;
pub mod error;
pub mod shared;
pub mod storage;
pub mod theme;

pub use capture::{RawCapture, RawCaptureState};
pub use error::{StateError, Validate};
pub use shared::{BoardState, Store, Subscription};
pub use theme::{Theme, ThemePatch, ThemeState};
