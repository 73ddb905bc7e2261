//! Board state shared between capture producers and renderers

use crate::capture::{RawCapture, RawCaptureState};
use crate::theme::{Theme, ThemeState};

/// Explicitly constructed context holding both observable states
///
/// Clones share the same underlying stores, so a `BoardState` can be handed to
/// every consumer that needs to read or react to the board.
#[derive(Debug, Clone)]
pub struct BoardState {
    /// Most recently captured raw dialog
    pub raw: RawCaptureState,
    /// Currently active theme
    pub theme: ThemeState,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardState {
    /// Create both stores with their built-in defaults
    pub fn new() -> Self {
        Self::with_values(RawCapture::default(), Theme::default())
    }

    /// Create both stores seeded with the given values
    pub fn with_values(raw: RawCapture, theme: Theme) -> Self {
        Self {
            raw: RawCaptureState::new(raw),
            theme: ThemeState::new(theme),
        }
    }

    /// Restore both stores to their defaults, notifying observers
    pub fn reset(&self) {
        self.raw.set(RawCapture::default());
        self.theme.set(Theme::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_has_defaults() {
        let board = BoardState::new();
        assert_eq!(board.raw.get(), RawCapture::default());
        assert_eq!(board.theme.get(), Theme::default());
    }

    #[test]
    fn test_boards_are_isolated() {
        let first = BoardState::new();
        let second = BoardState::new();
        first.raw.set(RawCapture::new("<p>one</p>", 10, 10, 0, 0));

        assert_eq!(first.raw.get().html, "<p>one</p>");
        assert_eq!(second.raw.get(), RawCapture::default());
    }

    #[test]
    fn test_clone_shares_stores() {
        let board = BoardState::new();
        let handle = board.clone();
        handle.theme.update(|t| Theme {
            name: "Shared".to_string(),
            ..t.clone()
        });
        assert_eq!(board.theme.get().name, "Shared");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let board = BoardState::with_values(
            RawCapture::new("<b>x</b>", 1, 2, 3, 4),
            Theme::default(),
        );
        board.theme.update(|t| Theme {
            font: "Monaco".to_string(),
            ..t.clone()
        });

        board.reset();
        assert_eq!(board.raw.get(), RawCapture::default());
        assert_eq!(board.theme.get(), Theme::default());
    }
}
