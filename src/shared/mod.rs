//! Shared observable state
//!
//! This module provides the generic observable [`Store`] and the
//! [`BoardState`] context that bundles the capture and theme stores.

pub mod state;
pub mod store;

pub use state::BoardState;
pub use store::{Store, Subscription};
