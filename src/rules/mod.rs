//! The rules-engine interface.
//!
//! [`RulesEngine`] is the narrow surface a driver needs: what may a player
//! do, do it, and is the game over. [`crate::game::Game`] implements it.

pub mod engine;

pub use engine::{GameResult, RulesEngine};
