//! Core engine types: ids, players, state, actions, RNG, configuration.
//!
//! Everything here is independent of particular cards. The card vocabulary
//! lives in [`crate::cards`]; the rules that act on this state live in
//! [`crate::game`].

pub mod action;
pub mod config;
pub mod entity;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{ActionRecord, CastOptions, PlayerAction};
pub use config::RulesConfig;
pub use entity::{ObjectId, ObjectRef, Target, Timestamp};
pub use error::{IllegalReason, Result, RulesError};
pub use player::{apnap_order, PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use state::{CombatState, Flow, GameState, PlayerState, TurnState};
