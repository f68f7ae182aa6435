//! Replacement and prevention effects.
//!
//! Before damage, a life change, a zone change or a draw happens, the game
//! runs it through [`ReplacementEngine::replace`]. Stored effects come from
//! resolved spells; replacement abilities come from battlefield permanents
//! as derived by the layer system.

mod effect;
mod engine;

pub use effect::{
    DamageFilter, RecipientFilter, ReplaceableEvent, ReplacementEffect, ReplacementId, ReplacementKind,
    ReplacementStore, Shield,
};
pub use engine::{ActiveReplacement, ReplacementEngine, ReplacementKey, ReplacementOutcome};
