//! # rust-ccg-rules
//!
//! The rules-resolution core of a trading card game: continuous effects in
//! layers, triggered abilities, priority and the stack, state-based actions,
//! replacement and prevention effects, combat.
//!
//! ## Design Principles
//!
//! 1. **Cards Are Data**: abilities and effects are composed from tagged enum
//!    variants. No card has code of its own.
//!
//! 2. **Derived, Never Stored**: objects keep their base values. What an
//!    object *is* right now is recomputed from the continuous effects in
//!    layer order whenever a rule asks.
//!
//! 3. **N-Player First**: triggers and choices are ordered APNAP for any
//!    number of players.
//!
//! 4. **Explicit Context**: a [`Game`] holds configuration, the shared card
//!    registry, state and listeners. There are no globals.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: `GameState` clones in O(1) via `im-rs`,
//!   so an illegal action is rolled back by restoring a snapshot.
//!
//! - **Step-at-a-Time**: [`Game::step`] makes one transition and records
//!   where the game stands in the state, so games can be checkpointed and
//!   resumed between any two steps.
//!
//! - **Synchronous Decisions**: players answer through [`DecisionMaker`];
//!   timeouts and malformed answers fall back to defaults.
//!
//! ## Modules
//!
//! - `core`: ids, players, configuration, errors, RNG, actions, state
//! - `zones`: ordered zones and zone-change counters
//! - `cards`: characteristics, costs, definitions, registry, sample cards
//! - `layers`: continuous effects and the derived view
//! - `triggers`: events, trigger conditions, pending triggers
//! - `stack`: turn structure, priority and the stack
//! - `replacement`: replacement and prevention effects
//! - `effects`: one-shot effects, targeting, resolution
//! - `decision`: the player-decision interface
//! - `rules`: the `RulesEngine` trait
//! - `game`: the game driver, combat, state-based actions, listeners
//! - `host`: many games in parallel

pub mod core;
pub mod zones;
pub mod cards;
pub mod layers;
pub mod triggers;
pub mod stack;
pub mod replacement;
pub mod effects;
pub mod decision;
pub mod rules;
pub mod game;
pub mod host;

// Re-export commonly used types
pub use crate::core::{
    ActionRecord, CastOptions, GameRng, GameState, ObjectId, ObjectRef, PlayerAction, PlayerId, PlayerMap, Result,
    RulesConfig, RulesError, Target,
};

pub use crate::zones::{Zone, ZoneKey, ZonePosition};

pub use crate::cards::{
    Ability, CardDefinition, CardId, CardRegistry, CardType, Characteristics, Color, ColorSet, Keyword, ObjectFilter,
};

pub use crate::layers::{ContinuousEffect, DerivedObject, DerivedView, Duration, Layer, LayerSystem, Modification};

pub use crate::triggers::{GameEvent, TriggerCondition};

pub use crate::stack::{PriorityStack, StackObject, Step};

pub use crate::replacement::{ReplacementEngine, ReplacementKind};

pub use crate::effects::{Effect, EffectResolver, TargetSpec};

pub use crate::decision::{AutoPilot, Deciders, DecisionMaker, DecisionRequest, DecisionResponse, Scripted};

pub use crate::rules::{GameResult, RulesEngine};

pub use crate::game::{EventLog, Game, GameListener, StepOutcome};

pub use crate::host::{GameHost, MatchReport, MatchSpec};
