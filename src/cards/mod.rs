//! Cards: definitions, game objects and the card registry.
//!
//! ## Key Types
//!
//! - [`CardDefinition`]: printed card data, built with `with_*` methods
//! - [`CardRegistry`]: validated definitions by id and name
//! - [`GameObject`]: a card, token or spell in a game, with its base
//!   (unmodified) state
//! - [`Characteristics`]: name, cost, colors, types, abilities, P/T
//! - [`Ability`]: the uniform ability vocabulary
//!
//! [`library`] holds a small set of ready-made cards.

pub mod ability;
pub mod characteristics;
pub mod definition;
pub mod filter;
pub mod instance;
pub mod library;
pub mod mana;
pub mod registry;

pub use ability::{
    Ability, AbilityCost, ActivatedAbility, Affects, ManaAbility, ReplacementAbility, StaticAbility, StaticEffect,
    TriggeredAbility,
};
pub use characteristics::{CardType, Characteristics, Color, ColorSet, Keyword, Subtype, Supertype};
pub use definition::{CardDefinition, CardId, Prototype, SpellAbility};
pub use filter::{ControllerFilter, FilterContext, ObjectFilter};
pub use instance::{CounterKind, GameObject};
pub use mana::{ManaCost, ManaKind, ManaPool};
pub use registry::CardRegistry;
