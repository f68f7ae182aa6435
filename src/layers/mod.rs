//! Continuous effects and the layer system.
//!
//! ## Layers
//!
//! | Layer | Changes |
//! |-------|---------|
//! | 1 | copy effects |
//! | 2 | control |
//! | 3 | text |
//! | 4 | types and subtypes |
//! | 5 | colors |
//! | 6 | abilities |
//! | 7a-7d | power/toughness: defining, setting, modifying (and counters), switching |
//!
//! [`LayerSystem::compute`] produces a [`DerivedView`] from the persisted
//! base state; nothing derived is stored.

pub mod continuous;
pub(crate) mod dependency;
pub mod layer;
pub mod modification;
pub mod system;
pub mod view;

pub use continuous::{ContinuousEffect, Duration, EffectId, EffectStore};
pub use layer::{Layer, LayerSlot, PtSublayer};
pub use modification::{Modification, Value};
pub use system::LayerSystem;
pub use view::{DerivedObject, DerivedView};
