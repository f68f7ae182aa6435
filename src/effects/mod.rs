//! Effects: what spells and abilities do.
//!
//! - [`Effect`]: the data-driven vocabulary of one-shot instructions
//! - [`TargetSpec`]: one target slot, with legality against a derived view
//! - [`EffectResolver`]: carries out a resolving stack object
//!
//! Cards compose effects from variants; there is no per-card code.

mod effect;
mod resolver;
mod targeting;

pub use effect::{Effect, EffectCondition, EffectTarget, PlayerRef, UnlessCost};
pub use resolver::{EffectResolver, ResolveResult};
pub use targeting::{TargetContext, TargetKind, TargetSpec};
