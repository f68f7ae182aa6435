//! Events and triggered abilities.
//!
//! ## Key Components
//!
//! - [`GameEvent`]: something that happened, with last known information
//!   for objects that left the battlefield
//! - [`TriggerCondition`]: when a triggered ability triggers
//! - [`TriggerRegistry`]: delayed triggers and trigger collection
//! - [`PendingTrigger`]: a triggered ability waiting for the stack
//!
//! Triggered abilities are read from the derived view, so abilities granted
//! by continuous effects trigger like printed ones.

mod condition;
mod event;
mod registry;

pub use condition::{ConditionContext, ConditionEvaluator, ObjectSubject, TriggerCondition};
pub use event::GameEvent;
pub use registry::{DelayedTrigger, PendingTrigger, TriggerId, TriggerLifetime, TriggerOrigin, TriggerRegistry};
