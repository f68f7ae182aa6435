//! Trigger conditions.
//!
//! A [`TriggerCondition`] is checked against each [`GameEvent`] from the
//! point of view of the ability's source. Conditions compose with `All`,
//! `Any` and `Not`.

use serde::{Deserialize, Serialize};

use crate::cards::{ControllerFilter, FilterContext, ObjectFilter, Subtype};
use crate::core::entity::Target;
use crate::core::player::PlayerId;
use crate::layers::{DerivedObject, DerivedView};
use crate::stack::Step;

use super::event::GameEvent;

/// Which objects a condition watches.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectSubject {
    /// Only the ability's own source.
    This,
    Matching(ObjectFilter),
}

impl ObjectSubject {
    fn matches(&self, object: &DerivedObject, ctx: &ConditionContext<'_>) -> bool {
        match self {
            ObjectSubject::This => object.id == ctx.source.id,
            ObjectSubject::Matching(filter) => filter.matches(object, &ctx.filter_context()),
        }
    }

    fn replace_subtype(&mut self, from: &Subtype, to: &Subtype) {
        if let ObjectSubject::Matching(filter) = self {
            filter.replace_subtype(from, to);
        }
    }
}

/// When a triggered ability triggers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerCondition {
    EntersBattlefield(ObjectSubject),
    /// Put into a graveyard from the battlefield.
    Dies(ObjectSubject),
    LeavesBattlefield(ObjectSubject),
    SpellCast { filter: ObjectFilter, caster: ControllerFilter },
    DealsDamage { subject: ObjectSubject, combat_only: bool },
    IsDealtDamage(ObjectSubject),
    LifeGained(ControllerFilter),
    BeginningOfStep { step: Step, whose: ControllerFilter },
    Attacks(ObjectSubject),
    CardDrawn(ControllerFilter),

    // === Combinators ===
    All(Vec<TriggerCondition>),
    Any(Vec<TriggerCondition>),
    Not(Box<TriggerCondition>),

    Always,
    Never,
}

impl TriggerCondition {
    /// "When this enters the battlefield".
    #[must_use]
    pub fn enters_self() -> Self {
        TriggerCondition::EntersBattlefield(ObjectSubject::This)
    }

    /// "When this dies".
    #[must_use]
    pub fn dies_self() -> Self {
        TriggerCondition::Dies(ObjectSubject::This)
    }

    /// "At the beginning of your upkeep".
    #[must_use]
    pub fn your_upkeep() -> Self {
        TriggerCondition::BeginningOfStep {
            step: Step::Upkeep,
            whose: ControllerFilter::You,
        }
    }

    /// Whether this condition looks at objects leaving the battlefield, and
    /// so must also be checked on the leaving object's last known
    /// information.
    #[must_use]
    pub fn looks_back(&self) -> bool {
        match self {
            TriggerCondition::Dies(_) | TriggerCondition::LeavesBattlefield(_) => true,
            TriggerCondition::All(cs) | TriggerCondition::Any(cs) => cs.iter().any(Self::looks_back),
            TriggerCondition::Not(c) => c.looks_back(),
            _ => false,
        }
    }

    /// Rewrite subtype words inside the condition's filters.
    pub fn replace_subtype(&mut self, from: &Subtype, to: &Subtype) {
        match self {
            TriggerCondition::EntersBattlefield(s)
            | TriggerCondition::Dies(s)
            | TriggerCondition::LeavesBattlefield(s)
            | TriggerCondition::IsDealtDamage(s)
            | TriggerCondition::Attacks(s)
            | TriggerCondition::DealsDamage { subject: s, .. } => s.replace_subtype(from, to),
            TriggerCondition::SpellCast { filter, .. } => filter.replace_subtype(from, to),
            TriggerCondition::All(cs) | TriggerCondition::Any(cs) => {
                for c in cs {
                    c.replace_subtype(from, to);
                }
            }
            TriggerCondition::Not(c) => c.replace_subtype(from, to),
            TriggerCondition::LifeGained(_)
            | TriggerCondition::BeginningOfStep { .. }
            | TriggerCondition::CardDrawn(_)
            | TriggerCondition::Always
            | TriggerCondition::Never => {}
        }
    }
}

/// The point of view a condition is evaluated from.
pub struct ConditionContext<'a> {
    /// The ability's source, current or last known.
    pub source: &'a DerivedObject,
    /// Derived view after the event.
    pub view: &'a DerivedView,
    pub active_player: PlayerId,
}

impl ConditionContext<'_> {
    fn controller(&self) -> PlayerId {
        self.source.controller
    }

    fn filter_context(&self) -> FilterContext {
        FilterContext::new(self.controller(), Some(self.source.id))
    }
}

/// Evaluates conditions against events.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Whether `condition` is met by `event`.
    #[must_use]
    pub fn evaluate(condition: &TriggerCondition, event: &GameEvent, ctx: &ConditionContext<'_>) -> bool {
        match condition {
            TriggerCondition::EntersBattlefield(subject) => event
                .entered_battlefield()
                .and_then(|r| ctx.view.get_ref(r))
                .is_some_and(|o| subject.matches(o, ctx)),
            TriggerCondition::Dies(subject) => event.died().is_some_and(|lki| subject.matches(lki, ctx)),
            TriggerCondition::LeavesBattlefield(subject) => event
                .left_battlefield()
                .is_some_and(|lki| subject.matches(lki, ctx)),
            TriggerCondition::SpellCast { filter, caster } => match event {
                GameEvent::SpellCast { spell, controller } => {
                    caster.matches(*controller, ctx.controller())
                        && ctx
                            .view
                            .get_ref(*spell)
                            .is_some_and(|o| filter.matches(o, &ctx.filter_context()))
                }
                _ => false,
            },
            TriggerCondition::DealsDamage { subject, combat_only } => match event {
                GameEvent::DamageDealt { source, combat, .. } => {
                    (*combat || !combat_only)
                        && ctx.view.get(*source).is_some_and(|o| subject.matches(o, ctx))
                }
                _ => false,
            },
            TriggerCondition::IsDealtDamage(subject) => match event {
                GameEvent::DamageDealt {
                    target: Target::Object(r),
                    ..
                } => ctx.view.get(r.id).is_some_and(|o| subject.matches(o, ctx)),
                _ => false,
            },
            TriggerCondition::LifeGained(whose) => match event {
                GameEvent::LifeGained { player, .. } => whose.matches(*player, ctx.controller()),
                _ => false,
            },
            TriggerCondition::BeginningOfStep { step, whose } => match event {
                GameEvent::StepBegan { step: began, active, .. } => {
                    began == step && whose.matches(*active, ctx.controller())
                }
                _ => false,
            },
            TriggerCondition::Attacks(subject) => match event {
                GameEvent::AttackerDeclared { attacker, .. } => ctx
                    .view
                    .get_ref(*attacker)
                    .is_some_and(|o| subject.matches(o, ctx)),
                _ => false,
            },
            TriggerCondition::CardDrawn(whose) => match event {
                GameEvent::CardDrawn { player, .. } => whose.matches(*player, ctx.controller()),
                _ => false,
            },
            TriggerCondition::All(cs) => cs.iter().all(|c| Self::evaluate(c, event, ctx)),
            TriggerCondition::Any(cs) => cs.iter().any(|c| Self::evaluate(c, event, ctx)),
            TriggerCondition::Not(c) => !Self::evaluate(c, event, ctx),
            TriggerCondition::Always => true,
            TriggerCondition::Never => false,
        }
    }
}
