//! Trigger registry.
//!
//! Printed and granted triggered abilities are not registered anywhere:
//! they are read from the derived view on every event, so an ability
//! granted or removed by a continuous effect triggers (or stops triggering)
//! immediately. The registry stores the rest: delayed triggers created by
//! resolving spells and abilities.
//!
//! ## Ordering
//!
//! [`TriggerRegistry::apnap_groups`] groups pending triggers by controller,
//! active player first and the others in turn order. Each group goes on the
//! stack in the order its controller picks, so the active player's triggers
//! end up lowest and resolve last.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::cards::{Ability, Characteristics};
use crate::core::entity::{ObjectId, ObjectRef};
use crate::core::player::{apnap_order, PlayerId};
use crate::effects::{Effect, TargetSpec};
use crate::layers::{DerivedObject, DerivedView, Duration};
use crate::zones::ZoneKey;

use super::condition::{ConditionContext, ConditionEvaluator, TriggerCondition};
use super::event::GameEvent;

/// Identifier of a delayed trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriggerId(pub u32);

impl TriggerId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TriggerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Trigger({})", self.0)
    }
}

/// How long a delayed trigger created by an effect lasts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerLifetime {
    /// For the rest of the game, or until its uses run out.
    #[default]
    Game,
    /// "This turn".
    ThisTurn,
    /// As long as the creating object stays on the battlefield.
    WhileSourceOnBattlefield,
}

/// A trigger not printed on any object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DelayedTrigger {
    pub id: TriggerId,
    /// The object whose ability created this trigger.
    pub source: ObjectId,
    pub controller: PlayerId,
    pub condition: TriggerCondition,
    pub effects: Vec<Effect>,
    pub enabled: bool,
    /// How many more times it can fire. `None` = unlimited.
    pub uses_remaining: Option<u32>,
    pub duration: Duration,
}

impl DelayedTrigger {
    /// An enabled trigger with unlimited uses; the registry assigns its id.
    #[must_use]
    pub fn new(source: ObjectId, controller: PlayerId, condition: TriggerCondition, effects: Vec<Effect>) -> Self {
        Self {
            id: TriggerId(0),
            source,
            controller,
            condition,
            effects,
            enabled: true,
            uses_remaining: None,
            duration: Duration::Indefinite,
        }
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn with_uses(mut self, uses: u32) -> Self {
        self.uses_remaining = Some(uses);
        self
    }

    #[must_use]
    pub fn can_fire(&self) -> bool {
        self.enabled && self.uses_remaining.map_or(true, |u| u > 0)
    }

    fn use_trigger(&mut self) {
        if let Some(uses) = self.uses_remaining.as_mut() {
            *uses = uses.saturating_sub(1);
        }
    }
}

/// Where a pending trigger came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerOrigin {
    /// The `index`th ability of the source, as derived when it triggered.
    Ability { index: usize },
    Delayed(TriggerId),
}

/// A triggered ability waiting to be put on the stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingTrigger {
    pub source: ObjectId,
    pub controller: PlayerId,
    pub origin: TriggerOrigin,
    pub targets: Vec<TargetSpec>,
    pub effects: Vec<Effect>,
    /// The object the event was about, if any.
    pub triggering: Option<ObjectRef>,
    pub event: GameEvent,
}

/// Delayed triggers of a game, and trigger collection.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TriggerRegistry {
    delayed: Vector<DelayedTrigger>,
    next_id: u32,
}

impl TriggerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a delayed trigger and return its id.
    pub fn register(&mut self, mut trigger: DelayedTrigger) -> TriggerId {
        let id = TriggerId::new(self.next_id);
        self.next_id += 1;
        trigger.id = id;
        self.delayed.push_back(trigger);
        id
    }

    pub fn remove(&mut self, id: TriggerId) -> Option<DelayedTrigger> {
        let idx = self.delayed.iter().position(|t| t.id == id)?;
        Some(self.delayed.remove(idx))
    }

    /// Cleanup: "this turn" triggers end. Returns how many.
    pub fn end_turn(&mut self) -> usize {
        let before = self.delayed.len();
        self.delayed
            .retain(|t| !matches!(t.duration, Duration::EndOfTurn | Duration::EndOfCombat));
        before - self.delayed.len()
    }

    /// Drop triggers tied to an object that has left the battlefield.
    pub fn prune(&mut self, on_battlefield: impl Fn(ObjectRef) -> bool) -> usize {
        let before = self.delayed.len();
        self.delayed.retain(|t| match t.duration {
            Duration::WhileOnBattlefield(r) => on_battlefield(r),
            _ => true,
        });
        before - self.delayed.len()
    }

    pub fn set_enabled(&mut self, id: TriggerId, enabled: bool) -> bool {
        match self.delayed.iter_mut().find(|t| t.id == id) {
            Some(t) => {
                t.enabled = enabled;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn get(&self, id: TriggerId) -> Option<&DelayedTrigger> {
        self.delayed.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.delayed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.delayed.is_empty()
    }

    /// Find every ability that triggers on `event`.
    ///
    /// Battlefield objects are checked as they are after the event. For an
    /// object leaving the battlefield, its last known abilities are checked
    /// too ("when this dies"). Delayed triggers use up one use per firing;
    /// exhausted ones are removed.
    pub fn collect(&mut self, event: &GameEvent, view: &DerivedView, active_player: PlayerId) -> Vec<PendingTrigger> {
        let triggering = triggering_object(event, view);
        let mut pending = Vec::new();

        let mut check = |source: &DerivedObject, looking_back: bool| {
            let ctx = ConditionContext {
                source,
                view,
                active_player,
            };
            for (index, ability) in source.characteristics.abilities.iter().enumerate() {
                let Ability::Triggered(t) = ability else { continue };
                if looking_back && !t.condition.looks_back() {
                    continue;
                }
                if ConditionEvaluator::evaluate(&t.condition, event, &ctx) {
                    pending.push(PendingTrigger {
                        source: source.id,
                        controller: source.controller,
                        origin: TriggerOrigin::Ability { index },
                        targets: t.targets.clone(),
                        effects: t.effects.clone(),
                        triggering,
                        event: event.clone(),
                    });
                }
            }
        };

        for object in view.battlefield() {
            check(object, false);
        }
        if let Some(lki) = event.left_battlefield() {
            if view.get(lki.id).map_or(true, |o| !o.is_on_battlefield()) {
                check(lki, true);
            }
        }

        for trigger in self.delayed.iter_mut() {
            if !trigger.can_fire() {
                continue;
            }
            let mut source = view.get(trigger.source).cloned().unwrap_or_else(|| {
                DerivedObject::new(trigger.source, trigger.controller, ZoneKey::EXILE, Characteristics::named(""))
            });
            source.controller = trigger.controller;
            let ctx = ConditionContext {
                source: &source,
                view,
                active_player,
            };
            if ConditionEvaluator::evaluate(&trigger.condition, event, &ctx) {
                trigger.use_trigger();
                pending.push(PendingTrigger {
                    source: trigger.source,
                    controller: trigger.controller,
                    origin: TriggerOrigin::Delayed(trigger.id),
                    targets: Vec::new(),
                    effects: trigger.effects.clone(),
                    triggering,
                    event: event.clone(),
                });
            }
        }
        self.delayed.retain(|t| t.uses_remaining != Some(0));

        if !pending.is_empty() {
            log::trace!("{} trigger(s) on {}", pending.len(), event.kind());
        }
        pending
    }

    /// Group pending triggers by controller in APNAP order. Triggers keep
    /// their collection order within a group.
    #[must_use]
    pub fn apnap_groups(
        pending: Vec<PendingTrigger>,
        active_player: PlayerId,
        player_count: usize,
    ) -> Vec<(PlayerId, Vec<PendingTrigger>)> {
        let mut groups: Vec<(PlayerId, Vec<PendingTrigger>)> = apnap_order(active_player, player_count)
            .into_iter()
            .map(|p| (p, Vec::new()))
            .collect();
        for trigger in pending {
            if let Some((_, group)) = groups.iter_mut().find(|(p, _)| *p == trigger.controller) {
                group.push(trigger);
            }
        }
        groups.retain(|(_, g)| !g.is_empty());
        groups
    }
}

fn triggering_object(event: &GameEvent, view: &DerivedView) -> Option<ObjectRef> {
    match event {
        GameEvent::ZoneChanged { object, .. } | GameEvent::Created { object } => Some(*object),
        GameEvent::DamageDealt { source, .. } => view.get(*source).map(DerivedObject::object_ref),
        GameEvent::SpellCast { spell, .. } => Some(*spell),
        GameEvent::AttackerDeclared { attacker, .. } => Some(*attacker),
        GameEvent::BlockerDeclared { blocker, .. } => Some(*blocker),
        GameEvent::CardDrawn { card, .. } => view.get(*card).map(DerivedObject::object_ref),
        _ => None,
    }
}
