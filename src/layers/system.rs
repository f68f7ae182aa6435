//! The layer computation.
//!
//! ## Algorithm
//!
//! 1. Every object starts from its copiable base values (printed values,
//!    or prototype values while a prototyped spell or permanent).
//! 2. For each [`LayerSlot`] in order:
//!    - static abilities are re-read from the partial view (a static ability
//!      that has already started applying keeps applying: lock-in);
//!    - the effects for this slot are gathered, characteristic-defining
//!      ones first, then ordered by dependency and timestamp;
//!    - each effect is resolved against the partial view and applied to the
//!      objects it affects. An effect's affected set is fixed the first
//!      time it applies.
//! 3. +1/+1 and -1/-1 counters apply at the start of layer 7c.
//!
//! Nothing is cached between calls; every query replays the layers from
//! the persisted base values.

use rustc_hash::FxHashMap;

use crate::cards::{
    Ability, Affects, CardRegistry, Characteristics, CounterKind, FilterContext, StaticAbility,
};
use crate::core::entity::{ObjectId, Timestamp};
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::zones::{Zone, ZoneKey};

use super::continuous::{ContinuousEffect, EffectId};
use super::dependency::{effect_depends_on, order_by_dependency};
use super::layer::{Layer, LayerSlot, PtSublayer};
use super::modification::Modification;
use super::view::{DerivedObject, DerivedView};

/// Computes derived characteristics.
pub struct LayerSystem;

impl LayerSystem {
    /// Derived view of every object in every zone.
    #[must_use]
    pub fn compute(state: &GameState, cards: &CardRegistry) -> DerivedView {
        let mut comp = Computation::start(state, cards);
        for slot in LayerSlot::ALL {
            comp.run_slot(slot, state);
        }
        comp.finish()
    }

    /// Derived characteristics of one object.
    #[must_use]
    pub fn characteristics(
        state: &GameState,
        cards: &CardRegistry,
        id: ObjectId,
    ) -> Option<Characteristics> {
        Self::compute(state, cards)
            .get(id)
            .map(|o| o.characteristics.clone())
    }

    /// Copiable values of one object: its base values as modified by copy
    /// effects only.
    #[must_use]
    pub fn copiable_values(state: &GameState, cards: &CardRegistry, id: ObjectId) -> Option<Characteristics> {
        let mut comp = Computation::start(state, cards);
        comp.run_slot(LayerSlot::layer(Layer::Copy), state);
        comp.finish().get(id).map(|o| o.characteristics.clone())
    }
}

/// Where an effect being applied came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Origin {
    Stored(EffectId),
    Static { instance: usize, effect: usize },
}

/// One effect competing for application in the current slot.
#[derive(Clone, Debug)]
pub(crate) struct Candidate {
    pub origin: Origin,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub timestamp: Timestamp,
    pub slot: LayerSlot,
    pub characteristic_defining: bool,
    pub modification: Modification,
}

/// A static ability seen during this computation.
#[derive(Clone, Debug)]
struct StaticInstance {
    source: ObjectId,
    controller: PlayerId,
    timestamp: Timestamp,
    ability: StaticAbility,
    /// Has applied in some earlier slot; keeps applying from now on.
    started: bool,
    /// Affected sets fixed when each scope first applied.
    affected: Vec<(Affects, Vec<ObjectId>)>,
}

/// State of one layer computation.
pub(crate) struct Computation<'s> {
    view: DerivedView,
    stored: Vec<&'s ContinuousEffect>,
    instances: Vec<StaticInstance>,
}

impl<'s> Computation<'s> {
    fn start(state: &'s GameState, cards: &CardRegistry) -> Self {
        let mut objects = FxHashMap::default();
        for (id, obj) in state.objects.iter() {
            let Some(zone) = state.zones.zone_of(*id) else {
                continue;
            };
            let Some(definition) = cards.get(obj.card) else {
                log::warn!("{} refers to unregistered card {}", id, obj.card);
                continue;
            };
            let derived = DerivedObject {
                id: *id,
                zcc: obj.zcc,
                zone,
                owner: obj.owner,
                controller: obj.controller,
                token: obj.token,
                timestamp: obj.timestamp,
                characteristics: obj.base_characteristics(definition, zone.zone),
            };
            objects.insert(*id, derived);
        }
        let battlefield = state
            .zones
            .contents(ZoneKey::BATTLEFIELD)
            .filter(|id| objects.contains_key(id))
            .collect();

        Self {
            view: DerivedView::from_parts(objects, battlefield),
            stored: state.effects.iter().collect(),
            instances: Vec::new(),
        }
    }

    fn finish(self) -> DerivedView {
        self.view
    }

    pub(crate) fn view(&self) -> &DerivedView {
        &self.view
    }

    fn run_slot(&mut self, slot: LayerSlot, state: &GameState) {
        self.refresh_statics();

        if slot == LayerSlot::pt(PtSublayer::Modify) {
            self.apply_counters(state);
        }

        let candidates = self.candidates(slot);
        if candidates.is_empty() {
            return;
        }

        let mut order = Vec::with_capacity(candidates.len());
        for cda in [true, false] {
            let group: Vec<&Candidate> = candidates
                .iter()
                .filter(|c| c.characteristic_defining == cda)
                .collect();
            let timestamps: Vec<(Timestamp, ObjectId)> =
                group.iter().map(|c| (c.timestamp, c.source)).collect();
            let sorted = order_by_dependency(&timestamps, |i, j| {
                effect_depends_on(self, group[i], group[j])
            });
            order.extend(sorted.into_iter().map(|i| group[i].clone()));
        }

        if order.len() > 1 {
            log::debug!(
                "layer {}: applying {:?}",
                slot,
                order.iter().map(|c| c.origin).collect::<Vec<_>>()
            );
        }
        for candidate in &order {
            self.apply(candidate);
        }
    }

    /// Re-read static abilities from the partial view.
    fn refresh_statics(&mut self) {
        let mut present: Vec<(ObjectId, PlayerId, Timestamp, StaticAbility)> = Vec::new();
        for obj in self.view.battlefield() {
            for ability in &obj.characteristics.abilities {
                if let Ability::Static(s) = ability {
                    if !s.characteristic_defining {
                        present.push((obj.id, obj.controller, obj.timestamp, s.clone()));
                    }
                }
            }
        }
        let mut all: Vec<&DerivedObject> = self.view.iter().collect();
        all.sort_by_key(|o| o.id);
        for obj in all {
            for ability in &obj.characteristics.abilities {
                if let Ability::Static(s) = ability {
                    if s.characteristic_defining {
                        present.push((obj.id, obj.controller, obj.timestamp, s.clone()));
                    }
                }
            }
        }

        let mut keep = vec![false; self.instances.len()];
        let mut fresh = Vec::new();
        for (source, controller, timestamp, ability) in present {
            let existing = self.instances.iter().enumerate().position(|(i, inst)| {
                !keep[i] && inst.source == source && inst.ability == ability
            });
            match existing {
                Some(i) => {
                    keep[i] = true;
                    self.instances[i].controller = controller;
                }
                None => fresh.push(StaticInstance {
                    source,
                    controller,
                    timestamp,
                    ability,
                    started: false,
                    affected: Vec::new(),
                }),
            }
        }

        let mut idx = 0;
        self.instances.retain(|inst| {
            let retained = keep[idx] || inst.started;
            idx += 1;
            retained
        });
        self.instances.extend(fresh);
    }

    fn apply_counters(&mut self, state: &GameState) {
        let ids: Vec<ObjectId> = self.view.battlefield_ids().to_vec();
        for id in ids {
            let Some(obj) = state.objects.get(&id) else { continue };
            let delta = obj.counter(CounterKind::PlusOne) as i32 - obj.counter(CounterKind::MinusOne) as i32;
            if delta == 0 {
                continue;
            }
            if let Some(derived) = self.view.get_mut(id) {
                let chars = &mut derived.characteristics;
                chars.power = chars.power.map(|p| p + delta);
                chars.toughness = chars.toughness.map(|t| t + delta);
            }
        }
    }

    fn candidates(&self, slot: LayerSlot) -> Vec<Candidate> {
        let mut out = Vec::new();
        for effect in &self.stored {
            if effect.modification.slot(false) == slot {
                out.push(Candidate {
                    origin: Origin::Stored(effect.id),
                    source: effect.source,
                    controller: effect.controller,
                    timestamp: effect.timestamp,
                    slot,
                    characteristic_defining: false,
                    modification: effect.modification.clone(),
                });
            }
        }
        for (i, inst) in self.instances.iter().enumerate() {
            let cda = inst.ability.characteristic_defining;
            for (j, effect) in inst.ability.effects.iter().enumerate() {
                if effect.modification.slot(cda) == slot {
                    out.push(Candidate {
                        origin: Origin::Static {
                            instance: i,
                            effect: j,
                        },
                        source: inst.source,
                        controller: inst.controller,
                        timestamp: inst.timestamp,
                        slot,
                        characteristic_defining: cda,
                        modification: effect.modification.clone(),
                    });
                }
            }
        }
        out
    }

    /// Whether the effect still exists in `view`.
    pub(crate) fn exists(&self, candidate: &Candidate, view: &DerivedView) -> bool {
        match candidate.origin {
            Origin::Stored(_) => true,
            Origin::Static { instance, .. } => {
                let inst = &self.instances[instance];
                inst.started
                    || view.get(inst.source).is_some_and(|source| {
                        source
                            .characteristics
                            .abilities
                            .iter()
                            .any(|a| matches!(a, Ability::Static(s) if *s == inst.ability))
                    })
            }
        }
    }

    /// Objects the effect applies to in `view`.
    pub(crate) fn affected(&self, candidate: &Candidate, view: &DerivedView) -> Vec<ObjectId> {
        match candidate.origin {
            Origin::Stored(id) => self
                .stored
                .iter()
                .find(|e| e.id == id)
                .map(|e| {
                    e.affected
                        .iter()
                        .filter_map(|r| view.get_ref(*r).map(|o| o.id))
                        .collect()
                })
                .unwrap_or_default(),
            Origin::Static { instance, effect } => {
                let inst = &self.instances[instance];
                let scope = &inst.ability.effects[effect].affects;
                if let Some((_, fixed)) = inst.affected.iter().find(|(a, _)| a == scope) {
                    return fixed.clone();
                }
                match scope {
                    Affects::Source => {
                        if view.get(inst.source).is_some() {
                            vec![inst.source]
                        } else {
                            Vec::new()
                        }
                    }
                    Affects::Filter(filter) => {
                        let ctx = FilterContext::new(inst.controller, Some(inst.source));
                        view.matching(filter, &ctx).map(|o| o.id).collect()
                    }
                }
            }
        }
    }

    /// Apply `candidate` to an arbitrary view without recording anything.
    pub(crate) fn apply_to(&self, candidate: &Candidate, view: &mut DerivedView) {
        let targets = self.affected(candidate, view);
        let ctx = FilterContext::new(candidate.controller, Some(candidate.source));
        let resolved = candidate.modification.resolve(view, &ctx);
        for id in targets {
            if let Some(obj) = view.get_mut(id) {
                resolved.apply(obj);
            }
        }
    }

    fn apply(&mut self, candidate: &Candidate) {
        if !self.exists(candidate, &self.view) {
            return;
        }
        let targets = self.affected(candidate, &self.view);
        if let Origin::Static { instance, effect } = candidate.origin {
            let inst = &mut self.instances[instance];
            inst.started = true;
            let scope = inst.ability.effects[effect].affects.clone();
            if !inst.affected.iter().any(|(a, _)| *a == scope) {
                inst.affected.push((scope, targets.clone()));
            }
        }

        let ctx = FilterContext::new(candidate.controller, Some(candidate.source));
        let resolved = candidate.modification.resolve(&self.view, &ctx);
        for id in targets {
            if let Some(obj) = self.view.get_mut(id) {
                if obj.zone.zone != Zone::Battlefield
                    && !candidate.characteristic_defining
                    && matches!(candidate.origin, Origin::Static { .. })
                {
                    continue;
                }
                resolved.apply(obj);
            }
        }
    }
}
