//! Replacement and prevention effects.
//!
//! A replacement effect watches for an event that is about to happen and
//! changes it ("if damage would be dealt, prevent it"; "if a card would be
//! put into a graveyard, exile it instead"). Effects created by resolving
//! spells live in the [`ReplacementStore`] until their duration ends;
//! replacement abilities of permanents are read from the derived view.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::cards::{ControllerFilter, CounterKind, FilterContext, ObjectFilter, Subtype};
use crate::core::entity::{ObjectId, ObjectRef, Target, Timestamp};
use crate::core::player::PlayerId;
use crate::layers::{DerivedView, Duration};
use crate::zones::ZoneKey;

/// An event that replacement effects may modify.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplaceableEvent {
    Damage {
        source: ObjectId,
        target: Target,
        amount: u32,
        combat: bool,
    },
    GainLife { player: PlayerId, amount: u32 },
    LoseLife { player: PlayerId, amount: u32 },
    ZoneChange {
        object: ObjectId,
        from: ZoneKey,
        to: ZoneKey,
        /// Enters the battlefield tapped.
        tapped: bool,
        /// Enters the battlefield with these counters.
        counters: Vec<(CounterKind, u32)>,
    },
    Draw { player: PlayerId },
}

impl ReplaceableEvent {
    /// A plain zone change.
    #[must_use]
    pub fn zone_change(object: ObjectId, from: ZoneKey, to: ZoneKey) -> Self {
        ReplaceableEvent::ZoneChange {
            object,
            from,
            to,
            tapped: false,
            counters: Vec::new(),
        }
    }

    /// The player who chooses among competing replacements: the player
    /// affected, or the controller of the object affected.
    #[must_use]
    pub fn affected_player(&self, view: &DerivedView) -> Option<PlayerId> {
        match self {
            ReplaceableEvent::Damage { target, .. } => match target {
                Target::Player(p) => Some(*p),
                Target::Object(r) => view.get(r.id).map(|o| o.controller),
            },
            ReplaceableEvent::GainLife { player, .. }
            | ReplaceableEvent::LoseLife { player, .. }
            | ReplaceableEvent::Draw { player } => Some(*player),
            ReplaceableEvent::ZoneChange { object, .. } => view.get(*object).map(|o| o.controller),
        }
    }
}

/// Who a damage filter accepts as the recipient.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecipientFilter {
    #[default]
    Any,
    Player(ControllerFilter),
    Permanent(ObjectFilter),
    /// One specific object.
    Object(ObjectRef),
}

/// Which damage events a damage replacement applies to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DamageFilter {
    pub combat_only: bool,
    /// The source must match; `None` accepts any source.
    pub source: Option<ObjectFilter>,
    pub recipient: RecipientFilter,
}

impl DamageFilter {
    /// Any damage.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn combat() -> Self {
        Self {
            combat_only: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_sources(mut self, filter: ObjectFilter) -> Self {
        self.source = Some(filter);
        self
    }

    #[must_use]
    pub fn to(mut self, recipient: RecipientFilter) -> Self {
        self.recipient = recipient;
        self
    }

    /// Whether a damage event matches, seen from `ctx`.
    #[must_use]
    pub fn matches(
        &self,
        source: ObjectId,
        target: &Target,
        combat: bool,
        view: &DerivedView,
        ctx: &FilterContext,
    ) -> bool {
        if self.combat_only && !combat {
            return false;
        }
        if let Some(filter) = &self.source {
            if !view.get(source).is_some_and(|o| filter.matches(o, ctx)) {
                return false;
            }
        }
        match (&self.recipient, target) {
            (RecipientFilter::Any, _) => true,
            (RecipientFilter::Player(whose), Target::Player(p)) => whose.matches(*p, ctx.you),
            (RecipientFilter::Permanent(filter), Target::Object(r)) => {
                view.get(r.id).is_some_and(|o| filter.matches(o, ctx))
            }
            (RecipientFilter::Object(expected), Target::Object(r)) => expected == r,
            _ => false,
        }
    }

    fn replace_subtype(&mut self, from: &Subtype, to: &Subtype) {
        if let Some(filter) = &mut self.source {
            filter.replace_subtype(from, to);
        }
        if let RecipientFilter::Permanent(filter) = &mut self.recipient {
            filter.replace_subtype(from, to);
        }
    }
}

/// How much damage a prevention effect can still prevent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shield {
    /// The next N damage.
    Amount(u32),
    /// All of it, for the effect's duration.
    All,
}

/// What a replacement effect does.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplacementKind {
    PreventDamage { filter: DamageFilter, shield: Shield },
    MultiplyDamage { filter: DamageFilter, factor: u32 },
    /// A card matching the filter that would be put into a graveyard is
    /// exiled instead.
    ExileInsteadOfGraveyard(ObjectFilter),
    EntersWithCounters {
        filter: ObjectFilter,
        kind: CounterKind,
        count: u32,
    },
    EntersTapped(ObjectFilter),
    /// A matching player who would draw gains life instead.
    DrawBecomesLifeGain { player: ControllerFilter, amount: u32 },
    MultiplyLifeGain { player: ControllerFilter, factor: u32 },
}

impl ReplacementKind {
    /// Prevent the next `amount` damage matching the filter.
    #[must_use]
    pub fn prevent(filter: DamageFilter, amount: u32) -> Self {
        ReplacementKind::PreventDamage {
            filter,
            shield: Shield::Amount(amount),
        }
    }

    /// Prevent all damage matching the filter.
    #[must_use]
    pub fn prevent_all(filter: DamageFilter) -> Self {
        ReplacementKind::PreventDamage {
            filter,
            shield: Shield::All,
        }
    }

    pub fn replace_subtype(&mut self, from: &Subtype, to: &Subtype) {
        match self {
            ReplacementKind::PreventDamage { filter, .. } | ReplacementKind::MultiplyDamage { filter, .. } => {
                filter.replace_subtype(from, to);
            }
            ReplacementKind::ExileInsteadOfGraveyard(filter)
            | ReplacementKind::EntersTapped(filter)
            | ReplacementKind::EntersWithCounters { filter, .. } => filter.replace_subtype(from, to),
            ReplacementKind::DrawBecomesLifeGain { .. } | ReplacementKind::MultiplyLifeGain { .. } => {}
        }
    }
}

/// Identifier of a stored replacement effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReplacementId(pub u32);

/// A replacement effect created by a resolved spell or ability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplacementEffect {
    pub id: ReplacementId,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub timestamp: Timestamp,
    pub duration: Duration,
    pub kind: ReplacementKind,
}

impl ReplacementEffect {
    /// Build an effect; the store assigns its id.
    #[must_use]
    pub fn new(
        source: ObjectId,
        controller: PlayerId,
        timestamp: Timestamp,
        duration: Duration,
        kind: ReplacementKind,
    ) -> Self {
        Self {
            id: ReplacementId(0),
            source,
            controller,
            timestamp,
            duration,
            kind,
        }
    }
}

/// Stored replacement effects of a game.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReplacementStore {
    effects: Vector<ReplacementEffect>,
    next_id: u32,
}

impl ReplacementStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mut effect: ReplacementEffect) -> ReplacementId {
        let id = ReplacementId(self.next_id);
        self.next_id += 1;
        effect.id = id;
        log::debug!("replacement effect {:?} from {}: {:?}", id, effect.source, effect.kind);
        self.effects.push_back(effect);
        id
    }

    pub fn remove(&mut self, id: ReplacementId) -> Option<ReplacementEffect> {
        let idx = self.effects.iter().position(|e| e.id == id)?;
        Some(self.effects.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: ReplacementId) -> Option<&ReplacementEffect> {
        self.effects.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReplacementEffect> {
        self.effects.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Use up `amount` of a prevention shield. An exhausted shield is
    /// removed. Returns the shield left, if the effect still exists.
    pub fn consume_shield(&mut self, id: ReplacementId, amount: u32) -> Option<u32> {
        let idx = self.effects.iter().position(|e| e.id == id)?;
        let left = match &mut self.effects.get_mut(idx)?.kind {
            ReplacementKind::PreventDamage {
                shield: Shield::Amount(n),
                ..
            } => {
                *n = n.saturating_sub(amount);
                *n
            }
            _ => return None,
        };
        if left == 0 {
            self.effects.remove(idx);
        }
        Some(left)
    }

    /// Cleanup: "this turn" effects end.
    pub fn end_turn(&mut self) -> usize {
        let before = self.effects.len();
        self.effects
            .retain(|e| !matches!(e.duration, Duration::EndOfTurn | Duration::EndOfCombat));
        before - self.effects.len()
    }

    pub fn end_combat(&mut self) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| e.duration != Duration::EndOfCombat);
        before - self.effects.len()
    }

    /// Drop effects whose duration was tied to an object that left the
    /// battlefield.
    pub fn prune(&mut self, on_battlefield: impl Fn(ObjectRef) -> bool) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| match e.duration {
            Duration::WhileOnBattlefield(r) => on_battlefield(r),
            _ => true,
        });
        before - self.effects.len()
    }
}
