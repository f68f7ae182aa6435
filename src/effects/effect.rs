//! Effect definitions.
//!
//! Effects are the one-shot instructions carried by spells, activated
//! abilities and triggered abilities. They are plain data; the
//! [`EffectResolver`](super::EffectResolver) gives them meaning against a
//! running game.
//!
//! ## Referring to things
//!
//! - [`EffectTarget`]: an object, by target index or relative to the
//!   resolving ability (its source, the object that triggered it).
//! - [`PlayerRef`]: one or more players relative to the resolving ability.
//!
//! ## Composite effects
//!
//! - `Sequence`: execute effects in order
//! - `Conditional`: branch on how the spell was cast
//! - `DoUnless`: a player may pay a cost to stop the effect ("punisher")

use serde::{Deserialize, Serialize};

use crate::cards::{CardId, CounterKind, ManaCost, ManaKind, ObjectFilter};
use crate::layers::{Duration, Modification, Value};
use crate::replacement::ReplacementKind;
use crate::triggers::{TriggerCondition, TriggerLifetime};

/// An object an effect acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectTarget {
    /// The object or player chosen for target slot `n`.
    Target(usize),
    /// The object the ability belongs to.
    Source,
    /// The object whose event triggered the ability.
    TriggeringObject,
}

impl EffectTarget {
    fn target_index(self) -> Option<usize> {
        match self {
            EffectTarget::Target(i) => Some(i),
            _ => None,
        }
    }
}

/// Players an effect acts on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerRef {
    /// The controller of the resolving spell or ability.
    Controller,
    /// The player chosen for target slot `n`.
    Target(usize),
    /// The controller of the object chosen for target slot `n`.
    TargetController(usize),
    EachOpponent,
    EachPlayer,
    ActivePlayer,
}

impl PlayerRef {
    fn target_index(self) -> Option<usize> {
        match self {
            PlayerRef::Target(i) | PlayerRef::TargetController(i) => Some(i),
            _ => None,
        }
    }
}

/// Something a player may do to stop an "unless" effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum UnlessCost {
    /// Sacrifice a permanent matching the filter.
    Sacrifice(ObjectFilter),
    PayLife(u32),
    PayMana(ManaCost),
}

/// A fact about how the resolving spell was cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectCondition {
    AdditionalCostPaid,
    Prototyped,
}

/// A one-shot game instruction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    // === Damage and life ===
    /// Deal damage to an object or player. Damage to a target slot holding a
    /// player hits that player.
    DealDamage { amount: Value, to: EffectTarget },

    /// Deal damage to each referenced player.
    DamagePlayers { amount: Value, players: PlayerRef },

    GainLife { amount: Value, player: PlayerRef },

    LoseLife { amount: Value, player: PlayerRef },

    // === Cards and zones ===
    DrawCards { count: u32, player: PlayerRef },

    Destroy(EffectTarget),

    Exile(EffectTarget),

    ReturnToHand(EffectTarget),

    /// Exile an object, then return it to the battlefield under its owner's
    /// control as a new object.
    Blink(EffectTarget),

    /// Each referenced player sacrifices a permanent matching the filter.
    Sacrifice { players: PlayerRef, filter: ObjectFilter },

    /// Counter a spell on the stack.
    CounterSpell(EffectTarget),

    /// Create tokens from a token definition.
    CreateTokens { card: CardId, count: u32, player: PlayerRef },

    // === Permanent state ===
    AddCounters { kind: CounterKind, count: u32, to: EffectTarget },

    Tap(EffectTarget),

    Untap(EffectTarget),

    AddMana { kind: ManaKind, amount: u32 },

    // === Lasting effects ===
    /// Create a continuous effect on one object.
    ApplyContinuous {
        to: EffectTarget,
        modification: Modification,
        duration: Duration,
    },

    /// Create a continuous effect on every permanent matching the filter
    /// now. Permanents that match later are not affected.
    ApplyToAll {
        filter: ObjectFilter,
        modification: Modification,
        duration: Duration,
    },

    /// The source becomes a copy of another object. Copiable values are
    /// taken when the effect resolves.
    BecomeCopy { of: EffectTarget, duration: Duration },

    /// Create a replacement or prevention effect.
    CreateReplacement { kind: ReplacementKind, duration: Duration },

    /// Set up a trigger that is not printed on any object.
    CreateDelayedTrigger {
        condition: TriggerCondition,
        effects: Vec<Effect>,
        /// `None` for no limit.
        uses: Option<u32>,
        lifetime: TriggerLifetime,
    },

    // === Composite ===
    Sequence(Vec<Effect>),

    Conditional {
        condition: EffectCondition,
        then: Box<Effect>,
        otherwise: Option<Box<Effect>>,
    },

    /// Perform `effect` unless `player` pays `cost`.
    DoUnless {
        effect: Box<Effect>,
        player: PlayerRef,
        cost: UnlessCost,
    },
}

impl Effect {
    /// Deal damage.
    #[must_use]
    pub fn damage(amount: Value, to: EffectTarget) -> Self {
        Effect::DealDamage { amount, to }
    }

    #[must_use]
    pub fn gain_life(amount: i32) -> Self {
        Effect::GainLife {
            amount: Value::Fixed(amount),
            player: PlayerRef::Controller,
        }
    }

    #[must_use]
    pub fn draw(count: u32) -> Self {
        Effect::DrawCards {
            count,
            player: PlayerRef::Controller,
        }
    }

    /// Target slot `n` gets the modification until end of turn.
    #[must_use]
    pub fn until_end_of_turn(target: usize, modification: Modification) -> Self {
        Effect::ApplyContinuous {
            to: EffectTarget::Target(target),
            modification,
            duration: Duration::EndOfTurn,
        }
    }

    #[must_use]
    pub fn unless(self, player: PlayerRef, cost: UnlessCost) -> Self {
        Effect::DoUnless {
            effect: Box::new(self),
            player,
            cost,
        }
    }

    /// Highest target slot this effect refers to.
    #[must_use]
    pub fn max_target_index(&self) -> Option<usize> {
        match self {
            Effect::DealDamage { to, .. }
            | Effect::Destroy(to)
            | Effect::Exile(to)
            | Effect::ReturnToHand(to)
            | Effect::Blink(to)
            | Effect::CounterSpell(to)
            | Effect::AddCounters { to, .. }
            | Effect::Tap(to)
            | Effect::Untap(to)
            | Effect::BecomeCopy { of: to, .. }
            | Effect::ApplyContinuous { to, .. } => to.target_index(),
            Effect::DamagePlayers { players: player, .. }
            | Effect::GainLife { player, .. }
            | Effect::LoseLife { player, .. }
            | Effect::DrawCards { player, .. }
            | Effect::Sacrifice { players: player, .. }
            | Effect::CreateTokens { player, .. } => player.target_index(),
            Effect::AddMana { .. }
            | Effect::ApplyToAll { .. }
            | Effect::CreateReplacement { .. }
            | Effect::CreateDelayedTrigger { .. } => None,
            Effect::Sequence(effects) => effects.iter().filter_map(Effect::max_target_index).max(),
            Effect::Conditional { then, otherwise, .. } => {
                let other = otherwise.as_ref().and_then(|e| e.max_target_index());
                then.max_target_index().max(other)
            }
            Effect::DoUnless { effect, player, .. } => effect.max_target_index().max(player.target_index()),
        }
    }
}
