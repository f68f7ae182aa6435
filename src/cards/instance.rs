//! Game objects: cards, tokens and spells in a game.
//!
//! `GameObject` tracks the runtime state of one object: who owns and
//! controls it, its zone-change counter and timestamp, status (tapped,
//! summoning sick), marked damage, counters, and how it was cast.
//!
//! Characteristics are *not* stored here. The printed values come from the
//! object's [`CardDefinition`]; the layer system derives everything else on
//! every query.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::action::CastOptions;
use crate::core::entity::{ObjectId, ObjectRef, Timestamp};
use crate::core::player::PlayerId;
use crate::zones::Zone;

use super::characteristics::Characteristics;
use super::definition::{CardDefinition, CardId};

/// Kinds of counter that can be placed on objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CounterKind {
    /// +1/+1
    PlusOne,
    /// -1/-1
    MinusOne,
    Charge,
}

/// A card, token or spell in a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameObject {
    pub id: ObjectId,
    pub card: CardId,
    pub owner: PlayerId,
    /// Controller before control-changing effects.
    pub controller: PlayerId,
    /// Incremented on every zone change.
    pub zcc: u32,
    /// When the object entered its current zone.
    pub timestamp: Timestamp,
    pub token: bool,
    pub tapped: bool,
    pub summoning_sick: bool,
    pub damage: u32,
    /// Dealt damage by a source with deathtouch since the last cleanup.
    pub deathtouch_damage: bool,
    pub counters: BTreeMap<CounterKind, u32>,
    pub cast: CastOptions,
}

impl GameObject {
    #[must_use]
    pub fn new(id: ObjectId, card: CardId, owner: PlayerId, timestamp: Timestamp) -> Self {
        Self {
            id,
            card,
            owner,
            controller: owner,
            zcc: 0,
            timestamp,
            token: false,
            tapped: false,
            summoning_sick: false,
            damage: 0,
            deathtouch_damage: false,
            counters: BTreeMap::new(),
            cast: CastOptions::default(),
        }
    }

    /// A weak reference to the object as it is now.
    #[must_use]
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.id, self.zcc)
    }

    /// Whether a reference taken at zone-change counter `zcc` still names
    /// this object.
    #[must_use]
    pub fn is_current(&self, zcc: u32) -> bool {
        self.zcc == zcc
    }

    #[must_use]
    pub fn counter(&self, kind: CounterKind) -> u32 {
        self.counters.get(&kind).copied().unwrap_or(0)
    }

    pub fn add_counters(&mut self, kind: CounterKind, count: u32) {
        if count > 0 {
            *self.counters.entry(kind).or_insert(0) += count;
        }
    }

    /// Remove up to `count` counters. Returns how many were removed.
    pub fn remove_counters(&mut self, kind: CounterKind, count: u32) -> u32 {
        let have = self.counter(kind);
        let removed = have.min(count);
        if removed == have {
            self.counters.remove(&kind);
        } else if let Some(n) = self.counters.get_mut(&kind) {
            *n -= removed;
        }
        removed
    }

    /// The object forgets its past: new zone-change counter and timestamp,
    /// status, damage and counters cleared, control back to the owner.
    pub fn reset_for_zone_change(&mut self, timestamp: Timestamp) {
        self.zcc += 1;
        self.timestamp = timestamp;
        self.controller = self.owner;
        self.tapped = false;
        self.summoning_sick = false;
        self.damage = 0;
        self.deathtouch_damage = false;
        self.counters.clear();
        self.cast = CastOptions::default();
    }

    /// Copiable values before any continuous effect: printed values, or
    /// the prototype's while the object is a prototyped spell or permanent.
    #[must_use]
    pub fn base_characteristics(&self, definition: &CardDefinition, zone: Zone) -> Characteristics {
        let prototyped =
            self.cast.prototyped && matches!(zone, Zone::Stack | Zone::Battlefield);
        definition.characteristics(prototyped)
    }
}
