//! Zone bookkeeping for object locations and movement.
//!
//! The `ZoneManager` tracks which zone every object is in and keeps each
//! zone ordered: libraries top-to-bottom, the stack in cast order, and the
//! battlefield in entry order so that iteration is deterministic.
//!
//! Library, hand, and graveyard are per-player; battlefield, stack, and
//! exile are shared. [`ZoneKey`] names a concrete container.
//!
//! Both maps are `im` persistent collections, so cloning a `ZoneManager`
//! (as part of a game-state snapshot) is O(1).

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use crate::core::entity::ObjectId;
use crate::core::player::PlayerId;
use crate::core::rng::GameRng;

/// The kinds of zone the rules know about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Zone {
    Library,
    Hand,
    Battlefield,
    Graveyard,
    Stack,
    Exile,
}

impl Zone {
    /// Whether each player has their own copy of this zone.
    #[must_use]
    pub const fn is_per_player(self) -> bool {
        matches!(self, Zone::Library | Zone::Hand | Zone::Graveyard)
    }

    /// Whether objects here are visible to everyone.
    #[must_use]
    pub const fn is_public(self) -> bool {
        !matches!(self, Zone::Library | Zone::Hand)
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Zone::Library => "library",
            Zone::Hand => "hand",
            Zone::Battlefield => "battlefield",
            Zone::Graveyard => "graveyard",
            Zone::Stack => "stack",
            Zone::Exile => "exile",
        };
        f.write_str(name)
    }
}

/// A concrete zone: the kind plus, for per-player zones, whose it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneKey {
    pub zone: Zone,
    pub owner: Option<PlayerId>,
}

impl ZoneKey {
    /// The key for `zone`, attaching `owner` only if the zone is per-player.
    #[must_use]
    pub fn new(zone: Zone, owner: PlayerId) -> Self {
        Self {
            zone,
            owner: zone.is_per_player().then_some(owner),
        }
    }

    /// The shared battlefield.
    pub const BATTLEFIELD: ZoneKey = ZoneKey {
        zone: Zone::Battlefield,
        owner: None,
    };

    /// The shared stack.
    pub const STACK: ZoneKey = ZoneKey {
        zone: Zone::Stack,
        owner: None,
    };

    /// The shared exile zone.
    pub const EXILE: ZoneKey = ZoneKey {
        zone: Zone::Exile,
        owner: None,
    };

    #[must_use]
    pub fn library(player: PlayerId) -> Self {
        Self::new(Zone::Library, player)
    }

    #[must_use]
    pub fn hand(player: PlayerId) -> Self {
        Self::new(Zone::Hand, player)
    }

    #[must_use]
    pub fn graveyard(player: PlayerId) -> Self {
        Self::new(Zone::Graveyard, player)
    }
}

/// Position for inserting an object into a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Top of the zone (last element).
    Top,
    /// Bottom of the zone (first element).
    Bottom,
    /// Specific index from the bottom, clamped to the zone size.
    Index(usize),
}

/// Tracks object locations.
///
/// ```
/// use ccg_rules::core::{ObjectId, PlayerId};
/// use ccg_rules::zones::{ZoneKey, ZoneManager, ZonePosition};
///
/// let p0 = PlayerId::new(0);
/// let mut zones = ZoneManager::new();
/// zones.add(ObjectId(1), ZoneKey::library(p0), ZonePosition::Top);
/// zones.add(ObjectId(2), ZoneKey::library(p0), ZonePosition::Top);
///
/// assert_eq!(zones.top(ZoneKey::library(p0)), Some(ObjectId(2)));
/// zones.move_to(ObjectId(2), ZoneKey::hand(p0), ZonePosition::Top);
/// assert_eq!(zones.len(ZoneKey::library(p0)), 1);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ZoneManager {
    locations: OrdMap<ObjectId, ZoneKey>,
    contents: OrdMap<ZoneKey, Vector<ObjectId>>,
}

impl ZoneManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an object that is not yet tracked.
    ///
    /// If the object is already tracked this behaves like [`Self::move_to`].
    pub fn add(&mut self, object: ObjectId, key: ZoneKey, position: ZonePosition) {
        if self.locations.contains_key(&object) {
            self.move_to(object, key, position);
            return;
        }
        self.locations.insert(object, key);
        Self::insert_at(self.contents.entry(key).or_default(), object, position);
    }

    /// Move an object to another zone. Returns the zone it left.
    pub fn move_to(
        &mut self,
        object: ObjectId,
        key: ZoneKey,
        position: ZonePosition,
    ) -> Option<ZoneKey> {
        let old = self.remove(object)?;
        self.locations.insert(object, key);
        Self::insert_at(self.contents.entry(key).or_default(), object, position);
        Some(old)
    }

    /// Stop tracking an object. Returns the zone it was in.
    pub fn remove(&mut self, object: ObjectId) -> Option<ZoneKey> {
        let key = self.locations.remove(&object)?;
        if let Some(list) = self.contents.get_mut(&key) {
            list.retain(|&o| o != object);
        }
        Some(key)
    }

    fn insert_at(list: &mut Vector<ObjectId>, object: ObjectId, position: ZonePosition) {
        match position {
            ZonePosition::Top => list.push_back(object),
            ZonePosition::Bottom => list.push_front(object),
            ZonePosition::Index(i) => {
                let idx = i.min(list.len());
                list.insert(idx, object);
            }
        }
    }

    /// Where an object currently is.
    #[must_use]
    pub fn zone_of(&self, object: ObjectId) -> Option<ZoneKey> {
        self.locations.get(&object).copied()
    }

    /// Whether the object is in a zone of the given kind.
    #[must_use]
    pub fn is_in(&self, object: ObjectId, zone: Zone) -> bool {
        self.zone_of(object).is_some_and(|k| k.zone == zone)
    }

    /// Objects in a zone, bottom to top.
    pub fn contents(&self, key: ZoneKey) -> impl Iterator<Item = ObjectId> + '_ {
        self.contents.get(&key).into_iter().flat_map(|v| v.iter().copied())
    }

    /// Objects on the battlefield in entry order.
    pub fn battlefield(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.contents(ZoneKey::BATTLEFIELD)
    }

    /// Number of objects in a zone.
    #[must_use]
    pub fn len(&self, key: ZoneKey) -> usize {
        self.contents.get(&key).map_or(0, Vector::len)
    }

    /// Whether nothing is tracked at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// The top object of a zone.
    #[must_use]
    pub fn top(&self, key: ZoneKey) -> Option<ObjectId> {
        self.contents.get(&key)?.last().copied()
    }

    /// Shuffle a zone.
    pub fn shuffle(&mut self, key: ZoneKey, rng: &mut GameRng) {
        if let Some(list) = self.contents.get_mut(&key) {
            let mut items: Vec<ObjectId> = list.iter().copied().collect();
            rng.shuffle(&mut items);
            *list = items.into_iter().collect();
        }
    }
}
