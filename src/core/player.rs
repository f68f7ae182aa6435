//! Player identification, per-player storage, and turn-order helpers.
//!
//! ## PlayerId
//!
//! Type-safe player identifier. Seats are numbered from 0 in turn order.
//!
//! ## PlayerMap
//!
//! Per-player data backed by a `Vec` for O(1) access, indexable by `PlayerId`.
//!
//! ## APNAP
//!
//! Simultaneous choices and triggered abilities are handled in
//! active-player, non-active-player order: [`apnap_order`].

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Seat of a player at the table, 0-based in turn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The seat after this one, wrapping around the table.
    #[must_use]
    pub fn next(self, player_count: usize) -> PlayerId {
        PlayerId(((self.index() + 1) % player_count) as u8)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Seats in APNAP order: the active player first, then everyone else in
/// turn order.
///
/// ```
/// use ccg_rules::core::{apnap_order, PlayerId};
///
/// let order = apnap_order(PlayerId::new(2), 4);
/// assert_eq!(order, vec![PlayerId::new(2), PlayerId::new(3), PlayerId::new(0), PlayerId::new(1)]);
/// ```
#[must_use]
pub fn apnap_order(active: PlayerId, player_count: usize) -> Vec<PlayerId> {
    (0..player_count)
        .map(|offset| PlayerId(((active.index() + offset) % player_count) as u8))
        .collect()
}

/// Per-player data storage with O(1) access.
///
/// ```
/// use ccg_rules::core::{PlayerId, PlayerMap};
///
/// let mut life: PlayerMap<i32> = PlayerMap::with_value(2, 20);
/// life[PlayerId::new(1)] -= 3;
/// assert_eq!(life[PlayerId::new(1)], 17);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create from a factory receiving each seat.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        Self {
            data: (0..player_count as u8).map(|i| factory(PlayerId(i))).collect(),
        }
    }

    /// Create from entries in seat order.
    pub fn from_vec(data: Vec<T>) -> Self {
        assert!(!data.is_empty(), "Must have at least 1 player");
        assert!(data.len() <= 255, "At most 255 players supported");
        Self { data }
    }

    /// Create with every entry set to the same value.
    pub fn with_value(player_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(player_count, |_| value.clone())
    }

    /// Number of seats.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Iterate over (PlayerId, &T) pairs in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over (PlayerId, &mut T) pairs in seat order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        &self.data[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        &mut self.data[player.index()]
    }
}
