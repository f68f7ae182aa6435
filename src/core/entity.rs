//! Object identification.
//!
//! Every card, token, and spell in a game has an `ObjectId`. Players are
//! not objects; they are addressed by `PlayerId`.
//!
//! ## Weak references
//!
//! An object that changes zones becomes a new object. Rather than minting a
//! new id, the engine bumps the object's *zone-change counter*. An
//! `ObjectRef` pairs the id with the counter observed when the reference
//! was taken, so a stack object can tell at resolution time whether its
//! target is still the same object:
//!
//! ```
//! use ccg_rules::core::{ObjectId, ObjectRef};
//!
//! let bear = ObjectRef::new(ObjectId(7), 2);
//! assert!(bear.is_current(2));
//! assert!(!bear.is_current(3)); // it moved since the reference was taken
//! ```

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Identifier of a game object (card, token, or spell copy).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Object({})", self.0)
    }
}

/// A weak reference to an object as it existed at a particular moment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// The referenced object.
    pub id: ObjectId,
    /// Zone-change counter at the time the reference was taken.
    pub zcc: u32,
}

impl ObjectRef {
    /// Create a reference.
    #[must_use]
    pub const fn new(id: ObjectId, zcc: u32) -> Self {
        Self { id, zcc }
    }

    /// True if the object has not changed zones since the reference was taken.
    #[must_use]
    pub const fn is_current(self, zcc: u32) -> bool {
        self.zcc == zcc
    }
}

/// Monotonic timestamp used to order continuous effects.
///
/// Objects receive a timestamp when they enter a zone; effects created by
/// resolving spells receive one when they are created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

/// Something a spell or ability can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// A player.
    Player(PlayerId),
    /// An object, weakly referenced.
    Object(ObjectRef),
}

impl Target {
    /// The object id if this targets an object.
    #[must_use]
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Target::Object(r) => Some(r.id),
            Target::Player(_) => None,
        }
    }

    /// The player if this targets a player.
    #[must_use]
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            Target::Player(p) => Some(*p),
            Target::Object(_) => None,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Player(p) => write!(f, "{}", p),
            Target::Object(r) => write!(f, "{}#{}", r.id, r.zcc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_ref_staleness() {
        let r = ObjectRef::new(ObjectId(3), 0);
        assert!(r.is_current(0));
        assert!(!r.is_current(1));
    }

    #[test]
    fn test_timestamp_ordering() {
        assert!(Timestamp(1) < Timestamp(2));
        assert_eq!(Timestamp::default(), Timestamp(0));
    }

    #[test]
    fn test_target_accessors() {
        let t = Target::Object(ObjectRef::new(ObjectId(9), 1));
        assert_eq!(t.object_id(), Some(ObjectId(9)));
        assert_eq!(t.player(), None);

        let p = Target::Player(PlayerId::new(1));
        assert_eq!(p.player(), Some(PlayerId::new(1)));
        assert_eq!(format!("{}", p), "Player 1");
    }

    #[test]
    fn test_serialization() {
        let t = Target::Object(ObjectRef::new(ObjectId(4), 2));
        let json = serde_json::to_string(&t).unwrap();
        let back: Target = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }
}
