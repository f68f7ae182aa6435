//! Game events.
//!
//! Every observable thing that happens in a game is reported as a
//! [`GameEvent`]. Events drive trigger collection and are forwarded to
//! listeners.

use serde::{Deserialize, Serialize};

use crate::core::entity::{ObjectId, ObjectRef, Target};
use crate::core::player::PlayerId;
use crate::layers::DerivedObject;
use crate::stack::Step;
use crate::zones::{Zone, ZoneKey};

/// Something that happened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An object moved between zones. `object` refers to the new object;
    /// `last_known` is the object as it last existed in `from`.
    ZoneChanged {
        object: ObjectRef,
        from: ZoneKey,
        to: ZoneKey,
        last_known: Box<DerivedObject>,
    },
    /// A token or card was put directly onto the battlefield without coming
    /// from another zone.
    Created { object: ObjectRef },
    DamageDealt {
        source: ObjectId,
        target: Target,
        amount: u32,
        combat: bool,
    },
    LifeGained { player: PlayerId, amount: u32 },
    LifeLost { player: PlayerId, amount: u32 },
    SpellCast { spell: ObjectRef, controller: PlayerId },
    SpellCountered { spell: ObjectId },
    CardDrawn { player: PlayerId, card: ObjectId },
    AttackerDeclared { attacker: ObjectRef, defender: PlayerId },
    BlockerDeclared { blocker: ObjectRef, attacker: ObjectRef },
    StepBegan { step: Step, active: PlayerId, turn: u32 },
    PlayerLost { player: PlayerId },
}

impl GameEvent {
    /// Whether an object entered the battlefield with this event.
    #[must_use]
    pub fn entered_battlefield(&self) -> Option<ObjectRef> {
        match self {
            GameEvent::ZoneChanged { object, to, .. } if to.zone == Zone::Battlefield => Some(*object),
            GameEvent::Created { object } => Some(*object),
            _ => None,
        }
    }

    /// The last known information of an object that left the battlefield.
    #[must_use]
    pub fn left_battlefield(&self) -> Option<&DerivedObject> {
        match self {
            GameEvent::ZoneChanged { from, last_known, .. } if from.zone == Zone::Battlefield => {
                Some(last_known)
            }
            _ => None,
        }
    }

    /// Last known information of a permanent that went to a graveyard from
    /// the battlefield.
    #[must_use]
    pub fn died(&self) -> Option<&DerivedObject> {
        match self {
            GameEvent::ZoneChanged {
                from, to, last_known, ..
            } if from.zone == Zone::Battlefield && to.zone == Zone::Graveyard => Some(last_known),
            _ => None,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::ZoneChanged { .. } => "zone_changed",
            GameEvent::Created { .. } => "created",
            GameEvent::DamageDealt { .. } => "damage_dealt",
            GameEvent::LifeGained { .. } => "life_gained",
            GameEvent::LifeLost { .. } => "life_lost",
            GameEvent::SpellCast { .. } => "spell_cast",
            GameEvent::SpellCountered { .. } => "spell_countered",
            GameEvent::CardDrawn { .. } => "card_drawn",
            GameEvent::AttackerDeclared { .. } => "attacker_declared",
            GameEvent::BlockerDeclared { .. } => "blocker_declared",
            GameEvent::StepBegan { .. } => "step_began",
            GameEvent::PlayerLost { .. } => "player_lost",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Characteristics;

    fn moved(from: ZoneKey, to: ZoneKey) -> GameEvent {
        let lki = DerivedObject::new(ObjectId(4), PlayerId::new(0), from, Characteristics::named("Bear"));
        GameEvent::ZoneChanged {
            object: ObjectRef::new(ObjectId(4), 1),
            from,
            to,
            last_known: Box::new(lki),
        }
    }

    #[test]
    fn test_died() {
        let p = PlayerId::new(0);
        let event = moved(ZoneKey::BATTLEFIELD, ZoneKey::graveyard(p));
        assert!(event.died().is_some());
        assert!(event.left_battlefield().is_some());
        assert!(event.entered_battlefield().is_none());

        let exiled = moved(ZoneKey::BATTLEFIELD, ZoneKey::EXILE);
        assert!(exiled.died().is_none());
        assert!(exiled.left_battlefield().is_some());
    }

    #[test]
    fn test_entered() {
        let event = moved(ZoneKey::STACK, ZoneKey::BATTLEFIELD);
        assert_eq!(event.entered_battlefield(), Some(ObjectRef::new(ObjectId(4), 1)));
        assert_eq!(event.kind(), "zone_changed");
    }
}
