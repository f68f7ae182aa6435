//! Player actions taken while holding priority.
//!
//! Actions are plain data: a verb plus the objects and targets it names.
//! They are produced by [`crate::game::Game::legal_actions`] or by a
//! [`crate::decision::DecisionMaker`], and validated by
//! [`crate::game::Game::apply_action`].

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::entity::{ObjectId, Target};
use super::player::PlayerId;

/// Choices made when casting a spell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CastOptions {
    /// Cast for its prototype cost.
    pub prototyped: bool,
    /// The optional additional cost was paid.
    pub additional_cost_paid: bool,
}

impl CastOptions {
    #[must_use]
    pub fn prototyped() -> Self {
        Self {
            prototyped: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_additional_cost() -> Self {
        Self {
            additional_cost_paid: true,
            ..Self::default()
        }
    }
}

/// Something a player does while holding priority.
///
/// ## Example
///
/// ```
/// use ccg_rules::core::{ObjectId, PlayerAction, PlayerId, Target};
///
/// let bolt_face = PlayerAction::cast(ObjectId(12), &[Target::Player(PlayerId::new(1))]);
/// assert!(!bolt_face.is_pass());
/// assert!(PlayerAction::PassPriority.is_pass());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerAction {
    PassPriority,
    PlayLand {
        card: ObjectId,
    },
    CastSpell {
        card: ObjectId,
        targets: SmallVec<[Target; 2]>,
        options: CastOptions,
    },
    /// Activate the `index`-th activated ability (counting only activated
    /// abilities) of `source`.
    ActivateAbility {
        source: ObjectId,
        index: usize,
        targets: SmallVec<[Target; 2]>,
    },
}

impl PlayerAction {
    /// Cast a spell normally.
    #[must_use]
    pub fn cast(card: ObjectId, targets: &[Target]) -> Self {
        PlayerAction::CastSpell {
            card,
            targets: SmallVec::from_slice(targets),
            options: CastOptions::default(),
        }
    }

    /// Cast a spell with explicit options.
    #[must_use]
    pub fn cast_with(card: ObjectId, targets: &[Target], options: CastOptions) -> Self {
        PlayerAction::CastSpell {
            card,
            targets: SmallVec::from_slice(targets),
            options,
        }
    }

    #[must_use]
    pub fn activate(source: ObjectId, index: usize, targets: &[Target]) -> Self {
        PlayerAction::ActivateAbility {
            source,
            index,
            targets: SmallVec::from_slice(targets),
        }
    }

    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, PlayerAction::PassPriority)
    }
}

/// A recorded action for replay and debugging.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The player who took this action.
    pub player: PlayerId,

    /// The action taken.
    pub action: PlayerAction,

    /// Turn number when action was taken.
    pub turn: u32,

    /// Sequence number within the game.
    pub sequence: u32,
}

impl ActionRecord {
    /// Create a new action record.
    #[must_use]
    pub fn new(player: PlayerId, action: PlayerAction, turn: u32, sequence: u32) -> Self {
        Self {
            player,
            action,
            turn,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::ObjectRef;

    #[test]
    fn test_constructors() {
        let target = Target::Object(ObjectRef::new(ObjectId(3), 1));
        let action = PlayerAction::cast_with(ObjectId(8), &[target], CastOptions::prototyped());
        match action {
            PlayerAction::CastSpell {
                card,
                targets,
                options,
            } => {
                assert_eq!(card, ObjectId(8));
                assert_eq!(targets.as_slice(), &[target]);
                assert!(options.prototyped);
                assert!(!options.additional_cost_paid);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_action_record_serde() {
        let record = ActionRecord::new(
            PlayerId::new(1),
            PlayerAction::activate(ObjectId(4), 0, &[]),
            3,
            17,
        );
        let json = serde_json::to_string(&record).unwrap();
        let back: ActionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
