//! Error types for the rules core.
//!
//! Illegal player actions are ordinary, recoverable errors: the action is
//! rejected, state is left untouched, and the player is asked again.
//! Malformed card definitions and bad configuration surface at load time.

use thiserror::Error;

use crate::cards::CardId;

use super::entity::ObjectId;
use super::player::PlayerId;

/// Errors raised by the rules core.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RulesError {
    /// A player attempted something the rules don't allow right now.
    #[error("illegal action by {player}: {reason}")]
    IllegalAction {
        /// Who attempted the action.
        player: PlayerId,
        /// Why it was rejected.
        reason: IllegalReason,
    },

    /// A card definition failed validation when it was registered.
    #[error("invalid card definition {card} ({name}): {reason}")]
    InvalidCard {
        /// Offending definition.
        card: CardId,
        /// Its name, for diagnostics.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two definitions were registered under the same id.
    #[error("card {0} is already registered")]
    DuplicateCard(CardId),

    /// A definition was looked up but never registered.
    #[error("unknown card {0}")]
    UnknownCard(CardId),

    /// An object id does not name a live object.
    #[error("unknown object {0}")]
    UnknownObject(ObjectId),

    /// A mana cost string could not be parsed.
    #[error("malformed mana cost {0:?}")]
    ManaCost(String),

    /// Invalid engine configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The game has already ended.
    #[error("the game is over")]
    GameOver,

    /// Snapshot encoding/decoding failed.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// Why an action was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IllegalReason {
    #[error("player does not hold priority")]
    NoPriority,
    #[error("cannot be done at this time")]
    Timing,
    #[error("insufficient mana")]
    InsufficientMana,
    #[error("invalid target selection")]
    InvalidTarget,
    #[error("object is not available for this action")]
    NotAvailable,
    #[error("cost cannot be paid")]
    UnpayableCost,
    #[error("already played a land this turn")]
    LandLimit,
    #[error("{0}")]
    Other(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RulesError>;

impl RulesError {
    /// Shorthand for an illegal-action error.
    #[must_use]
    pub fn illegal(player: PlayerId, reason: IllegalReason) -> Self {
        Self::IllegalAction { player, reason }
    }

    /// True if this is an illegal-action rejection (recoverable by re-prompting).
    #[must_use]
    pub fn is_illegal_action(&self) -> bool {
        matches!(self, Self::IllegalAction { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = RulesError::illegal(PlayerId::new(1), IllegalReason::InsufficientMana);
        assert_eq!(err.to_string(), "illegal action by Player 1: insufficient mana");
        assert!(err.is_illegal_action());
        assert!(!RulesError::GameOver.is_illegal_action());
    }
}
