//! Rules engine trait and game results.
//!
//! ## Implementation Notes
//!
//! - `legal_actions`: empty if the player can't act right now
//! - `apply_action`: deterministic; an illegal action is an `Err` and
//!   leaves the state untouched
//! - `is_terminal`: `None` while the game continues

use serde::{Deserialize, Serialize};

use crate::core::action::PlayerAction;
use crate::core::config::RulesConfig;
use crate::core::error::Result;
use crate::core::player::PlayerId;
use crate::core::state::GameState;

/// Result of a completed game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    /// The last player standing.
    Winner(PlayerId),
    /// Every remaining player lost at the same time.
    Draw,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
            GameResult::Draw => false,
        }
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        match self {
            GameResult::Winner(p) => Some(*p),
            GameResult::Draw => None,
        }
    }
}

/// Rules engine trait.
pub trait RulesEngine {
    /// Get the game configuration.
    fn config(&self) -> &RulesConfig;

    /// Current state.
    fn state(&self) -> &GameState;

    /// Every action `player` may take now. Includes `PassPriority`
    /// whenever the player holds priority.
    fn legal_actions(&self, player: PlayerId) -> Vec<PlayerAction>;

    /// Validate and perform an action.
    fn apply_action(&mut self, player: PlayerId, action: &PlayerAction) -> Result<()>;

    /// Check if the game is over.
    fn is_terminal(&self) -> Option<GameResult> {
        self.state().result.clone()
    }

    /// Whether `action` is among the legal actions of `player`.
    fn is_legal(&self, player: PlayerId, action: &PlayerAction) -> bool {
        self.legal_actions(player).contains(action)
    }
}
