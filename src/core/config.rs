//! Engine configuration.
//!
//! `RulesConfig` holds the table-level numbers the rules refer to: how many
//! players, starting life, hand sizes, the poison threshold. It also holds
//! the knobs of the decision driver (timeout and re-prompt budget).
//!
//! ```
//! use ccg_rules::core::RulesConfig;
//!
//! let config = RulesConfig::new(2)
//!     .with_starting_life(30)
//!     .with_opening_hand(5);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::{Result, RulesError};

/// Table-level rules parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Number of players (2..=8).
    pub player_count: usize,

    /// Life total each player starts with.
    pub starting_life: i32,

    /// Cards drawn at the start of the game.
    pub opening_hand: usize,

    /// Hand size enforced during cleanup.
    pub max_hand_size: usize,

    /// Poison counters at which a player loses.
    pub poison_threshold: u32,

    /// Whether the starting player skips the draw of their first turn.
    pub skip_first_draw: bool,

    /// How long to wait for a player decision, in milliseconds.
    pub decision_timeout_ms: u64,

    /// How many illegal actions a player may submit in a row before the
    /// engine passes priority for them.
    pub max_reprompts: u32,

    /// Upper bound on state-based action passes before a check gives up.
    pub sba_iteration_limit: u32,

    /// Land plays allowed per turn.
    pub lands_per_turn: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            player_count: 2,
            starting_life: 20,
            opening_hand: 7,
            max_hand_size: 7,
            poison_threshold: 10,
            skip_first_draw: true,
            decision_timeout_ms: 30_000,
            max_reprompts: 3,
            sba_iteration_limit: 64,
            lands_per_turn: 1,
        }
    }
}

impl RulesConfig {
    /// Defaults for a game with `player_count` players.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        Self {
            player_count,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RulesError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the starting life total.
    #[must_use]
    pub fn with_starting_life(mut self, life: i32) -> Self {
        self.starting_life = life;
        self
    }

    /// Set the opening hand size.
    #[must_use]
    pub fn with_opening_hand(mut self, cards: usize) -> Self {
        self.opening_hand = cards;
        self
    }

    /// Set the maximum hand size.
    #[must_use]
    pub fn with_max_hand_size(mut self, cards: usize) -> Self {
        self.max_hand_size = cards;
        self
    }

    /// Set whether the starting player skips the first draw.
    #[must_use]
    pub fn with_skip_first_draw(mut self, skip: bool) -> Self {
        self.skip_first_draw = skip;
        self
    }

    /// Set the decision timeout.
    #[must_use]
    pub fn with_decision_timeout(mut self, timeout: Duration) -> Self {
        self.decision_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the re-prompt budget for illegal actions.
    #[must_use]
    pub fn with_max_reprompts(mut self, n: u32) -> Self {
        self.max_reprompts = n;
        self
    }

    /// Decision timeout as a `Duration`.
    #[must_use]
    pub fn decision_timeout(&self) -> Duration {
        Duration::from_millis(self.decision_timeout_ms)
    }

    /// Check the configuration for values the rules can't work with.
    pub fn validate(&self) -> Result<()> {
        if !(2..=8).contains(&self.player_count) {
            return Err(RulesError::Config(format!(
                "player count must be between 2 and 8, got {}",
                self.player_count
            )));
        }
        if self.starting_life <= 0 {
            return Err(RulesError::Config(format!(
                "starting life must be positive, got {}",
                self.starting_life
            )));
        }
        if self.poison_threshold == 0 {
            return Err(RulesError::Config("poison threshold must be positive".into()));
        }
        if self.sba_iteration_limit == 0 {
            return Err(RulesError::Config(
                "state-based action iteration limit must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RulesConfig::default();
        assert_eq!(config.player_count, 2);
        assert_eq!(config.starting_life, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = RulesConfig::new(4)
            .with_starting_life(40)
            .with_max_hand_size(8)
            .with_skip_first_draw(false)
            .with_decision_timeout(Duration::from_millis(250))
            .with_max_reprompts(1);

        assert_eq!(config.player_count, 4);
        assert_eq!(config.starting_life, 40);
        assert_eq!(config.max_hand_size, 8);
        assert!(!config.skip_first_draw);
        assert_eq!(config.decision_timeout(), Duration::from_millis(250));
        assert_eq!(config.max_reprompts, 1);
    }

    #[test]
    fn test_invalid_player_count() {
        assert!(matches!(
            RulesConfig::new(1).validate(),
            Err(RulesError::Config(_))
        ));
        assert!(RulesConfig::new(9).validate().is_err());
    }

    #[test]
    fn test_zero_life_rejected() {
        let config = RulesConfig::new(2).with_starting_life(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_partial() {
        let config = RulesConfig::from_json(r#"{"player_count": 3, "starting_life": 25}"#).unwrap();
        assert_eq!(config.player_count, 3);
        assert_eq!(config.starting_life, 25);
        assert_eq!(config.opening_hand, 7);
    }

    #[test]
    fn test_from_json_rejects_bad_values() {
        assert!(RulesConfig::from_json(r#"{"player_count": 12}"#).is_err());
        assert!(RulesConfig::from_json("not json").is_err());
    }
}
