//! Game listeners.
//!
//! A [`GameListener`] sees every [`GameEvent`] after it has happened, every
//! step transition and the end of the game. Listeners observe; they cannot
//! change the game.

use std::sync::{Arc, Mutex};

use crate::core::player::PlayerId;
use crate::rules::GameResult;
use crate::stack::Step;
use crate::triggers::GameEvent;

/// Receives notifications from a running game.
pub trait GameListener: Send {
    fn on_event(&mut self, _event: &GameEvent) {}

    fn on_step(&mut self, _turn: u32, _step: Step, _active: PlayerId) {}

    fn on_game_over(&mut self, _result: &GameResult) {}
}

/// Records every event. Clones share the same log, so a test can keep one
/// handle and give the other to the game.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<GameEvent>>>,
    result: Arc<Mutex<Option<GameResult>>>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<GameEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Number of recorded events of the given kind (see [`GameEvent::kind`]).
    #[must_use]
    pub fn count(&self, kind: &str) -> usize {
        self.events
            .lock()
            .map(|e| e.iter().filter(|ev| ev.kind() == kind).count())
            .unwrap_or(0)
    }

    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        self.result.lock().ok().and_then(|r| r.clone())
    }
}

impl GameListener for EventLog {
    fn on_event(&mut self, event: &GameEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn on_game_over(&mut self, result: &GameResult) {
        if let Ok(mut slot) = self.result.lock() {
            *slot = Some(result.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_shares_storage() {
        let log = EventLog::new();
        let mut handle = log.clone();
        handle.on_event(&GameEvent::LifeGained {
            player: PlayerId::new(0),
            amount: 3,
        });
        handle.on_event(&GameEvent::PlayerLost {
            player: PlayerId::new(1),
        });
        handle.on_game_over(&GameResult::Winner(PlayerId::new(0)));

        assert_eq!(log.events().len(), 2);
        assert_eq!(log.count("life_gained"), 1);
        assert_eq!(log.result(), Some(GameResult::Winner(PlayerId::new(0))));
    }
}
