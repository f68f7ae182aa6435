//! Starting a game, and building scenarios.
//!
//! The scenario helpers put cards straight into zones without casting them
//! and without events or triggers. Tests and tools use them to set up a
//! position; games use [`Game::start`].

use crate::cards::CardId;
use crate::core::entity::ObjectId;
use crate::core::error::{Result, RulesError};
use crate::core::player::PlayerId;
use crate::core::state::Flow;
use crate::stack::Step;
use crate::zones::{ZoneKey, ZonePosition};

use super::Game;

impl Game {
    /// Build and shuffle each player's library from their deck list, then
    /// draw opening hands. `decks[i]` belongs to player `i`.
    pub fn start(&mut self, decks: &[Vec<CardId>]) -> Result<()> {
        if decks.len() != self.config.player_count {
            return Err(RulesError::Config(format!(
                "{} decks for {} players",
                decks.len(),
                self.config.player_count
            )));
        }
        if !self.state.objects.is_empty() {
            return Err(RulesError::Config("game already started".to_string()));
        }
        for card in decks.iter().flatten() {
            self.cards.lookup(*card)?;
        }

        for (seat, deck) in decks.iter().enumerate() {
            let player = PlayerId::new(seat as u8);
            let library = ZoneKey::library(player);
            for card in deck {
                self.state.create_object(*card, player, library, ZonePosition::Top);
            }
            self.state.zones.shuffle(library, &mut self.state.rng);
            for _ in 0..self.config.opening_hand {
                let Some(top) = self.state.zones.top(library) else {
                    break;
                };
                self.state.zones.move_to(top, ZoneKey::hand(player), ZonePosition::Top);
            }
        }
        log::info!(
            "game started: {} players, seed {}",
            self.config.player_count,
            self.state.rng.seed()
        );
        Ok(())
    }

    /// Put a new object for `card` onto the battlefield, untapped and able
    /// to attack.
    pub fn put_onto_battlefield(&mut self, card: CardId, controller: PlayerId) -> Result<ObjectId> {
        let definition = self.cards.lookup(card)?;
        let token = definition.token;
        let id = self.state.create_object(card, controller, ZoneKey::BATTLEFIELD, ZonePosition::Top);
        if let Some(obj) = self.state.object_mut(id) {
            obj.token = token;
        }
        Ok(id)
    }

    /// Put a new object for `card` into `owner`'s hand.
    pub fn put_in_hand(&mut self, card: CardId, owner: PlayerId) -> Result<ObjectId> {
        self.cards.lookup(card)?;
        Ok(self.state.create_object(card, owner, ZoneKey::hand(owner), ZonePosition::Top))
    }

    /// Put a new object for `card` on top of `owner`'s library.
    pub fn put_in_library(&mut self, card: CardId, owner: PlayerId) -> Result<ObjectId> {
        self.cards.lookup(card)?;
        Ok(self.state.create_object(card, owner, ZoneKey::library(owner), ZonePosition::Top))
    }

    /// Jump to the beginning of `step` in `active`'s turn, skipping
    /// everything in between. The next [`Game::step`] begins it.
    pub fn set_step(&mut self, active: PlayerId, step: Step) {
        self.state.stack.clear_priority();
        self.state.turn.active = active;
        self.state.turn.step = step;
        self.state.flow = Flow::StepStart;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cards::library;
    use crate::core::config::RulesConfig;

    fn game() -> Game {
        let cards = Arc::new(library::sample_registry().unwrap());
        Game::new(RulesConfig::new(2), cards, 11).unwrap()
    }

    #[test]
    fn test_start_draws_opening_hands() {
        let mut game = game();
        let deck = library::starter_deck();
        game.start(&[deck.clone(), deck.clone()]).unwrap();

        for seat in 0..2 {
            let p = PlayerId::new(seat);
            assert_eq!(game.zone(ZoneKey::hand(p)).len(), 7);
            assert_eq!(game.zone(ZoneKey::library(p)).len(), deck.len() - 7);
        }
    }

    #[test]
    fn test_start_rejects_wrong_deck_count() {
        let mut game = game();
        let err = game.start(&[library::starter_deck()]).unwrap_err();
        assert!(matches!(err, RulesError::Config(_)));
    }

    #[test]
    fn test_start_rejects_unknown_card() {
        let mut game = game();
        let deck = vec![CardId::new(9999)];
        let err = game.start(&[deck.clone(), deck]).unwrap_err();
        assert!(matches!(err, RulesError::UnknownCard(_)));
    }

    #[test]
    fn test_same_seed_same_library() {
        let deck = library::starter_deck();
        let mut a = game();
        let mut b = game();
        a.start(&[deck.clone(), deck.clone()]).unwrap();
        b.start(&[deck.clone(), deck]).unwrap();
        let p = PlayerId::new(0);
        let cards = |g: &Game| -> Vec<CardId> {
            g.zone(ZoneKey::library(p))
                .into_iter()
                .filter_map(|id| g.state().object(id).map(|o| o.card))
                .collect()
        };
        assert_eq!(cards(&a), cards(&b));
    }
}
