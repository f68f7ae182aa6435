//! One decision maker per seat.

use crate::core::player::{PlayerId, PlayerMap};

use super::maker::{AutoPilot, DecisionMaker};
use super::request::{DecisionRequest, DecisionResponse};

/// The decision makers of a game, indexed by seat.
///
/// [`Deciders::ask`] never fails: an error or a malformed answer is logged
/// and replaced by the request's fallback.
pub struct Deciders {
    makers: PlayerMap<Box<dyn DecisionMaker>>,
}

impl Deciders {
    /// Every seat played by a passive [`AutoPilot`].
    #[must_use]
    pub fn autopilot(player_count: usize) -> Self {
        Self {
            makers: PlayerMap::new(player_count, |_| Box::new(AutoPilot::passive()) as Box<dyn DecisionMaker>),
        }
    }

    /// Makers in seat order.
    #[must_use]
    pub fn new(makers: Vec<Box<dyn DecisionMaker>>) -> Self {
        Self {
            makers: PlayerMap::from_vec(makers),
        }
    }

    /// Replace the maker of one seat.
    #[must_use]
    pub fn with(mut self, player: PlayerId, maker: impl DecisionMaker + 'static) -> Self {
        self.set(player, maker);
        self
    }

    pub fn set(&mut self, player: PlayerId, maker: impl DecisionMaker + 'static) {
        self.makers[player] = Box::new(maker);
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.makers.player_count()
    }

    /// Ask the player named by `request`.
    pub fn ask(&mut self, request: &DecisionRequest) -> DecisionResponse {
        let player = request.player();
        let maker = &mut self.makers[player];
        match maker.decide(request) {
            Ok(response) => match request.accepts(&response) {
                Ok(()) => response,
                Err(e) => {
                    log::warn!("{} ({}): {}, using default", player, maker.name(), e);
                    request.fallback()
                }
            },
            Err(e) => {
                log::warn!("{} ({}): {}, using default", player, maker.name(), e);
                request.fallback()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::PlayerAction;
    use crate::core::entity::ObjectId;
    use crate::decision::{DecisionError, Scripted};

    struct Broken;

    impl DecisionMaker for Broken {
        fn decide(&mut self, _: &DecisionRequest) -> Result<DecisionResponse, DecisionError> {
            Err(DecisionError::Disconnected)
        }
    }

    #[test]
    fn test_error_falls_back() {
        let mut deciders = Deciders::autopilot(2).with(PlayerId::new(1), Broken);
        let request = DecisionRequest::PayUnless {
            player: PlayerId::new(1),
            source: ObjectId(1),
            cost: crate::effects::UnlessCost::PayLife(1),
        };
        assert_eq!(deciders.ask(&request), DecisionResponse::YesNo(false));
    }

    #[test]
    fn test_malformed_answer_falls_back() {
        let mut deciders = Deciders::new(vec![
            Box::new(Scripted::new([DecisionResponse::YesNo(true)])),
            Box::new(AutoPilot::passive()),
        ]);
        let request = DecisionRequest::Priority {
            player: PlayerId::new(0),
            legal: vec![PlayerAction::PassPriority],
        };
        assert_eq!(deciders.ask(&request), DecisionResponse::Action(PlayerAction::PassPriority));
        assert_eq!(deciders.player_count(), 2);
    }
}
