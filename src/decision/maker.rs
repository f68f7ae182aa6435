//! Decision makers.
//!
//! ## Implementations
//!
//! - [`AutoPilot`]: deterministic defaults, usable as a stand-in for a
//!   player who timed out or as a trivial bot.
//! - [`Scripted`]: a queue of canned responses, for tests.
//! - [`ChannelDecider`]: forwards requests over a channel to another
//!   thread and waits with a timeout.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::core::action::PlayerAction;
use crate::core::config::RulesConfig;

use super::request::{DecisionError, DecisionRequest, DecisionResponse};

/// Something that answers decision requests for one player.
pub trait DecisionMaker: Send {
    /// Answer a request. Errors make the game substitute the request's
    /// fallback.
    fn decide(&mut self, request: &DecisionRequest) -> Result<DecisionResponse, DecisionError>;

    /// Name for logs.
    fn name(&self) -> &str {
        "player"
    }
}

/// How an [`AutoPilot`] plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Style {
    /// Always pass and decline.
    #[default]
    Passive,
    /// Play a land, then the first castable spell or ability, attack with
    /// everything, pay "unless" costs.
    Aggressive,
}

/// Deterministic default player.
#[derive(Clone, Debug, Default)]
pub struct AutoPilot {
    style: Style,
}

impl AutoPilot {
    #[must_use]
    pub fn passive() -> Self {
        Self { style: Style::Passive }
    }

    #[must_use]
    pub fn aggressive() -> Self {
        Self {
            style: Style::Aggressive,
        }
    }

    #[must_use]
    pub fn style(&self) -> Style {
        self.style
    }
}

impl DecisionMaker for AutoPilot {
    fn decide(&mut self, request: &DecisionRequest) -> Result<DecisionResponse, DecisionError> {
        if self.style == Style::Passive {
            return Ok(request.fallback());
        }
        let response = match request {
            DecisionRequest::Priority { legal, .. } => {
                let land = legal
                    .iter()
                    .find(|a| matches!(a, PlayerAction::PlayLand { .. }));
                let other = legal.iter().find(|a| !a.is_pass());
                let action = land.or(other).cloned().unwrap_or(PlayerAction::PassPriority);
                DecisionResponse::Action(action)
            }
            DecisionRequest::Attackers {
                candidates, defenders, ..
            } => match defenders.first() {
                Some(defender) => DecisionResponse::Attackers(candidates.iter().map(|a| (*a, *defender)).collect()),
                None => DecisionResponse::Attackers(Vec::new()),
            },
            DecisionRequest::PayUnless { .. } => DecisionResponse::YesNo(true),
            other => other.fallback(),
        };
        Ok(response)
    }

    fn name(&self) -> &str {
        match self.style {
            Style::Passive => "autopilot (passive)",
            Style::Aggressive => "autopilot (aggressive)",
        }
    }
}

/// Replays queued responses in order, then falls back to defaults.
#[derive(Clone, Debug, Default)]
pub struct Scripted {
    responses: VecDeque<DecisionResponse>,
}

impl Scripted {
    #[must_use]
    pub fn new(responses: impl IntoIterator<Item = DecisionResponse>) -> Self {
        Self {
            responses: responses.into_iter().collect(),
        }
    }

    pub fn push(&mut self, response: DecisionResponse) {
        self.responses.push_back(response);
    }

    /// Responses not yet used.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

impl DecisionMaker for Scripted {
    fn decide(&mut self, request: &DecisionRequest) -> Result<DecisionResponse, DecisionError> {
        Ok(self.responses.pop_front().unwrap_or_else(|| request.fallback()))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// A request as sent to a [`RemotePlayer`]. The answer must carry the
/// same `seq`.
#[derive(Clone, Debug)]
pub struct Ticket {
    pub seq: u64,
    pub request: DecisionRequest,
}

/// Forwards requests to another thread over a channel.
pub struct ChannelDecider {
    requests: Sender<Ticket>,
    responses: Receiver<(u64, DecisionResponse)>,
    timeout: Duration,
    seq: u64,
}

/// The far end of a [`ChannelDecider`].
pub struct RemotePlayer {
    pub requests: Receiver<Ticket>,
    pub responses: Sender<(u64, DecisionResponse)>,
}

impl RemotePlayer {
    /// Answer `ticket`.
    pub fn reply(&self, ticket: &Ticket, response: DecisionResponse) -> Result<(), DecisionError> {
        self.responses
            .send((ticket.seq, response))
            .map_err(|_| DecisionError::Disconnected)
    }
}

impl ChannelDecider {
    /// A connected decider/remote pair. The decider waits at most
    /// `timeout` for each answer.
    #[must_use]
    pub fn pair(timeout: Duration) -> (ChannelDecider, RemotePlayer) {
        let (request_tx, request_rx) = mpsc::channel();
        let (response_tx, response_rx) = mpsc::channel();
        (
            ChannelDecider {
                requests: request_tx,
                responses: response_rx,
                timeout,
                seq: 0,
            },
            RemotePlayer {
                requests: request_rx,
                responses: response_tx,
            },
        )
    }

    /// A pair waiting for the configured decision timeout.
    #[must_use]
    pub fn from_config(config: &RulesConfig) -> (ChannelDecider, RemotePlayer) {
        Self::pair(config.decision_timeout())
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl DecisionMaker for ChannelDecider {
    fn decide(&mut self, request: &DecisionRequest) -> Result<DecisionResponse, DecisionError> {
        self.seq += 1;
        let seq = self.seq;
        self.requests
            .send(Ticket {
                seq,
                request: request.clone(),
            })
            .map_err(|_| DecisionError::Disconnected)?;

        let deadline = Instant::now() + self.timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.responses.recv_timeout(left) {
                Ok((answered, response)) if answered == seq => return Ok(response),
                // A late answer to a request that already timed out.
                Ok((answered, _)) => log::debug!("dropping stale answer to request {}", answered),
                Err(RecvTimeoutError::Timeout) => return Err(DecisionError::TimedOut),
                Err(RecvTimeoutError::Disconnected) => return Err(DecisionError::Disconnected),
            }
        }
    }

    fn name(&self) -> &str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::ObjectId;
    use crate::core::player::PlayerId;

    fn priority(legal: Vec<PlayerAction>) -> DecisionRequest {
        DecisionRequest::Priority {
            player: PlayerId::new(0),
            legal,
        }
    }

    #[test]
    fn test_aggressive_prefers_land() {
        let mut pilot = AutoPilot::aggressive();
        let legal = vec![
            PlayerAction::PassPriority,
            PlayerAction::cast(ObjectId(2), &[]),
            PlayerAction::PlayLand { card: ObjectId(3) },
        ];
        assert_eq!(
            pilot.decide(&priority(legal)).unwrap(),
            DecisionResponse::Action(PlayerAction::PlayLand { card: ObjectId(3) })
        );
    }

    #[test]
    fn test_passive_passes() {
        let mut pilot = AutoPilot::passive();
        let legal = vec![PlayerAction::PassPriority, PlayerAction::cast(ObjectId(2), &[])];
        assert_eq!(
            pilot.decide(&priority(legal)).unwrap(),
            DecisionResponse::Action(PlayerAction::PassPriority)
        );
    }

    #[test]
    fn test_scripted_then_fallback() {
        let mut script = Scripted::new([DecisionResponse::YesNo(true)]);
        let request = DecisionRequest::PayUnless {
            player: PlayerId::new(1),
            source: ObjectId(1),
            cost: crate::effects::UnlessCost::PayLife(2),
        };
        assert_eq!(script.decide(&request).unwrap(), DecisionResponse::YesNo(true));
        assert_eq!(script.decide(&request).unwrap(), DecisionResponse::YesNo(false));
        assert_eq!(script.remaining(), 0);
    }

    #[test]
    fn test_channel_round_trip() {
        let (mut decider, remote) = ChannelDecider::pair(Duration::from_secs(5));
        let handle = std::thread::spawn(move || {
            let ticket = remote.requests.recv().unwrap();
            assert!(matches!(ticket.request, DecisionRequest::Priority { .. }));
            remote
                .reply(&ticket, DecisionResponse::Action(PlayerAction::PassPriority))
                .unwrap();
        });
        let answer = decider.decide(&priority(vec![PlayerAction::PassPriority])).unwrap();
        assert_eq!(answer, DecisionResponse::Action(PlayerAction::PassPriority));
        handle.join().unwrap();
    }

    #[test]
    fn test_channel_timeout_and_disconnect() {
        let (mut decider, remote) = ChannelDecider::pair(Duration::from_millis(10));
        let request = priority(vec![PlayerAction::PassPriority]);
        assert_eq!(decider.decide(&request), Err(DecisionError::TimedOut));
        drop(remote);
        assert_eq!(decider.decide(&request), Err(DecisionError::Disconnected));
    }

    #[test]
    fn test_late_answer_is_not_used_for_next_request() {
        let (mut decider, remote) = ChannelDecider::pair(Duration::from_millis(50));
        let handle = std::thread::spawn(move || {
            let first = remote.requests.recv().unwrap();
            std::thread::sleep(Duration::from_millis(70));
            remote.reply(&first, DecisionResponse::Choice(1)).unwrap();
            let second = remote.requests.recv().unwrap();
            remote.reply(&second, DecisionResponse::Choice(0)).unwrap();
        });
        let request = DecisionRequest::OrderReplacements {
            player: PlayerId::new(0),
            sources: vec![ObjectId(1), ObjectId(2)],
        };
        assert_eq!(decider.decide(&request), Err(DecisionError::TimedOut));
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(decider.decide(&request), Ok(DecisionResponse::Choice(0)));
        handle.join().unwrap();
    }

    #[test]
    fn test_channel_uses_configured_timeout() {
        let config = RulesConfig::new(2).with_decision_timeout(Duration::from_millis(20));
        let (mut decider, _remote) = ChannelDecider::from_config(&config);
        assert_eq!(decider.timeout(), Duration::from_millis(20));
        let request = priority(vec![PlayerAction::PassPriority]);
        assert_eq!(decider.decide(&request), Err(DecisionError::TimedOut));
    }
}
