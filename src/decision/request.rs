//! Decision requests and responses.
//!
//! Every point where the rules wait for a player is a [`DecisionRequest`].
//! Requests are plain owned data so they can cross a thread boundary to a
//! remote player; each one knows its own default answer
//! ([`DecisionRequest::fallback`]) and how to check an answer
//! ([`DecisionRequest::accepts`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::action::PlayerAction;
use crate::core::entity::{ObjectId, Target};
use crate::core::player::PlayerId;
use crate::effects::UnlessCost;

/// Why a player is choosing objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceReason {
    /// Choose permanents to sacrifice.
    Sacrifice,
    /// Legend rule: choose the one legendary permanent to keep.
    LegendRule,
    /// Discard down to maximum hand size.
    Discard,
}

/// A question put to a player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum DecisionRequest {
    /// The player holds priority. `legal` lists every legal action.
    Priority {
        player: PlayerId,
        legal: Vec<PlayerAction>,
    },
    /// Choose a target for slot `slot` of a triggered ability of `source`.
    ChooseTarget {
        player: PlayerId,
        source: ObjectId,
        slot: usize,
        candidates: Vec<Target>,
    },
    /// Declare attackers: each chosen creature attacks one of `defenders`.
    Attackers {
        player: PlayerId,
        candidates: Vec<ObjectId>,
        defenders: Vec<PlayerId>,
    },
    /// Declare blockers. `options` lists every legal (blocker, attacker)
    /// pair; each blocker blocks at most once.
    Blockers {
        player: PlayerId,
        options: Vec<(ObjectId, ObjectId)>,
    },
    /// Order simultaneous triggers. The first in the answer goes on the
    /// stack first (and so resolves last).
    OrderTriggers {
        player: PlayerId,
        sources: Vec<ObjectId>,
    },
    /// Pick which of several applicable replacement effects applies first.
    OrderReplacements {
        player: PlayerId,
        sources: Vec<ObjectId>,
    },
    /// Pay `cost` to stop an effect of `source`?
    PayUnless {
        player: PlayerId,
        source: ObjectId,
        cost: UnlessCost,
    },
    /// Choose exactly `count` of `candidates` (fewer if there aren't enough).
    ChooseObjects {
        player: PlayerId,
        reason: ChoiceReason,
        candidates: Vec<ObjectId>,
        count: usize,
    },
}

/// A player's answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionResponse {
    Action(PlayerAction),
    /// Index into the request's options.
    Choice(usize),
    /// A permutation of the request's options.
    Order(Vec<usize>),
    Attackers(Vec<(ObjectId, PlayerId)>),
    Blockers(Vec<(ObjectId, ObjectId)>),
    YesNo(bool),
    Objects(Vec<ObjectId>),
}

/// Why no usable answer was obtained.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DecisionError {
    #[error("decision timed out")]
    TimedOut,
    #[error("player disconnected")]
    Disconnected,
    #[error("invalid response: {0}")]
    Invalid(String),
}

impl DecisionRequest {
    /// The player who must answer.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        match self {
            DecisionRequest::Priority { player, .. }
            | DecisionRequest::ChooseTarget { player, .. }
            | DecisionRequest::Attackers { player, .. }
            | DecisionRequest::Blockers { player, .. }
            | DecisionRequest::OrderTriggers { player, .. }
            | DecisionRequest::OrderReplacements { player, .. }
            | DecisionRequest::PayUnless { player, .. }
            | DecisionRequest::ChooseObjects { player, .. } => *player,
        }
    }

    /// The default answer: pass, first option, no attacks or blocks, keep
    /// the given order, decline to pay, the first objects.
    #[must_use]
    pub fn fallback(&self) -> DecisionResponse {
        match self {
            DecisionRequest::Priority { .. } => DecisionResponse::Action(PlayerAction::PassPriority),
            DecisionRequest::ChooseTarget { .. } | DecisionRequest::OrderReplacements { .. } => {
                DecisionResponse::Choice(0)
            }
            DecisionRequest::Attackers { .. } => DecisionResponse::Attackers(Vec::new()),
            DecisionRequest::Blockers { .. } => DecisionResponse::Blockers(Vec::new()),
            DecisionRequest::OrderTriggers { sources, .. } => DecisionResponse::Order((0..sources.len()).collect()),
            DecisionRequest::PayUnless { .. } => DecisionResponse::YesNo(false),
            DecisionRequest::ChooseObjects { candidates, count, .. } => {
                DecisionResponse::Objects(candidates.iter().take(*count).copied().collect())
            }
        }
    }

    /// Check that `response` answers this request. Priority actions are
    /// only checked for shape; the game validates them when applied.
    pub fn accepts(&self, response: &DecisionResponse) -> Result<(), DecisionError> {
        let invalid = |msg: &str| Err(DecisionError::Invalid(msg.to_string()));
        match (self, response) {
            (DecisionRequest::Priority { .. }, DecisionResponse::Action(_)) => Ok(()),
            (DecisionRequest::ChooseTarget { candidates, .. }, DecisionResponse::Choice(i)) => {
                if *i < candidates.len() {
                    Ok(())
                } else {
                    invalid("target index out of range")
                }
            }
            (DecisionRequest::OrderReplacements { sources, .. }, DecisionResponse::Choice(i)) => {
                if *i < sources.len() {
                    Ok(())
                } else {
                    invalid("replacement index out of range")
                }
            }
            (
                DecisionRequest::Attackers {
                    candidates, defenders, ..
                },
                DecisionResponse::Attackers(declared),
            ) => {
                if !all_unique(declared.iter().map(|(a, _)| *a)) {
                    return invalid("creature declared as attacker twice");
                }
                if declared
                    .iter()
                    .all(|(a, d)| candidates.contains(a) && defenders.contains(d))
                {
                    Ok(())
                } else {
                    invalid("attacker or defender not allowed")
                }
            }
            (DecisionRequest::Blockers { options, .. }, DecisionResponse::Blockers(declared)) => {
                if !all_unique(declared.iter().map(|(b, _)| *b)) {
                    return invalid("creature declared as blocker twice");
                }
                if declared.iter().all(|pair| options.contains(pair)) {
                    Ok(())
                } else {
                    invalid("illegal block")
                }
            }
            (DecisionRequest::OrderTriggers { sources, .. }, DecisionResponse::Order(order)) => {
                let mut sorted = order.clone();
                sorted.sort_unstable();
                if sorted == (0..sources.len()).collect::<Vec<_>>() {
                    Ok(())
                } else {
                    invalid("not a permutation of the triggers")
                }
            }
            (DecisionRequest::PayUnless { .. }, DecisionResponse::YesNo(_)) => Ok(()),
            (
                DecisionRequest::ChooseObjects {
                    candidates, count, ..
                },
                DecisionResponse::Objects(chosen),
            ) => {
                let needed = (*count).min(candidates.len());
                if chosen.len() != needed {
                    return invalid("wrong number of objects");
                }
                if all_unique(chosen.iter().copied()) && chosen.iter().all(|o| candidates.contains(o)) {
                    Ok(())
                } else {
                    invalid("object not among the candidates")
                }
            }
            _ => invalid("response does not match the request"),
        }
    }
}

fn all_unique(ids: impl Iterator<Item = ObjectId>) -> bool {
    let mut seen: Vec<ObjectId> = Vec::new();
    for id in ids {
        if seen.contains(&id) {
            return false;
        }
        seen.push(id);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(n: u8) -> PlayerId {
        PlayerId::new(n)
    }

    #[test]
    fn test_fallbacks_are_accepted() {
        let requests = vec![
            DecisionRequest::Priority {
                player: p(0),
                legal: vec![PlayerAction::PassPriority],
            },
            DecisionRequest::Attackers {
                player: p(0),
                candidates: vec![ObjectId(1)],
                defenders: vec![p(1)],
            },
            DecisionRequest::OrderTriggers {
                player: p(1),
                sources: vec![ObjectId(3), ObjectId(4)],
            },
            DecisionRequest::ChooseObjects {
                player: p(1),
                reason: ChoiceReason::Sacrifice,
                candidates: vec![ObjectId(5), ObjectId(6)],
                count: 1,
            },
        ];
        for request in requests {
            assert!(request.accepts(&request.fallback()).is_ok(), "{:?}", request);
        }
    }

    #[test]
    fn test_rejects_illegal_block() {
        let request = DecisionRequest::Blockers {
            player: p(1),
            options: vec![(ObjectId(7), ObjectId(1))],
        };
        assert!(request
            .accepts(&DecisionResponse::Blockers(vec![(ObjectId(7), ObjectId(1))]))
            .is_ok());
        assert!(request
            .accepts(&DecisionResponse::Blockers(vec![(ObjectId(8), ObjectId(1))]))
            .is_err());
    }

    #[test]
    fn test_rejects_bad_trigger_order() {
        let request = DecisionRequest::OrderTriggers {
            player: p(0),
            sources: vec![ObjectId(1), ObjectId(2)],
        };
        assert!(request.accepts(&DecisionResponse::Order(vec![1, 0])).is_ok());
        assert!(request.accepts(&DecisionResponse::Order(vec![1, 1])).is_err());
        assert!(request.accepts(&DecisionResponse::YesNo(true)).is_err());
    }

    #[test]
    fn test_choose_objects_count_clamps_to_candidates() {
        let request = DecisionRequest::ChooseObjects {
            player: p(0),
            reason: ChoiceReason::Sacrifice,
            candidates: vec![ObjectId(9)],
            count: 2,
        };
        assert!(request.accepts(&DecisionResponse::Objects(vec![ObjectId(9)])).is_ok());
        assert!(request.accepts(&DecisionResponse::Objects(vec![])).is_err());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(DecisionError::TimedOut.to_string(), "decision timed out");
    }
}
