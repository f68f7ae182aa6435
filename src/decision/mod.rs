//! The player-decision interface.
//!
//! The rules engine never blocks on anything but a [`DecisionMaker`]. Each
//! decision point builds a [`DecisionRequest`], hands it to the seat's
//! maker through [`Deciders::ask`], and continues with the answer. A maker
//! that errors (timeout, disconnect) or answers nonsense is replaced by the
//! request's fallback for that one decision; the match goes on.
//!
//! ```
//! use ccg_rules::core::{PlayerAction, PlayerId};
//! use ccg_rules::decision::{Deciders, DecisionRequest, DecisionResponse};
//!
//! let mut deciders = Deciders::autopilot(2);
//! let answer = deciders.ask(&DecisionRequest::Priority {
//!     player: PlayerId::new(1),
//!     legal: vec![PlayerAction::PassPriority],
//! });
//! assert_eq!(answer, DecisionResponse::Action(PlayerAction::PassPriority));
//! ```

pub mod deciders;
pub mod maker;
pub mod request;

pub use deciders::Deciders;
pub use maker::{AutoPilot, ChannelDecider, DecisionMaker, RemotePlayer, Scripted, Style, Ticket};
pub use request::{ChoiceReason, DecisionError, DecisionRequest, DecisionResponse};
