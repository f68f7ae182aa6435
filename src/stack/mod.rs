//! The stack, priority and turn structure.
//!
//! ## Example Usage
//!
//! ```
//! use ccg_rules::core::{ObjectId, PlayerId};
//! use ccg_rules::effects::Effect;
//! use ccg_rules::stack::{PassOutcome, PriorityStack, StackObject, StackObjectKind};
//!
//! let mut stack = PriorityStack::new();
//! stack.push(StackObject::new(
//!     StackObjectKind::Activated { index: 0 },
//!     ObjectId(1),
//!     PlayerId::new(0),
//!     vec![Effect::draw(1)],
//! ));
//! stack.give_priority(PlayerId::new(0));
//!
//! let live = [PlayerId::new(0), PlayerId::new(1)];
//! assert_eq!(stack.pass(&live), PassOutcome::Passed(PlayerId::new(1)));
//! assert_eq!(stack.pass(&live), PassOutcome::AllPassed);
//! ```

mod priority;
mod turn;

pub use priority::{PassOutcome, PriorityStack, StackId, StackObject, StackObjectKind};
pub use turn::{Phase, Step};
