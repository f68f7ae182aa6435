//! The stack and priority passing.
//!
//! Spells and abilities are pushed onto the stack and resolve in LIFO
//! order. Players pass priority in turn order; when every player still in
//! the game has passed in succession, the top object resolves (or, with an
//! empty stack, the step ends).
//!
//! ## N-Player Support
//!
//! Priority passes in turn order (0 → 1 → 2 → ... → 0), skipping players
//! who have left the game. All remaining players must pass consecutively.

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::CardId;
use crate::core::action::CastOptions;
use crate::core::entity::{ObjectId, ObjectRef, Target};
use crate::core::player::PlayerId;
use crate::effects::{Effect, TargetSpec};
use crate::triggers::TriggerOrigin;

/// Unique identifier for a stack object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackId(pub u32);

impl StackId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for StackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StackObject({})", self.0)
    }
}

/// What kind of stack object this is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StackObjectKind {
    /// A spell; `source` is the card object on the stack.
    Spell { card: CardId },
    Activated { index: usize },
    Triggered { origin: TriggerOrigin },
}

/// A spell or ability waiting to resolve.
///
/// Targets are weak references: an object target that changed zones since
/// it was chosen is illegal on resolution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StackObject {
    pub id: StackId,
    pub kind: StackObjectKind,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub targets: SmallVec<[Target; 2]>,
    pub target_specs: Vec<TargetSpec>,
    pub effects: Vec<Effect>,
    pub options: CastOptions,
    /// The object that caused a triggered ability to trigger.
    pub triggering: Option<ObjectRef>,
}

impl StackObject {
    /// A stack object; the stack assigns its id on push.
    #[must_use]
    pub fn new(kind: StackObjectKind, source: ObjectId, controller: PlayerId, effects: Vec<Effect>) -> Self {
        Self {
            id: StackId(0),
            kind,
            source,
            controller,
            targets: SmallVec::new(),
            target_specs: Vec::new(),
            effects,
            options: CastOptions::default(),
            triggering: None,
        }
    }

    #[must_use]
    pub fn with_targets(mut self, specs: Vec<TargetSpec>, targets: &[Target]) -> Self {
        self.target_specs = specs;
        self.targets = SmallVec::from_slice(targets);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: CastOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_triggering(mut self, triggering: Option<ObjectRef>) -> Self {
        self.triggering = triggering;
        self
    }

    #[must_use]
    pub fn is_spell(&self) -> bool {
        matches!(self.kind, StackObjectKind::Spell { .. })
    }
}

/// Result of a priority pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    /// Priority moved to this player.
    Passed(PlayerId),
    /// Every player passed in succession.
    AllPassed,
}

/// The stack plus the priority holder.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PriorityStack {
    /// Index 0 = bottom, last = top.
    objects: Vector<StackObject>,
    holder: Option<PlayerId>,
    consecutive_passes: usize,
    next_id: u32,
}

impl PriorityStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[must_use]
    pub fn top(&self) -> Option<&StackObject> {
        self.objects.last()
    }

    /// Bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &StackObject> {
        self.objects.iter()
    }

    #[must_use]
    pub fn get(&self, id: StackId) -> Option<&StackObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// The stack object for a spell card object.
    #[must_use]
    pub fn spell_for(&self, object: ObjectId) -> Option<&StackObject> {
        self.objects.iter().find(|o| o.is_spell() && o.source == object)
    }

    /// Spell card objects, bottom first.
    #[must_use]
    pub fn spell_objects(&self) -> Vec<ObjectId> {
        self.objects.iter().filter(|o| o.is_spell()).map(|o| o.source).collect()
    }

    /// Put an object on top. Passes reset; the holder is unchanged.
    pub fn push(&mut self, mut object: StackObject) -> StackId {
        let id = StackId::new(self.next_id);
        self.next_id += 1;
        object.id = id;
        self.objects.push_back(object);
        self.consecutive_passes = 0;
        id
    }

    /// Remove the top object for resolution.
    pub fn pop(&mut self) -> Option<StackObject> {
        self.consecutive_passes = 0;
        self.objects.pop_back()
    }

    /// Remove an object wherever it is. Removing an object that is already
    /// gone does nothing.
    pub fn remove(&mut self, id: StackId) -> Option<StackObject> {
        let idx = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(idx))
    }

    /// The player who holds priority, if anyone.
    #[must_use]
    pub fn holder(&self) -> Option<PlayerId> {
        self.holder
    }

    #[must_use]
    pub fn consecutive_passes(&self) -> usize {
        self.consecutive_passes
    }

    /// Give priority to `player` and start a fresh round of passes.
    pub fn give_priority(&mut self, player: PlayerId) {
        self.holder = Some(player);
        self.consecutive_passes = 0;
    }

    /// Nobody holds priority (between steps, during resolution).
    pub fn clear_priority(&mut self) {
        self.holder = None;
        self.consecutive_passes = 0;
    }

    /// The holder passes. `live` lists the players still in the game in
    /// turn order.
    pub fn pass(&mut self, live: &[PlayerId]) -> PassOutcome {
        self.consecutive_passes += 1;
        if self.consecutive_passes >= live.len() {
            return PassOutcome::AllPassed;
        }
        let next = match self.holder {
            Some(current) => next_live(current, live),
            None => live.first().copied(),
        };
        match next {
            Some(player) => {
                self.holder = Some(player);
                PassOutcome::Passed(player)
            }
            None => PassOutcome::AllPassed,
        }
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.clear_priority();
    }
}

/// The first player after `current` in turn order among `live`.
fn next_live(current: PlayerId, live: &[PlayerId]) -> Option<PlayerId> {
    live.iter()
        .copied()
        .find(|p| p.index() > current.index())
        .or_else(|| live.first().copied())
}
