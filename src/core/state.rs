//! Game state.
//!
//! `GameState` is everything that persists between rules evaluations: base
//! object values, zones, the stack, stored effects, turn progress and the
//! explicit flow position of the state machine. Derived characteristics are
//! never stored; see [`crate::layers::LayerSystem`].
//!
//! Every collection is an `im` persistent structure, so a clone is O(1).
//! The game snapshots the state before each action and restores it if the
//! action turns out to be illegal.

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};

use super::action::ActionRecord;
use super::entity::{ObjectId, ObjectRef, Timestamp};
use super::error::{Result, RulesError};
use super::player::{PlayerId, PlayerMap};
use super::rng::GameRng;
use crate::cards::{CardId, GameObject, ManaPool};
use crate::layers::EffectStore;
use crate::replacement::ReplacementStore;
use crate::rules::GameResult;
use crate::stack::{PriorityStack, Step};
use crate::triggers::{PendingTrigger, TriggerRegistry};
use crate::zones::{ZoneKey, ZoneManager, ZonePosition};

/// Per-player state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub life: i32,
    pub poison: u32,
    pub lost: bool,
    /// Tried to draw from an empty library since the last state-based
    /// action check.
    pub drew_from_empty: bool,
    pub mana_pool: ManaPool,
    pub lands_played: u32,
}

impl PlayerState {
    #[must_use]
    pub fn new(life: i32) -> Self {
        Self {
            life,
            poison: 0,
            lost: false,
            drew_from_empty: false,
            mana_pool: ManaPool::default(),
            lands_played: 0,
        }
    }
}

/// Attacks and blocks of the current combat.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    /// Attacking creature and the player it attacks.
    pub attackers: Vec<(ObjectId, PlayerId)>,
    /// Blocking creature and the attacker it blocks.
    pub blockers: Vec<(ObjectId, ObjectId)>,
    /// Attackers that were blocked, even if every blocker has since left.
    pub blocked: Vec<ObjectId>,
}

impl CombatState {
    #[must_use]
    pub fn is_attacking(&self, id: ObjectId) -> bool {
        self.attackers.iter().any(|(a, _)| *a == id)
    }

    #[must_use]
    pub fn is_blocking(&self, id: ObjectId) -> bool {
        self.blockers.iter().any(|(b, _)| *b == id)
    }

    /// Blockers of `attacker`, in declaration order.
    #[must_use]
    pub fn blockers_of(&self, attacker: ObjectId) -> Vec<ObjectId> {
        self.blockers
            .iter()
            .filter(|(_, a)| *a == attacker)
            .map(|(b, _)| *b)
            .collect()
    }

    #[must_use]
    pub fn is_blocked(&self, attacker: ObjectId) -> bool {
        self.blocked.contains(&attacker)
    }

    /// Forget a creature that left combat.
    pub fn remove(&mut self, id: ObjectId) {
        self.attackers.retain(|(a, _)| *a != id);
        self.blockers.retain(|(b, a)| *b != id && *a != id);
    }
}

/// Turn progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Starts at 1.
    pub number: u32,
    pub active: PlayerId,
    pub step: Step,
    pub combat: CombatState,
}

/// Where the state machine stands between two transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flow {
    /// The current step has not begun: its turn-based actions are next.
    StepStart,
    /// The stack's priority holder must act.
    Priority,
    /// The game is over.
    Ended,
}

/// Complete state of one game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameState {
    pub players: PlayerMap<PlayerState>,
    pub objects: OrdMap<ObjectId, GameObject>,
    pub zones: ZoneManager,
    pub stack: PriorityStack,
    pub effects: EffectStore,
    pub replacements: ReplacementStore,
    pub triggers: TriggerRegistry,
    /// Triggered abilities waiting to be put on the stack.
    pub pending_triggers: Vector<PendingTrigger>,
    pub turn: TurnState,
    pub flow: Flow,
    pub rng: GameRng,
    pub result: Option<GameResult>,
    pub history: Vector<ActionRecord>,
    next_object: u32,
    next_timestamp: u64,
}

impl GameState {
    /// A game before anything has happened: empty zones, player 0 active,
    /// turn 1 untap step.
    #[must_use]
    pub fn new(player_count: usize, starting_life: i32, seed: u64) -> Self {
        Self {
            players: PlayerMap::new(player_count, |_| PlayerState::new(starting_life)),
            objects: OrdMap::new(),
            zones: ZoneManager::new(),
            stack: PriorityStack::new(),
            effects: EffectStore::new(),
            replacements: ReplacementStore::new(),
            triggers: TriggerRegistry::new(),
            pending_triggers: Vector::new(),
            turn: TurnState {
                number: 1,
                active: PlayerId::new(0),
                step: Step::Untap,
                combat: CombatState::default(),
            },
            flow: Flow::StepStart,
            rng: GameRng::new(seed),
            result: None,
            history: Vector::new(),
            next_object: 1,
            next_timestamp: 1,
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.player_count()
    }

    /// Players still in the game, in turn order.
    #[must_use]
    pub fn live_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|(_, p)| !p.lost)
            .map(|(id, _)| id)
            .collect()
    }

    #[must_use]
    pub fn player(&self, player: PlayerId) -> &PlayerState {
        &self.players[player]
    }

    pub fn player_mut(&mut self, player: PlayerId) -> &mut PlayerState {
        &mut self.players[player]
    }

    #[must_use]
    pub fn life(&self, player: PlayerId) -> i32 {
        self.players[player].life
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }

    /// A fresh timestamp, later than every earlier one.
    pub fn next_timestamp(&mut self) -> Timestamp {
        let ts = Timestamp(self.next_timestamp);
        self.next_timestamp += 1;
        ts
    }

    /// Create an object for `card` in `zone`.
    pub fn create_object(&mut self, card: CardId, owner: PlayerId, zone: ZoneKey, position: ZonePosition) -> ObjectId {
        let id = ObjectId(self.next_object);
        self.next_object += 1;
        let timestamp = self.next_timestamp();
        self.objects.insert(id, GameObject::new(id, card, owner, timestamp));
        self.zones.add(id, zone, position);
        id
    }

    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(&id)
    }

    /// The object, or `UnknownObject`.
    pub fn try_object(&self, id: ObjectId) -> Result<&GameObject> {
        self.objects.get(&id).ok_or(RulesError::UnknownObject(id))
    }

    /// Whether `r` still names the same object.
    #[must_use]
    pub fn is_current(&self, r: ObjectRef) -> bool {
        self.objects.get(&r.id).is_some_and(|o| o.is_current(r.zcc))
    }

    /// Whether `r` names an object that is still on the battlefield.
    #[must_use]
    pub fn on_battlefield(&self, r: ObjectRef) -> bool {
        self.is_current(r) && self.zones.is_in(r.id, crate::zones::Zone::Battlefield)
    }

    /// Remove an object from the game entirely (a token that left the
    /// battlefield).
    pub fn delete_object(&mut self, id: ObjectId) -> Option<GameObject> {
        self.zones.remove(id);
        self.objects.remove(&id)
    }

    /// Drop stored effects and delayed triggers that can never apply
    /// again: tied to an object that left the battlefield, or affecting only
    /// objects that are gone.
    pub fn prune_effects(&mut self) -> usize {
        let objects = &self.objects;
        let zones = &self.zones;
        let is_current = |r: ObjectRef| objects.get(&r.id).is_some_and(|o| o.is_current(r.zcc));
        let on_battlefield = |r: ObjectRef| is_current(r) && zones.is_in(r.id, crate::zones::Zone::Battlefield);
        self.effects.prune(on_battlefield, is_current)
            + self.replacements.prune(on_battlefield)
            + self.triggers.prune(on_battlefield)
    }

    /// Serialize for checkpointing.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| RulesError::Snapshot(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| RulesError::Snapshot(e.to_string()))
    }
}
