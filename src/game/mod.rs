//! The game: an explicit context object tying configuration, the shared card
//! registry, state and listeners together.
//!
//! ## Driving a game
//!
//! [`Game::step`] advances the state machine by one transition (a step
//! beginning, one priority decision, a resolution, a step ending). Where the
//! machine stands between transitions is recorded in
//! [`GameState::flow`](crate::core::GameState), so a game can be stopped
//! after any step, serialized, and resumed.
//!
//! ```
//! use std::sync::Arc;
//! use ccg_rules::cards::library;
//! use ccg_rules::core::RulesConfig;
//! use ccg_rules::decision::Deciders;
//! use ccg_rules::game::Game;
//!
//! let cards = Arc::new(library::sample_registry().unwrap());
//! let mut game = Game::new(RulesConfig::new(2), cards, 7).unwrap();
//! let deck = library::starter_deck();
//! game.start(&[deck.clone(), deck]).unwrap();
//!
//! let mut deciders = Deciders::autopilot(2);
//! game.run_until_end(&mut deciders, 200).unwrap();
//! assert!(game.state().turn.number > 1);
//! ```
//!
//! ## Modules
//!
//! - `context`: the primitive game actions every rule goes through
//!   (zone changes, damage, life, draws) with replacement and triggers
//! - `casting`: legal actions, costs, casting and activation
//! - `combat`: attackers, blockers, combat damage
//! - `sba`: state-based actions and putting triggers on the stack
//! - `flow`: steps, turns and priority
//! - `setup`: starting a game and building scenarios

mod casting;
mod combat;
mod context;
mod flow;
pub mod listener;
mod sba;
mod setup;

use std::sync::Arc;

use crate::cards::{CardRegistry, Characteristics};
use crate::core::action::PlayerAction;
use crate::core::config::RulesConfig;
use crate::core::entity::ObjectId;
use crate::core::error::Result;
use crate::core::player::PlayerId;
use crate::core::state::{GameState, TurnState};
use crate::decision::Deciders;
use crate::layers::{DerivedObject, DerivedView, LayerSystem};
use crate::rules::{GameResult, RulesEngine};
use crate::stack::{PriorityStack, StackId, Step};
use crate::zones::ZoneKey;

pub use context::RulesContext;
pub use listener::{EventLog, GameListener};

/// What one call to [`Game::step`] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// A step began and its turn-based actions were performed.
    StepBegan(Step),
    /// The priority holder took an action other than passing.
    Acted { player: PlayerId, action: PlayerAction },
    /// The priority holder passed and priority moved on.
    Passed(PlayerId),
    /// Everyone passed and the top of the stack resolved.
    Resolved(StackId),
    /// Everyone passed with an empty stack; the step ended.
    StepEnded(Step),
    GameOver(GameResult),
}

/// One game of the rules core.
pub struct Game {
    pub(crate) config: RulesConfig,
    pub(crate) cards: Arc<CardRegistry>,
    pub(crate) state: GameState,
    pub(crate) listeners: Vec<Box<dyn GameListener>>,
}

impl Game {
    /// A new game. Nothing is in any zone until [`Game::start`] or the
    /// scenario helpers put it there.
    pub fn new(config: RulesConfig, cards: Arc<CardRegistry>, seed: u64) -> Result<Self> {
        config.validate()?;
        let state = GameState::new(config.player_count, config.starting_life, seed);
        Ok(Self {
            config,
            cards,
            state,
            listeners: Vec::new(),
        })
    }

    /// Resume a game from a checkpoint taken with [`Game::checkpoint`].
    pub fn restore(config: RulesConfig, cards: Arc<CardRegistry>, bytes: &[u8]) -> Result<Self> {
        config.validate()?;
        let state = GameState::from_bytes(bytes)?;
        Ok(Self {
            config,
            cards,
            state,
            listeners: Vec::new(),
        })
    }

    /// Serialize the game state.
    pub fn checkpoint(&self) -> Result<Vec<u8>> {
        self.state.to_bytes()
    }

    #[must_use]
    pub fn with_listener(mut self, listener: impl GameListener + 'static) -> Self {
        self.add_listener(listener);
        self
    }

    pub fn add_listener(&mut self, listener: impl GameListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    #[must_use]
    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    #[must_use]
    pub fn cards(&self) -> &Arc<CardRegistry> {
        &self.cards
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for building test scenarios. Changes made here bypass
    /// every rule.
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Derived characteristics of every object.
    #[must_use]
    pub fn view(&self) -> DerivedView {
        LayerSystem::compute(&self.state, &self.cards)
    }

    #[must_use]
    pub fn characteristics(&self, id: ObjectId) -> Option<Characteristics> {
        LayerSystem::characteristics(&self.state, &self.cards, id)
    }

    #[must_use]
    pub fn derived(&self, id: ObjectId) -> Option<DerivedObject> {
        self.view().get(id).cloned()
    }

    #[must_use]
    pub fn life(&self, player: PlayerId) -> i32 {
        self.state.life(player)
    }

    #[must_use]
    pub fn stack(&self) -> &PriorityStack {
        &self.state.stack
    }

    /// Objects in a zone, bottom first.
    #[must_use]
    pub fn zone(&self, key: ZoneKey) -> Vec<ObjectId> {
        self.state.zones.contents(key).collect()
    }

    #[must_use]
    pub fn turn(&self) -> &TurnState {
        &self.state.turn
    }

    #[must_use]
    pub fn result(&self) -> Option<&GameResult> {
        self.state.result.as_ref()
    }

    #[must_use]
    pub fn priority_holder(&self) -> Option<PlayerId> {
        self.state.stack.holder()
    }

    /// Step until the game ends or `max_steps` transitions have been made.
    /// Returns the result if the game ended.
    pub fn run_until_end(&mut self, deciders: &mut Deciders, max_steps: usize) -> Result<Option<GameResult>> {
        for _ in 0..max_steps {
            if let StepOutcome::GameOver(result) = self.step(deciders)? {
                return Ok(Some(result));
            }
        }
        log::info!(
            "stopped after {} steps on turn {} without a result",
            max_steps,
            self.state.turn.number
        );
        Ok(None)
    }
}

impl RulesEngine for Game {
    fn config(&self) -> &RulesConfig {
        &self.config
    }

    fn state(&self) -> &GameState {
        &self.state
    }

    fn legal_actions(&self, player: PlayerId) -> Vec<PlayerAction> {
        Game::legal_actions(self, player)
    }

    /// Choices the action leads to (trigger targets, orderings) are made by
    /// passive autopilots. Use [`Game::step`] to route them to players.
    fn apply_action(&mut self, player: PlayerId, action: &PlayerAction) -> Result<()> {
        let mut deciders = Deciders::autopilot(self.state.player_count());
        self.act(player, action, &mut deciders).map(|_| ())
    }
}
