//! Steps, turns and priority.
//!
//! ## Transitions
//!
//! | Flow        | `Game::step` does                                        |
//! |-------------|----------------------------------------------------------|
//! | `StepStart` | turn-based actions, settle, priority to the active player |
//! | `Priority`  | one decision of the holder: an action or a pass          |
//! | `Ended`     | nothing; reports the result again                        |
//!
//! A pass by the last player in a round either resolves the top of the
//! stack or, with an empty stack, ends the step.

use crate::core::action::PlayerAction;
use crate::core::entity::ObjectId;
use crate::core::error::{Result, RulesError};
use crate::core::player::PlayerId;
use crate::core::state::{CombatState, Flow};
use crate::decision::{ChoiceReason, Deciders, DecisionRequest, DecisionResponse};
use crate::effects::{EffectResolver, ResolveResult};
use crate::stack::{PassOutcome, Step};
use crate::triggers::GameEvent;
use crate::zones::ZoneKey;

use super::context::RulesContext;
use super::{Game, StepOutcome};

impl Game {
    /// Advance the game by one transition.
    pub fn step(&mut self, deciders: &mut Deciders) -> Result<StepOutcome> {
        if let Some(result) = &self.state.result {
            return Ok(StepOutcome::GameOver(result.clone()));
        }
        if deciders.player_count() != self.state.player_count() {
            return Err(RulesError::Config(format!(
                "{} decision makers for {} players",
                deciders.player_count(),
                self.state.player_count()
            )));
        }
        match self.state.flow {
            Flow::Ended => Err(RulesError::GameOver),
            Flow::StepStart => Ok(RulesContext::new(self, deciders).begin_step()),
            Flow::Priority => self.priority_decision(deciders),
        }
    }

    /// Ask the priority holder for an action. Illegal actions are
    /// re-prompted a bounded number of times, then treated as a pass.
    fn priority_decision(&mut self, deciders: &mut Deciders) -> Result<StepOutcome> {
        let holder = match self.state.stack.holder() {
            Some(p) if !self.state.player(p).lost => p,
            _ => {
                let Some(first) = self.first_live_from(self.state.turn.active) else {
                    return Err(RulesError::GameOver);
                };
                self.state.stack.give_priority(first);
                first
            }
        };

        for attempt in 0..=self.config.max_reprompts {
            let legal = self.legal_actions(holder);
            let response = deciders.ask(&DecisionRequest::Priority { player: holder, legal });
            let action = match response {
                DecisionResponse::Action(action) => action,
                _ => PlayerAction::PassPriority,
            };
            match self.act(holder, &action, deciders) {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_illegal_action() => {
                    log::warn!("{} attempt {}: {}", holder, attempt + 1, e);
                }
                Err(e) => return Err(e),
            }
        }
        log::warn!("{} made no legal choice, passing", holder);
        self.act(holder, &PlayerAction::PassPriority, deciders)
    }

    /// The first player still in the game, starting at `from`.
    pub(crate) fn first_live_from(&self, from: PlayerId) -> Option<PlayerId> {
        let n = self.state.player_count();
        crate::core::player::apnap_order(from, n)
            .into_iter()
            .find(|p| !self.state.player(*p).lost)
    }
}

impl RulesContext<'_> {
    /// Begin the current step: turn-based actions, then priority.
    pub(crate) fn begin_step(&mut self) -> StepOutcome {
        let step = self.state().turn.step;
        let active = self.state().turn.active;
        let turn = self.state().turn.number;

        if self.state().player(active).lost {
            return self.end_turn();
        }
        if step.needs_attackers() && self.state().turn.combat.attackers.is_empty() {
            log::debug!("no attackers, skipping {}", step);
            return self.end_step();
        }

        log::info!("turn {} ({}): {}", turn, active, step);
        self.turn_based_actions(step, active, turn);
        self.emit(GameEvent::StepBegan { step, active, turn });
        for listener in &mut self.game.listeners {
            listener.on_step(turn, step, active);
        }

        if !step.grants_priority() {
            self.check_state_based_actions();
            if let Some(result) = self.state().result.clone() {
                return StepOutcome::GameOver(result);
            }
            self.end_step();
            return StepOutcome::StepBegan(step);
        }

        self.settle();
        if let Some(result) = self.state().result.clone() {
            return StepOutcome::GameOver(result);
        }
        if let Some(first) = self.game.first_live_from(active) {
            let state = self.state_mut();
            state.stack.give_priority(first);
            state.flow = Flow::Priority;
        }
        StepOutcome::StepBegan(step)
    }

    fn turn_based_actions(&mut self, step: Step, active: PlayerId, turn: u32) {
        match step {
            Step::Untap => {
                let view = self.view();
                let controlled: Vec<ObjectId> =
                    view.battlefield().filter(|o| o.controller == active).map(|o| o.id).collect();
                let state = self.state_mut();
                for id in controlled {
                    if let Some(obj) = state.object_mut(id) {
                        obj.tapped = false;
                        obj.summoning_sick = false;
                    }
                }
                state.player_mut(active).lands_played = 0;
            }
            Step::Draw => {
                if turn == 1 && self.game.config.skip_first_draw {
                    log::debug!("{} skips the first draw", active);
                } else {
                    self.draw(active);
                }
            }
            Step::BeginCombat | Step::PostcombatMain => {
                self.state_mut().turn.combat = CombatState::default();
            }
            Step::DeclareAttackers => self.declare_attackers(),
            Step::DeclareBlockers => self.declare_blockers(),
            Step::CombatDamage => self.combat_damage(),
            Step::EndCombat => {
                let state = self.state_mut();
                state.effects.end_combat();
                state.replacements.end_combat();
            }
            Step::Cleanup => self.cleanup(active),
            Step::Upkeep | Step::PrecombatMain | Step::End => {}
        }
    }

    /// Discard to maximum hand size, remove damage and end "until end of
    /// turn" effects.
    fn cleanup(&mut self, active: PlayerId) {
        let hand: Vec<ObjectId> = self.state().zones.contents(ZoneKey::hand(active)).collect();
        let excess = hand.len().saturating_sub(self.game.config.max_hand_size);
        if excess > 0 {
            let chosen = match self.ask(DecisionRequest::ChooseObjects {
                player: active,
                reason: ChoiceReason::Discard,
                candidates: hand.clone(),
                count: excess,
            }) {
                DecisionResponse::Objects(chosen) => chosen,
                _ => hand.iter().take(excess).copied().collect(),
            };
            let view = self.view();
            for id in chosen {
                self.to_graveyard(id, &view);
            }
        }

        let state = self.state_mut();
        let battlefield: Vec<ObjectId> = state.zones.battlefield().collect();
        for id in battlefield {
            if let Some(obj) = state.object_mut(id) {
                obj.damage = 0;
                obj.deathtouch_damage = false;
            }
        }
        let effects = state.effects.end_turn();
        let replacements = state.replacements.end_turn();
        let triggers = state.triggers.end_turn();
        log::debug!(
            "cleanup: {} effects, {} replacements and {} delayed triggers end",
            effects,
            replacements,
            triggers
        );
    }

    /// The priority holder passes.
    pub(crate) fn pass_priority(&mut self, player: PlayerId) -> Result<StepOutcome> {
        let live = self.state().live_players();
        match self.state_mut().stack.pass(&live) {
            PassOutcome::Passed(next) => {
                log::trace!("{} passes to {}", player, next);
                Ok(StepOutcome::Passed(player))
            }
            PassOutcome::AllPassed if self.state().stack.is_empty() => {
                let step = self.state().turn.step;
                self.end_step();
                Ok(StepOutcome::StepEnded(step))
            }
            PassOutcome::AllPassed => Ok(self.resolve_top()),
        }
    }

    /// Resolve the top object of the stack, settle, and give the active
    /// player priority.
    fn resolve_top(&mut self) -> StepOutcome {
        let state = self.state_mut();
        state.stack.clear_priority();
        let Some(object) = state.stack.pop() else {
            return StepOutcome::Passed(state.turn.active);
        };
        let id = object.id;
        match EffectResolver::resolve(self, object) {
            ResolveResult::Resolved => log::debug!("{} resolved", id),
            ResolveResult::Fizzled => log::debug!("{} fizzled", id),
        }

        self.settle();
        if let Some(result) = self.state().result.clone() {
            return StepOutcome::GameOver(result);
        }
        let active = self.state().turn.active;
        if let Some(first) = self.game.first_live_from(active) {
            self.state_mut().stack.give_priority(first);
        }
        StepOutcome::Resolved(id)
    }

    /// End the current step: mana empties, and the next step (or turn)
    /// waits to begin.
    pub(crate) fn end_step(&mut self) -> StepOutcome {
        let step = self.state().turn.step;
        let state = self.state_mut();
        for (_, player) in state.players.iter_mut() {
            player.mana_pool.clear();
        }
        state.stack.clear_priority();
        match step.next() {
            Some(next) => {
                state.turn.step = next;
                state.flow = Flow::StepStart;
                StepOutcome::StepEnded(step)
            }
            None => self.end_turn(),
        }
    }

    /// Pass the turn to the next player still in the game.
    fn end_turn(&mut self) -> StepOutcome {
        let step = self.state().turn.step;
        let active = self.state().turn.active;
        let next = {
            let n = self.state().player_count();
            let mut candidate = active.next(n);
            while self.state().player(candidate).lost && candidate != active {
                candidate = candidate.next(n);
            }
            candidate
        };
        let state = self.state_mut();
        for (_, player) in state.players.iter_mut() {
            player.mana_pool.clear();
        }
        state.stack.clear_priority();
        state.turn.number += 1;
        state.turn.active = next;
        state.turn.step = Step::Untap;
        state.turn.combat = CombatState::default();
        state.flow = Flow::StepStart;
        log::info!("turn {} begins for {}", state.turn.number, next);
        StepOutcome::StepEnded(step)
    }
}
