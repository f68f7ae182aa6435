//! State-based actions and putting triggered abilities on the stack.
//!
//! Before anyone receives priority the game *settles*: state-based actions
//! are applied until none applies, then pending triggers go on the stack,
//! and the check repeats until neither changes anything.

use rustc_hash::FxHashMap;

use crate::cards::{CounterKind, Keyword, Supertype};
use crate::core::entity::{ObjectId, Target};
use crate::core::player::PlayerId;
use crate::core::state::Flow;
use crate::decision::{ChoiceReason, DecisionRequest, DecisionResponse};
use crate::effects::TargetContext;
use crate::rules::GameResult;
use crate::stack::{StackObject, StackObjectKind};
use crate::triggers::{GameEvent, PendingTrigger, TriggerRegistry};
use crate::zones::Zone;

use super::context::RulesContext;

impl RulesContext<'_> {
    /// Apply state-based actions and put triggers on the stack until
    /// nothing changes or the game ends.
    pub(crate) fn settle(&mut self) {
        loop {
            self.check_state_based_actions();
            if self.state().is_over() {
                return;
            }
            if !self.put_triggers_on_stack() {
                return;
            }
        }
    }

    /// Apply state-based actions repeatedly until none applies.
    pub(crate) fn check_state_based_actions(&mut self) {
        let limit = self.game.config.sba_iteration_limit;
        for _ in 0..limit {
            if !self.state_based_pass() || self.state().is_over() {
                return;
            }
        }
        log::warn!("state-based actions still applying after {} passes", limit);
    }

    /// One simultaneous pass. Returns whether anything happened.
    fn state_based_pass(&mut self) -> bool {
        let mut changed = false;

        let threshold = self.game.config.poison_threshold;
        let losers: Vec<PlayerId> = self
            .state()
            .players
            .iter()
            .filter(|(_, p)| !p.lost && (p.life <= 0 || p.drew_from_empty || p.poison >= threshold))
            .map(|(id, _)| id)
            .collect();
        for (_, player) in self.state_mut().players.iter_mut() {
            player.drew_from_empty = false;
        }
        if !losers.is_empty() {
            for player in losers {
                self.eliminate(player);
            }
            self.check_game_end();
            if self.state().is_over() {
                return true;
            }
            changed = true;
        }

        // Tokens that left the battlefield cease to exist.
        let stray_tokens: Vec<ObjectId> = self
            .state()
            .objects
            .values()
            .filter(|o| o.token && !self.state().zones.is_in(o.id, Zone::Battlefield))
            .map(|o| o.id)
            .collect();
        for id in stray_tokens {
            log::debug!("token {} ceases to exist", id);
            self.state_mut().delete_object(id);
            changed = true;
        }

        // +1/+1 and -1/-1 counters annihilate.
        let battlefield: Vec<ObjectId> = self.state().zones.battlefield().collect();
        for id in battlefield {
            if let Some(obj) = self.state_mut().object_mut(id) {
                let pairs = obj.counter(CounterKind::PlusOne).min(obj.counter(CounterKind::MinusOne));
                if pairs > 0 {
                    obj.remove_counters(CounterKind::PlusOne, pairs);
                    obj.remove_counters(CounterKind::MinusOne, pairs);
                    changed = true;
                }
            }
        }

        // Creatures with toughness 0 or less, or destroyed by damage.
        let view = self.view();
        let dying: Vec<ObjectId> = view
            .battlefield()
            .filter(|o| o.characteristics.is_creature())
            .filter(|o| {
                let Some(base) = self.state().object(o.id) else {
                    return false;
                };
                let toughness = o.toughness();
                let lethal = base.damage > 0 && base.damage as i32 >= toughness;
                let indestructible = o.characteristics.has_keyword(Keyword::Indestructible);
                toughness <= 0 || ((lethal || base.deathtouch_damage) && !indestructible)
            })
            .map(|o| o.id)
            .collect();
        for id in &dying {
            log::debug!("{} dies to state-based actions", id);
            self.to_graveyard(*id, &view);
            changed = true;
        }

        // Legend rule.
        let mut legends: FxHashMap<(PlayerId, String), Vec<ObjectId>> = FxHashMap::default();
        for o in view.battlefield() {
            if o.characteristics.has_supertype(Supertype::Legendary) && !dying.contains(&o.id) {
                legends
                    .entry((o.controller, o.characteristics.name.clone()))
                    .or_default()
                    .push(o.id);
            }
        }
        let mut groups: Vec<((PlayerId, String), Vec<ObjectId>)> =
            legends.into_iter().filter(|(_, ids)| ids.len() > 1).collect();
        groups.sort();
        for ((controller, name), candidates) in groups {
            let keep = match self.ask(DecisionRequest::ChooseObjects {
                player: controller,
                reason: ChoiceReason::LegendRule,
                candidates: candidates.clone(),
                count: 1,
            }) {
                DecisionResponse::Objects(chosen) => chosen.first().copied(),
                _ => None,
            }
            .unwrap_or(candidates[0]);
            log::debug!("legend rule: {} keeps {} named {}", controller, keep, name);
            for id in candidates.into_iter().filter(|id| *id != keep) {
                self.to_graveyard(id, &view);
            }
            changed = true;
        }

        changed
    }

    /// Remove a player from the game: their objects and stack objects
    /// leave with them.
    fn eliminate(&mut self, player: PlayerId) {
        log::info!("{} loses the game", player);
        let state = self.state_mut();
        state.player_mut(player).lost = true;

        let owned: Vec<ObjectId> = state.objects.values().filter(|o| o.owner == player).map(|o| o.id).collect();
        for id in owned {
            state.delete_object(id);
            state.turn.combat.remove(id);
        }
        let stacked: Vec<_> = state
            .stack
            .iter()
            .filter(|o| o.controller == player)
            .map(|o| o.id)
            .collect();
        for id in stacked {
            state.stack.remove(id);
        }
        state.pending_triggers.retain(|t| t.controller != player);
        state.prune_effects();
        if state.stack.holder() == Some(player) {
            state.stack.clear_priority();
        }

        self.emit(GameEvent::PlayerLost { player });
    }

    /// End the game if at most one player is left.
    pub(crate) fn check_game_end(&mut self) {
        let live = self.state().live_players();
        match live.as_slice() {
            [] => self.finish(GameResult::Draw),
            [winner] => self.finish(GameResult::Winner(*winner)),
            _ => {}
        }
    }

    pub(crate) fn finish(&mut self, result: GameResult) {
        if self.state().is_over() {
            return;
        }
        log::info!("game over on turn {}: {:?}", self.state().turn.number, result);
        let state = self.state_mut();
        state.result = Some(result.clone());
        state.flow = Flow::Ended;
        state.stack.clear_priority();
        for listener in &mut self.game.listeners {
            listener.on_game_over(&result);
        }
    }

    /// Put pending triggers on the stack: grouped by controller in APNAP
    /// order, each controller ordering their own. Returns whether anything
    /// was put on the stack.
    pub(crate) fn put_triggers_on_stack(&mut self) -> bool {
        let state = self.state_mut();
        if state.pending_triggers.is_empty() {
            return false;
        }
        let pending: Vec<PendingTrigger> = std::mem::take(&mut state.pending_triggers)
            .into_iter()
            .filter(|t| !state.player(t.controller).lost)
            .collect();
        let active = state.turn.active;
        let player_count = state.player_count();

        let mut pushed = false;
        for (controller, group) in TriggerRegistry::apnap_groups(pending, active, player_count) {
            for trigger in self.order_triggers(controller, group) {
                pushed |= self.push_trigger(trigger);
            }
        }
        pushed
    }

    fn order_triggers(&mut self, controller: PlayerId, group: Vec<PendingTrigger>) -> Vec<PendingTrigger> {
        if group.len() < 2 {
            return group;
        }
        let order = match self.ask(DecisionRequest::OrderTriggers {
            player: controller,
            sources: group.iter().map(|t| t.source).collect(),
        }) {
            DecisionResponse::Order(order) => order,
            _ => (0..group.len()).collect(),
        };
        let mut slots: Vec<Option<PendingTrigger>> = group.into_iter().map(Some).collect();
        order.into_iter().filter_map(|i| slots.get_mut(i).and_then(Option::take)).collect()
    }

    /// Choose targets and push one trigger. A trigger with a target slot
    /// that has no legal target is removed.
    fn push_trigger(&mut self, trigger: PendingTrigger) -> bool {
        let mut targets: Vec<Target> = Vec::with_capacity(trigger.targets.len());
        for (slot, spec) in trigger.targets.iter().enumerate() {
            let view = self.view();
            let live = self.state().live_players();
            let spells = self.state().stack.spell_objects();
            let ctx = TargetContext {
                view: &view,
                controller: trigger.controller,
                source: Some(trigger.source),
                players: &live,
                stack: &spells,
            };
            let candidates = spec.candidates(&ctx);
            let chosen = match candidates.len() {
                0 => {
                    log::debug!("trigger of {} has no legal target for slot {}", trigger.source, slot);
                    return false;
                }
                1 => candidates[0],
                _ => {
                    let index = match self.ask(DecisionRequest::ChooseTarget {
                        player: trigger.controller,
                        source: trigger.source,
                        slot,
                        candidates: candidates.clone(),
                    }) {
                        DecisionResponse::Choice(i) => i,
                        _ => 0,
                    };
                    candidates.get(index).copied().unwrap_or(candidates[0])
                }
            };
            targets.push(chosen);
        }

        let object = StackObject::new(
            StackObjectKind::Triggered { origin: trigger.origin },
            trigger.source,
            trigger.controller,
            trigger.effects,
        )
        .with_targets(trigger.targets, &targets)
        .with_triggering(trigger.triggering);
        let id = self.state_mut().stack.push(object);
        log::debug!("trigger of {} goes on the stack as {}", trigger.source, id);
        true
    }
}
