//! The rules context.
//!
//! A [`RulesContext`] is a game borrowed together with the decision makers
//! of its players. Every primitive game action goes through it:
//!
//! 1. the action is described as a [`ReplaceableEvent`];
//! 2. replacement and prevention effects modify it
//!    ([`RulesContext::replace`]);
//! 3. what is left is performed and reported as a [`GameEvent`]
//!    ([`RulesContext::emit`]), which collects triggered abilities and
//!    notifies listeners.

use crate::cards::{CounterKind, Keyword};
use crate::core::entity::{ObjectId, Target};
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::decision::{Deciders, DecisionRequest, DecisionResponse};
use crate::layers::{DerivedView, LayerSystem};
use crate::replacement::{ReplaceableEvent, ReplacementEngine};
use crate::triggers::GameEvent;
use crate::zones::{Zone, ZoneKey, ZonePosition};

use super::Game;

/// A game plus the players who make its decisions.
pub struct RulesContext<'g> {
    pub(crate) game: &'g mut Game,
    pub(crate) deciders: &'g mut Deciders,
}

impl<'g> RulesContext<'g> {
    pub fn new(game: &'g mut Game, deciders: &'g mut Deciders) -> Self {
        Self { game, deciders }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.game.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.game.state
    }

    /// A fresh derived view.
    #[must_use]
    pub fn view(&self) -> DerivedView {
        LayerSystem::compute(&self.game.state, &self.game.cards)
    }

    /// Put a question to a player.
    pub fn ask(&mut self, request: DecisionRequest) -> DecisionResponse {
        self.deciders.ask(&request)
    }

    /// Report an event: collect the abilities it triggers and notify
    /// listeners.
    pub(crate) fn emit(&mut self, event: GameEvent) {
        log::trace!("event {}: {:?}", event.kind(), event);
        let view = self.view();
        let active = self.game.state.turn.active;
        let pending = self.game.state.triggers.collect(&event, &view, active);
        self.game.state.pending_triggers.extend(pending);
        for listener in &mut self.game.listeners {
            listener.on_event(&event);
        }
    }

    /// Run an event through replacement effects. `None` if nothing is left
    /// of it.
    pub(crate) fn replace(&mut self, event: ReplaceableEvent, view: &DerivedView) -> Option<ReplaceableEvent> {
        let active = ReplacementEngine::active(&self.game.state.replacements, view);
        if active.is_empty() {
            return Some(event);
        }
        let deciders = &mut *self.deciders;
        let outcome = ReplacementEngine::replace(event, &active, view, |player, options| {
            let request = DecisionRequest::OrderReplacements {
                player,
                sources: options.iter().map(|r| r.source).collect(),
            };
            match deciders.ask(&request) {
                DecisionResponse::Choice(i) => i,
                _ => 0,
            }
        });
        for (id, used) in outcome.shields_used {
            self.game.state.replacements.consume_shield(id, used);
        }
        outcome.event
    }

    /// Replace, then perform. `view` is the view the event was described
    /// against; it supplies last known information.
    pub(crate) fn happen(&mut self, event: ReplaceableEvent, view: &DerivedView) {
        let Some(event) = self.replace(event, view) else {
            return;
        };
        match event {
            ReplaceableEvent::Damage {
                source,
                target,
                amount,
                combat,
            } => self.apply_damage(source, target, amount, combat, view),
            ReplaceableEvent::GainLife { player, amount } => self.apply_gain(player, amount),
            ReplaceableEvent::LoseLife { player, amount } => self.apply_loss(player, amount),
            ReplaceableEvent::ZoneChange {
                object,
                to,
                tapped,
                counters,
                ..
            } => self.apply_zone_change(object, to, tapped, &counters, view),
            ReplaceableEvent::Draw { player } => self.apply_draw(player),
        }
    }

    // === Primitive actions ===

    /// Move an object to another zone.
    pub fn move_object(&mut self, id: ObjectId, to: ZoneKey) {
        let view = self.view();
        self.move_with_view(id, to, &view);
    }

    /// Move against an already computed view. Objects moving at the same
    /// time share one view so each one's last known information is taken
    /// before any of them moved.
    pub(crate) fn move_with_view(&mut self, id: ObjectId, to: ZoneKey, view: &DerivedView) {
        let Some(from) = self.game.state.zones.zone_of(id) else {
            return;
        };
        self.happen(ReplaceableEvent::zone_change(id, from, to), view);
    }

    /// Put an object into its owner's graveyard.
    pub(crate) fn to_graveyard(&mut self, id: ObjectId, view: &DerivedView) {
        if let Some(owner) = self.game.state.object(id).map(|o| o.owner) {
            self.move_with_view(id, ZoneKey::graveyard(owner), view);
        }
    }

    pub fn deal_damage(&mut self, source: ObjectId, target: Target, amount: u32, combat: bool) {
        if amount == 0 {
            return;
        }
        let view = self.view();
        self.happen(
            ReplaceableEvent::Damage {
                source,
                target,
                amount,
                combat,
            },
            &view,
        );
    }

    pub fn gain_life(&mut self, player: PlayerId, amount: u32) {
        if amount == 0 {
            return;
        }
        let view = self.view();
        self.happen(ReplaceableEvent::GainLife { player, amount }, &view);
    }

    pub fn lose_life(&mut self, player: PlayerId, amount: u32) {
        if amount == 0 {
            return;
        }
        let view = self.view();
        self.happen(ReplaceableEvent::LoseLife { player, amount }, &view);
    }

    pub fn draw(&mut self, player: PlayerId) {
        let view = self.view();
        self.happen(ReplaceableEvent::Draw { player }, &view);
    }

    /// Create a token on the battlefield. Enters-the-battlefield
    /// replacements apply to it.
    pub fn create_token(&mut self, card: crate::cards::CardId, controller: PlayerId) -> ObjectId {
        let state = &mut self.game.state;
        let id = state.create_object(card, controller, ZoneKey::BATTLEFIELD, ZonePosition::Top);
        if let Some(obj) = state.object_mut(id) {
            obj.token = true;
            obj.summoning_sick = true;
        }

        let view = self.view();
        let entering = ReplaceableEvent::zone_change(id, ZoneKey::BATTLEFIELD, ZoneKey::BATTLEFIELD);
        if let Some(ReplaceableEvent::ZoneChange { tapped, counters, .. }) = self.replace(entering, &view) {
            if let Some(obj) = self.game.state.object_mut(id) {
                obj.tapped = tapped;
                for (kind, count) in counters {
                    obj.add_counters(kind, count);
                }
            }
        }

        let Some(object) = self.game.state.object(id).map(|o| o.object_ref()) else {
            return id;
        };
        log::debug!("{} creates token {}", controller, id);
        self.emit(GameEvent::Created { object });
        id
    }

    // === Performing replaced events ===

    fn apply_damage(&mut self, source: ObjectId, target: Target, amount: u32, combat: bool, view: &DerivedView) {
        let (lifelink, deathtouch, source_controller) = match view.get(source) {
            Some(o) => (
                o.characteristics.has_keyword(Keyword::Lifelink),
                o.characteristics.has_keyword(Keyword::Deathtouch),
                Some(o.controller),
            ),
            None => (false, false, None),
        };

        match target {
            Target::Player(player) => {
                let state = &mut self.game.state;
                if state.player(player).lost {
                    return;
                }
                state.player_mut(player).life -= amount as i32;
                self.emit(GameEvent::DamageDealt {
                    source,
                    target,
                    amount,
                    combat,
                });
                self.emit(GameEvent::LifeLost { player, amount });
            }
            Target::Object(r) => {
                if !self.game.state.on_battlefield(r) {
                    return;
                }
                if let Some(obj) = self.game.state.object_mut(r.id) {
                    obj.damage += amount;
                    obj.deathtouch_damage |= deathtouch;
                }
                self.emit(GameEvent::DamageDealt {
                    source,
                    target,
                    amount,
                    combat,
                });
            }
        }

        if let (true, Some(controller)) = (lifelink, source_controller) {
            self.gain_life(controller, amount);
        }
    }

    fn apply_gain(&mut self, player: PlayerId, amount: u32) {
        let state = &mut self.game.state;
        if state.player(player).lost || amount == 0 {
            return;
        }
        state.player_mut(player).life += amount as i32;
        self.emit(GameEvent::LifeGained { player, amount });
    }

    fn apply_loss(&mut self, player: PlayerId, amount: u32) {
        let state = &mut self.game.state;
        if state.player(player).lost || amount == 0 {
            return;
        }
        state.player_mut(player).life -= amount as i32;
        self.emit(GameEvent::LifeLost { player, amount });
    }

    fn apply_draw(&mut self, player: PlayerId) {
        let library = ZoneKey::library(player);
        let Some(card) = self.game.state.zones.top(library) else {
            log::debug!("{} draws from an empty library", player);
            self.game.state.player_mut(player).drew_from_empty = true;
            return;
        };
        let view = self.view();
        self.apply_zone_change(card, ZoneKey::hand(player), false, &[], &view);
        self.emit(GameEvent::CardDrawn { player, card });
    }

    /// Move an object, making it a new object in its new zone.
    pub(crate) fn apply_zone_change(
        &mut self,
        id: ObjectId,
        to: ZoneKey,
        tapped: bool,
        counters: &[(CounterKind, u32)],
        view: &DerivedView,
    ) {
        let state = &mut self.game.state;
        let Some(from) = state.zones.zone_of(id) else {
            return;
        };
        let Some(current_zcc) = state.object(id).map(|o| o.zcc) else {
            return;
        };
        let last_known = match view.get(id) {
            Some(o) if o.zcc == current_zcc => o.clone(),
            _ => match LayerSystem::compute(state, &self.game.cards).get(id) {
                Some(o) => o.clone(),
                None => return,
            },
        };

        // Cast options and the caster's control survive the spell becoming
        // a permanent, and are chosen before a card moves to the stack.
        let keep_cast = to.zone == Zone::Stack || (from.zone == Zone::Stack && to.zone == Zone::Battlefield);
        let timestamp = state.next_timestamp();
        let Some(obj) = state.object_mut(id) else {
            return;
        };
        let cast = obj.cast;
        let controller = obj.controller;
        obj.reset_for_zone_change(timestamp);
        if keep_cast {
            obj.cast = cast;
            obj.controller = controller;
        }
        if to.zone == Zone::Battlefield {
            obj.tapped = tapped;
            obj.summoning_sick = true;
            for (kind, count) in counters {
                obj.add_counters(*kind, *count);
            }
        }
        let object = obj.object_ref();

        state.zones.move_to(id, to, ZonePosition::Top);
        state.turn.combat.remove(id);
        if from.zone == Zone::Battlefield {
            state.prune_effects();
        }
        log::debug!("{} moves from {} to {}", id, from.zone, to.zone);

        self.emit(GameEvent::ZoneChanged {
            object,
            from,
            to,
            last_known: Box::new(last_known),
        });
    }
}
