//! Legal actions, costs, casting spells and activating abilities.
//!
//! ## Mana payment
//!
//! Costs are paid automatically: mana already in the pool first, then
//! untapped mana sources, tapping sources of a needed color before using
//! any source for generic mana, and colorless sources first for generic.

use crate::cards::{
    Ability, ActivatedAbility, CardDefinition, Characteristics, Color, Keyword, ManaAbility, ManaCost, ManaKind,
    ManaPool,
};
use crate::core::action::{ActionRecord, CastOptions, PlayerAction};
use crate::core::entity::{ObjectId, Target};
use crate::core::error::{IllegalReason, Result, RulesError};
use crate::core::player::PlayerId;
use crate::core::state::Flow;
use crate::decision::Deciders;
use crate::effects::{TargetContext, TargetSpec};
use crate::layers::{DerivedObject, DerivedView};
use crate::replacement::ReplaceableEvent;
use crate::stack::{StackObject, StackObjectKind};
use crate::triggers::GameEvent;
use crate::zones::ZoneKey;

use super::context::RulesContext;
use super::{Game, StepOutcome};

impl Game {
    /// Every action `player` may take now: pass, play a land, cast a spell
    /// (normally or prototyped, with or without its additional cost) or
    /// activate an ability, with every legal combination of targets.
    /// Empty unless `player` holds priority.
    #[must_use]
    pub fn legal_actions(&self, player: PlayerId) -> Vec<PlayerAction> {
        if self.state.flow != Flow::Priority || self.state.stack.holder() != Some(player) {
            return Vec::new();
        }
        let view = self.view();
        let live = self.state.live_players();
        let spells = self.state.stack.spell_objects();
        let available = self.available_mana(&view, player, None);
        let mut actions = vec![PlayerAction::PassPriority];

        for id in self.state.zones.contents(ZoneKey::hand(player)) {
            let Some(object) = view.get(id) else { continue };
            let chars = &object.characteristics;
            if chars.is_land() {
                if self.can_play_land(player) {
                    actions.push(PlayerAction::PlayLand { card: id });
                }
                continue;
            }
            if !chars.has_instant_timing() && !self.sorcery_timing(player) {
                continue;
            }
            let Some(definition) = self.state.object(id).and_then(|o| self.cards.get(o.card)) else {
                continue;
            };
            let specs = spell_targets(definition);
            let ctx = TargetContext {
                view: &view,
                controller: player,
                source: Some(id),
                players: &live,
                stack: &spells,
            };
            let Some(combinations) = target_combinations(&specs, &ctx) else {
                continue;
            };
            for options in cast_options(definition) {
                if !available.can_pay(&spell_cost(definition, options)) {
                    continue;
                }
                for targets in &combinations {
                    actions.push(PlayerAction::cast_with(id, targets, options));
                }
            }
        }

        for object in view.battlefield().filter(|o| o.controller == player) {
            for (index, ability) in activated_abilities(&object.characteristics).enumerate() {
                if self.activation_problem(player, object, ability, &view).is_some() {
                    continue;
                }
                let ctx = TargetContext {
                    view: &view,
                    controller: player,
                    source: Some(object.id),
                    players: &live,
                    stack: &spells,
                };
                let Some(combinations) = target_combinations(&ability.targets, &ctx) else {
                    continue;
                };
                for targets in &combinations {
                    actions.push(PlayerAction::activate(object.id, index, targets));
                }
            }
        }
        actions
    }

    /// Validate and perform a priority action, restoring the state if it
    /// turns out to be illegal.
    pub(crate) fn act(&mut self, player: PlayerId, action: &PlayerAction, deciders: &mut Deciders) -> Result<StepOutcome> {
        if self.state.is_over() {
            return Err(RulesError::GameOver);
        }
        if self.state.flow != Flow::Priority || self.state.stack.holder() != Some(player) {
            return Err(RulesError::illegal(player, IllegalReason::NoPriority));
        }
        let snapshot = self.state.clone();
        let outcome = RulesContext::new(self, deciders).perform(player, action);
        if let Err(e) = &outcome {
            log::debug!("rejected {:?}: {}", action, e);
            self.state = snapshot;
        }
        outcome
    }

    /// Whether `player` could cast a sorcery now.
    #[must_use]
    pub fn sorcery_timing(&self, player: PlayerId) -> bool {
        self.state.turn.active == player && self.state.turn.step.is_main() && self.state.stack.is_empty()
    }

    fn can_play_land(&self, player: PlayerId) -> bool {
        self.sorcery_timing(player) && self.state.player(player).lands_played < self.config.lands_per_turn
    }

    /// Untapped permanents of `player` with a mana ability, and what they
    /// make.
    pub(crate) fn mana_sources(
        &self,
        view: &DerivedView,
        player: PlayerId,
        exclude: Option<ObjectId>,
    ) -> Vec<(ObjectId, ManaAbility)> {
        view.battlefield()
            .filter(|o| o.controller == player && Some(o.id) != exclude)
            .filter(|o| self.can_tap(o))
            .filter_map(|o| {
                o.characteristics.abilities.iter().find_map(|a| match a {
                    Ability::Mana(m) => Some((o.id, *m)),
                    _ => None,
                })
            })
            .collect()
    }

    /// The pool `player` could have by tapping every mana source.
    pub(crate) fn available_mana(&self, view: &DerivedView, player: PlayerId, exclude: Option<ObjectId>) -> ManaPool {
        let mut pool = self.state.player(player).mana_pool;
        for (_, ability) in self.mana_sources(view, player, exclude) {
            pool.add(ability.produces, ability.amount);
        }
        pool
    }

    /// Whether a {T} cost of this permanent can be paid.
    fn can_tap(&self, object: &DerivedObject) -> bool {
        let Some(base) = self.state.object(object.id) else {
            return false;
        };
        let sick = base.summoning_sick
            && object.characteristics.is_creature()
            && !object.characteristics.has_keyword(Keyword::Haste);
        !base.tapped && !sick
    }

    fn activation_problem(
        &self,
        player: PlayerId,
        object: &DerivedObject,
        ability: &ActivatedAbility,
        view: &DerivedView,
    ) -> Option<IllegalReason> {
        if ability.sorcery_speed && !self.sorcery_timing(player) {
            return Some(IllegalReason::Timing);
        }
        if ability.cost.tap && !self.can_tap(object) {
            return Some(IllegalReason::UnpayableCost);
        }
        if ability.cost.life > 0 && self.state.life(player) < ability.cost.life as i32 {
            return Some(IllegalReason::UnpayableCost);
        }
        if let Some(cost) = &ability.cost.mana {
            let exclude = ability.cost.tap.then_some(object.id);
            if !self.available_mana(view, player, exclude).can_pay(cost) {
                return Some(IllegalReason::InsufficientMana);
            }
        }
        None
    }
}

/// Ways a card can be cast: normally, prototyped, each with and without its
/// additional cost.
fn cast_options(definition: &CardDefinition) -> Vec<CastOptions> {
    let mut out = vec![CastOptions::default()];
    if definition.prototype.is_some() {
        out.push(CastOptions::prototyped());
    }
    if definition.additional_cost.is_some() {
        let paid: Vec<CastOptions> = out
            .iter()
            .map(|o| CastOptions {
                additional_cost_paid: true,
                ..*o
            })
            .collect();
        out.extend(paid);
    }
    out
}

/// Total mana cost of casting `definition` with `options`.
fn spell_cost(definition: &CardDefinition, options: CastOptions) -> ManaCost {
    let base = match (&definition.prototype, options.prototyped) {
        (Some(proto), true) => proto.mana_cost,
        _ => definition.mana_cost.unwrap_or_default(),
    };
    match (&definition.additional_cost, options.additional_cost_paid) {
        (Some(extra), true) => base.plus(extra),
        _ => base,
    }
}

fn spell_targets(definition: &CardDefinition) -> Vec<TargetSpec> {
    definition.spell.as_ref().map(|s| s.targets.clone()).unwrap_or_default()
}

fn activated_abilities(chars: &Characteristics) -> impl Iterator<Item = &ActivatedAbility> {
    chars.abilities.iter().filter_map(|a| match a {
        Ability::Activated(ability) => Some(ability),
        _ => None,
    })
}

/// Every assignment of legal targets to the slots. `None` if some slot has
/// no legal target.
fn target_combinations(specs: &[TargetSpec], ctx: &TargetContext<'_>) -> Option<Vec<Vec<Target>>> {
    let mut combinations: Vec<Vec<Target>> = vec![Vec::new()];
    for spec in specs {
        let candidates = spec.candidates(ctx);
        if candidates.is_empty() {
            return None;
        }
        combinations = combinations
            .into_iter()
            .flat_map(|prefix| {
                candidates.iter().map(move |t| {
                    let mut next = prefix.clone();
                    next.push(*t);
                    next
                })
            })
            .collect();
    }
    Some(combinations)
}

fn check_targets(player: PlayerId, specs: &[TargetSpec], targets: &[Target], ctx: &TargetContext<'_>) -> Result<()> {
    if specs.len() != targets.len() || !specs.iter().zip(targets).all(|(spec, t)| spec.is_legal(t, ctx)) {
        return Err(RulesError::illegal(player, IllegalReason::InvalidTarget));
    }
    Ok(())
}

impl RulesContext<'_> {
    /// Perform a priority action. The caller restores the state on error.
    pub(crate) fn perform(&mut self, player: PlayerId, action: &PlayerAction) -> Result<StepOutcome> {
        match action {
            PlayerAction::PassPriority => return self.pass_priority(player),
            PlayerAction::PlayLand { card } => self.play_land(player, *card)?,
            PlayerAction::CastSpell {
                card,
                targets,
                options,
            } => self.cast_spell(player, *card, targets, *options)?,
            PlayerAction::ActivateAbility { source, index, targets } => {
                self.activate_ability(player, *source, *index, targets)?;
            }
        }

        let state = self.state_mut();
        let record = ActionRecord::new(player, action.clone(), state.turn.number, state.history.len() as u32);
        state.history.push_back(record);

        self.settle();
        if let Some(result) = self.state().result.clone() {
            return Ok(StepOutcome::GameOver(result));
        }
        self.state_mut().stack.give_priority(player);
        Ok(StepOutcome::Acted {
            player,
            action: action.clone(),
        })
    }

    fn in_hand(&self, player: PlayerId, card: ObjectId) -> Result<()> {
        if self.state().zones.zone_of(card) == Some(ZoneKey::hand(player)) {
            Ok(())
        } else {
            Err(RulesError::illegal(player, IllegalReason::NotAvailable))
        }
    }

    fn play_land(&mut self, player: PlayerId, card: ObjectId) -> Result<()> {
        self.in_hand(player, card)?;
        let view = self.view();
        let is_land = view.get(card).is_some_and(|o| o.characteristics.is_land());
        if !is_land {
            return Err(RulesError::illegal(player, IllegalReason::NotAvailable));
        }
        if !self.game.sorcery_timing(player) {
            return Err(RulesError::illegal(player, IllegalReason::Timing));
        }
        if self.state().player(player).lands_played >= self.game.config.lands_per_turn {
            return Err(RulesError::illegal(player, IllegalReason::LandLimit));
        }

        self.state_mut().player_mut(player).lands_played += 1;
        log::debug!("{} plays land {}", player, card);
        self.happen(
            ReplaceableEvent::zone_change(card, ZoneKey::hand(player), ZoneKey::BATTLEFIELD),
            &view,
        );
        Ok(())
    }

    fn cast_spell(&mut self, player: PlayerId, card: ObjectId, targets: &[Target], options: CastOptions) -> Result<()> {
        self.in_hand(player, card)?;
        let card_id = self.state().try_object(card)?.card;
        let cards = self.game.cards.clone();
        let definition = cards.lookup(card_id)?;
        let view = self.view();
        let Some(chars) = view.get(card).map(|o| &o.characteristics) else {
            return Err(RulesError::UnknownObject(card));
        };
        if chars.is_land() {
            return Err(RulesError::illegal(player, IllegalReason::NotAvailable));
        }
        if !chars.has_instant_timing() && !self.game.sorcery_timing(player) {
            return Err(RulesError::illegal(player, IllegalReason::Timing));
        }
        if (options.prototyped && definition.prototype.is_none())
            || (options.additional_cost_paid && definition.additional_cost.is_none())
        {
            return Err(RulesError::illegal(player, IllegalReason::NotAvailable));
        }

        let specs = spell_targets(definition);
        {
            let live = self.state().live_players();
            let spells = self.state().stack.spell_objects();
            let ctx = TargetContext {
                view: &view,
                controller: player,
                source: Some(card),
                players: &live,
                stack: &spells,
            };
            check_targets(player, &specs, targets, &ctx)?;
        }

        let cost = spell_cost(definition, options);
        self.pay_mana(player, &cost, None)?;

        if let Some(obj) = self.state_mut().object_mut(card) {
            obj.cast = options;
            obj.controller = player;
        }
        self.apply_zone_change(card, ZoneKey::STACK, false, &[], &view);
        let Some(spell) = self.state().object(card).map(|o| o.object_ref()) else {
            return Err(RulesError::UnknownObject(card));
        };
        let effects = definition.spell.as_ref().map(|s| s.effects.clone()).unwrap_or_default();
        let stack_object = StackObject::new(StackObjectKind::Spell { card: card_id }, card, player, effects)
            .with_targets(specs, targets)
            .with_options(options);
        let id = self.state_mut().stack.push(stack_object);
        log::debug!("{} casts {} ({}) as {}", player, definition.name, card, id);
        self.emit(GameEvent::SpellCast {
            spell,
            controller: player,
        });
        Ok(())
    }

    fn activate_ability(&mut self, player: PlayerId, source: ObjectId, index: usize, targets: &[Target]) -> Result<()> {
        let view = self.view();
        let Some(object) = view.get(source).filter(|o| o.is_on_battlefield() && o.controller == player) else {
            return Err(RulesError::illegal(player, IllegalReason::NotAvailable));
        };
        let Some(ability) = activated_abilities(&object.characteristics).nth(index).cloned() else {
            return Err(RulesError::illegal(player, IllegalReason::NotAvailable));
        };
        if let Some(reason) = self.game.activation_problem(player, object, &ability, &view) {
            return Err(RulesError::illegal(player, reason));
        }
        {
            let live = self.state().live_players();
            let spells = self.state().stack.spell_objects();
            let ctx = TargetContext {
                view: &view,
                controller: player,
                source: Some(source),
                players: &live,
                stack: &spells,
            };
            check_targets(player, &ability.targets, targets, &ctx)?;
        }

        // Pay: mana, then tap, life and sacrifice.
        if let Some(cost) = &ability.cost.mana {
            self.pay_mana(player, cost, ability.cost.tap.then_some(source))?;
        }
        if ability.cost.tap {
            if let Some(obj) = self.state_mut().object_mut(source) {
                obj.tapped = true;
            }
        }
        if ability.cost.life > 0 {
            self.lose_life(player, ability.cost.life);
        }
        if ability.cost.sacrifice_self {
            self.to_graveyard(source, &view);
        }

        let stack_object = StackObject::new(StackObjectKind::Activated { index }, source, player, ability.effects)
            .with_targets(ability.targets, targets);
        let id = self.state_mut().stack.push(stack_object);
        log::debug!("{} activates ability {} of {} as {}", player, index, source, id);
        Ok(())
    }

    /// Pay a mana cost, tapping mana sources as needed. `exclude` is a
    /// source already committed to a {T} cost.
    pub(crate) fn pay_mana(&mut self, player: PlayerId, cost: &ManaCost, exclude: Option<ObjectId>) -> Result<()> {
        if cost.is_zero() {
            return Ok(());
        }
        let view = self.view();
        let sources = self.game.mana_sources(&view, player, exclude);
        let mut pool = self.state().player(player).mana_pool;
        let mut tapped: Vec<ObjectId> = Vec::new();

        for color in Color::ALL {
            let kind = ManaKind::Colored(color);
            let need = cost.colored[color as usize];
            for (id, ability) in sources.iter().filter(|(_, a)| a.produces == kind) {
                if pool.amount(kind) >= need {
                    break;
                }
                pool.add(kind, ability.amount);
                tapped.push(*id);
            }
        }
        let mut rest: Vec<&(ObjectId, ManaAbility)> = sources.iter().filter(|(id, _)| !tapped.contains(id)).collect();
        rest.sort_by_key(|(_, a)| a.produces != ManaKind::Colorless);
        let mut rest = rest.into_iter();
        while !pool.can_pay(cost) {
            let Some((id, ability)) = rest.next() else { break };
            pool.add(ability.produces, ability.amount);
            tapped.push(*id);
        }

        if !pool.pay(cost) {
            return Err(RulesError::illegal(player, IllegalReason::InsufficientMana));
        }
        let state = self.state_mut();
        for id in tapped {
            if let Some(obj) = state.object_mut(id) {
                obj.tapped = true;
            }
        }
        state.player_mut(player).mana_pool = pool;
        Ok(())
    }

    /// Whether `player` could pay `cost` now.
    pub(crate) fn can_pay_mana(&self, player: PlayerId, cost: &ManaCost) -> bool {
        let view = self.view();
        self.game.available_mana(&view, player, None).can_pay(cost)
    }
}
