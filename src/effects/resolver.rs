//! Effect resolution.
//!
//! [`EffectResolver::resolve`] takes a stack object that has just left the
//! stack and carries out its effects through a [`RulesContext`], so every
//! primitive action goes through replacement effects and triggers.
//!
//! ## Targets on resolution
//!
//! Targets are checked again against the current view. Illegal targets are
//! left alone; if every target is illegal the object does not resolve.

use crate::cards::{FilterContext, Keyword, ObjectFilter};
use crate::core::action::CastOptions;
use crate::core::entity::{ObjectId, ObjectRef, Target};
use crate::core::player::{apnap_order, PlayerId};
use crate::decision::{ChoiceReason, DecisionRequest, DecisionResponse};
use crate::game::RulesContext;
use crate::layers::{ContinuousEffect, DerivedView, Duration, LayerSystem, Modification};
use crate::replacement::ReplacementEffect;
use crate::stack::StackObject;
use crate::triggers::{DelayedTrigger, GameEvent, TriggerLifetime};
use crate::zones::ZoneKey;

use super::effect::{Effect, EffectCondition, EffectTarget, PlayerRef, UnlessCost};
use super::targeting::TargetContext;

/// How a stack object left the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveResult {
    Resolved,
    /// Every target was illegal; nothing happened.
    Fizzled,
}

/// What the effects of one resolving object refer to.
struct Resolution {
    source: ObjectId,
    controller: PlayerId,
    /// `None` where the target became illegal.
    targets: Vec<Option<Target>>,
    triggering: Option<ObjectRef>,
    options: CastOptions,
}

impl Resolution {
    fn filter_ctx(&self) -> FilterContext {
        FilterContext::new(self.controller, Some(self.source))
    }

    fn target(&self, slot: usize) -> Option<Target> {
        self.targets.get(slot).copied().flatten()
    }

    fn object(&self, to: EffectTarget, ctx: &RulesContext<'_>) -> Option<ObjectRef> {
        let r = match to {
            EffectTarget::Target(slot) => match self.target(slot)? {
                Target::Object(r) => r,
                Target::Player(_) => return None,
            },
            EffectTarget::Source => ctx.state().object(self.source)?.object_ref(),
            EffectTarget::TriggeringObject => self.triggering?,
        };
        ctx.state().is_current(r).then_some(r)
    }

    fn damage_target(&self, to: EffectTarget, ctx: &RulesContext<'_>) -> Option<Target> {
        match to {
            EffectTarget::Target(slot) => match self.target(slot)? {
                Target::Player(p) => Some(Target::Player(p)),
                Target::Object(_) => self.object(to, ctx).map(Target::Object),
            },
            _ => self.object(to, ctx).map(Target::Object),
        }
    }

    fn players(&self, players: PlayerRef, ctx: &RulesContext<'_>, view: &DerivedView) -> Vec<PlayerId> {
        let state = ctx.state();
        let everyone: Vec<PlayerId> = apnap_order(state.turn.active, state.player_count())
            .into_iter()
            .filter(|p| !state.player(*p).lost)
            .collect();
        let found = match players {
            PlayerRef::Controller => vec![self.controller],
            PlayerRef::ActivePlayer => vec![state.turn.active],
            PlayerRef::Target(slot) => self.target(slot).and_then(|t| t.player()).into_iter().collect(),
            PlayerRef::TargetController(slot) => match self.target(slot) {
                Some(Target::Object(r)) => view.get(r.id).map(|o| o.controller).into_iter().collect(),
                Some(Target::Player(p)) => vec![p],
                None => Vec::new(),
            },
            PlayerRef::EachOpponent => everyone.into_iter().filter(|p| *p != self.controller).collect(),
            PlayerRef::EachPlayer => everyone,
        };
        found.into_iter().filter(|p| !state.player(*p).lost).collect()
    }
}

/// Carries out resolving spells and abilities.
pub struct EffectResolver;

impl EffectResolver {
    /// Resolve `object`, which has already been removed from the stack. A
    /// spell card still on the stack afterwards becomes a permanent or goes
    /// to its owner's graveyard.
    pub fn resolve(ctx: &mut RulesContext<'_>, object: StackObject) -> ResolveResult {
        let view = ctx.view();
        let targets: Vec<Option<Target>> = {
            let live = ctx.state().live_players();
            let spells = ctx.state().stack.spell_objects();
            let tctx = TargetContext {
                view: &view,
                controller: object.controller,
                source: Some(object.source),
                players: &live,
                stack: &spells,
            };
            object
                .targets
                .iter()
                .zip(&object.target_specs)
                .map(|(t, spec)| spec.is_legal(t, &tctx).then_some(*t))
                .collect()
        };

        if !targets.is_empty() && targets.iter().all(Option::is_none) {
            log::debug!("{} fizzles: no legal targets", object.id);
            if object.is_spell() {
                ctx.to_graveyard(object.source, &view);
            }
            return ResolveResult::Fizzled;
        }

        let res = Resolution {
            source: object.source,
            controller: object.controller,
            targets,
            triggering: object.triggering,
            options: object.options,
        };
        for effect in &object.effects {
            Self::execute(ctx, effect, &res);
        }

        if object.is_spell() && ctx.state().zones.zone_of(object.source) == Some(ZoneKey::STACK) {
            let view = ctx.view();
            let permanent = view
                .get(object.source)
                .is_some_and(|o| o.characteristics.is_permanent());
            if permanent {
                ctx.move_with_view(object.source, ZoneKey::BATTLEFIELD, &view);
            } else {
                ctx.to_graveyard(object.source, &view);
            }
        }
        ResolveResult::Resolved
    }

    fn execute(ctx: &mut RulesContext<'_>, effect: &Effect, res: &Resolution) {
        let view = ctx.view();
        let fctx = res.filter_ctx();
        match effect {
            Effect::DealDamage { amount, to } => {
                let amount = amount.evaluate(&view, &fctx).max(0) as u32;
                if let Some(target) = res.damage_target(*to, ctx) {
                    ctx.deal_damage(res.source, target, amount, false);
                }
            }
            Effect::DamagePlayers { amount, players } => {
                let amount = amount.evaluate(&view, &fctx).max(0) as u32;
                for player in res.players(*players, ctx, &view) {
                    ctx.deal_damage(res.source, Target::Player(player), amount, false);
                }
            }
            Effect::GainLife { amount, player } => {
                let amount = amount.evaluate(&view, &fctx).max(0) as u32;
                for p in res.players(*player, ctx, &view) {
                    ctx.gain_life(p, amount);
                }
            }
            Effect::LoseLife { amount, player } => {
                let amount = amount.evaluate(&view, &fctx).max(0) as u32;
                for p in res.players(*player, ctx, &view) {
                    ctx.lose_life(p, amount);
                }
            }
            Effect::DrawCards { count, player } => {
                for p in res.players(*player, ctx, &view) {
                    for _ in 0..*count {
                        ctx.draw(p);
                    }
                }
            }
            Effect::Destroy(to) => {
                let Some(r) = res.object(*to, ctx).filter(|r| ctx.state().on_battlefield(*r)) else {
                    return;
                };
                let indestructible = view
                    .get(r.id)
                    .is_some_and(|o| o.characteristics.has_keyword(Keyword::Indestructible));
                if !indestructible {
                    ctx.to_graveyard(r.id, &view);
                }
            }
            Effect::Exile(to) => {
                if let Some(r) = res.object(*to, ctx) {
                    ctx.move_with_view(r.id, ZoneKey::EXILE, &view);
                }
            }
            Effect::ReturnToHand(to) => {
                if let Some(r) = res.object(*to, ctx).filter(|r| ctx.state().on_battlefield(*r)) {
                    let owner = ctx.state().object(r.id).map(|o| o.owner);
                    if let Some(owner) = owner {
                        ctx.move_with_view(r.id, ZoneKey::hand(owner), &view);
                    }
                }
            }
            Effect::Blink(to) => {
                let Some(r) = res.object(*to, ctx).filter(|r| ctx.state().on_battlefield(*r)) else {
                    return;
                };
                ctx.move_with_view(r.id, ZoneKey::EXILE, &view);
                if ctx.state().zones.zone_of(r.id) == Some(ZoneKey::EXILE) {
                    ctx.move_object(r.id, ZoneKey::BATTLEFIELD);
                }
            }
            Effect::Sacrifice { players, filter } => {
                for player in res.players(*players, ctx, &view) {
                    let view = ctx.view();
                    if let Some(id) = Self::choose_sacrifice(ctx, player, filter, res.source, &view) {
                        ctx.to_graveyard(id, &view);
                    }
                }
            }
            Effect::CounterSpell(to) => {
                let Some(r) = res.object(*to, ctx) else { return };
                let Some(stack_id) = ctx.state().stack.spell_for(r.id).map(|s| s.id) else {
                    return;
                };
                ctx.state_mut().stack.remove(stack_id);
                log::debug!("{} counters {}", res.source, r.id);
                ctx.to_graveyard(r.id, &view);
                ctx.emit(GameEvent::SpellCountered { spell: r.id });
            }
            Effect::CreateTokens { card, count, player } => {
                for p in res.players(*player, ctx, &view) {
                    for _ in 0..*count {
                        ctx.create_token(*card, p);
                    }
                }
            }
            Effect::AddCounters { kind, count, to } => {
                if let Some(r) = res.object(*to, ctx).filter(|r| ctx.state().on_battlefield(*r)) {
                    if let Some(obj) = ctx.state_mut().object_mut(r.id) {
                        obj.add_counters(*kind, *count);
                    }
                }
            }
            Effect::Tap(to) | Effect::Untap(to) => {
                let tapped = matches!(effect, Effect::Tap(_));
                if let Some(r) = res.object(*to, ctx).filter(|r| ctx.state().on_battlefield(*r)) {
                    if let Some(obj) = ctx.state_mut().object_mut(r.id) {
                        obj.tapped = tapped;
                    }
                }
            }
            Effect::AddMana { kind, amount } => {
                ctx.state_mut().player_mut(res.controller).mana_pool.add(*kind, *amount);
            }
            Effect::ApplyContinuous {
                to,
                modification,
                duration,
            } => {
                let Some(r) = res.object(*to, ctx).filter(|r| ctx.state().on_battlefield(*r)) else {
                    return;
                };
                let modification = match modification {
                    Modification::CopyOf(_) => modification.clone(),
                    other => other.resolve(&view, &fctx),
                };
                Self::add_continuous(ctx, res, *duration, &[r], modification);
            }
            Effect::ApplyToAll {
                filter,
                modification,
                duration,
            } => {
                let affected: Vec<ObjectRef> = view.matching(filter, &fctx).map(|o| o.object_ref()).collect();
                if affected.is_empty() {
                    return;
                }
                let modification = modification.resolve(&view, &fctx);
                Self::add_continuous(ctx, res, *duration, &affected, modification);
            }
            Effect::BecomeCopy { of, duration } => {
                let Some(me) = res
                    .object(EffectTarget::Source, ctx)
                    .filter(|r| ctx.state().on_battlefield(*r))
                else {
                    return;
                };
                let Some(original) = res.object(*of, ctx) else { return };
                let Some(values) = LayerSystem::copiable_values(ctx.state(), &ctx.game.cards, original.id) else {
                    return;
                };
                log::debug!("{} becomes a copy of {} ({})", me.id, original.id, values.name);
                Self::add_continuous(ctx, res, *duration, &[me], Modification::BecomeCopy(Box::new(values)));
            }
            Effect::CreateReplacement { kind, duration } => {
                let state = ctx.state_mut();
                let timestamp = state.next_timestamp();
                let id = state.replacements.add(ReplacementEffect::new(
                    res.source,
                    res.controller,
                    timestamp,
                    *duration,
                    kind.clone(),
                ));
                log::debug!("replacement effect {:?} created by {}", id, res.source);
            }
            Effect::CreateDelayedTrigger {
                condition,
                effects,
                uses,
                lifetime,
            } => {
                let duration = match lifetime {
                    TriggerLifetime::Game => Duration::Indefinite,
                    TriggerLifetime::ThisTurn => Duration::EndOfTurn,
                    TriggerLifetime::WhileSourceOnBattlefield => {
                        let Some(r) = ctx
                            .state()
                            .object(res.source)
                            .map(|o| o.object_ref())
                            .filter(|r| ctx.state().on_battlefield(*r))
                        else {
                            return;
                        };
                        Duration::WhileOnBattlefield(r)
                    }
                };
                let mut trigger = DelayedTrigger::new(res.source, res.controller, condition.clone(), effects.clone())
                    .with_duration(duration);
                if let Some(n) = uses {
                    trigger = trigger.with_uses(*n);
                }
                let id = ctx.state_mut().triggers.register(trigger);
                log::debug!("delayed trigger {} created by {}", id, res.source);
            }
            Effect::Sequence(effects) => {
                for e in effects {
                    Self::execute(ctx, e, res);
                }
            }
            Effect::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let holds = match condition {
                    EffectCondition::AdditionalCostPaid => res.options.additional_cost_paid,
                    EffectCondition::Prototyped => res.options.prototyped,
                };
                if holds {
                    Self::execute(ctx, then, res);
                } else if let Some(otherwise) = otherwise {
                    Self::execute(ctx, otherwise, res);
                }
            }
            Effect::DoUnless { effect, player, cost } => {
                for p in res.players(*player, ctx, &view) {
                    if Self::offer_unless(ctx, p, cost, res) {
                        log::debug!("{} pays to stop the effect of {}", p, res.source);
                        return;
                    }
                }
                Self::execute(ctx, effect, res);
            }
        }
    }

    fn add_continuous(
        ctx: &mut RulesContext<'_>,
        res: &Resolution,
        duration: Duration,
        affected: &[ObjectRef],
        modification: Modification,
    ) {
        let state = ctx.state_mut();
        let timestamp = state.next_timestamp();
        let id = state.effects.add(ContinuousEffect::new(
            res.source,
            res.controller,
            timestamp,
            duration,
            affected,
            modification,
        ));
        log::debug!("continuous effect {:?} on {} objects", id, affected.len());
    }

    /// Permanents `player` controls that match `filter`.
    fn sacrifice_candidates(player: PlayerId, filter: &ObjectFilter, source: ObjectId, view: &DerivedView) -> Vec<ObjectId> {
        let fctx = FilterContext::new(player, Some(source));
        view.matching(filter, &fctx)
            .filter(|o| o.controller == player)
            .map(|o| o.id)
            .collect()
    }

    fn choose_sacrifice(
        ctx: &mut RulesContext<'_>,
        player: PlayerId,
        filter: &ObjectFilter,
        source: ObjectId,
        view: &DerivedView,
    ) -> Option<ObjectId> {
        let candidates = Self::sacrifice_candidates(player, filter, source, view);
        match candidates.len() {
            0 => None,
            1 => candidates.first().copied(),
            _ => {
                let chosen = match ctx.ask(DecisionRequest::ChooseObjects {
                    player,
                    reason: ChoiceReason::Sacrifice,
                    candidates: candidates.clone(),
                    count: 1,
                }) {
                    DecisionResponse::Objects(chosen) => chosen.first().copied(),
                    _ => None,
                };
                chosen.or_else(|| candidates.first().copied())
            }
        }
    }

    /// Offer `player` the chance to pay `cost`. Returns whether they paid.
    fn offer_unless(ctx: &mut RulesContext<'_>, player: PlayerId, cost: &UnlessCost, res: &Resolution) -> bool {
        let view = ctx.view();
        let able = match cost {
            UnlessCost::Sacrifice(filter) => !Self::sacrifice_candidates(player, filter, res.source, &view).is_empty(),
            UnlessCost::PayLife(n) => ctx.state().life(player) >= *n as i32,
            UnlessCost::PayMana(mana) => ctx.can_pay_mana(player, mana),
        };
        if !able {
            return false;
        }
        let accepted = matches!(
            ctx.ask(DecisionRequest::PayUnless {
                player,
                source: res.source,
                cost: cost.clone(),
            }),
            DecisionResponse::YesNo(true)
        );
        if !accepted {
            return false;
        }
        match cost {
            UnlessCost::Sacrifice(filter) => match Self::choose_sacrifice(ctx, player, filter, res.source, &view) {
                Some(id) => {
                    ctx.to_graveyard(id, &view);
                    true
                }
                None => false,
            },
            UnlessCost::PayLife(n) => {
                ctx.lose_life(player, *n);
                true
            }
            UnlessCost::PayMana(mana) => ctx.pay_mana(player, mana, None).is_ok(),
        }
    }
}
