//! Combat: declaring attackers and blockers, and combat damage.

use crate::cards::Keyword;
use crate::core::entity::{ObjectId, Target};
use crate::core::player::{apnap_order, PlayerId};
use crate::decision::{DecisionRequest, DecisionResponse};
use crate::layers::{DerivedObject, DerivedView};
use crate::triggers::GameEvent;

use super::context::RulesContext;

/// One assignment of combat damage.
struct Assignment {
    source: ObjectId,
    target: Target,
    amount: u32,
}

impl RulesContext<'_> {
    /// The active player declares attackers among their untapped creatures
    /// that can attack. Each attacks one live opponent.
    pub(crate) fn declare_attackers(&mut self) {
        let active = self.state().turn.active;
        let view = self.view();
        let candidates: Vec<ObjectId> = view
            .battlefield()
            .filter(|o| o.controller == active && self.can_attack(o))
            .map(|o| o.id)
            .collect();
        let defenders: Vec<PlayerId> = self.state().live_players().into_iter().filter(|p| *p != active).collect();
        if candidates.is_empty() || defenders.is_empty() {
            return;
        }

        let declared = match self.ask(DecisionRequest::Attackers {
            player: active,
            candidates,
            defenders,
        }) {
            DecisionResponse::Attackers(declared) => declared,
            _ => Vec::new(),
        };

        for (attacker, defender) in declared {
            let vigilance = view
                .get(attacker)
                .is_some_and(|o| o.characteristics.has_keyword(Keyword::Vigilance));
            let state = self.state_mut();
            let Some(obj) = state.object_mut(attacker) else {
                continue;
            };
            if !vigilance {
                obj.tapped = true;
            }
            let attacker_ref = obj.object_ref();
            state.turn.combat.attackers.push((attacker, defender));
            log::debug!("{} attacks {}", attacker, defender);
            self.emit(GameEvent::AttackerDeclared {
                attacker: attacker_ref,
                defender,
            });
        }
    }

    fn can_attack(&self, object: &DerivedObject) -> bool {
        let chars = &object.characteristics;
        let Some(base) = self.state().object(object.id) else {
            return false;
        };
        chars.is_creature()
            && !base.tapped
            && (!base.summoning_sick || chars.has_keyword(Keyword::Haste))
            && !chars.has_keyword(Keyword::Defender)
    }

    /// Each defending player, in APNAP order, declares blockers among their
    /// untapped creatures.
    pub(crate) fn declare_blockers(&mut self) {
        let active = self.state().turn.active;
        let attackers = self.state().turn.combat.attackers.clone();
        let order = apnap_order(active, self.state().player_count());

        for defender in order {
            if defender == active || self.state().player(defender).lost {
                continue;
            }
            let view = self.view();
            let options = self.block_options(defender, &attackers, &view);
            if options.is_empty() {
                continue;
            }
            let declared = match self.ask(DecisionRequest::Blockers {
                player: defender,
                options,
            }) {
                DecisionResponse::Blockers(declared) => declared,
                _ => Vec::new(),
            };

            for (blocker, attacker) in declared {
                let (Some(blocker_ref), Some(attacker_ref)) = (
                    view.get(blocker).map(DerivedObject::object_ref),
                    view.get(attacker).map(DerivedObject::object_ref),
                ) else {
                    continue;
                };
                let combat = &mut self.state_mut().turn.combat;
                combat.blockers.push((blocker, attacker));
                if !combat.blocked.contains(&attacker) {
                    combat.blocked.push(attacker);
                }
                log::debug!("{} blocks {}", blocker, attacker);
                self.emit(GameEvent::BlockerDeclared {
                    blocker: blocker_ref,
                    attacker: attacker_ref,
                });
            }
        }
    }

    /// Every legal (blocker, attacker) pair for `defender`.
    fn block_options(
        &self,
        defender: PlayerId,
        attackers: &[(ObjectId, PlayerId)],
        view: &DerivedView,
    ) -> Vec<(ObjectId, ObjectId)> {
        let blockers: Vec<&DerivedObject> = view
            .battlefield()
            .filter(|o| o.controller == defender && o.characteristics.is_creature())
            .filter(|o| self.state().object(o.id).is_some_and(|b| !b.tapped))
            .collect();
        let mut options = Vec::new();
        for (attacker, attacked) in attackers {
            if *attacked != defender {
                continue;
            }
            let Some(attacker_obj) = view.get(*attacker) else {
                continue;
            };
            let flying = attacker_obj.characteristics.has_keyword(Keyword::Flying);
            for blocker in &blockers {
                let chars = &blocker.characteristics;
                if flying && !chars.has_keyword(Keyword::Flying) && !chars.has_keyword(Keyword::Reach) {
                    continue;
                }
                options.push((blocker.id, *attacker));
            }
        }
        options
    }

    /// Assign and deal combat damage. All assignments are made against one
    /// view before any damage is dealt.
    pub(crate) fn combat_damage(&mut self) {
        let view = self.view();
        let combat = self.state().turn.combat.clone();
        let mut assignments: Vec<Assignment> = Vec::new();

        for (attacker, defender) in &combat.attackers {
            let Some(attacker_obj) = view.get(*attacker).filter(|o| o.is_on_battlefield()) else {
                continue;
            };
            let power = attacker_obj.power().max(0) as u32;
            if power == 0 {
                continue;
            }
            let chars = &attacker_obj.characteristics;
            let trample = chars.has_keyword(Keyword::Trample);
            let deathtouch = chars.has_keyword(Keyword::Deathtouch);

            if !combat.is_blocked(*attacker) {
                assignments.push(Assignment {
                    source: *attacker,
                    target: Target::Player(*defender),
                    amount: power,
                });
                continue;
            }

            let blockers: Vec<&DerivedObject> = combat
                .blockers_of(*attacker)
                .into_iter()
                .filter_map(|b| view.get(b))
                .filter(|b| b.is_on_battlefield())
                .collect();
            let mut remaining = power;
            for (i, blocker) in blockers.iter().enumerate() {
                if remaining == 0 {
                    break;
                }
                let last = i + 1 == blockers.len();
                let lethal = self.lethal_damage(blocker, deathtouch);
                let amount = if last && !trample { remaining } else { lethal.min(remaining) };
                assignments.push(Assignment {
                    source: *attacker,
                    target: Target::Object(blocker.object_ref()),
                    amount,
                });
                remaining -= amount;
            }
            if trample && remaining > 0 {
                assignments.push(Assignment {
                    source: *attacker,
                    target: Target::Player(*defender),
                    amount: remaining,
                });
            }
        }

        for (blocker, attacker) in &combat.blockers {
            let (Some(blocker_obj), Some(attacker_obj)) = (view.get(*blocker), view.get(*attacker)) else {
                continue;
            };
            if !blocker_obj.is_on_battlefield() || !attacker_obj.is_on_battlefield() {
                continue;
            }
            let power = blocker_obj.power().max(0) as u32;
            if power > 0 {
                assignments.push(Assignment {
                    source: *blocker,
                    target: Target::Object(attacker_obj.object_ref()),
                    amount: power,
                });
            }
        }

        log::debug!("{} combat damage assignments", assignments.len());
        for a in assignments {
            self.deal_damage(a.source, a.target, a.amount, true);
        }
    }

    /// Damage that is lethal to `blocker` given damage already marked.
    fn lethal_damage(&self, blocker: &DerivedObject, deathtouch: bool) -> u32 {
        if deathtouch {
            return 1;
        }
        let marked = self.state().object(blocker.id).map_or(0, |o| o.damage) as i32;
        (blocker.toughness() - marked).max(1) as u32
    }
}
