//! Applying replacement effects to an event.
//!
//! ## Algorithm
//!
//! 1. Gather the replacements that apply to the event and have not yet
//!    modified it.
//! 2. If none, the event happens as it now stands. If one, it applies. If
//!    several, the affected player chooses which applies first.
//! 3. Repeat with the modified event.
//!
//! Each replacement applies to a given event at most once, so the loop
//! always terminates. Prevention that reduces damage to zero, or a draw
//! replaced by a life gain, ends the loop early.

use serde::{Deserialize, Serialize};

use crate::cards::{Ability, FilterContext};
use crate::core::entity::{ObjectId, Timestamp};
use crate::core::player::PlayerId;
use crate::layers::DerivedView;
use crate::zones::{Zone, ZoneKey};

use super::effect::{ReplaceableEvent, ReplacementId, ReplacementKind, ReplacementStore, Shield};

/// Where an active replacement comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplacementKey {
    Stored(ReplacementId),
    /// The `index`th ability of a battlefield permanent.
    Ability { object: ObjectId, index: usize },
}

/// A replacement effect that currently exists.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveReplacement {
    pub key: ReplacementKey,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub timestamp: Timestamp,
    pub kind: ReplacementKind,
}

/// The event after replacement.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReplacementOutcome {
    /// `None` when the event was entirely prevented.
    pub event: Option<ReplaceableEvent>,
    /// Replacements applied, in order.
    pub applied: Vec<ReplacementKey>,
    /// Damage absorbed by each stored prevention shield.
    pub shields_used: Vec<(ReplacementId, u32)>,
}

/// Applies replacement effects.
pub struct ReplacementEngine;

impl ReplacementEngine {
    /// Stored replacements plus replacement abilities on the battlefield,
    /// oldest first.
    #[must_use]
    pub fn active(store: &ReplacementStore, view: &DerivedView) -> Vec<ActiveReplacement> {
        let mut active: Vec<ActiveReplacement> = store
            .iter()
            .map(|e| ActiveReplacement {
                key: ReplacementKey::Stored(e.id),
                source: e.source,
                controller: e.controller,
                timestamp: e.timestamp,
                kind: e.kind.clone(),
            })
            .collect();
        for object in view.battlefield() {
            for (index, ability) in object.characteristics.abilities.iter().enumerate() {
                if let Ability::Replacement(r) = ability {
                    active.push(ActiveReplacement {
                        key: ReplacementKey::Ability {
                            object: object.id,
                            index,
                        },
                        source: object.id,
                        controller: object.controller,
                        timestamp: object.timestamp,
                        kind: r.kind.clone(),
                    });
                }
            }
        }
        active.sort_by_key(|r| r.timestamp);
        active
    }

    /// Whether `replacement` would modify `event`.
    #[must_use]
    pub fn applies(replacement: &ActiveReplacement, event: &ReplaceableEvent, view: &DerivedView) -> bool {
        let ctx = FilterContext::new(replacement.controller, Some(replacement.source));
        match (&replacement.kind, event) {
            (
                ReplacementKind::PreventDamage { filter, shield },
                ReplaceableEvent::Damage {
                    source,
                    target,
                    amount,
                    combat,
                },
            ) => *amount > 0 && *shield != Shield::Amount(0) && filter.matches(*source, target, *combat, view, &ctx),
            (
                ReplacementKind::MultiplyDamage { filter, .. },
                ReplaceableEvent::Damage {
                    source,
                    target,
                    amount,
                    combat,
                },
            ) => *amount > 0 && filter.matches(*source, target, *combat, view, &ctx),
            (ReplacementKind::ExileInsteadOfGraveyard(filter), ReplaceableEvent::ZoneChange { object, to, .. }) => {
                to.zone == Zone::Graveyard && view.get(*object).is_some_and(|o| filter.matches(o, &ctx))
            }
            (
                ReplacementKind::EntersWithCounters { filter, .. } | ReplacementKind::EntersTapped(filter),
                ReplaceableEvent::ZoneChange { object, to, .. },
            ) => to.zone == Zone::Battlefield && view.get(*object).is_some_and(|o| filter.matches(o, &ctx)),
            (ReplacementKind::DrawBecomesLifeGain { player: whose, .. }, ReplaceableEvent::Draw { player }) => {
                whose.matches(*player, replacement.controller)
            }
            (ReplacementKind::MultiplyLifeGain { player: whose, .. }, ReplaceableEvent::GainLife { player, amount }) => {
                *amount > 0 && whose.matches(*player, replacement.controller)
            }
            _ => false,
        }
    }

    /// Run the replacement loop on `event`.
    ///
    /// `choose(player, options)` picks which of several applicable
    /// replacements applies next; an out-of-range answer picks the first.
    pub fn replace(
        event: ReplaceableEvent,
        active: &[ActiveReplacement],
        view: &DerivedView,
        mut choose: impl FnMut(PlayerId, &[&ActiveReplacement]) -> usize,
    ) -> ReplacementOutcome {
        let mut outcome = ReplacementOutcome::default();
        let mut current = event;

        loop {
            let candidates: Vec<&ActiveReplacement> = active
                .iter()
                .filter(|r| !outcome.applied.contains(&r.key))
                .filter(|r| Self::applies(r, &current, view))
                .collect();
            let chosen = match candidates.len() {
                0 => break,
                1 => candidates[0],
                _ => {
                    let player = current
                        .affected_player(view)
                        .unwrap_or(candidates[0].controller);
                    let pick = choose(player, &candidates);
                    log::debug!("{} orders replacements, applying option {}", player, pick);
                    candidates.get(pick).copied().unwrap_or(candidates[0])
                }
            };
            outcome.applied.push(chosen.key);

            match Self::apply(chosen, current, &mut outcome) {
                Some(next) => current = next,
                None => return outcome,
            }
        }

        outcome.event = Some(current);
        outcome
    }

    /// Apply one replacement. `None` means nothing is left of the event.
    fn apply(
        replacement: &ActiveReplacement,
        event: ReplaceableEvent,
        outcome: &mut ReplacementOutcome,
    ) -> Option<ReplaceableEvent> {
        match (&replacement.kind, event) {
            (
                ReplacementKind::PreventDamage { shield, .. },
                ReplaceableEvent::Damage {
                    source,
                    target,
                    amount,
                    combat,
                },
            ) => {
                // An ability's shield renews for every event; a stored one is used up.
                let prevented = match shield {
                    Shield::Amount(n) => (*n).min(amount),
                    Shield::All => amount,
                };
                if let ReplacementKey::Stored(id) = replacement.key {
                    if matches!(shield, Shield::Amount(_)) {
                        outcome.shields_used.push((id, prevented));
                    }
                }
                log::debug!("prevented {} of {} damage from {}", prevented, amount, source);
                let left = amount - prevented;
                (left > 0).then_some(ReplaceableEvent::Damage {
                    source,
                    target,
                    amount: left,
                    combat,
                })
            }
            (
                ReplacementKind::MultiplyDamage { factor, .. },
                ReplaceableEvent::Damage {
                    source,
                    target,
                    amount,
                    combat,
                },
            ) => Some(ReplaceableEvent::Damage {
                source,
                target,
                amount: amount.saturating_mul(*factor),
                combat,
            }),
            (ReplacementKind::ExileInsteadOfGraveyard(_), ReplaceableEvent::ZoneChange {
                object,
                from,
                tapped,
                counters,
                ..
            }) => Some(ReplaceableEvent::ZoneChange {
                object,
                from,
                to: ZoneKey::EXILE,
                tapped,
                counters,
            }),
            (
                ReplacementKind::EntersWithCounters { kind, count, .. },
                ReplaceableEvent::ZoneChange {
                    object,
                    from,
                    to,
                    tapped,
                    mut counters,
                },
            ) => {
                counters.push((*kind, *count));
                Some(ReplaceableEvent::ZoneChange {
                    object,
                    from,
                    to,
                    tapped,
                    counters,
                })
            }
            (ReplacementKind::EntersTapped(_), ReplaceableEvent::ZoneChange {
                object, from, to, counters, ..
            }) => Some(ReplaceableEvent::ZoneChange {
                object,
                from,
                to,
                tapped: true,
                counters,
            }),
            (ReplacementKind::DrawBecomesLifeGain { amount, .. }, ReplaceableEvent::Draw { player }) => {
                Some(ReplaceableEvent::GainLife {
                    player,
                    amount: *amount,
                })
            }
            (ReplacementKind::MultiplyLifeGain { factor, .. }, ReplaceableEvent::GainLife { player, amount }) => {
                Some(ReplaceableEvent::GainLife {
                    player,
                    amount: amount.saturating_mul(*factor),
                })
            }
            (_, unchanged) => Some(unchanged),
        }
    }
}
