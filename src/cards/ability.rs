//! Abilities: the uniform vocabulary every card is built from.
//!
//! An ability belongs to exactly one source object and lives as long as the
//! source keeps it (an ability-removing effect ends it just like leaving
//! the battlefield does).
//!
//! ## Variants
//!
//! - `Keyword`: interpreted directly by the rules (flying, trample, ...)
//! - `Static`: continuous effects generated while the source is on the
//!   battlefield, or in every zone for characteristic-defining abilities
//! - `Triggered`: a condition watched by the trigger registry
//! - `Activated`: a cost and effects, put on the stack on activation
//! - `Mana`: a `{T}: add mana` ability, resolved immediately during payment
//! - `Replacement`: a replacement/prevention effect read from the derived view

use serde::{Deserialize, Serialize};

use crate::effects::{Effect, TargetSpec};
use crate::layers::Modification;
use crate::replacement::ReplacementKind;
use crate::triggers::TriggerCondition;

use super::characteristics::{Keyword, Subtype};
use super::filter::ObjectFilter;
use super::mana::{ManaCost, ManaKind};

/// One ability of an object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Ability {
    Keyword(Keyword),
    Static(StaticAbility),
    Triggered(TriggeredAbility),
    Activated(ActivatedAbility),
    Mana(ManaAbility),
    Replacement(ReplacementAbility),
}

impl Ability {
    /// Static ability applying a modification to every object the filter
    /// matches ("Creatures you control get +1/+1").
    #[must_use]
    pub fn static_for(filter: ObjectFilter, modification: Modification) -> Self {
        Ability::Static(StaticAbility {
            effects: vec![StaticEffect {
                affects: Affects::Filter(filter),
                modification,
            }],
            characteristic_defining: false,
        })
    }

    /// Static ability modifying only its source.
    #[must_use]
    pub fn static_self(modification: Modification) -> Self {
        Ability::Static(StaticAbility {
            effects: vec![StaticEffect {
                affects: Affects::Source,
                modification,
            }],
            characteristic_defining: false,
        })
    }

    /// Characteristic-defining ability. Functions in every zone.
    #[must_use]
    pub fn characteristic_defining(modification: Modification) -> Self {
        Ability::Static(StaticAbility {
            effects: vec![StaticEffect {
                affects: Affects::Source,
                modification,
            }],
            characteristic_defining: true,
        })
    }

    /// Triggered ability without targets.
    #[must_use]
    pub fn triggered(condition: TriggerCondition, effects: Vec<Effect>) -> Self {
        Ability::Triggered(TriggeredAbility {
            condition,
            targets: Vec::new(),
            effects,
        })
    }

    /// Triggered ability with targets chosen when it is put on the stack.
    #[must_use]
    pub fn triggered_targeted(
        condition: TriggerCondition,
        targets: Vec<TargetSpec>,
        effects: Vec<Effect>,
    ) -> Self {
        Ability::Triggered(TriggeredAbility {
            condition,
            targets,
            effects,
        })
    }

    /// `{T}: Add one mana of the given kind.`
    #[must_use]
    pub fn tap_for_mana(kind: ManaKind) -> Self {
        Ability::Mana(ManaAbility {
            produces: kind,
            amount: 1,
        })
    }

    #[must_use]
    pub fn replacement(kind: ReplacementKind) -> Self {
        Ability::Replacement(ReplacementAbility { kind })
    }

    #[must_use]
    pub fn as_static(&self) -> Option<&StaticAbility> {
        match self {
            Ability::Static(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_triggered(&self) -> Option<&TriggeredAbility> {
        match self {
            Ability::Triggered(t) => Some(t),
            _ => None,
        }
    }

    /// Rewrite a subtype word inside this ability's text.
    pub fn replace_subtype(&mut self, from: &Subtype, to: &Subtype) {
        match self {
            Ability::Static(s) => {
                for effect in &mut s.effects {
                    if let Affects::Filter(filter) = &mut effect.affects {
                        filter.replace_subtype(from, to);
                    }
                }
            }
            Ability::Triggered(t) => t.condition.replace_subtype(from, to),
            Ability::Replacement(r) => r.kind.replace_subtype(from, to),
            Ability::Keyword(_) | Ability::Activated(_) | Ability::Mana(_) => {}
        }
    }
}

/// A static ability: one or more continuous effects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaticAbility {
    pub effects: Vec<StaticEffect>,
    pub characteristic_defining: bool,
}

/// One continuous effect of a static ability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaticEffect {
    pub affects: Affects,
    pub modification: Modification,
}

/// Which objects a static effect applies to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Affects {
    /// The source object itself.
    Source,
    /// Every battlefield object matching the filter, relative to the
    /// source's controller.
    Filter(ObjectFilter),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggeredAbility {
    pub condition: TriggerCondition,
    pub targets: Vec<TargetSpec>,
    pub effects: Vec<Effect>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivatedAbility {
    pub cost: AbilityCost,
    pub targets: Vec<TargetSpec>,
    pub effects: Vec<Effect>,
    /// Only when its controller could cast a sorcery.
    pub sorcery_speed: bool,
}

impl ActivatedAbility {
    #[must_use]
    pub fn new(cost: AbilityCost, effects: Vec<Effect>) -> Self {
        Self {
            cost,
            targets: Vec::new(),
            effects,
            sorcery_speed: false,
        }
    }

    #[must_use]
    pub fn with_targets(mut self, targets: Vec<TargetSpec>) -> Self {
        self.targets = targets;
        self
    }

    #[must_use]
    pub fn sorcery_speed(mut self) -> Self {
        self.sorcery_speed = true;
        self
    }
}

/// Cost of an activated ability.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityCost {
    pub mana: Option<ManaCost>,
    pub tap: bool,
    pub sacrifice_self: bool,
    pub life: u32,
}

impl AbilityCost {
    #[must_use]
    pub fn mana(cost: ManaCost) -> Self {
        Self {
            mana: Some(cost),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn tap() -> Self {
        Self {
            tap: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_tap(mut self) -> Self {
        self.tap = true;
        self
    }

    #[must_use]
    pub fn with_sacrifice_self(mut self) -> Self {
        self.sacrifice_self = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaAbility {
    pub produces: ManaKind,
    pub amount: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplacementAbility {
    pub kind: ReplacementKind,
}
