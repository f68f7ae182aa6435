//! What a continuous effect does to the objects it affects.
//!
//! A [`Modification`] is resolved against the current partial view before
//! it is applied: dynamic values are counted, and a copy effect captures the
//! copiable values of the object it copies. Resolution and application are
//! split so the dependency check can compare what an effect *would* do
//! under two different partial views.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{Ability, CardType, Characteristics, ColorSet, FilterContext, Keyword, ObjectFilter, Subtype};
use crate::core::entity::ObjectRef;
use crate::core::player::PlayerId;

use super::layer::{Layer, LayerSlot, PtSublayer};
use super::view::{DerivedObject, DerivedView};

/// A number that may depend on the game state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Fixed(i32),
    /// Number of battlefield objects matching the filter.
    CountOf(ObjectFilter),
    Negated(Box<Value>),
}

impl Value {
    /// Evaluate against a view.
    #[must_use]
    pub fn evaluate(&self, view: &DerivedView, ctx: &FilterContext) -> i32 {
        match self {
            Value::Fixed(n) => *n,
            Value::CountOf(filter) => view.count_matching(filter, ctx) as i32,
            Value::Negated(inner) => -inner.evaluate(view, ctx),
        }
    }

    /// The value if it doesn't depend on state; dynamic values read as 0.
    #[must_use]
    pub fn fixed(&self) -> i32 {
        match self {
            Value::Fixed(n) => *n,
            Value::CountOf(_) => 0,
            Value::Negated(inner) => -inner.fixed(),
        }
    }

    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        match self {
            Value::Fixed(_) => false,
            Value::CountOf(_) => true,
            Value::Negated(inner) => inner.is_dynamic(),
        }
    }
}

/// The change a continuous effect makes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Modification {
    /// Become a copy of another object (layer 1).
    CopyOf(ObjectRef),
    /// Take on already-determined copiable values (layer 1).
    BecomeCopy(Box<Characteristics>),
    /// Layer 2.
    ChangeController(PlayerId),
    /// Replace every instance of one subtype word (layer 3).
    ReplaceSubtypeWord { from: Subtype, to: Subtype },
    /// Layer 4.
    AddTypes(SmallVec<[CardType; 2]>),
    /// Layer 4.
    AddSubtypes(SmallVec<[Subtype; 2]>),
    /// Layer 4: lose all subtypes and gain these.
    SetSubtypes(SmallVec<[Subtype; 2]>),
    /// Layer 5.
    SetColors(ColorSet),
    /// Layer 5.
    AddColors(ColorSet),
    /// Layer 6.
    AddAbility(Box<Ability>),
    /// Layer 6.
    RemoveKeyword(Keyword),
    /// Layer 6.
    RemoveAllAbilities,
    /// Layer 7a when characteristic-defining, otherwise 7b.
    SetPt { power: Value, toughness: Value },
    /// Layer 7c.
    ModifyPt { power: Value, toughness: Value },
    /// Layer 7d.
    SwitchPt,
}

impl Modification {
    /// +N/+N (or -N/-N).
    #[must_use]
    pub fn pump(power: i32, toughness: i32) -> Self {
        Modification::ModifyPt {
            power: Value::Fixed(power),
            toughness: Value::Fixed(toughness),
        }
    }

    /// Base power and toughness N/M.
    #[must_use]
    pub fn set_pt(power: i32, toughness: i32) -> Self {
        Modification::SetPt {
            power: Value::Fixed(power),
            toughness: Value::Fixed(toughness),
        }
    }

    #[must_use]
    pub fn grant(keyword: Keyword) -> Self {
        Modification::AddAbility(Box::new(Ability::Keyword(keyword)))
    }

    /// Where this modification applies.
    #[must_use]
    pub fn slot(&self, characteristic_defining: bool) -> LayerSlot {
        match self {
            Modification::CopyOf(_) | Modification::BecomeCopy(_) => LayerSlot::layer(Layer::Copy),
            Modification::ChangeController(_) => LayerSlot::layer(Layer::Control),
            Modification::ReplaceSubtypeWord { .. } => LayerSlot::layer(Layer::Text),
            Modification::AddTypes(_) | Modification::AddSubtypes(_) | Modification::SetSubtypes(_) => {
                LayerSlot::layer(Layer::Type)
            }
            Modification::SetColors(_) | Modification::AddColors(_) => LayerSlot::layer(Layer::Color),
            Modification::AddAbility(_)
            | Modification::RemoveKeyword(_)
            | Modification::RemoveAllAbilities => LayerSlot::layer(Layer::Ability),
            Modification::SetPt { .. } if characteristic_defining => {
                LayerSlot::pt(PtSublayer::CharacteristicDefining)
            }
            Modification::SetPt { .. } => LayerSlot::pt(PtSublayer::Set),
            Modification::ModifyPt { .. } => LayerSlot::pt(PtSublayer::Modify),
            Modification::SwitchPt => LayerSlot::pt(PtSublayer::Switch),
        }
    }

    /// Fix dynamic values and copy sources against `view`.
    #[must_use]
    pub fn resolve(&self, view: &DerivedView, ctx: &FilterContext) -> Modification {
        match self {
            Modification::CopyOf(original) => match view.get_ref(*original) {
                Some(obj) => Modification::BecomeCopy(Box::new(obj.characteristics.clone())),
                None => self.clone(),
            },
            Modification::SetPt { power, toughness } => Modification::SetPt {
                power: Value::Fixed(power.evaluate(view, ctx)),
                toughness: Value::Fixed(toughness.evaluate(view, ctx)),
            },
            Modification::ModifyPt { power, toughness } => Modification::ModifyPt {
                power: Value::Fixed(power.evaluate(view, ctx)),
                toughness: Value::Fixed(toughness.evaluate(view, ctx)),
            },
            other => other.clone(),
        }
    }

    /// Apply a resolved modification to one object.
    pub fn apply(&self, object: &mut DerivedObject) {
        let chars = &mut object.characteristics;
        match self {
            // An unresolved copy names an object that no longer exists.
            Modification::CopyOf(_) => {}
            Modification::BecomeCopy(values) => *chars = (**values).clone(),
            Modification::ChangeController(player) => object.controller = *player,
            Modification::ReplaceSubtypeWord { from, to } => {
                for subtype in chars.subtypes.iter_mut() {
                    if subtype == from {
                        *subtype = to.clone();
                    }
                }
                for ability in &mut chars.abilities {
                    ability.replace_subtype(from, to);
                }
            }
            Modification::AddTypes(types) => {
                for t in types {
                    if !chars.card_types.contains(t) {
                        chars.card_types.push(*t);
                    }
                }
            }
            Modification::AddSubtypes(subtypes) => {
                for s in subtypes {
                    if !chars.subtypes.contains(s) {
                        chars.subtypes.push(s.clone());
                    }
                }
            }
            Modification::SetSubtypes(subtypes) => chars.subtypes = subtypes.clone(),
            Modification::SetColors(colors) => chars.colors = *colors,
            Modification::AddColors(colors) => chars.colors = chars.colors.union(*colors),
            Modification::AddAbility(ability) => chars.abilities.push((**ability).clone()),
            Modification::RemoveKeyword(keyword) => chars
                .abilities
                .retain(|a| !matches!(a, Ability::Keyword(k) if k == keyword)),
            Modification::RemoveAllAbilities => chars.abilities.clear(),
            Modification::SetPt { power, toughness } => {
                chars.power = Some(power.fixed());
                chars.toughness = Some(toughness.fixed());
            }
            Modification::ModifyPt { power, toughness } => {
                chars.power = chars.power.map(|p| p + power.fixed());
                chars.toughness = chars.toughness.map(|t| t + toughness.fixed());
            }
            Modification::SwitchPt => std::mem::swap(&mut chars.power, &mut chars.toughness),
        }
    }
}
