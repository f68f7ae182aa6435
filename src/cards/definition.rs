//! Card definitions: printed card data.
//!
//! `CardDefinition` holds the immutable properties of a card: its printed
//! characteristics, its abilities, and for instants and sorceries the
//! spell ability that runs on resolution. Runtime data (zone, damage,
//! counters, how it was cast) lives in [`super::GameObject`].
//!
//! ## Prototype
//!
//! A card with a prototype can be cast for an alternative mana cost and is
//! then a smaller creature with different colors and power/toughness. The
//! alternative values apply only while the object is on the stack or the
//! battlefield; in every other zone it has its printed values.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::error::{Result, RulesError};
use crate::effects::{Effect, TargetSpec};

use super::ability::Ability;
use super::characteristics::{CardType, Characteristics, ColorSet, Keyword, Subtype, Supertype};
use super::mana::ManaCost;

/// Unique identifier for a card definition.
///
/// This identifies the "type" of card (e.g., "Lightning Bolt"), not an
/// object in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Alternative characteristics for a prototyped cast.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prototype {
    pub mana_cost: ManaCost,
    pub power: i32,
    pub toughness: i32,
}

/// What an instant or sorcery does when it resolves.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpellAbility {
    pub targets: Vec<TargetSpec>,
    pub effects: Vec<Effect>,
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use ccg_rules::cards::{CardDefinition, CardId, CardType};
///
/// let bears = CardDefinition::new(CardId::new(1), "Grizzly Bears")
///     .with_cost("{1}{G}")
///     .with_types(&[CardType::Creature])
///     .with_subtypes(&["Bear"])
///     .with_pt(2, 2);
///
/// assert!(bears.validate().is_ok());
/// assert_eq!(bears.characteristics(false).mana_value(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,
    pub name: String,
    pub mana_cost: Option<ManaCost>,
    /// Color indicator; when `None` colors come from the mana cost.
    pub color_indicator: Option<ColorSet>,
    pub supertypes: SmallVec<[Supertype; 1]>,
    pub card_types: SmallVec<[CardType; 2]>,
    pub subtypes: SmallVec<[Subtype; 2]>,
    pub abilities: Vec<Ability>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub spell: Option<SpellAbility>,
    pub prototype: Option<Prototype>,
    /// Optional additional cost the caster may choose to pay.
    pub additional_cost: Option<ManaCost>,
    /// Token definitions are never put into decks.
    pub token: bool,
    #[serde(skip)]
    build_errors: Vec<String>,
}

impl CardDefinition {
    /// Create a new card definition with no cost, types or abilities.
    #[must_use]
    pub fn new(id: CardId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            mana_cost: None,
            color_indicator: None,
            supertypes: SmallVec::new(),
            card_types: SmallVec::new(),
            subtypes: SmallVec::new(),
            abilities: Vec::new(),
            power: None,
            toughness: None,
            spell: None,
            prototype: None,
            additional_cost: None,
            token: false,
            build_errors: Vec::new(),
        }
    }

    /// Set the mana cost from brace notation. Parse failures are reported
    /// by [`Self::validate`].
    #[must_use]
    pub fn with_cost(mut self, cost: &str) -> Self {
        match ManaCost::parse(cost) {
            Ok(c) => self.mana_cost = Some(c),
            Err(e) => self.build_errors.push(e.to_string()),
        }
        self
    }

    #[must_use]
    pub fn with_colors(mut self, colors: ColorSet) -> Self {
        self.color_indicator = Some(colors);
        self
    }

    #[must_use]
    pub fn with_supertypes(mut self, supertypes: &[Supertype]) -> Self {
        self.supertypes.extend_from_slice(supertypes);
        self
    }

    #[must_use]
    pub fn with_types(mut self, types: &[CardType]) -> Self {
        self.card_types.extend_from_slice(types);
        self
    }

    #[must_use]
    pub fn with_subtypes(mut self, subtypes: &[&str]) -> Self {
        self.subtypes.extend(subtypes.iter().map(|s| Subtype::from(*s)));
        self
    }

    #[must_use]
    pub fn with_pt(mut self, power: i32, toughness: i32) -> Self {
        self.power = Some(power);
        self.toughness = Some(toughness);
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.abilities.push(Ability::Keyword(keyword));
        self
    }

    #[must_use]
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    /// Set the spell ability of an instant or sorcery.
    #[must_use]
    pub fn with_spell(mut self, targets: Vec<TargetSpec>, effects: Vec<Effect>) -> Self {
        self.spell = Some(SpellAbility { targets, effects });
        self
    }

    /// Add a prototype. Parse failures are reported by [`Self::validate`].
    #[must_use]
    pub fn with_prototype(mut self, cost: &str, power: i32, toughness: i32) -> Self {
        match ManaCost::parse(cost) {
            Ok(mana_cost) => {
                self.prototype = Some(Prototype {
                    mana_cost,
                    power,
                    toughness,
                });
            }
            Err(e) => self.build_errors.push(e.to_string()),
        }
        self
    }

    /// Add an optional additional cost.
    #[must_use]
    pub fn with_additional_cost(mut self, cost: &str) -> Self {
        match ManaCost::parse(cost) {
            Ok(c) => self.additional_cost = Some(c),
            Err(e) => self.build_errors.push(e.to_string()),
        }
        self
    }

    /// Mark as a token definition.
    #[must_use]
    pub fn token(mut self) -> Self {
        self.token = true;
        self
    }

    #[must_use]
    pub fn has_type(&self, card_type: CardType) -> bool {
        self.card_types.contains(&card_type)
    }

    /// Printed characteristics, or the prototype's when `prototyped`.
    #[must_use]
    pub fn characteristics(&self, prototyped: bool) -> Characteristics {
        let colors = self.color_indicator.unwrap_or_else(|| {
            self.mana_cost
                .as_ref()
                .map_or(ColorSet::COLORLESS, ManaCost::colors)
        });
        let mut chars = Characteristics {
            name: self.name.clone(),
            mana_cost: self.mana_cost,
            colors,
            supertypes: self.supertypes.clone(),
            card_types: self.card_types.clone(),
            subtypes: self.subtypes.clone(),
            abilities: self.abilities.clone(),
            power: self.power,
            toughness: self.toughness,
        };
        if let (true, Some(proto)) = (prototyped, &self.prototype) {
            chars.mana_cost = Some(proto.mana_cost);
            chars.colors = proto.mana_cost.colors();
            chars.power = Some(proto.power);
            chars.toughness = Some(proto.toughness);
        }
        chars
    }

    /// Check the definition for errors the engine can't recover from later.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| RulesError::InvalidCard {
            card: self.id,
            name: self.name.clone(),
            reason,
        };

        if let Some(err) = self.build_errors.first() {
            return Err(invalid(err.clone()));
        }
        if self.name.trim().is_empty() {
            return Err(invalid("card has no name".into()));
        }
        if self.card_types.is_empty() {
            return Err(invalid("card has no card type".into()));
        }
        if self.has_type(CardType::Creature) && (self.power.is_none() || self.toughness.is_none()) {
            return Err(invalid("creature without power/toughness".into()));
        }
        let is_spell = self.has_type(CardType::Instant) || self.has_type(CardType::Sorcery);
        if is_spell && self.spell.is_none() {
            return Err(invalid("instant or sorcery without a spell ability".into()));
        }
        if self.prototype.is_some() && !self.has_type(CardType::Creature) {
            return Err(invalid("prototype on a non-creature".into()));
        }

        if let Some(spell) = &self.spell {
            check_target_refs(&spell.targets, &spell.effects).map_err(invalid)?;
        }
        for ability in &self.abilities {
            match ability {
                Ability::Triggered(t) => check_target_refs(&t.targets, &t.effects).map_err(invalid)?,
                Ability::Activated(a) => check_target_refs(&a.targets, &a.effects).map_err(invalid)?,
                _ => {}
            }
        }
        Ok(())
    }
}

fn check_target_refs(targets: &[TargetSpec], effects: &[Effect]) -> std::result::Result<(), String> {
    let highest = effects.iter().filter_map(Effect::max_target_index).max();
    match highest {
        Some(i) if i >= targets.len() => Err(format!(
            "effect refers to target {} but only {} target(s) are declared",
            i,
            targets.len()
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Color;
    use crate::effects::{EffectTarget, TargetSpec};
    use crate::layers::Value;

    fn bolt() -> CardDefinition {
        CardDefinition::new(CardId::new(2), "Lightning Bolt")
            .with_cost("{R}")
            .with_types(&[CardType::Instant])
            .with_spell(
                vec![TargetSpec::any_target()],
                vec![Effect::damage(Value::Fixed(3), EffectTarget::Target(0))],
            )
    }

    #[test]
    fn test_card_id() {
        let id = CardId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Card(42)");
    }

    #[test]
    fn test_colors_from_cost() {
        let chars = bolt().characteristics(false);
        assert_eq!(chars.colors, ColorSet::single(Color::Red));
        assert_eq!(chars.mana_value(), 1);
        assert!(bolt().validate().is_ok());
    }

    #[test]
    fn test_prototype_characteristics() {
        let automaton = CardDefinition::new(CardId::new(3), "Automaton")
            .with_cost("{7}")
            .with_types(&[CardType::Artifact, CardType::Creature])
            .with_pt(6, 4)
            .with_prototype("{2}{R}", 3, 2);

        let normal = automaton.characteristics(false);
        assert_eq!(normal.pt(), Some((6, 4)));
        assert!(normal.colors.is_colorless());
        assert_eq!(normal.mana_value(), 7);

        let proto = automaton.characteristics(true);
        assert_eq!(proto.pt(), Some((3, 2)));
        assert_eq!(proto.colors, ColorSet::single(Color::Red));
        assert_eq!(proto.mana_value(), 3);
    }

    #[test]
    fn test_validate_creature_without_pt() {
        let card = CardDefinition::new(CardId::new(1), "Shade").with_types(&[CardType::Creature]);
        assert!(matches!(card.validate(), Err(RulesError::InvalidCard { .. })));
    }

    #[test]
    fn test_validate_bad_cost() {
        let card = CardDefinition::new(CardId::new(1), "Oops")
            .with_cost("{R")
            .with_types(&[CardType::Artifact]);
        assert!(card.validate().is_err());
    }

    #[test]
    fn test_validate_dangling_target_ref() {
        let card = CardDefinition::new(CardId::new(1), "Fork")
            .with_cost("{R}")
            .with_types(&[CardType::Instant])
            .with_spell(
                vec![TargetSpec::any_target()],
                vec![Effect::damage(Value::Fixed(1), EffectTarget::Target(1))],
            );
        let err = card.validate().unwrap_err();
        assert!(err.to_string().contains("target 1"));
    }

    #[test]
    fn test_validate_spell_needs_spell_ability() {
        let card = CardDefinition::new(CardId::new(1), "Blank").with_types(&[CardType::Sorcery]);
        assert!(card.validate().is_err());
    }

    #[test]
    fn test_serialization() {
        let card = bolt();
        let json = serde_json::to_string(&card).unwrap();
        let back: CardDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "Lightning Bolt");
        assert_eq!(back.spell, card.spell);
    }
}
