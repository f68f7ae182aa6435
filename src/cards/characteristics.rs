//! Object characteristics: the values the layer system computes.
//!
//! `Characteristics` is the full set of values an object has once all
//! applicable continuous effects are applied: name, mana cost, colors,
//! types, subtypes, abilities, power and toughness. A card definition
//! supplies the printed values; [`crate::layers::LayerSystem`] derives the
//! rest.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::ability::Ability;
use super::mana::ManaCost;

/// One of the five colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    pub const ALL: [Color; 5] = [Color::White, Color::Blue, Color::Black, Color::Red, Color::Green];

    const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Mana symbol letter.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
        }
    }

    /// Parse a mana symbol letter.
    #[must_use]
    pub fn from_symbol(c: char) -> Option<Color> {
        Color::ALL.into_iter().find(|color| color.symbol() == c)
    }
}

/// A set of colors stored as a bitmask.
///
/// ```
/// use ccg_rules::cards::{Color, ColorSet};
///
/// let boros = ColorSet::of(&[Color::Red, Color::White]);
/// assert!(boros.contains(Color::Red));
/// assert!(!boros.is_colorless());
/// assert_eq!(boros.len(), 2);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorSet(u8);

impl ColorSet {
    /// Colorless.
    pub const COLORLESS: ColorSet = ColorSet(0);

    /// A set containing the given colors.
    #[must_use]
    pub fn of(colors: &[Color]) -> Self {
        colors.iter().fold(Self::COLORLESS, |set, &c| set.with(c))
    }

    /// A set containing a single color.
    #[must_use]
    pub const fn single(color: Color) -> Self {
        ColorSet(color.bit())
    }

    /// This set plus `color`.
    #[must_use]
    pub const fn with(self, color: Color) -> Self {
        ColorSet(self.0 | color.bit())
    }

    #[must_use]
    pub const fn contains(self, color: Color) -> bool {
        self.0 & color.bit() != 0
    }

    /// True if any color is shared.
    #[must_use]
    pub const fn intersects(self, other: ColorSet) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub const fn union(self, other: ColorSet) -> Self {
        ColorSet(self.0 | other.0)
    }

    #[must_use]
    pub const fn is_colorless(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.is_colorless()
    }

    pub fn iter(self) -> impl Iterator<Item = Color> {
        Color::ALL.into_iter().filter(move |&c| self.contains(c))
    }
}

/// Card types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardType {
    Artifact,
    Creature,
    Enchantment,
    Instant,
    Land,
    Planeswalker,
    Sorcery,
}

impl CardType {
    /// Whether objects of this type are permanents.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        !matches!(self, CardType::Instant | CardType::Sorcery)
    }
}

/// Supertypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Supertype {
    Basic,
    Legendary,
}

/// A subtype word ("Elf", "Mountain", "Aura").
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Subtype(pub String);

impl Subtype {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Subtype {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for Subtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keyword abilities the rules core interprets directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Flying,
    Reach,
    Haste,
    Vigilance,
    Trample,
    Deathtouch,
    Lifelink,
    Defender,
    Indestructible,
    Hexproof,
    Flash,
}

/// The derived (or printed) values of an object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Characteristics {
    pub name: String,
    pub mana_cost: Option<ManaCost>,
    pub colors: ColorSet,
    pub supertypes: SmallVec<[Supertype; 1]>,
    pub card_types: SmallVec<[CardType; 2]>,
    pub subtypes: SmallVec<[Subtype; 2]>,
    pub abilities: Vec<Ability>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
}

impl Characteristics {
    /// Empty characteristics with a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn has_type(&self, card_type: CardType) -> bool {
        self.card_types.contains(&card_type)
    }

    #[must_use]
    pub fn has_subtype(&self, subtype: &Subtype) -> bool {
        self.subtypes.contains(subtype)
    }

    #[must_use]
    pub fn has_supertype(&self, supertype: Supertype) -> bool {
        self.supertypes.contains(&supertype)
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.has_type(CardType::Creature)
    }

    #[must_use]
    pub fn is_land(&self) -> bool {
        self.has_type(CardType::Land)
    }

    /// Whether an object with these types would be a permanent.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        !self.card_types.is_empty() && self.card_types.iter().all(|t| t.is_permanent())
    }

    /// Instants, and anything with flash, may be cast whenever its
    /// controller has priority.
    #[must_use]
    pub fn has_instant_timing(&self) -> bool {
        self.has_type(CardType::Instant) || self.has_keyword(Keyword::Flash)
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.abilities
            .iter()
            .any(|a| matches!(a, Ability::Keyword(k) if *k == keyword))
    }

    /// Mana value of the current mana cost (0 if none).
    #[must_use]
    pub fn mana_value(&self) -> u32 {
        self.mana_cost.as_ref().map_or(0, ManaCost::mana_value)
    }

    /// Power and toughness as a pair, for creatures.
    #[must_use]
    pub fn pt(&self) -> Option<(i32, i32)> {
        Some((self.power?, self.toughness?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_symbols() {
        assert_eq!(Color::from_symbol('U'), Some(Color::Blue));
        assert_eq!(Color::from_symbol('X'), None);
        assert_eq!(Color::Green.symbol(), 'G');
    }

    #[test]
    fn test_color_set_ops() {
        let red = ColorSet::single(Color::Red);
        let rg = red.with(Color::Green);
        assert!(rg.intersects(red));
        assert!(!ColorSet::single(Color::Blue).intersects(rg));
        assert_eq!(rg.iter().collect::<Vec<_>>(), vec![Color::Red, Color::Green]);
        assert!(ColorSet::COLORLESS.is_colorless());
    }

    #[test]
    fn test_permanent_types() {
        let mut chars = Characteristics::named("Bear");
        chars.card_types.push(CardType::Creature);
        assert!(chars.is_permanent());
        assert!(!chars.has_instant_timing());

        let mut bolt = Characteristics::named("Bolt");
        bolt.card_types.push(CardType::Instant);
        assert!(!bolt.is_permanent());
        assert!(bolt.has_instant_timing());
    }

    #[test]
    fn test_keywords_read_from_abilities() {
        let mut chars = Characteristics::named("Bird");
        chars.abilities.push(Ability::Keyword(Keyword::Flying));
        assert!(chars.has_keyword(Keyword::Flying));
        assert!(!chars.has_keyword(Keyword::Reach));
    }
}
