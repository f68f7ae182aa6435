//! Object filters: "creatures you control", "other Elves", "nonred creatures".
//!
//! Filters are evaluated against derived characteristics, so an effect that
//! turns a creature red changes what "nonred creatures" matches.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::entity::ObjectId;
use crate::core::player::PlayerId;
use crate::layers::DerivedObject;

use super::characteristics::{CardType, ColorSet, Keyword, Subtype};

/// Relation between a player and "you" (the controller of the effect).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerFilter {
    #[default]
    Any,
    You,
    Opponent,
}

impl ControllerFilter {
    #[must_use]
    pub fn matches(self, player: PlayerId, you: PlayerId) -> bool {
        match self {
            ControllerFilter::Any => true,
            ControllerFilter::You => player == you,
            ControllerFilter::Opponent => player != you,
        }
    }
}

/// Who "you" and "this" are when a filter is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterContext {
    pub you: PlayerId,
    pub source: Option<ObjectId>,
}

impl FilterContext {
    #[must_use]
    pub fn new(you: PlayerId, source: Option<ObjectId>) -> Self {
        Self { you, source }
    }
}

/// A predicate over objects. Empty lists mean "no restriction".
///
/// ```
/// use ccg_rules::cards::{CardType, ObjectFilter};
///
/// let other_elves = ObjectFilter::creature().with_subtype("Elf").other();
/// assert_eq!(other_elves.card_types.as_slice(), &[CardType::Creature]);
/// assert!(other_elves.exclude_source);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectFilter {
    /// Has at least one of these types.
    pub card_types: SmallVec<[CardType; 2]>,
    /// Has at least one of these subtypes.
    pub subtypes: SmallVec<[Subtype; 1]>,
    /// Has at least one of these colors.
    pub colors: ColorSet,
    /// Has none of these colors.
    pub excluded_colors: ColorSet,
    pub controller: ControllerFilter,
    /// Doesn't match the source of the effect.
    pub exclude_source: bool,
    pub keyword: Option<Keyword>,
    pub nontoken: bool,
    pub name: Option<String>,
}

impl ObjectFilter {
    /// Matches everything.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn creature() -> Self {
        Self::of_type(CardType::Creature)
    }

    #[must_use]
    pub fn of_type(card_type: CardType) -> Self {
        let mut filter = Self::default();
        filter.card_types.push(card_type);
        filter
    }

    #[must_use]
    pub fn with_type(mut self, card_type: CardType) -> Self {
        self.card_types.push(card_type);
        self
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<Subtype>) -> Self {
        self.subtypes.push(subtype.into());
        self
    }

    #[must_use]
    pub fn with_colors(mut self, colors: ColorSet) -> Self {
        self.colors = colors;
        self
    }

    #[must_use]
    pub fn without_colors(mut self, colors: ColorSet) -> Self {
        self.excluded_colors = colors;
        self
    }

    #[must_use]
    pub fn you_control(mut self) -> Self {
        self.controller = ControllerFilter::You;
        self
    }

    #[must_use]
    pub fn opponents_control(mut self) -> Self {
        self.controller = ControllerFilter::Opponent;
        self
    }

    /// "Other": excludes the effect's source.
    #[must_use]
    pub fn other(mut self) -> Self {
        self.exclude_source = true;
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keyword = Some(keyword);
        self
    }

    #[must_use]
    pub fn nontoken(mut self) -> Self {
        self.nontoken = true;
        self
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Evaluate the filter against a derived object.
    #[must_use]
    pub fn matches(&self, object: &DerivedObject, ctx: &FilterContext) -> bool {
        let chars = &object.characteristics;
        if self.exclude_source && ctx.source == Some(object.id) {
            return false;
        }
        if !self.controller.matches(object.controller, ctx.you) {
            return false;
        }
        if !self.card_types.is_empty() && !self.card_types.iter().any(|t| chars.has_type(*t)) {
            return false;
        }
        if !self.subtypes.is_empty() && !self.subtypes.iter().any(|s| chars.has_subtype(s)) {
            return false;
        }
        if !self.colors.is_colorless() && !chars.colors.intersects(self.colors) {
            return false;
        }
        if chars.colors.intersects(self.excluded_colors) {
            return false;
        }
        if self.keyword.is_some_and(|k| !chars.has_keyword(k)) {
            return false;
        }
        if self.nontoken && object.token {
            return false;
        }
        if self.name.as_ref().is_some_and(|n| *n != chars.name) {
            return false;
        }
        true
    }

    /// Rewrite a subtype word (text-changing effects).
    pub fn replace_subtype(&mut self, from: &Subtype, to: &Subtype) {
        for subtype in &mut self.subtypes {
            if subtype == from {
                *subtype = to.clone();
            }
        }
    }
}
