//! Mana costs and mana pools.
//!
//! Costs are written in the usual brace notation, `{2}{R}{R}`. Only generic
//! and the five colored symbols are understood.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, RulesError};

use super::characteristics::{Color, ColorSet};

/// A mana cost: generic amount plus colored pips.
///
/// ```
/// use ccg_rules::cards::ManaCost;
///
/// let cost = ManaCost::parse("{4}{R}{R}{R}").unwrap();
/// assert_eq!(cost.mana_value(), 7);
/// assert_eq!(cost.to_string(), "{4}{R}{R}{R}");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaCost {
    pub generic: u32,
    /// Indexed by `Color as usize`.
    pub colored: [u32; 5],
}

impl ManaCost {
    /// Parse brace notation. The empty string is a zero cost.
    pub fn parse(text: &str) -> Result<Self> {
        let mut cost = ManaCost::default();
        let mut rest = text.trim();
        while !rest.is_empty() {
            let inner = rest
                .strip_prefix('{')
                .and_then(|r| r.split_once('}'))
                .ok_or_else(|| RulesError::ManaCost(text.to_string()))?;
            let (symbol, tail) = inner;
            if let Ok(n) = symbol.parse::<u32>() {
                cost.generic += n;
            } else {
                let mut chars = symbol.chars();
                let color = match (chars.next(), chars.next()) {
                    (Some(c), None) => Color::from_symbol(c),
                    _ => None,
                }
                .ok_or_else(|| RulesError::ManaCost(text.to_string()))?;
                cost.colored[color as usize] += 1;
            }
            rest = tail;
        }
        Ok(cost)
    }

    /// Total mana value.
    #[must_use]
    pub fn mana_value(&self) -> u32 {
        self.generic + self.colored.iter().sum::<u32>()
    }

    /// Colors of the pips in this cost.
    #[must_use]
    pub fn colors(&self) -> ColorSet {
        Color::ALL
            .into_iter()
            .filter(|&c| self.colored[c as usize] > 0)
            .fold(ColorSet::COLORLESS, ColorSet::with)
    }

    /// Combined cost of this and another (additional costs).
    #[must_use]
    pub fn plus(&self, other: &ManaCost) -> ManaCost {
        let mut colored = self.colored;
        for (slot, extra) in colored.iter_mut().zip(other.colored) {
            *slot += extra;
        }
        ManaCost {
            generic: self.generic + other.generic,
            colored,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.mana_value() == 0
    }
}

impl std::fmt::Display for ManaCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.generic > 0 || self.is_zero() {
            write!(f, "{{{}}}", self.generic)?;
        }
        for color in Color::ALL {
            for _ in 0..self.colored[color as usize] {
                write!(f, "{{{}}}", color.symbol())?;
            }
        }
        Ok(())
    }
}

/// Kinds of mana a pool can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManaKind {
    Colored(Color),
    Colorless,
}

impl ManaKind {
    const fn slot(self) -> usize {
        match self {
            ManaKind::Colored(c) => c as usize,
            ManaKind::Colorless => 5,
        }
    }
}

/// Unspent mana. Empties between steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPool {
    amounts: [u32; 6],
}

impl ManaPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: ManaKind, amount: u32) {
        self.amounts[kind.slot()] += amount;
    }

    #[must_use]
    pub fn amount(&self, kind: ManaKind) -> u32 {
        self.amounts[kind.slot()]
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.amounts.iter().sum()
    }

    pub fn clear(&mut self) {
        self.amounts = [0; 6];
    }

    /// Pay a cost from the pool. Returns false (and leaves the pool
    /// untouched) if it can't be paid.
    pub fn pay(&mut self, cost: &ManaCost) -> bool {
        let mut after = self.amounts;
        for color in Color::ALL {
            let need = cost.colored[color as usize];
            let slot = &mut after[color as usize];
            if *slot < need {
                return false;
            }
            *slot -= need;
        }

        // Generic: colorless first, then whichever color has the most left.
        let mut generic = cost.generic;
        let take = generic.min(after[5]);
        after[5] -= take;
        generic -= take;
        while generic > 0 {
            let Some(idx) = (0..5)
                .filter(|&i| after[i] > 0)
                .max_by_key(|&i| (after[i], std::cmp::Reverse(i)))
            else {
                return false;
            };
            after[idx] -= 1;
            generic -= 1;
        }

        self.amounts = after;
        true
    }

    #[must_use]
    pub fn can_pay(&self, cost: &ManaCost) -> bool {
        let mut probe = *self;
        probe.pay(cost)
    }
}
