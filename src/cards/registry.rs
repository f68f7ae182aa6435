//! Card registry for definition lookup.
//!
//! The `CardRegistry` stores every card definition a game can reference.
//! Definitions are validated as they are registered, so a malformed card is
//! a load-time error rather than a mid-game surprise. Once loaded the
//! registry is shared read-only (`Arc<CardRegistry>`) by every game.

use rustc_hash::FxHashMap;

use crate::core::error::{Result, RulesError};

use super::definition::{CardDefinition, CardId};

/// Registry of card definitions.
///
/// ## Example
///
/// ```
/// use ccg_rules::cards::{CardDefinition, CardId, CardRegistry, CardType};
///
/// let mut registry = CardRegistry::new();
/// registry
///     .register(CardDefinition::new(CardId::new(1), "Mountain").with_types(&[CardType::Land]))
///     .unwrap();
///
/// assert_eq!(registry.get(CardId::new(1)).unwrap().name, "Mountain");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, CardDefinition>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a card definition.
    pub fn register(&mut self, card: CardDefinition) -> Result<CardId> {
        if self.cards.contains_key(&card.id) {
            return Err(RulesError::DuplicateCard(card.id));
        }
        card.validate()?;
        let id = card.id;
        self.cards.insert(id, card);
        Ok(id)
    }

    /// Register several definitions, stopping at the first invalid one.
    pub fn register_all(&mut self, cards: impl IntoIterator<Item = CardDefinition>) -> Result<()> {
        for card in cards {
            self.register(card)?;
        }
        Ok(())
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(&id)
    }

    /// Get a card definition, as an error if missing.
    pub fn lookup(&self, id: CardId) -> Result<&CardDefinition> {
        self.cards.get(&id).ok_or(RulesError::UnknownCard(id))
    }

    /// Find a definition by exact name.
    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&CardDefinition> {
        self.cards.values().find(|c| c.name == name)
    }

    /// Check if a card ID is registered.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all card definitions.
    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }
}
