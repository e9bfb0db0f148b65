//! Card registry for definition lookup.
//!
//! The `CardRegistry` is built once by the host (from its card library)
//! and shared read-only by every match. Definitions are looked up by
//! `CardId`; the set index maps a set code to the cards printed in it.

use rustc_hash::FxHashMap;

use super::definition::{CardDefinition, CardId};
use crate::core::{Result, RulesError};

/// Registry of card definitions.
///
/// ## Example
///
/// ```
/// use rust_tcg::cards::{CardDefinition, CardId, CardRegistry, CardType};
///
/// let mut registry = CardRegistry::new();
/// registry
///     .register(CardDefinition::new(CardId::new(1), "Forest").with_type(CardType::Land).with_set_code("10E"))
///     .unwrap();
///
/// assert_eq!(registry.get(CardId::new(1)).unwrap().name, "Forest");
/// assert_eq!(registry.cards_in_set("10E").len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, CardDefinition>,
    by_set: FxHashMap<String, Vec<CardId>>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition.
    ///
    /// Fails if a card with the same ID already exists.
    pub fn register(&mut self, card: CardDefinition) -> Result<()> {
        if self.cards.contains_key(&card.id) {
            return Err(RulesError::InvalidConfig(format!(
                "card {} already registered",
                card.id
            )));
        }
        self.by_set
            .entry(card.set_code.clone())
            .or_default()
            .push(card.id);
        self.cards.insert(card.id, card);
        Ok(())
    }

    /// Register every card of a set, stamping each with `set_code`.
    ///
    /// Stops at the first duplicate id; cards before it stay registered.
    pub fn register_set(&mut self, set_code: &str, cards: impl IntoIterator<Item = CardDefinition>) -> Result<()> {
        for card in cards {
            self.register(card.with_set_code(set_code))?;
        }
        Ok(())
    }

    /// Register a card, replacing any earlier definition with the same ID.
    pub fn upsert(&mut self, card: CardDefinition) -> Option<CardDefinition> {
        let previous = self.cards.remove(&card.id);
        if let Some(old) = &previous {
            if let Some(ids) = self.by_set.get_mut(&old.set_code) {
                ids.retain(|id| *id != old.id);
            }
        }
        self.by_set
            .entry(card.set_code.clone())
            .or_default()
            .push(card.id);
        self.cards.insert(card.id, card);
        previous
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(&id)
    }

    /// Get a card definition by ID or fail with `NotFound`.
    pub fn require(&self, id: CardId) -> Result<&CardDefinition> {
        self.cards
            .get(&id)
            .ok_or_else(|| RulesError::not_found(format!("{id} is not in the card registry")))
    }

    /// Find a card by exact name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&CardDefinition> {
        self.cards.values().find(|c| c.name == name)
    }

    /// Cards printed in a set, in registration order.
    #[must_use]
    pub fn cards_in_set(&self, set_code: &str) -> Vec<&CardDefinition> {
        self.by_set
            .get(set_code)
            .map(|ids| ids.iter().filter_map(|id| self.cards.get(id)).collect())
            .unwrap_or_default()
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

    /// Find cards matching a predicate.
    pub fn find<F>(&self, predicate: F) -> impl Iterator<Item = &CardDefinition>
    where
        F: Fn(&CardDefinition) -> bool,
    {
        self.cards.values().filter(move |c| predicate(c))
    }
}

impl FromIterator<CardDefinition> for CardRegistry {
    /// Later definitions replace earlier ones with the same ID.
    fn from_iter<I: IntoIterator<Item = CardDefinition>>(iter: I) -> Self {
        let mut registry = Self::new();
        for card in iter {
            registry.upsert(card);
        }
        registry
    }
}
