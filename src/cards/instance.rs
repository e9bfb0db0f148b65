//! Card instances - one physical card in a match.
//!
//! A `CardInstance` is created for every card of every deck when the match
//! is built, and keeps its `EntityId` as it moves between library, hand,
//! stack, battlefield and graveyard. It carries its own copy of the
//! definition so a suspended match is self-contained.

use serde::{Deserialize, Serialize};

use super::definition::{CardDefinition, CardId};
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;

/// A card in a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique entity ID for this card.
    pub id: EntityId,

    /// Player who started the match with this card (or created the token).
    pub owner: PlayerId,

    /// Printed characteristics.
    pub definition: CardDefinition,

    /// Tokens cease to exist when they leave the battlefield.
    #[serde(default)]
    pub is_token: bool,
}

impl CardInstance {
    /// Create a card instance.
    #[must_use]
    pub fn new(id: EntityId, owner: PlayerId, definition: CardDefinition) -> Self {
        Self {
            id,
            owner,
            definition,
            is_token: false,
        }
    }

    /// Create a token instance.
    #[must_use]
    pub fn token(id: EntityId, owner: PlayerId, definition: CardDefinition) -> Self {
        Self {
            id,
            owner,
            definition,
            is_token: true,
        }
    }

    /// Card name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// ID of the printed card.
    #[must_use]
    pub fn card_id(&self) -> CardId {
        self.definition.id
    }
}

impl std::fmt::Display for CardInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.definition.name, self.id)
    }
}
