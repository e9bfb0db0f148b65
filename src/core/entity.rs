//! Card and match identification.
//!
//! Every card in a match gets an `EntityId` when the match is created and
//! keeps it as it moves between library, hand, stack, battlefield and
//! graveyard. Tokens get a fresh id when created. Players are addressed
//! by `PlayerId`, never by entity id.
//!
//! ```
//! use rust_tcg::core::{EntityId, MatchId};
//!
//! assert_eq!(EntityId(12).to_string(), "Entity(12)");
//! assert_eq!(MatchId::new(3).to_string(), "Match(3)");
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier of a card within one match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// First id handed out by a fresh match.
    pub const FIRST: EntityId = EntityId(1);

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The id allocated after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Identifier of a match in the match table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchId(pub u64);

impl MatchId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Match({})", self.0)
    }
}
