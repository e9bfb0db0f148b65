//! Match configuration.
//!
//! `MatchConfig` carries the numeric house rules a match is created with.
//! The defaults are the standard constructed-format values.
//!
//! ```
//! use rust_tcg::core::MatchConfig;
//!
//! let config = MatchConfig::default().with_starting_life(30);
//! assert_eq!(config.starting_life, 30);
//! assert_eq!(config.max_hand_size, 7);
//! ```

use serde::{Deserialize, Serialize};

use super::error::{Result, RulesError};

/// House rules for one match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Life each player starts with.
    pub starting_life: i64,

    /// Cards drawn for the opening hand (and after each mulligan).
    pub opening_hand_size: usize,

    /// Hand size the active player discards down to during cleanup.
    pub max_hand_size: usize,

    /// Maximum number of mulligans a player may take.
    pub max_mulligans: u32,

    /// Skip the draw of the very first turn of the game.
    pub skip_first_draw: bool,

    /// Lands a player may play per turn.
    pub lands_per_turn: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            starting_life: 20,
            opening_hand_size: 7,
            max_hand_size: 7,
            max_mulligans: 7,
            skip_first_draw: true,
            lands_per_turn: 1,
        }
    }
}

impl MatchConfig {
    /// Set starting life (builder pattern).
    #[must_use]
    pub fn with_starting_life(mut self, life: i64) -> Self {
        self.starting_life = life;
        self
    }

    /// Set opening hand size (builder pattern).
    #[must_use]
    pub fn with_opening_hand_size(mut self, size: usize) -> Self {
        self.opening_hand_size = size;
        self
    }

    /// Set maximum hand size (builder pattern).
    #[must_use]
    pub fn with_max_hand_size(mut self, size: usize) -> Self {
        self.max_hand_size = size;
        self
    }

    /// Set maximum mulligans (builder pattern).
    #[must_use]
    pub fn with_max_mulligans(mut self, max: u32) -> Self {
        self.max_mulligans = max;
        self
    }

    /// Choose whether the first turn skips its draw (builder pattern).
    #[must_use]
    pub fn with_skip_first_draw(mut self, skip: bool) -> Self {
        self.skip_first_draw = skip;
        self
    }

    /// Set lands per turn (builder pattern).
    #[must_use]
    pub fn with_lands_per_turn(mut self, lands: u32) -> Self {
        self.lands_per_turn = lands;
        self
    }

    /// Validate this configuration for a match with `player_count` players.
    pub fn validate(&self, player_count: usize) -> Result<()> {
        if player_count < 2 {
            return Err(RulesError::InvalidConfig(format!(
                "a match needs at least 2 players, got {player_count}"
            )));
        }
        if player_count > 255 {
            return Err(RulesError::InvalidConfig("at most 255 players supported".into()));
        }
        if self.starting_life <= 0 {
            return Err(RulesError::InvalidConfig("starting life must be positive".into()));
        }
        Ok(())
    }
}
