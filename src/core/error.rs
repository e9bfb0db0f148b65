//! Rules errors.
//!
//! Every rejected operation returns a `RulesError` and leaves the match
//! untouched: operations validate before they mutate.

use thiserror::Error;

/// Why an operation was rejected.
#[derive(Debug, Error)]
pub enum RulesError {
    /// The action is not allowed now (wrong priority holder, wrong step,
    /// wrong timing, pending interaction, finished match).
    #[error("illegal action: {0}")]
    IllegalAction(String),

    /// A chosen target does not pass its filter.
    #[error("illegal target: {0}")]
    IllegalTarget(String),

    /// The pool cannot cover the cost.
    #[error("insufficient mana: need {required}, pool holds {available}")]
    InsufficientMana { required: u32, available: u32 },

    /// A combat damage assignment breaks the assignment rules.
    #[error("invalid damage assignment: {0}")]
    InvalidDamageAssignment(String),

    /// A referenced card, permanent, player or match does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A mana cost string could not be parsed.
    #[error("invalid mana cost `{0}`")]
    InvalidManaCost(String),

    /// Match setup was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A match snapshot could not be encoded or decoded.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),
}

impl RulesError {
    /// Shorthand for `RulesError::IllegalAction`.
    pub fn illegal(reason: impl Into<String>) -> Self {
        Self::IllegalAction(reason.into())
    }

    /// Shorthand for `RulesError::NotFound`.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

/// Result alias used throughout the engine.
pub type Result<T> = std::result::Result<T, RulesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RulesError::InsufficientMana { required: 3, available: 1 };
        assert_eq!(err.to_string(), "insufficient mana: need 3, pool holds 1");

        let err = RulesError::illegal("not your priority");
        assert_eq!(err.to_string(), "illegal action: not your priority");
    }
}
