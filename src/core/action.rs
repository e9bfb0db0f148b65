//! Player actions and the action history.
//!
//! Every mutating entry point of `Match` has a matching `Action` variant,
//! so a host can drive a match from a single decoded message type via
//! `Match::apply`. Accepted actions are appended to the match history as
//! `ActionRecord`s.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::entity::EntityId;
use super::player::PlayerId;
use crate::combat::DamageAssignment;
use crate::effects::Target;

/// A player decision submitted to the engine.
///
/// ## Example
///
/// ```
/// use rust_tcg::core::{Action, EntityId};
/// use rust_tcg::effects::Target;
/// use rust_tcg::PlayerId;
///
/// let bolt = Action::CastSpell {
///     card: EntityId(12),
///     target: Some(Target::Player(PlayerId::new(1))),
///     x: 0,
/// };
/// assert!(!bolt.is_pass());
/// assert!(Action::PassPriority.is_pass());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    // === Mulligan ===
    KeepHand,
    Mulligan,
    /// Cards put on the bottom of the library after keeping a mulligan.
    BottomCards(Vec<EntityId>),

    // === Priority ===
    PlayLand {
        card: EntityId,
    },
    CastSpell {
        card: EntityId,
        target: Option<Target>,
        x: u32,
    },
    ActivateAbility {
        permanent: EntityId,
        index: usize,
        target: Option<Target>,
        x: u32,
    },
    PassPriority,

    // === Combat ===
    DeclareAttackers(SmallVec<[EntityId; 4]>),
    /// `(blocker, attacker)` pairs.
    DeclareBlockers(Vec<(EntityId, EntityId)>),
    AssignCombatDamage {
        attacker: EntityId,
        assignment: DamageAssignment,
    },

    // === Interaction responses ===
    ChooseTarget(Target),
    AnswerMay(bool),
    Discard(Vec<EntityId>),
}

impl Action {
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Action::PassPriority)
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Action::KeepHand => "keep hand",
            Action::Mulligan => "mulligan",
            Action::BottomCards(_) => "bottom cards",
            Action::PlayLand { .. } => "play land",
            Action::CastSpell { .. } => "cast spell",
            Action::ActivateAbility { .. } => "activate ability",
            Action::PassPriority => "pass priority",
            Action::DeclareAttackers(_) => "declare attackers",
            Action::DeclareBlockers(_) => "declare blockers",
            Action::AssignCombatDamage { .. } => "assign combat damage",
            Action::ChooseTarget(_) => "choose target",
            Action::AnswerMay(_) => "answer prompt",
            Action::Discard(_) => "discard",
        }
    }
}

/// A recorded action with metadata for history tracking.
///
/// Used for:
/// - Replay/debugging
/// - Reconnecting clients catching up on the match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The player who took this action.
    pub player: PlayerId,

    /// The action taken.
    pub action: Action,

    /// Turn number when action was taken.
    pub turn: u32,

    /// Sequence number within the match (for ordering).
    pub sequence: u32,
}

impl ActionRecord {
    /// Create a new action record.
    #[must_use]
    pub fn new(player: PlayerId, action: Action, turn: u32, sequence: u32) -> Self {
        Self {
            player,
            action,
            turn,
            sequence,
        }
    }
}
