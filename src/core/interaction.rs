//! Suspension points that wait for a player's input.
//!
//! The engine never blocks. When a rule needs a decision it stores a
//! `PendingInteraction` on the match and returns; the matching entry point
//! validates the response and resumes. While one is set, every other
//! mutating action is rejected.

use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use super::player::PlayerId;
use crate::combat::DamageContext;
use crate::effects::Target;
use crate::stack::StackEntry;
use crate::triggers::PendingTrigger;

/// A paused decision and the context needed to validate its answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PendingInteraction {
    /// Keep the opening hand or mulligan.
    MulliganDecision { player: PlayerId },

    /// Put `count` cards from hand on the bottom of the library.
    BottomCards { player: PlayerId, count: usize },

    /// Active player picks attackers from `candidates`.
    DeclareAttackers {
        player: PlayerId,
        candidates: Vec<EntityId>,
    },

    /// Defending player picks blockers from `candidates`.
    DeclareBlockers {
        player: PlayerId,
        candidates: Vec<EntityId>,
    },

    /// Attacker's controller splits its combat damage.
    CombatDamageAssignment {
        player: PlayerId,
        context: DamageContext,
    },

    /// Controller of a triggered ability picks its target.
    ChooseTarget {
        player: PlayerId,
        trigger: PendingTrigger,
        legal_targets: Vec<Target>,
    },

    /// "You may ..." during resolution. The entry is held here and resumes
    /// at `effect_index` once answered.
    MayEffectPrompt {
        player: PlayerId,
        prompt: String,
        entry: Box<StackEntry>,
        effect_index: usize,
    },

    /// Active player discards down to the maximum hand size.
    CleanupDiscard { player: PlayerId, count: usize },
}

impl PendingInteraction {
    /// Player who must respond.
    #[must_use]
    pub fn player(&self) -> PlayerId {
        match self {
            PendingInteraction::MulliganDecision { player }
            | PendingInteraction::BottomCards { player, .. }
            | PendingInteraction::DeclareAttackers { player, .. }
            | PendingInteraction::DeclareBlockers { player, .. }
            | PendingInteraction::CombatDamageAssignment { player, .. }
            | PendingInteraction::ChooseTarget { player, .. }
            | PendingInteraction::MayEffectPrompt { player, .. }
            | PendingInteraction::CleanupDiscard { player, .. } => *player,
        }
    }

    /// Kind name, used in error messages and views.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            PendingInteraction::MulliganDecision { .. } => "mulligan decision",
            PendingInteraction::BottomCards { .. } => "bottom cards",
            PendingInteraction::DeclareAttackers { .. } => "declare attackers",
            PendingInteraction::DeclareBlockers { .. } => "declare blockers",
            PendingInteraction::CombatDamageAssignment { .. } => "combat damage assignment",
            PendingInteraction::ChooseTarget { .. } => "choose target",
            PendingInteraction::MayEffectPrompt { .. } => "may effect prompt",
            PendingInteraction::CleanupDiscard { .. } => "cleanup discard",
        }
    }
}

impl std::fmt::Display for PendingInteraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.kind(), self.player())
    }
}
