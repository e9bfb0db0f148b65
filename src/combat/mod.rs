//! Combat: attacker/blocker declaration and combat damage.
//!
//! ## Key Types
//!
//! - `CombatState`: who attacks, who blocks what, and assignments in progress
//! - `DamageContext`: everything needed to validate one attacker's split
//! - `DamageAssignment`: an ordered recipient → amount mapping
//!
//! Block legality is not special-cased here: it is a `TargetFilter` built
//! from the attacker's keywords (see `TargetFilter::able_to_block`) and
//! evaluated against each proposed blocker.

mod damage;
mod declare;

pub use damage::{begin as begin_damage, submit as submit_damage, validate_assignment};
pub use damage::{BlockerLethal, DamageAssignment, DamageContext, DamagePass, DamageRecipient};
pub use declare::{attack_candidates, block_candidates, declare_attackers, declare_blockers};

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};

/// Combat bookkeeping for the current turn.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    /// Declared attackers, in declaration order.
    pub attackers: Vec<EntityId>,
    pub defending_player: Option<PlayerId>,
    /// `(blocker, attacker)` pairs in declaration order.
    pub blocks: Vec<(EntityId, EntityId)>,
    /// Assignments collected during the combat damage step.
    pub assignments: Vec<(EntityId, DamageAssignment)>,
    /// Attackers still waiting for their controller's assignment.
    pub awaiting: Vec<DamageContext>,
    /// Which damage pass the combat damage step is in.
    pub pass: DamagePass,
}

impl CombatState {
    /// Blockers of an attacker, in block order.
    #[must_use]
    pub fn blockers_of(&self, attacker: EntityId) -> Vec<EntityId> {
        self.blocks
            .iter()
            .filter(|(_, a)| *a == attacker)
            .map(|(b, _)| *b)
            .collect()
    }
}
