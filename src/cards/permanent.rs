//! Permanents - cards on the battlefield with their runtime status.
//!
//! A `Permanent` owns its `CardInstance` while on the battlefield. Effective
//! characteristics that depend on other permanents (anthems, auras) are
//! computed by `MatchState`; this type only knows its own printed values
//! and its until-end-of-turn modifiers.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::definition::{CardDefinition, Keyword};
use super::instance::CardInstance;
use crate::core::{EntityId, PlayerId};

/// A card on the battlefield.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Permanent {
    pub card: CardInstance,

    /// Player who controls it.
    pub controller: PlayerId,

    // === Status ===
    pub tapped: bool,
    /// Entered since its controller's most recent untap step.
    pub summoning_sick: bool,

    // === Combat ===
    pub attacking: bool,
    pub blocking: bool,
    /// Attackers this permanent blocks.
    pub blocking_targets: SmallVec<[EntityId; 2]>,
    /// Attacker was blocked this combat (stays blocked if its blockers leave).
    pub was_blocked: bool,

    // === Damage and modifiers (cleared during cleanup) ===
    pub marked_damage: i32,
    /// Marked damage includes damage from a source with deathtouch.
    pub deathtouch_damage: bool,
    pub power_modifier: i32,
    pub toughness_modifier: i32,
    pub granted_keywords: SmallVec<[Keyword; 2]>,

    /// Permanent this one is attached to (auras). Resolved by lookup.
    pub attached_to: Option<EntityId>,

    /// Activations this turn, indexed like the definition's abilities.
    pub activations_this_turn: SmallVec<[u32; 2]>,
}

impl Permanent {
    /// Put a card onto the battlefield under `controller`.
    ///
    /// Creatures enter summoning sick.
    #[must_use]
    pub fn new(card: CardInstance, controller: PlayerId) -> Self {
        let ability_count = card.definition.abilities.len();
        Self {
            card,
            controller,
            tapped: false,
            summoning_sick: true,
            attacking: false,
            blocking: false,
            blocking_targets: SmallVec::new(),
            was_blocked: false,
            marked_damage: 0,
            deathtouch_damage: false,
            power_modifier: 0,
            toughness_modifier: 0,
            granted_keywords: SmallVec::new(),
            attached_to: None,
            activations_this_turn: SmallVec::from_elem(0, ability_count),
        }
    }

    #[must_use]
    pub fn id(&self) -> EntityId {
        self.card.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.card.name()
    }

    #[must_use]
    pub fn owner(&self) -> PlayerId {
        self.card.owner
    }

    #[must_use]
    pub fn definition(&self) -> &CardDefinition {
        &self.card.definition
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.card.definition.is_creature()
    }

    /// Printed power plus until-end-of-turn modifiers.
    #[must_use]
    pub fn base_power(&self) -> i32 {
        self.card.definition.power.unwrap_or(0) + self.power_modifier
    }

    /// Printed toughness plus until-end-of-turn modifiers.
    #[must_use]
    pub fn base_toughness(&self) -> i32 {
        self.card.definition.toughness.unwrap_or(0) + self.toughness_modifier
    }

    /// Printed or granted keyword; ignores static effects of other permanents.
    #[must_use]
    pub fn has_own_keyword(&self, keyword: Keyword) -> bool {
        self.card.definition.has_keyword(keyword) || self.granted_keywords.contains(&keyword)
    }

    /// Activations of one ability this turn.
    #[must_use]
    pub fn activations(&self, index: usize) -> u32 {
        self.activations_this_turn.get(index).copied().unwrap_or(0)
    }

    /// Count one activation of an ability.
    pub fn record_activation(&mut self, index: usize) {
        if self.activations_this_turn.len() <= index {
            self.activations_this_turn.resize(index + 1, 0);
        }
        self.activations_this_turn[index] += 1;
    }

    /// Remove attacking/blocking status.
    pub fn clear_combat(&mut self) {
        self.attacking = false;
        self.blocking = false;
        self.blocking_targets.clear();
        self.was_blocked = false;
    }

    /// Cleanup: remove damage, until-end-of-turn effects and activation counts.
    pub fn reset_end_of_turn(&mut self) {
        self.marked_damage = 0;
        self.deathtouch_damage = false;
        self.power_modifier = 0;
        self.toughness_modifier = 0;
        self.granted_keywords.clear();
        for count in &mut self.activations_this_turn {
            *count = 0;
        }
    }
}

impl std::fmt::Display for Permanent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.card)?;
        if self.tapped {
            write!(f, " [tapped]")?;
        }
        Ok(())
    }
}
