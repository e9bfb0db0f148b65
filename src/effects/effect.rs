//! Effect definitions.
//!
//! Every card ability is an ordered list of `Effect` values attached to a
//! slot. One enum covers the whole catalogue; `EffectResolver::apply` is
//! the single place that gives each variant its meaning.

use serde::{Deserialize, Serialize};

use super::targeting::TargetFilter;
use crate::cards::Keyword;
use crate::mana::ManaColor;

/// Who or what an effect acts on, resolved against the stack entry that
/// carries it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recipient {
    /// The entry's chosen target.
    Target,
    /// The permanent the ability comes from.
    Source,
    /// The entry's controller.
    Controller,
    /// Every opponent of the controller still in the match.
    EachOpponent,
}

/// An atomic game effect.
///
/// ## Player effects
///
/// `DealDamage`, `DealXDamage`, `GainLife`, `LoseLife`, `DrawCards`, `AddMana`
///
/// ## Permanent effects
///
/// `Destroy`, `Sacrifice`, `Boost`, `GrantKeyword`, `Tap`, `Untap`,
/// `ReturnToHand`, `CreateToken`
///
/// ## Stack effects
///
/// `CounterSpell`
///
/// ## Static effects (read while the source is on the battlefield)
///
/// `StaticBoost`, `BoostAttached`, `GrantKeywordAttached`
///
/// ## Composite
///
/// `May` asks the controller before applying the wrapped effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    // === Damage and life ===
    DealDamage {
        amount: i32,
        recipient: Recipient,
    },

    /// Damage equal to the X paid for the entry.
    DealXDamage {
        recipient: Recipient,
    },

    GainLife {
        amount: i64,
        recipient: Recipient,
    },

    LoseLife {
        amount: i64,
        recipient: Recipient,
    },

    // === Cards and mana ===
    DrawCards {
        count: u32,
        recipient: Recipient,
    },

    /// Add mana to the controller's pool.
    AddMana {
        color: ManaColor,
        amount: u32,
    },

    // === Permanents ===
    Destroy {
        recipient: Recipient,
    },

    Sacrifice {
        recipient: Recipient,
    },

    /// +power/+toughness until end of turn.
    Boost {
        power: i32,
        toughness: i32,
        recipient: Recipient,
    },

    /// Keyword until end of turn.
    GrantKeyword {
        keyword: Keyword,
        recipient: Recipient,
    },

    Tap {
        recipient: Recipient,
    },

    Untap {
        recipient: Recipient,
    },

    /// Return to its owner's hand.
    ReturnToHand {
        recipient: Recipient,
    },

    /// Create creature tokens under the controller's control.
    CreateToken {
        name: String,
        power: i32,
        toughness: i32,
        keywords: Vec<Keyword>,
        count: u32,
    },

    // === Stack ===
    /// Counter the targeted stack entry.
    CounterSpell,

    // === Static ===
    /// Permanents passing `filter` (from the source controller's point of
    /// view) get +power/+toughness.
    StaticBoost {
        filter: TargetFilter,
        power: i32,
        toughness: i32,
    },

    /// The permanent the source is attached to gets +power/+toughness.
    BoostAttached {
        power: i32,
        toughness: i32,
    },

    /// The permanent the source is attached to has a keyword.
    GrantKeywordAttached {
        keyword: Keyword,
    },

    // === Composite ===
    /// "You may ..." - the controller answers yes or no at resolution.
    May {
        prompt: String,
        effect: Box<Effect>,
    },
}

impl Effect {
    // === Convenience Constructors ===

    #[must_use]
    pub fn deal_damage(amount: i32, recipient: Recipient) -> Self {
        Effect::DealDamage { amount, recipient }
    }

    #[must_use]
    pub fn gain_life(amount: i64) -> Self {
        Effect::GainLife {
            amount,
            recipient: Recipient::Controller,
        }
    }

    #[must_use]
    pub fn draw(count: u32) -> Self {
        Effect::DrawCards {
            count,
            recipient: Recipient::Controller,
        }
    }

    #[must_use]
    pub fn boost(power: i32, toughness: i32, recipient: Recipient) -> Self {
        Effect::Boost {
            power,
            toughness,
            recipient,
        }
    }

    #[must_use]
    pub fn may(prompt: impl Into<String>, effect: Effect) -> Self {
        Effect::May {
            prompt: prompt.into(),
            effect: Box::new(effect),
        }
    }

    /// Anthem: permanents passing `filter` get +power/+toughness.
    #[must_use]
    pub fn anthem(filter: TargetFilter, power: i32, toughness: i32) -> Self {
        Effect::StaticBoost {
            filter,
            power,
            toughness,
        }
    }

    // === Classification ===

    /// Effects that are read continuously instead of applied once.
    #[must_use]
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            Effect::StaticBoost { .. } | Effect::BoostAttached { .. } | Effect::GrantKeywordAttached { .. }
        )
    }

    /// Whether applying this effect reads the entry's chosen target.
    #[must_use]
    pub fn uses_target(&self) -> bool {
        match self {
            Effect::CounterSpell => true,
            Effect::May { effect, .. } => effect.uses_target(),
            Effect::DealDamage { recipient, .. }
            | Effect::DealXDamage { recipient }
            | Effect::GainLife { recipient, .. }
            | Effect::LoseLife { recipient, .. }
            | Effect::DrawCards { recipient, .. }
            | Effect::Destroy { recipient }
            | Effect::Sacrifice { recipient }
            | Effect::Boost { recipient, .. }
            | Effect::GrantKeyword { recipient, .. }
            | Effect::Tap { recipient }
            | Effect::Untap { recipient }
            | Effect::ReturnToHand { recipient } => *recipient == Recipient::Target,
            _ => false,
        }
    }
}
