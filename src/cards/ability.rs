//! Activated abilities.

use serde::{Deserialize, Serialize};

use crate::effects::{Effect, EffectSlot, TargetFilter};
use crate::mana::{ManaColor, ManaCost};

/// When an ability may be activated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityTiming {
    /// Any time its controller holds priority.
    InstantSpeed,
    /// Only in its controller's main step with an empty stack.
    SorcerySpeed,
}

/// An ability a permanent's controller can activate by paying its cost.
///
/// ```
/// use rust_tcg::cards::ActivatedAbility;
/// use rust_tcg::mana::ManaColor;
///
/// let tap_for_green = ActivatedAbility::mana(ManaColor::Green);
/// assert!(tap_for_green.is_mana_ability());
/// assert!(tap_for_green.requires_tap);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivatedAbility {
    /// Rules text, for logs and views.
    pub description: String,

    // === Cost ===
    /// Mana component of the cost.
    pub mana_cost: Option<ManaCost>,
    /// `{T}` is part of the cost.
    pub requires_tap: bool,
    /// Sacrificing the source is part of the cost.
    pub sacrifice_self: bool,

    // === Effect ===
    pub effects: Vec<Effect>,
    /// Target requirement, if the ability targets.
    pub target: Option<TargetFilter>,

    // === Restrictions ===
    /// Maximum activations per turn.
    pub max_per_turn: Option<u32>,
    pub timing: AbilityTiming,
}

impl ActivatedAbility {
    /// Create an instant-speed ability with no cost.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            mana_cost: None,
            requires_tap: false,
            sacrifice_self: false,
            effects: Vec::new(),
            target: None,
            max_per_turn: None,
            timing: AbilityTiming::InstantSpeed,
        }
    }

    /// `{T}: Add one mana of a color.`
    #[must_use]
    pub fn mana(color: ManaColor) -> Self {
        Self::new(format!("{{T}}: Add {{{}}}.", color.symbol()))
            .with_tap()
            .with_effect(Effect::AddMana { color, amount: 1 })
    }

    /// Set the mana cost (builder pattern).
    #[must_use]
    pub fn with_mana_cost(mut self, cost: ManaCost) -> Self {
        self.mana_cost = Some(cost);
        self
    }

    /// Add `{T}` to the cost (builder pattern).
    #[must_use]
    pub fn with_tap(mut self) -> Self {
        self.requires_tap = true;
        self
    }

    /// Add "sacrifice this" to the cost (builder pattern).
    #[must_use]
    pub fn with_sacrifice(mut self) -> Self {
        self.sacrifice_self = true;
        self
    }

    /// Add an effect (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Set the target requirement (builder pattern).
    #[must_use]
    pub fn with_target(mut self, filter: TargetFilter) -> Self {
        self.target = Some(filter);
        self
    }

    /// Limit activations per turn (builder pattern).
    #[must_use]
    pub fn with_max_per_turn(mut self, max: u32) -> Self {
        self.max_per_turn = Some(max);
        self
    }

    /// Restrict to sorcery timing (builder pattern).
    #[must_use]
    pub fn sorcery_speed(mut self) -> Self {
        self.timing = AbilityTiming::SorcerySpeed;
        self
    }

    /// Mana abilities only add mana and never target; they resolve
    /// immediately instead of using the stack.
    #[must_use]
    pub fn is_mana_ability(&self) -> bool {
        self.target.is_none()
            && !self.effects.is_empty()
            && self.effects.iter().all(|e| matches!(e, Effect::AddMana { .. }))
    }

    /// The slot this ability is reported under.
    #[must_use]
    pub fn slot(&self) -> EffectSlot {
        if self.is_mana_ability() {
            EffectSlot::ManaActivatedAbility
        } else {
            EffectSlot::TapActivatedAbility
        }
    }
}
