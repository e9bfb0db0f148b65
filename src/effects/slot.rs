//! Hook points at which card definitions declare effects.

use serde::{Deserialize, Serialize};

/// Named hook point on a card definition.
///
/// Triggered slots are filled by the trigger collector when the matching
/// `GameEvent` fires; `Spell` effects run when the card resolves from the
/// stack; `Static` effects are read on demand when characteristics are
/// computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectSlot {
    /// Runs when the card resolves as a spell.
    Spell,
    /// Continuous effect while on the battlefield.
    Static,
    OnEnterBattlefield,
    OnDeath,
    OnAttack,
    OnBlock,
    /// Reported slot of non-mana activated abilities.
    TapActivatedAbility,
    /// Reported slot of mana abilities.
    ManaActivatedAbility,
    /// Beginning of its controller's upkeep.
    UpkeepTriggered,
    /// Beginning of its controller's end step.
    EndStepTriggered,
    /// Whenever any player casts a spell.
    OnAnyPlayerCastsSpell,
}

impl EffectSlot {
    /// Slots whose effects become triggered abilities.
    #[must_use]
    pub const fn is_triggered(self) -> bool {
        matches!(
            self,
            EffectSlot::OnEnterBattlefield
                | EffectSlot::OnDeath
                | EffectSlot::OnAttack
                | EffectSlot::OnBlock
                | EffectSlot::UpkeepTriggered
                | EffectSlot::EndStepTriggered
                | EffectSlot::OnAnyPlayerCastsSpell
        )
    }
}
