//! Game events that fire triggered abilities.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};
use crate::effects::EffectSlot;

/// Something that happened during the match.
///
/// Events are appended to `MatchState::events` as they happen and drained
/// by the trigger collector at the next point a player would receive
/// priority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A permanent entered the battlefield.
    EnteredBattlefield { permanent: EntityId },

    /// A creature was put into a graveyard from the battlefield.
    /// The card keeps its entity id in the graveyard.
    Died { card: EntityId, controller: PlayerId },

    /// A creature was declared as an attacker.
    Attacked { attacker: EntityId },

    /// A creature was declared as a blocker.
    Blocked { blocker: EntityId, attacker: EntityId },

    /// The active player's upkeep began.
    UpkeepBegan { player: PlayerId },

    /// The active player's end step began.
    EndStepBegan { player: PlayerId },

    /// A spell was cast.
    SpellCast { caster: PlayerId, card: EntityId },
}

impl GameEvent {
    /// Effect slot this event fires.
    #[must_use]
    pub const fn slot(&self) -> EffectSlot {
        match self {
            GameEvent::EnteredBattlefield { .. } => EffectSlot::OnEnterBattlefield,
            GameEvent::Died { .. } => EffectSlot::OnDeath,
            GameEvent::Attacked { .. } => EffectSlot::OnAttack,
            GameEvent::Blocked { .. } => EffectSlot::OnBlock,
            GameEvent::UpkeepBegan { .. } => EffectSlot::UpkeepTriggered,
            GameEvent::EndStepBegan { .. } => EffectSlot::EndStepTriggered,
            GameEvent::SpellCast { .. } => EffectSlot::OnAnyPlayerCastsSpell,
        }
    }
}

impl std::fmt::Display for GameEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameEvent::EnteredBattlefield { permanent } => write!(f, "{permanent} entered the battlefield"),
            GameEvent::Died { card, .. } => write!(f, "{card} died"),
            GameEvent::Attacked { attacker } => write!(f, "{attacker} attacked"),
            GameEvent::Blocked { blocker, attacker } => write!(f, "{blocker} blocked {attacker}"),
            GameEvent::UpkeepBegan { player } => write!(f, "{player}'s upkeep began"),
            GameEvent::EndStepBegan { player } => write!(f, "{player}'s end step began"),
            GameEvent::SpellCast { caster, card } => write!(f, "{caster} cast {card}"),
        }
    }
}
