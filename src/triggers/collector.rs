//! Turning events into triggered abilities on the stack.
//!
//! `collect` scans queued events for permanents (or, for deaths, the dead
//! card) with effects at the event's slot and queues a `PendingTrigger`
//! per matching object. `flush` puts queued triggers on the stack in APNAP
//! order: the active player's first, so the others' resolve first.
//! A trigger that needs a target pauses on `ChooseTarget`; one with no
//! legal target is removed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cards::CardDefinition;
use crate::core::{EntityId, MatchState, PendingInteraction, PlayerId, Result, RulesError};
use crate::effects::{Effect, EffectSlot, FilterContext, Target, TargetFilter};
use crate::stack::{StackEntry, StackEntryKind};
use crate::turn;

use super::event::GameEvent;

/// A triggered ability waiting to be put on the stack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingTrigger {
    pub source: EntityId,
    pub source_name: String,
    pub controller: PlayerId,
    pub slot: EffectSlot,
    pub effects: Vec<Effect>,
    pub target_filter: Option<TargetFilter>,
}

impl PendingTrigger {
    fn from_definition(source: EntityId, controller: PlayerId, definition: &CardDefinition, slot: EffectSlot) -> Option<Self> {
        let effects: Vec<Effect> = definition.effects_for(slot).cloned().collect();
        if effects.is_empty() {
            return None;
        }
        let target_filter = if effects.iter().any(Effect::uses_target) {
            Some(definition.target_for(slot).cloned().unwrap_or_else(TargetFilter::creature_or_player))
        } else {
            None
        };
        Some(Self {
            source,
            source_name: definition.name.clone(),
            controller,
            slot,
            effects,
            target_filter,
        })
    }

    /// The stack entry for this trigger.
    #[must_use]
    pub fn into_entry(self, target: Option<Target>) -> StackEntry {
        let description = format!("{} trigger ({:?})", self.source_name, self.slot);
        let mut entry = StackEntry::new(StackEntryKind::TriggeredAbility, self.source, self.controller, description)
            .with_effects(self.effects);
        if let (Some(target), Some(filter)) = (target, self.target_filter) {
            entry = entry.with_target(target, filter);
        }
        entry
    }
}

/// Queue triggers for every event emitted since the last call.
pub fn collect(state: &mut MatchState) {
    let events = std::mem::take(&mut state.events);
    let mut found = Vec::new();

    for event in &events {
        let slot = event.slot();
        match event {
            GameEvent::EnteredBattlefield { permanent: id }
            | GameEvent::Attacked { attacker: id }
            | GameEvent::Blocked { blocker: id, .. } => {
                if let Some(perm) = state.permanent(*id) {
                    found.extend(PendingTrigger::from_definition(*id, perm.controller, perm.definition(), slot));
                }
            }
            GameEvent::Died { card, controller } => {
                let dead = state
                    .players
                    .iter()
                    .flat_map(|(_, board)| board.graveyard.iter())
                    .find(|c| c.id == *card);
                if let Some(dead) = dead {
                    found.extend(PendingTrigger::from_definition(*card, *controller, &dead.definition, slot));
                }
            }
            GameEvent::UpkeepBegan { player } | GameEvent::EndStepBegan { player } => {
                for perm in state.permanents().filter(|p| p.controller == *player) {
                    found.extend(PendingTrigger::from_definition(perm.id(), perm.controller, perm.definition(), slot));
                }
            }
            GameEvent::SpellCast { .. } => {
                for perm in state.permanents() {
                    found.extend(PendingTrigger::from_definition(perm.id(), perm.controller, perm.definition(), slot));
                }
            }
        }
    }

    if found.is_empty() {
        return;
    }
    debug!(match_id = %state.id, count = found.len(), "triggers collected");
    state.pending_triggers.extend(found);
    order_apnap(state);
}

/// Stable sort of queued triggers by seat distance from the active player.
fn order_apnap(state: &mut MatchState) {
    let count = state.player_count();
    let active = state.active_player.index();
    state
        .pending_triggers
        .sort_by_key(|t| (t.controller.index() + count - active) % count);
}

/// Put queued triggers on the stack until done or a target choice is needed.
pub fn flush(state: &mut MatchState) {
    while state.pending_interaction.is_none() && !state.pending_triggers.is_empty() {
        let trigger = state.pending_triggers.remove(0);

        if !state.is_in_match(trigger.controller) {
            continue;
        }

        let Some(filter) = trigger.target_filter.clone() else {
            push(state, trigger, None);
            continue;
        };

        let legal_targets = {
            let ctx = FilterContext::new(state, trigger.controller).with_source(trigger.source);
            filter.legal_targets(&ctx)
        };
        if legal_targets.is_empty() {
            state.log(format!("{} trigger has no legal target and is removed", trigger.source_name));
            continue;
        }

        state.pending_interaction = Some(PendingInteraction::ChooseTarget {
            player: trigger.controller,
            trigger,
            legal_targets,
        });
    }
}

/// Put one trigger on the stack with its chosen target.
pub fn push(state: &mut MatchState, trigger: PendingTrigger, target: Option<Target>) {
    let name = trigger.source_name.clone();
    let id = state.stack.push(trigger.into_entry(target));
    debug!(match_id = %state.id, entry = %id, source = %name, "trigger put on the stack");
    state.log(format!("{name} trigger goes on the stack"));
}

/// Answer a `ChooseTarget` prompt, then keep stacking queued triggers.
pub fn choose_target(state: &mut MatchState, player: PlayerId, target: Target) -> Result<()> {
    state.ensure_running()?;
    let (trigger, legal_targets) = match state.pending_interaction.take() {
        Some(PendingInteraction::ChooseTarget { player: p, trigger, legal_targets }) if p == player => {
            (trigger, legal_targets)
        }
        other => {
            state.pending_interaction = other;
            return Err(RulesError::illegal(format!("{player} has no target to choose")));
        }
    };

    if !legal_targets.contains(&target) {
        let reason = format!("{target} is not a legal target for the {} trigger", trigger.source_name);
        state.pending_interaction = Some(PendingInteraction::ChooseTarget {
            player,
            trigger,
            legal_targets,
        });
        return Err(RulesError::IllegalTarget(reason));
    }

    push(state, trigger, Some(target));
    turn::settle(state);
    Ok(())
}
