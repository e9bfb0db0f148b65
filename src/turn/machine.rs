//! The turn/step state machine.
//!
//! `enter` runs a step's entry actions and either grants priority, pauses
//! on a `PendingInteraction`, or moves straight on (untap, cleanup, and
//! combat steps skipped when nobody attacks). `advance` is called when all
//! players pass with an empty stack. Mana pools empty on every step change.

use tracing::info;

use crate::combat;
use crate::core::{EntityId, MatchState, MatchStatus, PendingInteraction, PlayerId, Result, RulesError};
use crate::rules::state_based;
use crate::triggers::{self, GameEvent};

use super::step::Step;

/// What happens after a step's entry actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StepFlow {
    /// The active player receives priority.
    Priority,
    /// A `PendingInteraction` was raised.
    Paused,
    /// No priority in this step: move to the next one.
    Continue,
    /// Jump forward to a later step of the same turn.
    SkipTo(Step),
}

/// Begin turn 1 with the starting player active.
pub fn start_first_turn(state: &mut MatchState) {
    state.status = MatchStatus::Running;
    state.turn_number = 1;
    state.active_player = state.starting_player;
    info!(match_id = %state.id, player = %state.active_player, "match started");
    state.log(format!("Turn 1: {}", state.active_player));
    enter(state, Step::Untap);
}

/// Leave the current step for the next one.
pub fn advance(state: &mut MatchState) {
    let next = following(state);
    enter(state, next);
}

/// Enter `step` and keep going until a player must act.
pub fn enter(state: &mut MatchState, step: Step) {
    let mut step = step;
    loop {
        if state.status != MatchStatus::Running {
            return;
        }
        state.drain_mana_pools();
        state.step = step;
        state.stack.clear_priority();
        state.stack.clear_passes();
        info!(match_id = %state.id, turn = state.turn_number, %step, "step");

        match on_enter(state) {
            StepFlow::Priority => {
                let active = state.active_player;
                state.stack.set_priority(active);
                settle(state);
                return;
            }
            StepFlow::Paused => return,
            StepFlow::Continue => step = following(state),
            StepFlow::SkipTo(target) => step = target,
        }
    }
}

/// The step after the current one; leaving cleanup starts the next turn.
fn following(state: &mut MatchState) -> Step {
    if state.step == Step::Cleanup {
        let next = state.next_in_match(state.active_player);
        state.active_player = next;
        state.turn_number += 1;
        state.log(format!("Turn {}: {next}", state.turn_number));
        info!(match_id = %state.id, turn = state.turn_number, player = %next, "turn begins");
    }
    state.step.next()
}

fn on_enter(state: &mut MatchState) -> StepFlow {
    let active = state.active_player;
    match state.step {
        Step::Untap => {
            let board = &mut state.players[active];
            board.lands_played_this_turn = 0;
            for perm in &mut board.battlefield {
                perm.tapped = false;
                perm.summoning_sick = false;
            }
            StepFlow::Continue
        }
        Step::Upkeep => {
            state.emit(GameEvent::UpkeepBegan { player: active });
            StepFlow::Priority
        }
        Step::Draw => {
            if !(state.turn_number == 1 && state.config.skip_first_draw) {
                state.draw_cards(active, 1);
            }
            StepFlow::Priority
        }
        Step::PrecombatMain | Step::PostcombatMain => StepFlow::Priority,
        Step::BeginningOfCombat => {
            state.combat = combat::CombatState::default();
            StepFlow::Priority
        }
        Step::DeclareAttackers => {
            let candidates = combat::attack_candidates(state, active);
            if candidates.is_empty() {
                return StepFlow::SkipTo(Step::EndOfCombat);
            }
            state.pending_interaction = Some(PendingInteraction::DeclareAttackers {
                player: active,
                candidates,
            });
            StepFlow::Paused
        }
        Step::DeclareBlockers => {
            let defender = state.combat.defending_player.unwrap_or_else(|| state.defending_player());
            let candidates = combat::block_candidates(state, defender);
            if candidates.is_empty() {
                return StepFlow::Priority;
            }
            state.pending_interaction = Some(PendingInteraction::DeclareBlockers {
                player: defender,
                candidates,
            });
            StepFlow::Paused
        }
        Step::CombatDamage => {
            if combat::begin_damage(state) {
                StepFlow::Paused
            } else {
                StepFlow::Priority
            }
        }
        Step::EndOfCombat => {
            for (_, board) in state.players.iter_mut() {
                for perm in &mut board.battlefield {
                    perm.clear_combat();
                }
            }
            state.combat = combat::CombatState::default();
            StepFlow::Priority
        }
        Step::EndStep => {
            state.emit(GameEvent::EndStepBegan { player: active });
            StepFlow::Priority
        }
        Step::Cleanup => {
            let excess = state.players[active].hand.len().saturating_sub(state.config.max_hand_size);
            if excess > 0 {
                state.pending_interaction = Some(PendingInteraction::CleanupDiscard {
                    player: active,
                    count: excess,
                });
                return StepFlow::Paused;
            }
            finish_cleanup(state);
            StepFlow::Continue
        }
    }
}

/// Remove damage and until-end-of-turn effects from every permanent.
fn finish_cleanup(state: &mut MatchState) {
    for (_, board) in state.players.iter_mut() {
        for perm in &mut board.battlefield {
            perm.reset_end_of_turn();
        }
    }
}

/// Run state-based actions, then put waiting triggers on the stack.
///
/// Called after every accepted action and before anyone receives priority.
pub fn settle(state: &mut MatchState) {
    state_based::check(state);
    if state.status == MatchStatus::Finished {
        return;
    }

    triggers::collect(state);
    if state.pending_interaction.is_none() {
        triggers::flush(state);
    }

    if let Some(holder) = state.stack.priority_player() {
        if !state.is_in_match(holder) {
            let next = state.next_in_match(holder);
            state.stack.set_priority(next);
        }
    }
}

// === Interaction Responses ===

/// The active player's attack declaration.
pub fn declare_attackers(state: &mut MatchState, player: PlayerId, attackers: &[EntityId]) -> Result<()> {
    state.ensure_running()?;
    if combat::declare_attackers(state, player, attackers)? {
        let active = state.active_player;
        state.stack.set_priority(active);
        settle(state);
    } else {
        state.log(format!("{player} does not attack"));
        enter(state, Step::EndOfCombat);
    }
    Ok(())
}

/// The defending player's block declaration.
pub fn declare_blockers(state: &mut MatchState, player: PlayerId, blocks: &[(EntityId, EntityId)]) -> Result<()> {
    state.ensure_running()?;
    combat::declare_blockers(state, player, blocks)?;
    let active = state.active_player;
    state.stack.set_priority(active);
    settle(state);
    Ok(())
}

/// One attacker's damage assignment.
pub fn assign_combat_damage(
    state: &mut MatchState,
    player: PlayerId,
    attacker: EntityId,
    assignment: combat::DamageAssignment,
) -> Result<()> {
    state.ensure_running()?;
    if combat::submit_damage(state, player, attacker, assignment)? {
        let active = state.active_player;
        state.stack.set_priority(active);
        settle(state);
    }
    Ok(())
}

/// Discard down to the maximum hand size, finishing cleanup.
pub fn discard(state: &mut MatchState, player: PlayerId, cards: &[EntityId]) -> Result<()> {
    state.ensure_running()?;
    let count = match &state.pending_interaction {
        Some(PendingInteraction::CleanupDiscard { player: p, count }) if *p == player => *count,
        _ => return Err(RulesError::illegal(format!("{player} has no discard pending"))),
    };
    if cards.len() != count {
        return Err(RulesError::illegal(format!("discard exactly {count} card(s), got {}", cards.len())));
    }
    validate_hand_selection(state, player, cards)?;

    state.pending_interaction = None;
    for card in cards {
        if let Some(instance) = state.players[player].take_from_hand(*card) {
            state.log(format!("{player} discards {}", instance.name()));
            state.put_into_graveyard(instance);
        }
    }
    finish_cleanup(state);
    advance(state);
    Ok(())
}

/// Every card is in `player`'s hand, each named once.
pub(crate) fn validate_hand_selection(state: &MatchState, player: PlayerId, cards: &[EntityId]) -> Result<()> {
    let board = state.board(player)?;
    for (index, card) in cards.iter().enumerate() {
        if cards[..index].contains(card) {
            return Err(RulesError::illegal(format!("{card} is chosen twice")));
        }
        if board.hand_card(*card).is_none() {
            return Err(RulesError::illegal(format!("{card} is not in {player}'s hand")));
        }
    }
    Ok(())
}
