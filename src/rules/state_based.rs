//! State-based actions.
//!
//! Checked after every accepted action and every resolution, before any
//! player receives priority. Repeats until nothing changes:
//!
//! - a creature with toughness 0 or less, lethal marked damage, or any
//!   damage from a deathtouch source is destroyed
//! - an aura attached to nothing is put into its owner's graveyard
//! - a player at 0 or less life, or who drew from an empty library, loses
//!
//! When at most one player is left the match is finished.

use tracing::info;

use crate::core::{EntityId, MatchState, MatchStatus, PlayerId};

use super::engine::GameResult;

/// Apply state-based actions until the state is stable.
pub fn check(state: &mut MatchState) {
    if state.status != MatchStatus::Running {
        return;
    }
    loop {
        let mut changed = destroy_lethal(state);
        changed |= remove_orphaned_auras(state);
        changed |= apply_losses(state);
        if !changed {
            break;
        }
    }
    finish_if_decided(state);
}

fn destroy_lethal(state: &mut MatchState) -> bool {
    let doomed: Vec<EntityId> = state
        .permanents()
        .filter(|p| p.is_creature())
        .filter(|p| {
            let toughness = state.effective_toughness(p);
            toughness <= 0 || p.marked_damage >= toughness || (p.deathtouch_damage && p.marked_damage > 0)
        })
        .map(|p| p.id())
        .collect();

    for id in &doomed {
        state.destroy(*id);
    }
    !doomed.is_empty()
}

fn remove_orphaned_auras(state: &mut MatchState) -> bool {
    let orphans: Vec<EntityId> = state
        .permanents()
        .filter(|p| p.definition().is_aura())
        .filter(|p| p.attached_to.map_or(true, |host| state.permanent(host).is_none()))
        .map(|p| p.id())
        .collect();

    for id in &orphans {
        state.destroy(*id);
    }
    !orphans.is_empty()
}

fn apply_losses(state: &mut MatchState) -> bool {
    let losers: Vec<PlayerId> = state
        .players
        .iter()
        .filter(|(_, board)| !board.has_lost && (board.life <= 0 || board.drew_from_empty_library))
        .map(|(player, _)| player)
        .collect();

    for player in &losers {
        let board = &mut state.players[*player];
        board.has_lost = true;
        let reason = if board.life <= 0 { "life total" } else { "empty library" };
        info!(match_id = %state.id, player = %player, reason, "player lost");
        state.log(format!("{player} loses ({reason})"));
        eliminate(state, *player);
    }
    !losers.is_empty()
}

/// Remove a player who lost: their permanents and stack entries leave the
/// game, and any decision they owed is dropped.
fn eliminate(state: &mut MatchState, player: PlayerId) {
    let board = &mut state.players[player];
    let permanents = std::mem::take(&mut board.battlefield);
    for permanent in permanents {
        state.put_into_graveyard(permanent.card);
    }

    let entries: Vec<_> = state
        .stack
        .entries()
        .iter()
        .filter(|e| e.controller == player)
        .map(|e| e.id)
        .collect();
    for id in entries {
        if let Some(card) = state.stack.remove(id).and_then(|e| e.card) {
            state.put_into_graveyard(card);
        }
    }

    state.pending_triggers.retain(|t| t.controller != player);
    state.combat.awaiting.retain(|ctx| ctx.controller != player);

    if state.pending_interaction.as_ref().is_some_and(|p| p.player() == player) {
        state.pending_interaction = None;
        if state.stack.priority_player().is_none() {
            let next = state.next_in_match(state.active_player);
            state.stack.set_priority(next);
        }
    }
}

fn finish_if_decided(state: &mut MatchState) {
    let living = state.players_in_match();
    if living.len() > 1 {
        return;
    }
    let result = match living.first() {
        Some(winner) => GameResult::Winner(*winner),
        None => GameResult::Draw,
    };
    info!(match_id = %state.id, result = ?result, "match finished");
    state.log(format!("Match over: {result}"));
    state.status = MatchStatus::Finished;
    state.result = Some(result);
    state.pending_interaction = None;
    state.pending_triggers.clear();
    state.stack.clear_priority();
}
