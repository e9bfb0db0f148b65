//! Opening hands and the mulligan procedure.
//!
//! Players decide in turn order starting with the starting player. A
//! mulligan shuffles the hand back and draws a fresh one; on keeping, a
//! player who took `n` mulligans puts `n` cards from hand on the bottom of
//! the library. Once everyone has kept, turn 1 begins.

use tracing::info;

use crate::core::{EntityId, MatchState, MatchStatus, PendingInteraction, PlayerId, Result, RulesError};

use super::machine::{start_first_turn, validate_hand_selection};

/// Shuffle every library, draw opening hands, and ask the starting player.
pub fn deal_opening_hands(state: &mut MatchState) {
    let hand_size = state.config.opening_hand_size as u32;
    let players: Vec<PlayerId> = state.players.player_ids().collect();
    for player in players {
        shuffle_library(state, player);
        state.draw_cards(player, hand_size);
    }
    state.status = MatchStatus::Mulligan;
    state.pending_interaction = Some(PendingInteraction::MulliganDecision {
        player: state.starting_player,
    });
    info!(match_id = %state.id, starting = %state.starting_player, "opening hands dealt");
}

/// Keep the current hand.
pub fn keep_hand(state: &mut MatchState, player: PlayerId) -> Result<()> {
    expect_decision(state, player)?;
    let mulligans = state.players[player].mulligans as usize;
    state.log(format!("{player} keeps {} card(s)", state.players[player].hand.len()));

    if mulligans > 0 {
        let count = mulligans.min(state.players[player].hand.len());
        if count > 0 {
            state.pending_interaction = Some(PendingInteraction::BottomCards { player, count });
            return Ok(());
        }
    }
    state.players[player].kept_hand = true;
    next_decision(state);
    Ok(())
}

/// Shuffle the hand away and draw a new one.
pub fn mulligan(state: &mut MatchState, player: PlayerId) -> Result<()> {
    expect_decision(state, player)?;
    let max = state.config.max_mulligans;
    if state.players[player].mulligans >= max {
        return Err(RulesError::illegal(format!("{player} has already taken {max} mulligan(s)")));
    }

    let board = &mut state.players[player];
    let hand = std::mem::take(&mut board.hand);
    board.library.extend(hand);
    board.mulligans += 1;
    let taken = board.mulligans;

    shuffle_library(state, player);
    state.draw_cards(player, state.config.opening_hand_size as u32);
    state.log(format!("{player} mulligans ({taken})"));
    info!(match_id = %state.id, %player, mulligans = taken, "mulligan");
    Ok(())
}

/// Put the chosen cards on the bottom of the library after keeping.
pub fn bottom_cards(state: &mut MatchState, player: PlayerId, cards: &[EntityId]) -> Result<()> {
    let count = match &state.pending_interaction {
        Some(PendingInteraction::BottomCards { player: p, count }) if *p == player => *count,
        _ => return Err(RulesError::illegal(format!("{player} has no cards to put on the bottom"))),
    };
    if cards.len() != count {
        return Err(RulesError::illegal(format!(
            "put exactly {count} card(s) on the bottom, got {}",
            cards.len()
        )));
    }
    validate_hand_selection(state, player, cards)?;

    for card in cards {
        let board = &mut state.players[player];
        if let Some(instance) = board.take_from_hand(*card) {
            // The library's top is its last element.
            board.library.insert(0, instance);
        }
    }
    state.players[player].kept_hand = true;
    state.log(format!("{player} puts {count} card(s) on the bottom"));
    next_decision(state);
    Ok(())
}

fn expect_decision(state: &MatchState, player: PlayerId) -> Result<()> {
    if state.status != MatchStatus::Mulligan {
        return Err(RulesError::illegal("no mulligan decisions are pending"));
    }
    match &state.pending_interaction {
        Some(PendingInteraction::MulliganDecision { player: p }) if *p == player => Ok(()),
        Some(pending) => Err(RulesError::illegal(format!("waiting for {pending}"))),
        None => Err(RulesError::illegal("no mulligan decisions are pending")),
    }
}

/// Ask the next undecided player, or start the game.
fn next_decision(state: &mut MatchState) {
    let order = state.players_in_match_from(state.starting_player);
    match order.into_iter().find(|p| !state.players[*p].kept_hand) {
        Some(player) => {
            state.pending_interaction = Some(PendingInteraction::MulliganDecision { player });
        }
        None => {
            state.pending_interaction = None;
            start_first_turn(state);
        }
    }
}

fn shuffle_library(state: &mut MatchState, player: PlayerId) {
    let MatchState { players, rng, .. } = state;
    rng.shuffle(&mut players[player].library);
}
