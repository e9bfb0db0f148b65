//! Per-player projection of a match.
//!
//! A `PlayerView` is what a client may see: everything public, plus the
//! viewer's own hand. Other players' hands and every library are reduced
//! to card counts. Pending decisions owed by someone else show only their
//! kind and player.

use serde::{Deserialize, Serialize};

use crate::cards::{CardInstance, Permanent};
use crate::core::{MatchId, MatchState, MatchStatus, PendingInteraction, PlayerId, Result};
use crate::mana::ManaPool;
use crate::stack::StackEntry;
use crate::turn::Step;

use super::engine::GameResult;

/// Public information about one seat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeatView {
    pub player: PlayerId,
    pub life: i64,
    pub hand_size: usize,
    pub library_size: usize,
    pub mana_pool: ManaPool,
    pub battlefield: Vec<Permanent>,
    pub graveyard: Vec<CardInstance>,
    pub has_lost: bool,
}

/// A decision someone else owes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingOn {
    pub player: PlayerId,
    pub kind: String,
}

/// The match as seen by `viewer`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub match_id: MatchId,
    pub viewer: PlayerId,
    pub status: MatchStatus,
    pub turn_number: u32,
    pub active_player: PlayerId,
    pub step: Step,
    pub priority_player: Option<PlayerId>,
    /// Bottom to top.
    pub stack: Vec<StackEntry>,
    pub seats: Vec<SeatView>,
    /// The viewer's hand.
    pub hand: Vec<CardInstance>,
    /// The viewer's own pending decision, in full.
    pub my_decision: Option<PendingInteraction>,
    pub waiting_on: Option<WaitingOn>,
    pub result: Option<GameResult>,
}

impl PlayerView {
    pub(crate) fn project(state: &MatchState, viewer: PlayerId) -> Result<Self> {
        let hand = state.board(viewer)?.hand.clone();

        let seats = state
            .players
            .iter()
            .map(|(player, board)| SeatView {
                player,
                life: board.life,
                hand_size: board.hand.len(),
                library_size: board.library.len(),
                mana_pool: board.mana_pool,
                battlefield: board.battlefield.clone(),
                graveyard: board.graveyard.clone(),
                has_lost: board.has_lost,
            })
            .collect();

        let (my_decision, waiting_on) = match &state.pending_interaction {
            Some(pending) if pending.player() == viewer => (Some(pending.clone()), None),
            Some(pending) => (
                None,
                Some(WaitingOn {
                    player: pending.player(),
                    kind: pending.kind().to_string(),
                }),
            ),
            None => (None, None),
        };

        Ok(Self {
            match_id: state.id,
            viewer,
            status: state.status,
            turn_number: state.turn_number,
            active_player: state.active_player,
            step: state.step,
            priority_player: state.stack.priority_player(),
            stack: state.stack.entries().to_vec(),
            seats,
            hand,
            my_decision,
            waiting_on,
            result: state.result.clone(),
        })
    }

    /// Public information about a seat.
    #[must_use]
    pub fn seat(&self, player: PlayerId) -> Option<&SeatView> {
        self.seats.iter().find(|s| s.player == player)
    }
}
