//! The match façade and everything around it.
//!
//! - [`Match`]: one game, with every mutating entry point and read-only view
//! - [`MatchTable`]: independent matches behind per-match locks
//! - [`PlayerView`]: what one player is allowed to see
//! - [`state_based`]: state-based actions and game end

mod engine;
pub mod state_based;
mod table;
mod view;

pub use engine::{GameResult, Match};
pub use table::{MatchHandle, MatchTable};
pub use view::{PlayerView, SeatView, WaitingOn};
