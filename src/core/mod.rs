//! Core engine types: entities, players, configuration, errors, actions,
//! pending interactions and the match state itself.
//!
//! Everything else in the crate is rules code operating on [`MatchState`].

pub mod action;
pub mod config;
pub mod entity;
pub mod error;
pub mod interaction;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Action, ActionRecord};
pub use config::MatchConfig;
pub use entity::{EntityId, MatchId};
pub use error::{Result, RulesError};
pub use interaction::PendingInteraction;
pub use player::{PlayerId, PlayerMap};
pub use rng::{GameRng, GameRngState};
pub use state::{MatchState, MatchStatus, PlayerBoard};
