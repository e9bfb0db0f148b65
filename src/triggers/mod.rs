//! Trigger system for event-driven abilities.
//!
//! Triggers let cards respond to game events. Rules code emits a
//! [`GameEvent`] whenever something trigger-worthy happens; before the
//! next player receives priority the engine collects every effect
//! registered at the event's [`EffectSlot`](crate::effects::EffectSlot)
//! and puts the resulting triggered abilities on the stack.
//!
//! ## Key Components
//!
//! - [`GameEvent`]: An event that occurred, mapped to one effect slot
//! - [`PendingTrigger`]: A triggered ability waiting for the stack
//! - [`collect`] / [`flush`]: event scan and APNAP stacking
//!
//! ## Example Usage
//!
//! ```
//! use rust_tcg::cards::{CardDefinition, CardId, CardInstance, CardType, Permanent};
//! use rust_tcg::core::{MatchConfig, MatchId, MatchState, PlayerId};
//! use rust_tcg::effects::{Effect, EffectSlot};
//! use rust_tcg::triggers::{self, GameEvent};
//!
//! let mut state = MatchState::new(MatchId::new(1), MatchConfig::default(), 2, 42);
//! let arena = CardDefinition::new(CardId::new(1), "Phyrexian Arena")
//!     .with_type(CardType::Enchantment)
//!     .with_effect(EffectSlot::UpkeepTriggered, Effect::draw(1));
//! let id = state.allocate_entity();
//! let p0 = PlayerId::new(0);
//! state.players[p0].battlefield.push(Permanent::new(CardInstance::new(id, p0, arena), p0));
//!
//! state.emit(GameEvent::UpkeepBegan { player: p0 });
//! triggers::collect(&mut state);
//! triggers::flush(&mut state);
//! assert_eq!(state.stack.len(), 1);
//! ```
//!
//! ## N-Player Support
//!
//! APNAP ordering walks seats from the active player, so it works for any
//! number of players; triggers controlled by players who lost are dropped.

mod collector;
mod event;

pub use collector::{choose_target, collect, flush, push, PendingTrigger};
pub use event::GameEvent;
