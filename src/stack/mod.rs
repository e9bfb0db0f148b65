//! The stack and the priority protocol.
//!
//! Spells and abilities go on a LIFO stack. After any action the acting
//! player keeps priority; players then pass in seat order. When every
//! player still in the match has passed in succession without an
//! intervening action, the top entry resolves and the active player
//! receives priority again. With an empty stack, the same round of passes
//! ends the step instead.
//!
//! ## Design Philosophy
//!
//! `PriorityStack` only keeps the data (entries, holder, passes); rules
//! live in free functions over `MatchState`: `casting` validates and pushes,
//! `resolution` passes priority and resolves.
//!
//! ## Example Usage
//!
//! ```
//! use rust_tcg::core::{EntityId, PlayerId};
//! use rust_tcg::stack::{PassOutcome, PriorityStack, StackEntry, StackEntryKind};
//!
//! let players = [PlayerId::new(0), PlayerId::new(1)];
//! let mut stack = PriorityStack::new();
//! stack.push(StackEntry::new(StackEntryKind::Spell, EntityId(10), players[0], "Shock"));
//! stack.set_priority(players[0]);
//!
//! assert_eq!(stack.pass(players[0], &players), PassOutcome::PriorityTo(players[1]));
//! assert_eq!(stack.pass(players[1], &players), PassOutcome::AllPassed);
//! ```

mod casting;
mod priority;
mod resolution;

pub use casting::{ability_target_filter, activate_ability, cast_spell, play_land, spell_target_filter};
pub use priority::{PassOutcome, PriorityStack, StackEntry, StackEntryId, StackEntryKind};
pub use resolution::{answer_may, pass_priority, resolve_top};
