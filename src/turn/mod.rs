//! Turn structure: mulligans, the step cycle, and cleanup.
//!
//! A turn walks the twelve steps of [`Step`] in order. Entry actions run on
//! entering each step (untap, draw, attack/block declaration, combat
//! damage, hand-size discard); in every step except untap and cleanup the
//! active player then receives priority, and the step ends when all
//! players pass in succession with an empty stack.
//!
//! ```
//! use rust_tcg::turn::Step;
//!
//! assert_eq!(Step::Cleanup.next(), Step::Untap);
//! assert!(!Step::Untap.grants_priority());
//! assert!(Step::PostcombatMain.is_main());
//! ```

mod machine;
mod mulligan;
mod step;

pub use machine::{
    advance, assign_combat_damage, declare_attackers, declare_blockers, discard, enter, settle, start_first_turn,
};
pub use mulligan::{bottom_cards, deal_opening_hands, keep_hand, mulligan};
pub use step::Step;
