//! # rust-tcg
//!
//! Authoritative rules engine for a turn-based trading card game server.
//!
//! The engine tracks the state of a match between two or more players and
//! enforces turn progression, the priority/stack protocol, combat, mana
//! payment and card-effect dispatch. It is deterministic (seeded RNG) and
//! never blocks: when a rule needs a player's decision it stores a
//! [`PendingInteraction`] on the match and returns, and the matching entry
//! point resumes from it on the next request.
//!
//! ## Design Principles
//!
//! 1. **Validate, then mutate**: a rejected request returns a
//!    [`RulesError`] and leaves the match unchanged.
//!
//! 2. **N-Player First**: seats are turn order; APNAP ordering, priority
//!    rounds and elimination work for any number of players.
//!
//! 3. **Data-driven cards**: a card is a [`CardDefinition`] listing
//!    [`Effect`] values per [`EffectSlot`]; one resolver gives every effect
//!    its meaning.
//!
//! ## Modules
//!
//! - `core`: Ids, players, configuration, errors, actions, `MatchState`
//! - `mana`: Colors, costs and pools
//! - `cards`: Definitions, instances, permanents, registry, reference catalog
//! - `effects`: Effect values, targeting filters and the resolver
//! - `triggers`: Event → triggered ability collection
//! - `stack`: Casting, activation, priority and resolution
//! - `combat`: Attack/block declaration and damage assignment
//! - `turn`: Steps, mulligans and the turn state machine
//! - `rules`: State-based actions, the `Match` façade, `MatchTable`, `PlayerView`
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use rust_tcg::cards::catalog;
//! use rust_tcg::{Match, MatchConfig, MatchId, PlayerId, Step};
//!
//! let registry = Arc::new(catalog::reference_registry());
//! let deck = vec![catalog::FOREST; 40];
//! let p0 = PlayerId::new(0);
//! let p1 = PlayerId::new(1);
//!
//! let mut game = Match::new(MatchId::new(1), registry, vec![deck.clone(), deck], p0, MatchConfig::default(), 7)
//!     .unwrap();
//! game.keep_hand(p0).unwrap();
//! game.keep_hand(p1).unwrap();
//!
//! // Turn 1 begins in the upkeep; both players pass to reach the draw step.
//! assert_eq!(game.step(), Step::Upkeep);
//! game.pass_priority(p0).unwrap();
//! game.pass_priority(p1).unwrap();
//! assert_eq!(game.step(), Step::Draw);
//! ```

pub mod cards;
pub mod combat;
pub mod core;
pub mod effects;
pub mod mana;
pub mod rules;
pub mod stack;
pub mod triggers;
pub mod turn;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionRecord, EntityId, GameRng, GameRngState, MatchConfig, MatchId, MatchState, MatchStatus,
    PendingInteraction, PlayerBoard, PlayerId, PlayerMap, Result, RulesError,
};

pub use crate::mana::{ManaColor, ManaCost, ManaPool};

pub use crate::cards::{
    AbilityTiming, ActivatedAbility, CardDefinition, CardId, CardInstance, CardRegistry, CardType, Keyword, Permanent,
};

pub use crate::effects::{Effect, EffectResolver, EffectSlot, Recipient, Target, TargetFilter};

pub use crate::triggers::{GameEvent, PendingTrigger};

pub use crate::stack::{PriorityStack, StackEntry, StackEntryId, StackEntryKind};

pub use crate::combat::{CombatState, DamageAssignment, DamageContext, DamagePass, DamageRecipient};

pub use crate::turn::Step;

pub use crate::rules::{GameResult, Match, MatchTable, PlayerView};
