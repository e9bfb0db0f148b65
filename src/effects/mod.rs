//! Effect system for card abilities.
//!
//! Effects are the building blocks of card abilities:
//! - `EffectSlot`: named hook points on a card definition
//! - `Effect`: the catalogue of atomic effects
//! - `TargetFilter`: composable legality predicates for targets and blocks
//! - `EffectResolver`: executes effects on match state
//!
//! ## Design Philosophy
//!
//! A card's rules text is data: an ordered list of `Effect` values per
//! slot. The resolver is the only code that interprets them, so adding a
//! card never means adding a type.
//!
//! ## Example Usage
//!
//! ```
//! use rust_tcg::cards::{CardDefinition, CardId, CardType};
//! use rust_tcg::effects::{Effect, EffectSlot, Recipient, TargetFilter};
//! use rust_tcg::mana::ManaCost;
//!
//! let shock = CardDefinition::new(CardId::new(1), "Shock")
//!     .with_type(CardType::Instant)
//!     .with_mana_cost(ManaCost::parse("{R}").unwrap())
//!     .with_effect(EffectSlot::Spell, Effect::deal_damage(2, Recipient::Target))
//!     .with_target(EffectSlot::Spell, TargetFilter::creature_or_player());
//!
//! assert_eq!(shock.effects_for(EffectSlot::Spell).count(), 1);
//! ```

mod effect;
mod resolver;
mod slot;
mod targeting;

pub use effect::{Effect, Recipient};
pub use resolver::{EffectContext, EffectResolver, ResolveResult, RunOutcome};
pub use slot::EffectSlot;
pub use targeting::{FilterContext, Target, TargetFilter, Verdict};
