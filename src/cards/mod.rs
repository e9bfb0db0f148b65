//! Card system: definitions, instances, permanents and the registry.
//!
//! ## Key Types
//!
//! - `CardId`: Identifier of a printed card
//! - `CardDefinition`: Printed characteristics and the effects declared per slot
//! - `CardInstance`: One physical card in a match, keeping its `EntityId` across zones
//! - `Permanent`: A card on the battlefield with its runtime status
//! - `CardRegistry`: Definition lookup shared read-only by all matches
//!
//! [`catalog`] holds the reference card pool.

mod ability;
pub mod catalog;
mod definition;
mod instance;
mod permanent;
mod registry;

pub use ability::{AbilityTiming, ActivatedAbility};
pub use definition::{CardDefinition, CardId, CardType, Keyword};
pub use instance::CardInstance;
pub use permanent::Permanent;
pub use registry::CardRegistry;
