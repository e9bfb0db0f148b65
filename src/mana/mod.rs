//! Mana system: colors, costs and pools.
//!
//! ## Design Philosophy
//!
//! Costs are immutable values parsed once from card text; pools are five
//! plain counters owned by each player. Payment is a pure function of the
//! cost and the pool, so it can be checked (`can_pay`) before anything is
//! mutated.
//!
//! Generic mana is paid greedily from the most abundant color. This is a
//! heuristic, not an optimal solver: a pool can be left unable to pay a
//! second spell that an optimal payment would have allowed.
//!
//! ## Example Usage
//!
//! ```
//! use rust_tcg::mana::{ManaColor, ManaCost, ManaPool};
//!
//! let bolt: ManaCost = "{R}".parse().unwrap();
//! let mut pool = ManaPool::new().with(ManaColor::Red, 1);
//! bolt.pay(&mut pool, 0).unwrap();
//! assert!(pool.is_empty());
//! ```

mod color;
mod cost;
mod pool;

pub use color::ManaColor;
pub use cost::ManaCost;
pub use pool::ManaPool;
