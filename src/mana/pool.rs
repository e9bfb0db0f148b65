//! Per-player mana pool.

use serde::{Deserialize, Serialize};

use super::ManaColor;

/// Five independent non-negative counters, one per color.
///
/// Pools are emptied on every step transition.
///
/// ```
/// use rust_tcg::mana::{ManaColor, ManaPool};
///
/// let mut pool = ManaPool::new().with(ManaColor::Red, 2);
/// pool.add(ManaColor::Green, 1);
/// assert_eq!(pool.total(), 3);
/// pool.clear();
/// assert!(pool.is_empty());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaPool {
    counts: [u32; 5],
}

impl ManaPool {
    /// Create an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add mana of a color (builder pattern).
    #[must_use]
    pub fn with(mut self, color: ManaColor, amount: u32) -> Self {
        self.add(color, amount);
        self
    }

    /// Amount of one color.
    #[must_use]
    pub fn get(&self, color: ManaColor) -> u32 {
        self.counts[color.index()]
    }

    /// Add mana of a color.
    pub fn add(&mut self, color: ManaColor, amount: u32) {
        self.counts[color.index()] = self.counts[color.index()].saturating_add(amount);
    }

    /// Remove up to `amount` mana of a color, returning how much was removed.
    pub fn remove(&mut self, color: ManaColor, amount: u32) -> u32 {
        let slot = &mut self.counts[color.index()];
        let removed = amount.min(*slot);
        *slot -= removed;
        removed
    }

    /// Total mana across all colors.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().fold(0, |sum, n| sum.saturating_add(*n))
    }

    /// Check if the pool holds no mana.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Empty the pool.
    pub fn clear(&mut self) {
        self.counts = [0; 5];
    }

    /// The color with the most mana; ties go to the earliest in W, U, B, R, G order.
    ///
    /// Returns `None` when the pool is empty.
    #[must_use]
    pub fn most_abundant(&self) -> Option<ManaColor> {
        let mut best: Option<ManaColor> = None;
        for color in ManaColor::ALL {
            let count = self.get(color);
            if count == 0 {
                continue;
            }
            if best.map_or(true, |b| count > self.get(b)) {
                best = Some(color);
            }
        }
        best
    }
}

impl std::fmt::Display for ManaPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = ManaColor::ALL
            .iter()
            .filter(|c| self.get(**c) > 0)
            .map(|c| format!("{}{}", self.get(*c), c))
            .collect();
        if parts.is_empty() {
            write!(f, "empty")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}
