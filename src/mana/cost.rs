//! Mana costs: parsing, payability and payment.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{ManaColor, ManaPool};
use crate::core::{Result, RulesError};

/// An immutable mana cost such as `{2}{R}{R}` or `{X}{R}`.
///
/// ```
/// use rust_tcg::mana::{ManaColor, ManaCost, ManaPool};
///
/// let cost: ManaCost = "{1}{R}".parse().unwrap();
/// let mut pool = ManaPool::new().with(ManaColor::Red, 1).with(ManaColor::Green, 2);
///
/// assert!(cost.can_pay(&pool, 0));
/// cost.pay(&mut pool, 0).unwrap();
/// assert_eq!(pool.get(ManaColor::Red), 0);
/// assert_eq!(pool.get(ManaColor::Green), 1);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaCost {
    generic: u32,
    colored: [u32; 5],
    has_x: bool,
}

impl ManaCost {
    /// A cost of `generic` generic mana and nothing else.
    #[must_use]
    pub const fn generic(generic: u32) -> Self {
        Self {
            generic,
            colored: [0; 5],
            has_x: false,
        }
    }

    /// Add colored symbols (builder pattern).
    #[must_use]
    pub fn with_colored(mut self, color: ManaColor, count: u32) -> Self {
        self.colored[color.index()] = self.colored[color.index()].saturating_add(count);
        self
    }

    /// Add an `{X}` symbol (builder pattern).
    #[must_use]
    pub fn with_x(mut self) -> Self {
        self.has_x = true;
        self
    }

    /// Parse a cost written as brace-delimited symbols.
    ///
    /// Color letters add to that color, numbers add to generic, `X` marks
    /// a variable cost. An empty string is the zero cost.
    pub fn parse(text: &str) -> Result<Self> {
        let mut cost = Self::default();
        let mut rest = text.trim();

        while !rest.is_empty() {
            let Some(inner) = rest.strip_prefix('{') else {
                return Err(RulesError::InvalidManaCost(text.to_string()));
            };
            let Some(close) = inner.find('}') else {
                return Err(RulesError::InvalidManaCost(text.to_string()));
            };
            let symbol = &inner[..close];
            rest = &inner[close + 1..];

            if let Some(color) = ManaColor::from_symbol(symbol) {
                cost.colored[color.index()] += 1;
            } else if symbol == "X" {
                cost.has_x = true;
            } else if let Ok(amount) = symbol.parse::<u32>() {
                cost.generic = cost
                    .generic
                    .checked_add(amount)
                    .ok_or_else(|| RulesError::InvalidManaCost(text.to_string()))?;
            } else {
                return Err(RulesError::InvalidManaCost(text.to_string()));
            }
        }

        if cost.generic.checked_add(cost.colored_total()).is_none() {
            return Err(RulesError::InvalidManaCost(text.to_string()));
        }
        Ok(cost)
    }

    /// Generic portion of the cost.
    #[must_use]
    pub fn generic_amount(&self) -> u32 {
        self.generic
    }

    /// Colored requirement for one color.
    #[must_use]
    pub fn colored(&self, color: ManaColor) -> u32 {
        self.colored[color.index()]
    }

    /// Whether the cost contains `{X}`.
    #[must_use]
    pub fn has_x(&self) -> bool {
        self.has_x
    }

    /// Total colored symbols.
    #[must_use]
    pub fn colored_total(&self) -> u32 {
        self.colored.iter().fold(0, |sum, n| sum.saturating_add(*n))
    }

    /// Mana value: generic plus colored, with X counted as zero.
    #[must_use]
    pub fn mana_value(&self) -> u32 {
        self.generic.saturating_add(self.colored_total())
    }

    /// Amount of mana needed to pay this cost with the chosen X,
    /// saturating at `u32::MAX`.
    #[must_use]
    pub fn total_with_x(&self, x: u32) -> u32 {
        self.mana_value().saturating_add(if self.has_x { x } else { 0 })
    }

    /// Generic plus X, widened so a huge X can't overflow.
    fn generic_with_x(&self, x: u32) -> u64 {
        u64::from(self.generic) + if self.has_x { u64::from(x) } else { 0 }
    }

    /// Check whether `pool` can pay this cost with the chosen X.
    ///
    /// Every colored requirement must be covered by that color, and what
    /// remains after reserving the colored mana must cover generic plus X.
    #[must_use]
    pub fn can_pay(&self, pool: &ManaPool, x: u32) -> bool {
        for color in ManaColor::ALL {
            if pool.get(color) < self.colored(color) {
                return false;
            }
        }
        let held: u64 = ManaColor::ALL.iter().map(|c| u64::from(pool.get(*c))).sum();
        let reserved: u64 = ManaColor::ALL.iter().map(|c| u64::from(self.colored(*c))).sum();
        held - reserved >= self.generic_with_x(x)
    }

    /// Pay this cost from `pool`.
    ///
    /// Colored requirements are deducted exactly. Each generic unit is then
    /// taken from whichever color currently has the most mana, ties going
    /// to the earliest color in W, U, B, R, G order. An unpayable cost
    /// leaves the pool untouched.
    pub fn pay(&self, pool: &mut ManaPool, x: u32) -> Result<()> {
        if !self.can_pay(pool, x) {
            return Err(RulesError::InsufficientMana {
                required: self.total_with_x(x),
                available: pool.total(),
            });
        }

        for color in ManaColor::ALL {
            pool.remove(color, self.colored(color));
        }

        let mut generic = self.generic_with_x(x);
        while generic > 0 {
            let Some(color) = pool.most_abundant() else {
                break;
            };
            pool.remove(color, 1);
            generic -= 1;
        }

        Ok(())
    }
}

impl FromStr for ManaCost {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for ManaCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.has_x {
            write!(f, "{{X}}")?;
        }
        if self.generic > 0 || (self.colored_total() == 0 && !self.has_x) {
            write!(f, "{{{}}}", self.generic)?;
        }
        for color in ManaColor::ALL {
            for _ in 0..self.colored(color) {
                write!(f, "{{{}}}", color.symbol())?;
            }
        }
        Ok(())
    }
}
