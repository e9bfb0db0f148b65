//! Mana cost parsing and payment.
//!
//! Example-based checks of the greedy generic payment plus property tests
//! for conservation and all-or-nothing payment.

use proptest::prelude::*;
use rust_tcg::{ManaColor, ManaCost, ManaPool, RulesError};

fn pool_strategy() -> impl Strategy<Value = ManaPool> {
    prop::array::uniform5(0u32..5).prop_map(|counts| {
        ManaColor::ALL
            .iter()
            .zip(counts)
            .fold(ManaPool::new(), |pool, (color, n)| pool.with(*color, n))
    })
}

fn cost_strategy() -> impl Strategy<Value = ManaCost> {
    (0u32..6, prop::array::uniform5(0u32..3), any::<bool>()).prop_map(|(generic, colored, x)| {
        let cost = ManaColor::ALL
            .iter()
            .zip(colored)
            .fold(ManaCost::generic(generic), |cost, (color, n)| cost.with_colored(*color, n));
        if x {
            cost.with_x()
        } else {
            cost
        }
    })
}

// =============================================================================
// Parsing
// =============================================================================

/// Costs parse from brace-delimited symbols and print back the same way.
#[test]
fn test_parse_and_display() {
    let cost: ManaCost = "{4}{G}{G}".parse().unwrap();
    assert_eq!(cost.generic_amount(), 4);
    assert_eq!(cost.colored(ManaColor::Green), 2);
    assert_eq!(cost.mana_value(), 6);
    assert_eq!(cost.to_string(), "{4}{G}{G}");

    let blaze = ManaCost::parse("{X}{R}").unwrap();
    assert!(blaze.has_x());
    assert_eq!(blaze.mana_value(), 1);
    assert_eq!(blaze.total_with_x(3), 4);
    assert_eq!(blaze.to_string(), "{X}{R}");

    assert_eq!(ManaCost::parse("").unwrap(), ManaCost::default());
}

/// Malformed costs are rejected.
#[test]
fn test_parse_errors() {
    for text in ["{2}{R", "2R", "{Q}", "{}"] {
        assert!(
            matches!(ManaCost::parse(text), Err(RulesError::InvalidManaCost(_))),
            "{text} should not parse"
        );
    }
}

// =============================================================================
// Payment
// =============================================================================

/// Generic mana comes from the most abundant color, earliest on ties.
#[test]
fn test_generic_paid_from_most_abundant() {
    let mut pool = ManaPool::new()
        .with(ManaColor::White, 1)
        .with(ManaColor::Blue, 2)
        .with(ManaColor::Green, 2);

    ManaCost::generic(2).pay(&mut pool, 0).unwrap();

    assert_eq!(pool.get(ManaColor::White), 1);
    assert_eq!(pool.get(ManaColor::Blue), 1);
    assert_eq!(pool.get(ManaColor::Green), 1);
}

/// Colored requirements come out before generic.
#[test]
fn test_colored_reserved_before_generic() {
    let mut pool = ManaPool::new().with(ManaColor::Red, 2).with(ManaColor::Green, 1);
    let cost = ManaCost::parse("{1}{R}{R}").unwrap();

    assert!(cost.can_pay(&pool, 0));
    cost.pay(&mut pool, 0).unwrap();
    assert!(pool.is_empty());
}

/// Colored mana can't be substituted.
#[test]
fn test_wrong_color() {
    let mut pool = ManaPool::new().with(ManaColor::Green, 5);
    let cost = ManaCost::parse("{B}").unwrap();

    let err = cost.pay(&mut pool, 0).unwrap_err();
    assert_eq!(err.to_string(), "insufficient mana: need 1, pool holds 5");
    assert_eq!(pool.get(ManaColor::Green), 5);
}

/// X adds to the generic part.
#[test]
fn test_x_paid_as_generic() {
    let cost = ManaCost::parse("{X}{R}").unwrap();
    let pool = ManaPool::new().with(ManaColor::Red, 1).with(ManaColor::Blue, 2);

    assert!(cost.can_pay(&pool, 2));
    assert!(!cost.can_pay(&pool, 3));
}

proptest! {
    /// `can_pay` and `pay` agree; a successful payment removes exactly
    /// the cost, a failed one removes nothing.
    #[test]
    fn test_payment_conserves_mana(pool in pool_strategy(), cost in cost_strategy(), x in 0u32..4) {
        let before = pool;
        let mut after = pool;
        let payable = cost.can_pay(&before, x);

        match cost.pay(&mut after, x) {
            Ok(()) => {
                prop_assert!(payable);
                prop_assert_eq!(before.total() - after.total(), cost.total_with_x(x));
                for color in ManaColor::ALL {
                    prop_assert!(before.get(color) - after.get(color) >= cost.colored(color));
                }
            }
            Err(_) => {
                prop_assert!(!payable);
                prop_assert_eq!(before, after);
            }
        }
    }

    /// Displayed costs parse back to the same cost.
    #[test]
    fn test_display_parses_back(cost in cost_strategy()) {
        let parsed = ManaCost::parse(&cost.to_string()).unwrap();
        prop_assert_eq!(parsed, cost);
    }
}
