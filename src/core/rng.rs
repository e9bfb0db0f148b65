//! Deterministic random number generation.
//!
//! Every shuffle in a match (opening libraries, mulligans) draws from the
//! match's `GameRng`, so a match replays identically from its seed and
//! action history.
//!
//! The RNG serializes as a `GameRngState` (seed + ChaCha8 word position),
//! which lets a suspended match be persisted and resumed mid-game.
//!
//! ```
//! use rust_tcg::core::GameRng;
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//! let mut deck_a = vec![1, 2, 3, 4, 5];
//! let mut deck_b = deck_a.clone();
//! a.shuffle(&mut deck_a);
//! b.shuffle(&mut deck_b);
//! assert_eq!(deck_a, deck_b);
//! ```

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic match RNG backed by ChaCha8.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(into = "GameRngState", from = "GameRngState")]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this RNG was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

impl From<GameRng> for GameRngState {
    fn from(rng: GameRng) -> Self {
        rng.state()
    }
}

impl From<GameRngState> for GameRng {
    fn from(state: GameRngState) -> Self {
        GameRng::from_state(&state)
    }
}

/// Serializable RNG state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck() -> Vec<u32> {
        (1..=40).collect()
    }

    fn shuffled(rng: &mut GameRng) -> Vec<u32> {
        let mut cards = deck();
        rng.shuffle(&mut cards);
        cards
    }

    #[test]
    fn test_same_seed_same_order() {
        let mut a = GameRng::new(42);
        let mut b = GameRng::new(42);
        for _ in 0..5 {
            assert_eq!(shuffled(&mut a), shuffled(&mut b));
        }
        assert_ne!(shuffled(&mut GameRng::new(1)), shuffled(&mut GameRng::new(2)));
    }

    #[test]
    fn test_shuffle_keeps_cards() {
        let mut rng = GameRng::new(42);
        let mut cards = shuffled(&mut rng);
        assert_ne!(cards, deck());

        cards.sort_unstable();
        assert_eq!(cards, deck());
    }

    #[test]
    fn test_state_restore_continues_sequence() {
        let mut rng = GameRng::new(7);
        shuffled(&mut rng);

        let state = rng.state();
        let expected = shuffled(&mut rng);
        let mut restored = GameRng::from_state(&state);
        assert_eq!(shuffled(&mut restored), expected);
    }

    #[test]
    fn test_serde_through_state() {
        let mut rng = GameRng::new(99);
        shuffled(&mut rng);

        let bytes = bincode::serialize(&rng).unwrap();
        let mut restored: GameRng = bincode::deserialize(&bytes).unwrap();

        assert_eq!(restored.seed(), 99);
        assert_eq!(shuffled(&mut rng), shuffled(&mut restored));
    }
}
