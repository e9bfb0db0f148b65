//! The match table: independent matches behind per-match locks.
//!
//! One lock per match serializes mutations of that match; the table's
//! own lock is held only long enough to look a match up, so different
//! matches never wait on each other.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::info;

use crate::core::{MatchId, Result, RulesError};

use super::engine::Match;

/// Shared handle to one match.
pub type MatchHandle = Arc<Mutex<Match>>;

/// All live matches of a server.
#[derive(Default)]
pub struct MatchTable {
    matches: RwLock<FxHashMap<MatchId, MatchHandle>>,
}

impl MatchTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a match. Fails if its id is taken.
    pub fn insert(&self, game: Match) -> Result<MatchHandle> {
        let id = game.id();
        let mut matches = self.matches.write();
        if matches.contains_key(&id) {
            return Err(RulesError::InvalidConfig(format!("{id} already exists")));
        }
        let handle = Arc::new(Mutex::new(game));
        matches.insert(id, Arc::clone(&handle));
        info!(match_id = %id, "match added to table");
        Ok(handle)
    }

    /// Remove a finished or abandoned match.
    pub fn remove(&self, id: MatchId) -> Option<MatchHandle> {
        self.matches.write().remove(&id)
    }

    #[must_use]
    pub fn get(&self, id: MatchId) -> Option<MatchHandle> {
        self.matches.read().get(&id).cloned()
    }

    /// Run `f` with exclusive access to one match.
    pub fn with_match<T>(&self, id: MatchId, f: impl FnOnce(&mut Match) -> Result<T>) -> Result<T> {
        let handle = self
            .get(id)
            .ok_or_else(|| RulesError::not_found(id.to_string()))?;
        let mut game = handle.lock();
        f(&mut game)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.matches.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::catalog;
    use crate::core::{MatchConfig, PlayerId};

    fn game(id: u64) -> Match {
        let registry = Arc::new(catalog::reference_registry());
        let deck = vec![catalog::FOREST; 20];
        Match::new(MatchId::new(id), registry, vec![deck.clone(), deck], PlayerId::new(0), MatchConfig::default(), id)
            .unwrap()
    }

    #[test]
    fn test_insert_and_mutate() {
        let table = MatchTable::new();
        table.insert(game(1)).unwrap();
        table.insert(game(2)).unwrap();
        assert!(table.insert(game(1)).is_err());
        assert_eq!(table.len(), 2);

        table.with_match(MatchId::new(1), |m| m.keep_hand(PlayerId::new(0))).unwrap();
        let pending = table
            .with_match(MatchId::new(1), |m| Ok(m.pending_interaction().map(|p| p.player())))
            .unwrap();
        assert_eq!(pending, Some(PlayerId::new(1)));

        let untouched = table
            .with_match(MatchId::new(2), |m| Ok(m.pending_interaction().map(|p| p.player())))
            .unwrap();
        assert_eq!(untouched, Some(PlayerId::new(0)));
    }

    #[test]
    fn test_missing_match() {
        let table = MatchTable::new();
        let result = table.with_match(MatchId::new(7), |m| Ok(m.status()));
        assert!(matches!(result, Err(RulesError::NotFound(_))));

        table.insert(game(7)).unwrap();
        assert!(table.remove(MatchId::new(7)).is_some());
        assert!(table.is_empty());
    }

    #[test]
    fn test_matches_run_on_separate_threads() {
        let table = Arc::new(MatchTable::new());
        for id in 0..4 {
            table.insert(game(id)).unwrap();
        }

        let workers: Vec<_> = (0..4)
            .map(|id| {
                let table = Arc::clone(&table);
                std::thread::spawn(move || {
                    table.with_match(MatchId::new(id), |m| {
                        m.keep_hand(PlayerId::new(0))?;
                        m.keep_hand(PlayerId::new(1))
                    })
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap().unwrap();
        }

        for id in 0..4 {
            let turn = table.with_match(MatchId::new(id), |m| Ok(m.turn_number())).unwrap();
            assert_eq!(turn, 1);
        }
    }
}
