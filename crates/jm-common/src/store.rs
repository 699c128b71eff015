//! Persistence port for match results.
//!
//! The engine only ever writes through this trait, at most once per pair,
//! and never reads back.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::{error::StoreError, matching::scoring::MatchResult};

pub trait MatchStore: Send + Sync {
    /// Update-or-create the result for `(candidate_id, vacancy_id)`.
    fn save(&self, candidate_id: i64, vacancy_id: i64, result: &MatchResult) -> Result<(), StoreError>;
}

/// Process-local store keyed by `(candidate_id, vacancy_id)`; latest write wins.
#[derive(Debug, Default)]
pub struct InMemoryMatchStore {
    results: RwLock<HashMap<(i64, i64), MatchResult>>,
}

impl InMemoryMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, candidate_id: i64, vacancy_id: i64) -> Option<MatchResult> {
        self.results.read().get(&(candidate_id, vacancy_id)).copied()
    }

    pub fn len(&self) -> usize {
        self.results.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.read().is_empty()
    }

    /// All stored results, ordered by key.
    pub fn snapshot(&self) -> Vec<((i64, i64), MatchResult)> {
        let mut rows: Vec<_> = self
            .results
            .read()
            .iter()
            .map(|(key, result)| (*key, *result))
            .collect();
        rows.sort_by_key(|(key, _)| *key);
        rows
    }
}

impl MatchStore for InMemoryMatchStore {
    fn save(&self, candidate_id: i64, vacancy_id: i64, result: &MatchResult) -> Result<(), StoreError> {
        let replaced = self
            .results
            .write()
            .insert((candidate_id, vacancy_id), *result)
            .is_some();
        debug!(candidate_id, vacancy_id, replaced, "match result saved");
        Ok(())
    }
}
