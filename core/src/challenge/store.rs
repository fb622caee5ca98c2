//! Answer store
//!
//! Process-lifetime map from challenge identifier to its hidden solution.
//! One mutex guards the whole map, so inserting a new challenge and
//! consuming one on a successful answer never interleave for the same key.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;
use log::debug;

use crate::error::{to_state_error, Result};
use crate::models::{StoredSolution, Verdict};

/// In-memory answer key
#[derive(Debug, Default)]
pub struct AnswerStore {
    entries: Mutex<HashMap<Uuid, StoredSolution>>,
}

impl AnswerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, StoredSolution>>> {
        self.entries.lock().map_err(to_state_error)
    }

    /// Insert a solution under a fresh identifier.
    ///
    /// Returns `false` and leaves the store untouched if the identifier is taken.
    pub fn insert_new(&self, id: Uuid, solution: StoredSolution) -> Result<bool> {
        let mut entries = self.lock()?;
        if entries.contains_key(&id) {
            return Ok(false);
        }
        entries.insert(id, solution);
        Ok(true)
    }

    /// Copy of the solution stored for an identifier
    pub fn get(&self, id: &Uuid) -> Result<Option<StoredSolution>> {
        Ok(self.lock()?.get(id).cloned())
    }

    /// Whether an identifier has a live entry
    pub fn contains(&self, id: &Uuid) -> Result<bool> {
        Ok(self.lock()?.contains_key(id))
    }

    /// Remove an entry, returning it if it was present
    pub fn remove(&self, id: &Uuid) -> Result<Option<StoredSolution>> {
        Ok(self.lock()?.remove(id))
    }

    /// Judge an entry and remove it on a pass, as one critical section.
    ///
    /// Returns `None` when the identifier has no entry.
    pub fn resolve<F>(&self, id: &Uuid, judge: F) -> Result<Option<Verdict>>
    where
        F: FnOnce(&StoredSolution) -> Verdict,
    {
        let mut entries = self.lock()?;
        let verdict = match entries.get(id) {
            Some(solution) => judge(solution),
            None => return Ok(None),
        };

        if verdict.is_pass() {
            entries.remove(id);
            debug!("Consumed answer store entry {}", id);
        }

        Ok(Some(verdict))
    }

    /// Number of live entries
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }

    /// Drop every entry, returning how many were removed
    pub fn clear(&self) -> Result<usize> {
        let mut entries = self.lock()?;
        let removed = entries.len();
        entries.clear();
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn pass() -> Verdict {
        Verdict::Pass { message: "ok".to_string() }
    }

    fn fail() -> Verdict {
        Verdict::Fail { message: "no".to_string() }
    }

    #[test]
    fn test_insert_get_remove() {
        let store = AnswerStore::new();
        let id = Uuid::new_v4();

        assert!(store.insert_new(id, StoredSolution::text_only("SELECT 1;")).unwrap());
        assert!(!store.insert_new(id, StoredSolution::text_only("SELECT 2;")).unwrap());
        assert_eq!(store.get(&id).unwrap().unwrap().sql, "SELECT 1;");
        assert_eq!(store.len().unwrap(), 1);

        assert!(store.remove(&id).unwrap().is_some());
        assert!(store.remove(&id).unwrap().is_none());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_resolve_removes_only_on_pass() {
        let store = AnswerStore::new();
        let id = Uuid::new_v4();
        store.insert_new(id, StoredSolution::text_only("SELECT 1;")).unwrap();

        assert_eq!(store.resolve(&id, |_| fail()).unwrap(), Some(fail()));
        assert!(store.contains(&id).unwrap());

        assert_eq!(store.resolve(&id, |_| pass()).unwrap(), Some(pass()));
        assert!(!store.contains(&id).unwrap());

        assert_eq!(store.resolve(&id, |_| pass()).unwrap(), None);
    }

    #[test]
    fn test_concurrent_resolve_consumes_once() {
        let store = Arc::new(AnswerStore::new());
        let id = Uuid::new_v4();
        store.insert_new(id, StoredSolution::text_only("SELECT 1;")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.resolve(&id, |_| pass()).unwrap())
            })
            .collect();

        let passes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|v| v.is_some())
            .count();

        assert_eq!(passes, 1);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_clear() {
        let store = AnswerStore::new();
        for _ in 0..3 {
            store.insert_new(Uuid::new_v4(), StoredSolution::text_only("SELECT 1;")).unwrap();
        }

        assert_eq!(store.clear().unwrap(), 3);
        assert!(store.is_empty().unwrap());
    }
}
