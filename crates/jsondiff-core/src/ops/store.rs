use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::errors::{DiffError, ExError, ExErrorKind, ExResult};
use crate::model::{DiffId, SavedDiff};

/// Key-value persistence for saved diffs
///
/// Implementations must give read-after-write consistency for a single key
/// and must never overwrite: `put` on an existing id fails with
/// `AlreadyExists`. There is no update or delete.
pub trait DiffStore: Send + Sync {
    /// Fetch a diff by id, `None` if absent
    ///
    /// # Errors
    ///
    /// Returns `Persistence` (or `Serialization` for a corrupt row) on backend failure.
    fn get(&self, id: &DiffId) -> ExResult<Option<SavedDiff>>;

    /// Insert a new diff
    ///
    /// # Errors
    ///
    /// Returns `AlreadyExists` if the id is taken, `Persistence` on backend failure.
    fn put(&self, diff: &SavedDiff) -> ExResult<()>;

    /// Check whether an id is taken
    ///
    /// # Errors
    ///
    /// Same as `get`.
    fn contains(&self, id: &DiffId) -> ExResult<bool> {
        Ok(self.get(id)?.is_some())
    }
}

/// In-memory store
///
/// HashMap behind a mutex. Backs the `:memory:` database setting and most
/// tests; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    diffs: Mutex<HashMap<DiffId, SavedDiff>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored diffs
    pub fn len(&self) -> usize {
        self.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> ExResult<MutexGuard<'_, HashMap<DiffId, SavedDiff>>> {
        self.diffs.lock().map_err(|_| {
            ExError::new(ExErrorKind::Internal)
                .with_op("memory_store")
                .with_message("memory store lock poisoned")
        })
    }
}

impl DiffStore for MemoryStore {
    fn get(&self, id: &DiffId) -> ExResult<Option<SavedDiff>> {
        Ok(self.lock()?.get(id).cloned())
    }

    fn put(&self, diff: &SavedDiff) -> ExResult<()> {
        let mut diffs = self.lock()?;
        if diffs.contains_key(diff.id()) {
            return Err(DiffError::DiffAlreadyExists {
                model_id: diff.id().to_string(),
            }
            .into());
        }
        diffs.insert(diff.id().clone(), diff.clone());
        Ok(())
    }

    fn contains(&self, id: &DiffId) -> ExResult<bool> {
        Ok(self.lock()?.contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(s: &str) -> DiffId {
        DiffId::parse(s).unwrap()
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get(&id("abcdefgh")).unwrap(), None);
        assert!(!store.contains(&id("abcdefgh")).unwrap());
    }

    #[test]
    fn test_put_then_get() {
        let store = MemoryStore::new();
        let diff = SavedDiff::new(id("abcdefgh"), json!({"a": [1, 2]}));

        store.put(&diff).unwrap();

        assert_eq!(store.get(diff.id()).unwrap(), Some(diff.clone()));
        assert!(store.contains(diff.id()).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_put_refuses_overwrite() {
        let store = MemoryStore::new();
        let first = SavedDiff::new(id("abcdefgh"), json!(1));
        let second = SavedDiff::new(id("abcdefgh"), json!(2));

        store.put(&first).unwrap();
        let err = store.put(&second).unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::AlreadyExists);
        assert_eq!(err.entity_id(), Some("abcdefgh"));
        assert_eq!(store.get(first.id()).unwrap().unwrap().state(), &json!(1));
    }
}
