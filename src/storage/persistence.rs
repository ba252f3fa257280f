//! AssessmentStore trait - pluggable storage backend
//!
//! Abstracts assessment persistence so callers can swap backends without
//! touching sizing code:
//! - `InMemoryStore`: bounded in-memory store for tests and ephemeral use
//! - `SledAssessmentStore`: durable on-device store

use std::sync::RwLock;

use crate::config::defaults;
use crate::types::AssessmentRecord;

/// Trait for pluggable assessment persistence backends.
///
/// Implementations must be `Send + Sync` so one store can be shared by
/// several callers.
pub trait AssessmentStore: Send + Sync {
    /// Store a new record. Fails with `Duplicate` if the id already exists.
    fn save(&self, record: &AssessmentRecord) -> Result<(), StorageError>;

    /// Fetch a record by id.
    fn get(&self, id: &str) -> Result<Option<AssessmentRecord>, StorageError>;

    /// Most recent records first.
    fn list(&self, limit: usize) -> Result<Vec<AssessmentRecord>, StorageError>;

    /// Remove a record. Fails with `NotFound` if the id is unknown.
    fn delete(&self, id: &str) -> Result<(), StorageError>;

    fn count(&self) -> Result<usize, StorageError>;

    /// Backend name for logging
    fn backend_name(&self) -> &'static str;
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("assessment '{0}' not found")]
    NotFound(String),
    #[error("assessment '{0}' already exists")]
    Duplicate(String),
}

impl From<sled::Error> for StorageError {
    fn from(err: sled::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// In-memory store. Thread-safe via `RwLock`; data is lost on drop.
pub struct InMemoryStore {
    records: RwLock<Vec<AssessmentRecord>>,
    max_records: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(defaults::IN_MEMORY_MAX_RECORDS)
    }

    /// Store holding at most `max_records`. When full, the oldest held
    /// record is evicted to make room for the one being saved.
    pub fn with_capacity(max_records: usize) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            max_records: max_records.max(1),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentStore for InMemoryStore {
    fn save(&self, record: &AssessmentRecord) -> Result<(), StorageError> {
        let mut store = self
            .records
            .write()
            .map_err(|e| StorageError::Database(e.to_string()))?;

        if store.iter().any(|r| r.id == record.id) {
            return Err(StorageError::Duplicate(record.id.clone()));
        }
        // Evict before inserting; the saved record is always retained
        if store.len() >= self.max_records {
            store.remove(0);
        }
        store.push(record.clone());
        store.sort_by_key(|r| r.created_at);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<AssessmentRecord>, StorageError> {
        let store = self
            .records
            .read()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(store.iter().find(|r| r.id == id).cloned())
    }

    fn list(&self, limit: usize) -> Result<Vec<AssessmentRecord>, StorageError> {
        let store = self
            .records
            .read()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(store.iter().rev().take(limit).cloned().collect())
    }

    fn delete(&self, id: &str) -> Result<(), StorageError> {
        let mut store = self
            .records
            .write()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        let before = store.len();
        store.retain(|r| r.id != id);
        if store.len() == before {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn count(&self) -> Result<usize, StorageError> {
        let store = self
            .records
            .read()
            .map_err(|e| StorageError::Database(e.to_string()))?;
        Ok(store.len())
    }

    fn backend_name(&self) -> &'static str {
        "InMemory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::make_record;

    #[test]
    fn test_in_memory_save_and_get() {
        let store = InMemoryStore::new();
        let record = make_record("CUL-1", 1_000);
        store.save(&record).unwrap();

        let fetched = store.get("CUL-1").unwrap();
        assert_eq!(fetched, Some(record));
        assert!(store.get("CUL-missing").unwrap().is_none());
    }

    #[test]
    fn test_in_memory_list_newest_first() {
        let store = InMemoryStore::new();
        store.save(&make_record("a", 100)).unwrap();
        store.save(&make_record("c", 300)).unwrap();
        store.save(&make_record("b", 200)).unwrap();

        let list = store.list(2).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].id, "c");
        assert_eq!(list[1].id, "b");
    }

    #[test]
    fn test_in_memory_duplicate_rejected() {
        let store = InMemoryStore::new();
        store.save(&make_record("dup", 1)).unwrap();
        assert!(matches!(
            store.save(&make_record("dup", 2)),
            Err(StorageError::Duplicate(_))
        ));
    }

    #[test]
    fn test_in_memory_delete() {
        let store = InMemoryStore::new();
        store.save(&make_record("x", 1)).unwrap();
        store.delete("x").unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(matches!(store.delete("x"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_in_memory_evicts_oldest() {
        let store = InMemoryStore::with_capacity(2);
        store.save(&make_record("a", 1)).unwrap();
        store.save(&make_record("b", 2)).unwrap();
        store.save(&make_record("c", 3)).unwrap();
        assert_eq!(store.count().unwrap(), 2);
        assert!(store.get("a").unwrap().is_none());
    }

    #[test]
    fn test_in_memory_keeps_backdated_record_when_full() {
        let store = InMemoryStore::with_capacity(2);
        store.save(&make_record("b", 2)).unwrap();
        store.save(&make_record("c", 3)).unwrap();
        store.save(&make_record("a", 1)).unwrap();
        assert_eq!(store.count().unwrap(), 2);
        assert!(store.get("a").unwrap().is_some(), "saved record was dropped");
        assert!(store.get("b").unwrap().is_none());
        let ids: Vec<String> = store.list(10).unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }

    #[test]
    fn test_trait_object() {
        let store: Box<dyn AssessmentStore> = Box::new(InMemoryStore::new());
        assert_eq!(store.backend_name(), "InMemory");
        store.save(&make_record("t", 42)).unwrap();
        assert_eq!(store.list(10).unwrap().len(), 1);
    }
}
