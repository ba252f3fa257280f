//! Durable assessment storage on sled
//!
//! Two trees:
//! - `assessments`: record id -> JSON-serialized `AssessmentRecord`
//! - `by_time`: big-endian created-at nanoseconds + id -> record id,
//!   so iteration order is chronological

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sled::transaction::{abort, TransactionError};
use sled::Transactional;
use tracing::{debug, info};

use super::persistence::{AssessmentStore, StorageError};
use crate::types::AssessmentRecord;

const RECORDS_TREE: &str = "assessments";
const TIME_INDEX_TREE: &str = "by_time";

/// sled-backed `AssessmentStore`.
#[derive(Clone)]
pub struct SledAssessmentStore {
    db: Arc<sled::Db>,
    records: sled::Tree,
    by_time: sled::Tree,
}

impl SledAssessmentStore {
    /// Open or create the store at the specified directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let db = sled::open(path)?;
        let records = db.open_tree(RECORDS_TREE)?;
        let by_time = db.open_tree(TIME_INDEX_TREE)?;
        info!(path = %path.display(), records = records.len(), "Assessment storage opened");
        Ok(Self {
            db: Arc::new(db),
            records,
            by_time,
        })
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    pub fn stats(&self) -> Result<StorageStats, StorageError> {
        let first = self.by_time.first()?;
        let last = self.by_time.last()?;
        let oldest = match first {
            Some((_, id)) => self.created_at_of(&id)?,
            None => None,
        };
        let newest = match last {
            Some((_, id)) => self.created_at_of(&id)?,
            None => None,
        };
        Ok(StorageStats {
            record_count: self.records.len(),
            size_bytes: self.db.size_on_disk()?,
            oldest,
            newest,
        })
    }

    fn created_at_of(&self, id: &[u8]) -> Result<Option<DateTime<Utc>>, StorageError> {
        match self.records.get(id)? {
            Some(bytes) => {
                let record: AssessmentRecord = serde_json::from_slice(&bytes)?;
                Ok(Some(record.created_at))
            }
            None => Ok(None),
        }
    }
}

/// Time index key: created-at nanoseconds as big-endian bytes with the sign
/// bit flipped, followed by the id. Byte order then matches time order,
/// including timestamps before 1970.
fn time_key(record: &AssessmentRecord) -> Vec<u8> {
    let nanos = record
        .created_at
        .timestamp_nanos_opt()
        .unwrap_or_else(|| record.created_at.timestamp().saturating_mul(1_000_000_000));
    let mut stamp = nanos.to_be_bytes();
    stamp[0] ^= 0x80;
    let mut key = Vec::with_capacity(stamp.len() + record.id.len());
    key.extend_from_slice(&stamp);
    key.extend_from_slice(record.id.as_bytes());
    key
}

fn map_tx_error(err: TransactionError<StorageError>) -> StorageError {
    match err {
        TransactionError::Abort(e) => e,
        TransactionError::Storage(e) => e.into(),
    }
}

impl AssessmentStore for SledAssessmentStore {
    fn save(&self, record: &AssessmentRecord) -> Result<(), StorageError> {
        let value = serde_json::to_vec(record)?;
        let index_key = time_key(record);
        let id = record.id.as_bytes();

        (&self.records, &self.by_time)
            .transaction(|(records, by_time)| {
                if records.get(id)?.is_some() {
                    return abort(StorageError::Duplicate(record.id.clone()));
                }
                records.insert(id, value.as_slice())?;
                by_time.insert(index_key.as_slice(), id)?;
                Ok(())
            })
            .map_err(map_tx_error)?;

        self.db.flush()?;
        debug!(
            id = %record.id,
            site = %record.site.site_name,
            recommended_mm = record.result.recommended_size_mm,
            "Stored assessment"
        );
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<AssessmentRecord>, StorageError> {
        match self.records.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn list(&self, limit: usize) -> Result<Vec<AssessmentRecord>, StorageError> {
        let mut out = Vec::with_capacity(limit.min(self.by_time.len()));
        for item in self.by_time.iter().rev() {
            if out.len() >= limit {
                break;
            }
            let (_, id) = item?;
            if let Some(bytes) = self.records.get(&id)? {
                out.push(serde_json::from_slice(&bytes)?);
            }
        }
        Ok(out)
    }

    fn delete(&self, id: &str) -> Result<(), StorageError> {
        let record = self
            .get(id)?
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        let index_key = time_key(&record);

        (&self.records, &self.by_time)
            .transaction(|(records, by_time)| {
                records.remove(id.as_bytes())?;
                by_time.remove(index_key.as_slice())?;
                Ok::<(), sled::transaction::ConflictableTransactionError<StorageError>>(())
            })
            .map_err(map_tx_error)?;

        self.db.flush()?;
        info!(id = %id, "Deleted assessment");
        Ok(())
    }

    fn count(&self) -> Result<usize, StorageError> {
        Ok(self.records.len())
    }

    fn backend_name(&self) -> &'static str {
        "Sled"
    }
}

/// Storage statistics
#[derive(Debug, Clone)]
pub struct StorageStats {
    pub record_count: usize,
    pub size_bytes: u64,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

impl StorageStats {
    /// Size in megabytes
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::make_record;

    fn open_temp() -> (tempfile::TempDir, SledAssessmentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SledAssessmentStore::open(dir.path().join("db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_save_get_roundtrip() {
        let (_dir, store) = open_temp();
        let record = make_record("CUL-A", 1_700_000_000);
        store.save(&record).unwrap();
        assert_eq!(store.get("CUL-A").unwrap(), Some(record));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_list_is_chronological_newest_first() {
        let (_dir, store) = open_temp();
        store.save(&make_record("mid", 2_000)).unwrap();
        store.save(&make_record("old", 1_000)).unwrap();
        store.save(&make_record("new", 3_000)).unwrap();

        let ids: Vec<String> = store.list(10).unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
        assert_eq!(store.list(1).unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let (_dir, store) = open_temp();
        store.save(&make_record("same", 1)).unwrap();
        let err = store.save(&make_record("same", 2)).unwrap_err();
        assert!(matches!(err, StorageError::Duplicate(_)));
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.by_time.len(), 1);
    }

    #[test]
    fn test_delete_removes_index_entry() {
        let (_dir, store) = open_temp();
        store.save(&make_record("gone", 5)).unwrap();
        store.delete("gone").unwrap();
        assert!(store.get("gone").unwrap().is_none());
        assert!(store.by_time.is_empty());
        assert!(matches!(store.delete("gone"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_pre_epoch_records_keep_chronological_order() {
        let (_dir, store) = open_temp();
        store.save(&make_record("1950", -631_152_000)).unwrap();
        store.save(&make_record("1969", -1_000)).unwrap();
        store.save(&make_record("1975", 157_766_400)).unwrap();

        let ids: Vec<String> = store.list(10).unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["1975", "1969", "1950"]);
        assert!(time_key(&make_record("x", -2)) < time_key(&make_record("x", -1)));
        assert!(time_key(&make_record("x", -1)) < time_key(&make_record("x", 0)));
    }

    #[test]
    fn test_stats() {
        let (_dir, store) = open_temp();
        let empty = store.stats().unwrap();
        assert_eq!(empty.record_count, 0);
        assert!(empty.oldest.is_none());

        store.save(&make_record("a", 1_000)).unwrap();
        store.save(&make_record("b", 2_000)).unwrap();
        let stats = store.stats().unwrap();
        assert_eq!(stats.record_count, 2);
        assert_eq!(stats.oldest.map(|t| t.timestamp()), Some(1_000));
        assert_eq!(stats.newest.map(|t| t.timestamp()), Some(2_000));
    }
}
