//! In-memory store
//!
//! BTreeMap-based store with RwLock for concurrency.

use std::collections::BTreeMap;

use bytes::Bytes;
use parking_lot::RwLock;
use tracing::trace;

use crate::error::Result;

use super::{ObjectKey, ObjectScan, SaveStore, StoredObject, ValueRange};

/// Ordered in-memory save container
///
/// ## Concurrency:
/// - `objects` and `custom`: Protected by RwLock (many concurrent readers)
/// - Scans copy matching entries out under the read lock; values are
///   `Bytes`, so the copy is a refcount bump
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Game objects, ordered by key
    objects: RwLock<BTreeMap<ObjectKey, Bytes>>,
    /// Custom records (header and friends)
    custom: RwLock<BTreeMap<String, Bytes>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a game object
    pub fn insert_object(&self, key: ObjectKey, value: impl Into<Bytes>) {
        self.objects.write().insert(key, value.into());
    }

    /// Insert or replace a custom record
    pub fn insert_custom(&self, key: impl Into<String>, value: impl Into<Bytes>) {
        self.custom.write().insert(key.into(), value.into());
    }

    /// Number of game objects
    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }

    /// Number of custom records
    pub fn custom_count(&self) -> usize {
        self.custom.read().len()
    }

    /// Custom records in key order (for snapshot writing)
    pub fn custom_records(&self) -> Vec<(String, Bytes)> {
        self.custom
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn collect_matching(&self, range: Option<&ValueRange>) -> Vec<StoredObject> {
        let objects = self.objects.read();
        objects
            .iter()
            .filter(|(_, value)| range.map_or(true, |r| r.contains(value)))
            .map(|(key, value)| StoredObject {
                key: *key,
                value: value.clone(),
            })
            .collect()
    }
}

impl SaveStore for MemoryStore {
    fn custom_record(&self, key: &str) -> Result<Option<Bytes>> {
        Ok(self.custom.read().get(key).cloned())
    }

    fn scan_value_range(&self, range: &ValueRange) -> Result<ObjectScan<'_>> {
        let matches = self.collect_matching(Some(range));
        trace!("Range scan matched {} objects", matches.len());
        Ok(Box::new(matches.into_iter().map(Ok)))
    }

    fn scan_all(&self) -> Result<ObjectScan<'_>> {
        let all = self.collect_matching(None);
        Ok(Box::new(all.into_iter().map(Ok)))
    }
}
