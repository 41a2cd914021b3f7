//! Store Module
//!
//! The save container seen as an ordered key-value byte store.
//!
//! ## Responsibilities
//! - Serve custom records (the name table header lives here)
//! - Range-scan game objects by their *value* bytes
//! - Full scans for unfiltered queries
//!
//! The core only ever reads through [`SaveStore`]; nothing is written back.
//!
//! ## Backends
//! - [`SqliteStore`]: the `.ark` save database itself
//! - [`MemoryStore`]: ordered in-memory map, used directly by tests and as
//!   the load target of snapshot files
//! - Snapshot files: portable on-disk dump of a container, see [`snapshot`]

mod memory;
pub mod snapshot;
mod sqlite;

use std::fmt;

use bytes::Bytes;
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::error::Result;

pub use memory::MemoryStore;
pub use snapshot::{SnapshotReader, SnapshotWriter};
pub use sqlite::SqliteStore;

/// Size of an object key in bytes
pub const OBJECT_KEY_SIZE: usize = 16;

// =============================================================================
// Keys and Values
// =============================================================================

/// 16-byte key addressing one stored object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey(pub [u8; OBJECT_KEY_SIZE]);

impl ObjectKey {
    /// Interpret the key as a UUID in mixed-endian (`bytes_le`) layout
    pub fn uuid(&self) -> Uuid {
        Uuid::from_bytes_le(self.0)
    }

    /// 32 lowercase hex digits, no dashes
    pub fn simple(&self) -> String {
        self.uuid().simple().to_string()
    }
}

impl From<[u8; OBJECT_KEY_SIZE]> for ObjectKey {
    fn from(bytes: [u8; OBJECT_KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uuid().hyphenated())
    }
}

impl Serialize for ObjectKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A (key, value) pair returned by a scan
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub key: ObjectKey,
    /// Immutable snapshot of the value blob
    pub value: Bytes,
}

// =============================================================================
// Range Filters
// =============================================================================

/// Half-open range `[low, high)` over value bytes, byte-lexicographic.
///
/// `high == None` means unbounded above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRange {
    pub low: Vec<u8>,
    pub high: Option<Vec<u8>>,
}

impl ValueRange {
    /// Whether a value lies in the range
    pub fn contains(&self, value: &[u8]) -> bool {
        if value < self.low.as_slice() {
            return false;
        }
        match &self.high {
            Some(high) => value < high.as_slice(),
            None => true,
        }
    }
}

// =============================================================================
// Store Interface
// =============================================================================

/// Lazily evaluated scan result. Dropping it cancels the scan.
pub type ObjectScan<'a> = Box<dyn Iterator<Item = Result<StoredObject>> + 'a>;

/// Read-only access to a save container
pub trait SaveStore: Send + Sync {
    /// Fetch a custom record by key
    fn custom_record(&self, key: &str) -> Result<Option<Bytes>>;

    /// Every object whose value lies in `range`
    fn scan_value_range(&self, range: &ValueRange) -> Result<ObjectScan<'_>>;

    /// Every object
    fn scan_all(&self) -> Result<ObjectScan<'_>>;
}
