//! SQLite save container
//!
//! An `.ark` save is an SQLite database with two tables:
//! ```text
//! custom(key TEXT, value BLOB)   header record under "SaveHeader"
//! game(key BLOB(16), value BLOB) one row per game object
//! ```
//!
//! The database is opened read-only. Range filters become bound blob
//! parameters; SQLite compares blobs with `memcmp` then length, which is the
//! byte-lexicographic order [`ValueRange`] assumes.

use std::path::Path;

use bytes::Bytes;
use parking_lot::Mutex;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OpenFlags, OptionalExtension};
use tracing::{debug, trace};

use crate::error::{ArkError, Result};

use super::{ObjectKey, ObjectScan, SaveStore, StoredObject, ValueRange, OBJECT_KEY_SIZE};

/// Read-only handle on a save database
///
/// ## Concurrency:
/// - `conn`: one connection behind a Mutex; scans collect their rows under
///   the lock and release it before the caller iterates
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a save file read-only
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        debug!("Opened save database {}", path.display());
        Ok(Self::from_connection(conn))
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Number of rows in the game table
    pub fn object_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM game", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    fn select_objects(&self, sql: &str, params: Vec<Value>) -> Result<Vec<StoredObject>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(params), |row| {
            Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, Vec<u8>>(1)?))
        })?;

        let mut objects = Vec::new();
        for row in rows {
            let (key, value) = row?;
            objects.push(StoredObject {
                key: object_key(&key)?,
                value: Bytes::from(value),
            });
        }
        Ok(objects)
    }
}

impl SaveStore for SqliteStore {
    fn custom_record(&self, key: &str) -> Result<Option<Bytes>> {
        let value: Option<Vec<u8>> = self
            .conn
            .lock()
            .query_row("SELECT value FROM custom WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value.map(Bytes::from))
    }

    fn scan_value_range(&self, range: &ValueRange) -> Result<ObjectScan<'_>> {
        let mut params = vec![Value::Blob(range.low.clone())];
        let sql = match &range.high {
            Some(high) => {
                params.push(Value::Blob(high.clone()));
                "SELECT key, value FROM game WHERE value >= ?1 AND value < ?2 ORDER BY key"
            }
            None => "SELECT key, value FROM game WHERE value >= ?1 ORDER BY key",
        };

        let matches = self.select_objects(sql, params)?;
        trace!("Range scan matched {} rows", matches.len());
        Ok(Box::new(matches.into_iter().map(Ok)))
    }

    fn scan_all(&self) -> Result<ObjectScan<'_>> {
        let all = self.select_objects("SELECT key, value FROM game ORDER BY key", Vec::new())?;
        Ok(Box::new(all.into_iter().map(Ok)))
    }
}

fn object_key(raw: &[u8]) -> Result<ObjectKey> {
    let bytes: [u8; OBJECT_KEY_SIZE] = raw.try_into().map_err(|_| {
        ArkError::Store(format!(
            "game key of {} bytes, expected {}",
            raw.len(),
            OBJECT_KEY_SIZE
        ))
    })?;
    Ok(ObjectKey(bytes))
}
