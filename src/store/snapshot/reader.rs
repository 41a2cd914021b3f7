//! Snapshot Reader
//!
//! Validates a snapshot file and loads it into a [`MemoryStore`].

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::debug;

use crate::error::{ArkError, Result};
use crate::store::{MemoryStore, ObjectKey, OBJECT_KEY_SIZE};

use super::{FOOTER_SIZE, HEADER_SIZE, MAGIC, VERSION};

/// Reader for snapshot files
pub struct SnapshotReader;

impl SnapshotReader {
    /// Open a snapshot file and load every record
    pub fn open(path: &Path) -> Result<MemoryStore> {
        let data = fs::read(path)?;
        let store = Self::load(&data)?;
        debug!(
            "Loaded snapshot {}: {} custom records, {} objects",
            path.display(),
            store.custom_count(),
            store.object_count()
        );
        Ok(store)
    }

    /// Parse snapshot bytes
    pub fn load(data: &[u8]) -> Result<MemoryStore> {
        let min_size = (HEADER_SIZE + FOOTER_SIZE) as usize;
        if data.len() < min_size {
            return Err(ArkError::Snapshot(format!(
                "File too small: {} bytes (min {})",
                data.len(),
                min_size
            )));
        }

        if &data[0..4] != MAGIC {
            return Err(ArkError::Snapshot(format!(
                "Invalid snapshot magic: expected ARKS, got {:?}",
                &data[0..4]
            )));
        }

        let mut header = Cursor::new(&data[4..HEADER_SIZE as usize]);
        let version = header.read_u16::<LittleEndian>()?;
        if version != VERSION {
            return Err(ArkError::Snapshot(format!(
                "Unsupported snapshot version: {}",
                version
            )));
        }
        let custom_count = header.read_u32::<LittleEndian>()?;
        let object_count = header.read_u32::<LittleEndian>()?;

        let data_end = data.len() - FOOTER_SIZE as usize;
        let section = &data[HEADER_SIZE as usize..data_end];

        let stored_crc = Cursor::new(&data[data_end..]).read_u32::<LittleEndian>()?;
        let actual_crc = crc32fast::hash(section);
        if stored_crc != actual_crc {
            return Err(ArkError::Snapshot(format!(
                "CRC mismatch: stored {:#010x}, computed {:#010x}",
                stored_crc, actual_crc
            )));
        }

        let store = MemoryStore::new();
        let mut cursor = Cursor::new(section);

        for _ in 0..custom_count {
            let key_len = cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
            let val_len = cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
            let key = read_vec(&mut cursor, key_len)?;
            let value = read_vec(&mut cursor, val_len)?;
            let key = String::from_utf8(key)
                .map_err(|e| ArkError::Snapshot(format!("Custom key is not UTF-8: {}", e)))?;
            store.insert_custom(key, value);
        }

        for _ in 0..object_count {
            let mut key = [0u8; OBJECT_KEY_SIZE];
            cursor.read_exact(&mut key).map_err(truncated)?;
            let val_len = cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
            let value = read_vec(&mut cursor, val_len)?;
            store.insert_object(ObjectKey(key), value);
        }

        if (cursor.position() as usize) != section.len() {
            return Err(ArkError::Snapshot(format!(
                "{} trailing bytes after {} objects",
                section.len() - cursor.position() as usize,
                object_count
            )));
        }

        Ok(store)
    }
}

fn read_vec(cursor: &mut Cursor<&[u8]>, len: usize) -> Result<Vec<u8>> {
    let remaining = cursor.get_ref().len() - cursor.position() as usize;
    if len > remaining {
        return Err(ArkError::Snapshot(format!(
            "Record of {} bytes overruns section ({} left)",
            len, remaining
        )));
    }
    let mut buf = vec![0u8; len];
    cursor.read_exact(&mut buf)?;
    Ok(buf)
}

fn truncated(e: std::io::Error) -> ArkError {
    ArkError::Snapshot(format!("Section truncated: {}", e))
}
