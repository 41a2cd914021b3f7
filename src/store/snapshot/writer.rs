//! Snapshot Writer
//!
//! Writes custom records and game objects to a new snapshot file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{ArkError, Result};
use crate::store::{MemoryStore, ObjectKey, SaveStore};

use super::{MAGIC, VERSION};

/// Builder for snapshot files
///
/// Custom records must all be added before the first object.
pub struct SnapshotWriter {
    /// Output file path
    path: PathBuf,
    /// Buffered writer for performance
    writer: BufWriter<File>,
    custom_count: u32,
    object_count: u32,
    /// Running CRC hasher for both sections
    data_hasher: crc32fast::Hasher,
}

impl SnapshotWriter {
    /// Create a new snapshot file (truncating any existing one)
    pub fn new(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut writer = BufWriter::new(file);

        // Counts are placeholders, patched in finish()
        writer.write_all(MAGIC)?;
        writer.write_all(&VERSION.to_le_bytes())?;
        writer.write_all(&0u32.to_le_bytes())?;
        writer.write_all(&0u32.to_le_bytes())?;

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            custom_count: 0,
            object_count: 0,
            data_hasher: crc32fast::Hasher::new(),
        })
    }

    /// Write every record of an in-memory store
    pub fn write_store(path: &Path, store: &MemoryStore) -> Result<PathBuf> {
        let mut writer = Self::new(path)?;
        for (key, value) in store.custom_records() {
            writer.add_custom(&key, &value)?;
        }
        for object in store.scan_all()? {
            let object = object?;
            writer.add_object(&object.key, &object.value)?;
        }
        writer.finish()
    }

    /// Copy the named custom records and every object out of any store,
    /// e.g. a save database. Missing custom records are left out.
    pub fn import<S: SaveStore + ?Sized>(
        path: &Path,
        store: &S,
        custom_keys: &[&str],
    ) -> Result<PathBuf> {
        let mut writer = Self::new(path)?;
        for key in custom_keys {
            match store.custom_record(key)? {
                Some(value) => writer.add_custom(key, &value)?,
                None => warn!("Custom record {:?} not in store, not imported", key),
            }
        }
        for object in store.scan_all()? {
            let object = object?;
            writer.add_object(&object.key, &object.value)?;
        }
        info!(
            "Imported {} custom records and {} objects into {}",
            writer.custom_count,
            writer.object_count,
            path.display()
        );
        writer.finish()
    }

    /// Add a custom record
    pub fn add_custom(&mut self, key: &str, value: &[u8]) -> Result<()> {
        if self.object_count > 0 {
            return Err(ArkError::Snapshot(format!(
                "custom record {:?} added after {} objects",
                key, self.object_count
            )));
        }

        self.write_data(&len_u32(key.len())?.to_le_bytes())?;
        self.write_data(&len_u32(value.len())?.to_le_bytes())?;
        self.write_data(key.as_bytes())?;
        self.write_data(value)?;

        self.custom_count += 1;
        Ok(())
    }

    /// Add a game object
    pub fn add_object(&mut self, key: &ObjectKey, value: &[u8]) -> Result<()> {
        self.write_data(&key.0)?;
        self.write_data(&len_u32(value.len())?.to_le_bytes())?;
        self.write_data(value)?;

        self.object_count += 1;
        Ok(())
    }

    fn write_data(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.data_hasher.update(bytes);
        Ok(())
    }

    /// Write the footer, patch the header counts and return the file path
    pub fn finish(mut self) -> Result<PathBuf> {
        let data_crc = self.data_hasher.finalize();

        self.writer.write_all(&data_crc.to_le_bytes())?;
        self.writer.write_all(&[0u8; 4])?;
        self.writer.flush()?;

        let mut file = self.writer.into_inner().map_err(|e| {
            ArkError::Snapshot(format!("Failed to flush snapshot: {}", e))
        })?;
        file.seek(SeekFrom::Start(6))?; // After magic + version
        file.write_all(&self.custom_count.to_le_bytes())?;
        file.write_all(&self.object_count.to_le_bytes())?;
        file.sync_all()?;

        Ok(self.path)
    }
}

fn len_u32(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| ArkError::Snapshot(format!("record of {} bytes is too large", len)))
}
