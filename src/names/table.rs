//! Name table implementation
//!
//! Read-only after construction; safe to share across decode workers by
//! reference.

use std::collections::HashMap;

use crate::error::{ArkError, Result};

use super::header::HeaderRecord;
use super::{NameId, UNKNOWN_NAME};

/// Bidirectional map between interned ids and engine names
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    /// Live entries in header order (an overwritten id keeps only its last string)
    entries: Vec<(NameId, String)>,
    /// id → position in `entries`
    by_id: HashMap<NameId, usize>,
    /// name → ids sharing it, header order
    by_name: HashMap<String, Vec<NameId>>,
    /// First section of the header record
    header_strings: Vec<String>,
}

impl NameTable {
    /// Build the table from a raw header record
    pub fn from_header(bytes: &[u8]) -> Result<Self> {
        let record = HeaderRecord::parse(bytes)?;
        let mut table = Self::from_entries(record.names);
        table.header_strings = record.strings;
        Ok(table)
    }

    /// Build the table from (id, name) pairs in header order.
    ///
    /// A repeated id keeps its last name.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (NameId, S)>,
        S: Into<String>,
    {
        let mut latest: HashMap<NameId, usize> = HashMap::new();
        let raw: Vec<(NameId, String)> = entries
            .into_iter()
            .map(|(id, name)| (id, name.into()))
            .collect();
        for (pos, (id, _)) in raw.iter().enumerate() {
            latest.insert(*id, pos);
        }

        let mut table = Self::default();
        for (pos, (id, name)) in raw.into_iter().enumerate() {
            if latest.get(&id) != Some(&pos) {
                continue;
            }
            table.by_id.insert(id, table.entries.len());
            table.by_name.entry(name.clone()).or_default().push(id);
            table.entries.push((id, name));
        }
        table
    }

    /// Resolve an id to its name, or [`UNKNOWN_NAME`] if absent
    pub fn resolve(&self, id: NameId) -> &str {
        self.try_resolve(id).unwrap_or(UNKNOWN_NAME)
    }

    /// Resolve an id to its name
    pub fn try_resolve(&self, id: NameId) -> Option<&str> {
        self.by_id
            .get(&id)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    /// Whether the id has an entry
    pub fn contains(&self, id: NameId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Find the id of a name.
    ///
    /// When several ids share the name, the first in header order wins; use
    /// [`NameTable::reverse_lookup_all`] to see every candidate.
    pub fn reverse_lookup(&self, name: &str) -> Result<NameId> {
        self.by_name
            .get(name)
            .and_then(|ids| ids.first().copied())
            .ok_or_else(|| ArkError::NameNotFound(name.to_string()))
    }

    /// Every id carrying the name, in header order
    pub fn reverse_lookup_all(&self, name: &str) -> Vec<NameId> {
        self.by_name.get(name).cloned().unwrap_or_default()
    }

    /// Strings of the header's first section
    pub fn header_strings(&self) -> &[String] {
        &self.header_strings
    }

    /// Entries in header order
    pub fn iter(&self) -> impl Iterator<Item = (NameId, &str)> {
        self.entries.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Number of names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
