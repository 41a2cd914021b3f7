//! Names Module
//!
//! Interned engine names. Every class, property and type tag inside a save is
//! stored as a 32-bit id into a table carried by the save header.
//!
//! ## Header Record Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Preamble (18 bytes, uninterpreted)                      │
//! ├─────────────────────────────────────────────────────────┤
//! │ Header strings                                          │
//! │   [Len: u32][Bytes incl. NUL][Marker: u32 = -1]         │
//! │   ... until Len == 0                                    │
//! ├─────────────────────────────────────────────────────────┤
//! │ Skip (8 bytes)                                          │
//! ├─────────────────────────────────────────────────────────┤
//! │ Name entries                                            │
//! │   [NameId: u32][Len: u32][Bytes incl. NUL]              │
//! │   ... until the record is exhausted                     │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod header;
mod table;

use std::fmt;

use serde::Serialize;

pub use header::{HeaderRecord, PREAMBLE_SIZE};
pub use table::NameTable;

/// Sentinel returned when an id has no entry in the table
pub const UNKNOWN_NAME: &str = "<unknown>";

/// Interned name identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NameId(pub u32);

impl NameId {
    /// Little-endian bytes, as the id appears inside value blobs
    pub fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

impl From<u32> for NameId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}
