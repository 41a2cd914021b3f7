//! Snapshot files
//!
//! Portable on-disk dump of a save container, so a save can be opened without
//! the database engine it ships in.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (14 bytes)                                       │
//! │   Magic: "ARKS" (4) | Version: u16 (2)                  │
//! │   CustomCount: u32 (4) | ObjectCount: u32 (4)           │
//! ├─────────────────────────────────────────────────────────┤
//! │ Custom Section (variable)                               │
//! │   [KeyLen: u32][ValLen: u32][Key][Value]                │
//! ├─────────────────────────────────────────────────────────┤
//! │ Object Section (variable)                               │
//! │   [Key: 16][ValLen: u32][Value]                         │
//! ├─────────────────────────────────────────────────────────┤
//! │ Footer (8 bytes)                                        │
//! │   DataCRC: u32 (4) | Padding (4)                        │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod reader;
mod writer;

pub use reader::SnapshotReader;
pub use writer::SnapshotWriter;

/// Magic bytes identifying a snapshot file
pub(crate) const MAGIC: &[u8; 4] = b"ARKS";

/// Current snapshot format version
pub(crate) const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + CustomCount (4) + ObjectCount (4) = 14 bytes
pub(crate) const HEADER_SIZE: u64 = 14;

/// Footer size: DataCRC (4) + Padding (4) = 8 bytes
pub(crate) const FOOTER_SIZE: u64 = 8;
