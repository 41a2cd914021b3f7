//! Byte-signature fast paths
//!
//! These lookups scan raw blob bytes for fixed markers instead of decoding
//! the property stream. They duplicate format knowledge held by the decoder:
//! if the save layout changes, both must be updated together.
//!
//! ```text
//! link:        [04 42 56 10][link id: u32 BE]
//! tamed name:  [51 DA 5A 7C] ... +25: [len: u32 LE][text: len-1][NUL]
//! tamed flag:  [LE name id of the tamed-flag property] anywhere
//! ```

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::warn;

use crate::names::NameTable;

/// Marker followed by the id linking an instance to its status blob
pub const LINK_MARKER: [u8; 4] = [0x04, 0x42, 0x56, 0x10];

/// Marker of the tamed-name property
pub const TAMED_NAME_MARKER: [u8; 4] = [0x51, 0xDA, 0x5A, 0x7C];

/// Offset of the name length, counted from the start of the marker
const TAMED_NAME_LENGTH_OFFSET: usize = 25;

fn find_marker(blob: &[u8], marker: &[u8; 4]) -> Option<usize> {
    blob.windows(marker.len()).position(|window| window == marker)
}

/// Link id following the first link marker, read big-endian
pub fn status_link_id(blob: &[u8]) -> Option<u32> {
    let at = find_marker(blob, &LINK_MARKER)? + LINK_MARKER.len();
    blob.get(at..at + 4).map(BigEndian::read_u32)
}

/// Tamed name, if the blob carries one
pub fn tamed_name(blob: &[u8]) -> Option<String> {
    let marker = find_marker(blob, &TAMED_NAME_MARKER)?;
    let len_at = marker + TAMED_NAME_LENGTH_OFFSET;
    let len = blob.get(len_at..len_at + 4).map(LittleEndian::read_u32)? as usize;
    if len == 0 {
        return None;
    }

    let text_at = len_at + 4;
    let text = blob.get(text_at..text_at.checked_add(len - 1)?)?;
    std::str::from_utf8(text).ok().map(str::to_string)
}

/// Markers resolved once per session
#[derive(Debug, Clone, Default)]
pub struct Signatures {
    /// Little-endian name id whose presence flags a creature as tamed
    tamed_marker: Option<[u8; 4]>,
}

impl Signatures {
    /// Resolve the tamed marker from the name of the tamed-flag property.
    ///
    /// If the name is missing from the table, no blob is considered tamed.
    pub fn from_names(names: &NameTable, tamed_flag_property: &str) -> Self {
        match names.reverse_lookup(tamed_flag_property) {
            Ok(id) => Self::with_tamed_marker(id.to_le_bytes()),
            Err(_) => {
                warn!(
                    "Tamed flag property {:?} not in name table, no creature will count as tamed",
                    tamed_flag_property
                );
                Self::default()
            }
        }
    }

    /// Use an explicit tamed marker
    pub fn with_tamed_marker(marker: [u8; 4]) -> Self {
        Self {
            tamed_marker: Some(marker),
        }
    }

    pub fn tamed_marker(&self) -> Option<[u8; 4]> {
        self.tamed_marker
    }

    /// Whether the tamed marker occurs anywhere in the blob
    pub fn is_tamed(&self, blob: &[u8]) -> bool {
        match &self.tamed_marker {
            Some(marker) => find_marker(blob, marker).is_some(),
            None => false,
        }
    }
}
