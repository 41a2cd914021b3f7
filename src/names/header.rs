//! Header record parsing
//!
//! Splits the raw `SaveHeader` custom record into its string list and its
//! (id, name) pairs.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use tracing::{debug, warn};

use crate::error::{ArkError, Result};

use super::NameId;

/// Size of the uninterpreted preamble at the start of the header record
pub const PREAMBLE_SIZE: usize = 18;

/// Bytes skipped between the string list and the name entries
const SECTION_GAP: u64 = 8;

/// Marker that follows every header string
const STRING_TRAILER: u32 = u32::MAX;

/// Parsed contents of a header record
#[derive(Debug, Clone, Default)]
pub struct HeaderRecord {
    /// Strings of the first section, in order (map and package paths)
    pub strings: Vec<String>,

    /// Name entries, in header order
    pub names: Vec<(NameId, String)>,
}

impl HeaderRecord {
    /// Parse a header record
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < PREAMBLE_SIZE {
            return Err(ArkError::HeaderFormat(format!(
                "record is {} bytes, preamble alone needs {}",
                bytes.len(),
                PREAMBLE_SIZE
            )));
        }

        let mut cursor = Cursor::new(&bytes[PREAMBLE_SIZE..]);

        let mut strings = Vec::new();
        while let Some(s) = read_string(&mut cursor)? {
            strings.push(s);
            let trailer = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
            if trailer != STRING_TRAILER {
                warn!(
                    "Header string {:?} followed by {:#010x}, expected -1",
                    strings.last(),
                    trailer
                );
            }
        }

        skip(&mut cursor, SECTION_GAP)?;

        let total = cursor.get_ref().len() as u64;
        let mut names = Vec::new();
        while cursor.position() < total {
            let id = NameId(cursor.read_u32::<LittleEndian>().map_err(truncated)?);
            match read_string(&mut cursor)? {
                Some(name) => names.push((id, name)),
                None => debug!("Name entry {} has an empty string, skipped", id),
            }
        }

        debug!(
            "Parsed header: {} strings, {} names",
            strings.len(),
            names.len()
        );

        Ok(Self { strings, names })
    }
}

/// Read a length-prefixed, NUL-terminated string. A zero length yields `None`.
fn read_string(cursor: &mut Cursor<&[u8]>) -> Result<Option<String>> {
    let len = cursor.read_u32::<LittleEndian>().map_err(truncated)? as usize;
    if len == 0 {
        return Ok(None);
    }

    let remaining = cursor.get_ref().len() - cursor.position() as usize;
    if len > remaining {
        return Err(ArkError::HeaderFormat(format!(
            "string of {} bytes at offset {} overruns record ({} left)",
            len,
            cursor.position() as usize + PREAMBLE_SIZE,
            remaining
        )));
    }

    let mut raw = vec![0u8; len];
    cursor.read_exact(&mut raw)?;
    raw.truncate(len - 1);

    String::from_utf8(raw)
        .map(Some)
        .map_err(|e| ArkError::HeaderFormat(format!("string is not UTF-8: {}", e)))
}

fn skip(cursor: &mut Cursor<&[u8]>, count: u64) -> Result<()> {
    let target = cursor.position() + count;
    if target > cursor.get_ref().len() as u64 {
        return Err(ArkError::HeaderFormat(format!(
            "cannot skip {} bytes at offset {}",
            count,
            cursor.position() as usize + PREAMBLE_SIZE
        )));
    }
    cursor.set_position(target);
    Ok(())
}

fn truncated(e: std::io::Error) -> ArkError {
    ArkError::HeaderFormat(format!("record truncated: {}", e))
}
