//! Object Locator
//!
//! Finds objects without a secondary index by turning "objects of class X" and
//! "status blob of creature N" into byte ranges over stored *values*.
//!
//! ## Range Layout
//! ```text
//! class range:   low  = LE(id)                  high = LE(id + 2^24)
//! status range:  low  = STATUS_PREFIX ++ BE(n)  high = STATUS_PREFIX ++ BE(n + 1)
//! ```
//!
//! Every value blob starts with its 4-byte class id, so a class range scan
//! returns exactly one class's instances whatever bytes follow the id.

use tracing::{debug, warn};

use crate::error::Result;
use crate::names::NameId;
use crate::store::{ObjectScan, SaveStore, StoredObject, ValueRange};

/// Range width of a class scan: the id's most significant LE byte
pub const CLASS_RANGE_STEP: u32 = 1 << 24;

/// Fixed leading bytes of every Rex status-component blob. The last four bytes
/// are the link marker; the creature's link id follows big-endian.
pub const STATUS_PREFIX: [u8; 28] = [
    0xE9, 0x79, 0x20, 0xCD, // status component class id
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x02, 0x00, 0x00, 0x00, //
    0x0C, 0x55, 0x42, 0x8D, //
    0x00, 0x00, 0x00, 0x00, //
    0x04, 0x42, 0x56, 0x10, // link marker
];

/// Byte order of the value encoded after a range prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    fn encode(self, value: u32) -> [u8; 4] {
        match self {
            Endian::Little => value.to_le_bytes(),
            Endian::Big => value.to_be_bytes(),
        }
    }

    /// Position of the byte a step increments
    fn stepped_byte(self, step: u32) -> usize {
        let lowest = (step.trailing_zeros() / 8) as usize;
        match self {
            Endian::Little => lowest,
            Endian::Big => 3 - lowest,
        }
    }
}

/// Build `[prefix ++ enc(value), prefix ++ enc(value + step))`.
///
/// When `value + step` overflows, the upper bound becomes the lexicographic
/// successor of the low bound truncated after the stepped byte, or unbounded
/// when there is none.
pub fn build_range_filter(prefix: &[u8], value: u32, step: u32, order: Endian) -> ValueRange {
    let mut low = Vec::with_capacity(prefix.len() + 4);
    low.extend_from_slice(prefix);
    low.extend_from_slice(&order.encode(value));

    let high = match value.checked_add(step) {
        Some(next) => {
            let mut high = Vec::with_capacity(prefix.len() + 4);
            high.extend_from_slice(prefix);
            high.extend_from_slice(&order.encode(next));
            Some(high)
        }
        None => {
            let cut = prefix.len() + order.stepped_byte(step.max(1)) + 1;
            lexicographic_successor(&low[..cut])
        }
    };

    ValueRange { low, high }
}

/// Smallest byte string greater than every string starting with `bytes`
fn lexicographic_successor(bytes: &[u8]) -> Option<Vec<u8>> {
    let mut out = bytes.to_vec();
    while let Some(last) = out.pop() {
        if last < u8::MAX {
            out.push(last + 1);
            return Some(out);
        }
    }
    None
}

/// Range holding every object whose class is `id`
pub fn class_range(id: NameId) -> ValueRange {
    build_range_filter(&[], id.0, CLASS_RANGE_STEP, Endian::Little)
}

/// Range holding the status blob linked to `object_id`
pub fn status_range(object_id: u32) -> ValueRange {
    build_range_filter(&STATUS_PREFIX, object_id, 1, Endian::Big)
}

/// Outcome of a status blob lookup
#[derive(Debug, Clone, PartialEq)]
pub enum StatusMatch {
    NotFound,
    Unique(StoredObject),
    /// Several rows matched; the first one is used
    Ambiguous { first: StoredObject, matches: usize },
}

impl StatusMatch {
    /// The row a caller should use, first-row-wins
    pub fn into_first(self) -> Option<StoredObject> {
        match self {
            StatusMatch::NotFound => None,
            StatusMatch::Unique(object) => Some(object),
            StatusMatch::Ambiguous { first, .. } => Some(first),
        }
    }
}

/// Runs locator ranges against a store
pub struct ObjectLocator<'a, S: SaveStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: SaveStore + ?Sized> ObjectLocator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Every object of class `id`
    pub fn find_class_objects(&self, id: NameId) -> Result<ObjectScan<'a>> {
        debug!("Class scan for {}", id);
        self.store.scan_value_range(&class_range(id))
    }

    /// The status blob linked to `object_id`
    pub fn find_status_blob(&self, object_id: u32) -> Result<StatusMatch> {
        let mut rows = self.store.scan_value_range(&status_range(object_id))?;

        let first = match rows.next() {
            Some(row) => row?,
            None => return Ok(StatusMatch::NotFound),
        };

        let mut matches = 1;
        for row in rows {
            row?;
            matches += 1;
        }

        if matches == 1 {
            Ok(StatusMatch::Unique(first))
        } else {
            warn!(
                "Status lookup for link id {:#010x} matched {} rows, using the first",
                object_id, matches
            );
            Ok(StatusMatch::Ambiguous { first, matches })
        }
    }
}
