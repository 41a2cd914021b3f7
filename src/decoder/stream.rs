//! Property stream iteration
//!
//! [`PropertyStream`] walks a blob lazily, one entry per `next()`.
//! [`decode_object`] drains a stream and gathers diagnostics.

use tracing::trace;

use crate::diagnostics::Diagnostic;
use crate::names::{NameId, NameTable};

use super::cursor::BlobCursor;
use super::handlers::decode_payload;
use super::{
    BlobKind, DecodeError, DecodeOutcome, PropertyEntry, PropertyTag, PropertyValue,
    CLASS_ID_SIZE, ENTRY_HEAD_SIZE, FOOTER_SIZE,
};

/// Lazy iterator over a blob's properties.
///
/// Yields entries in declaration order. After the first error it yields
/// nothing more; to start over, build a new stream.
pub struct PropertyStream<'a> {
    cursor: BlobCursor<'a>,
    names: &'a NameTable,
    class_id: NameId,
    done: bool,
}

impl<'a> PropertyStream<'a> {
    /// Position a stream on the first property of `blob`
    pub fn new(blob: &'a [u8], kind: BlobKind, names: &'a NameTable) -> Result<Self, DecodeError> {
        let min = kind.min_blob_len();
        if blob.len() < min {
            return Err(DecodeError::BlobTooShort {
                len: blob.len(),
                min,
            });
        }

        let class_id = NameId(u32::from_le_bytes([blob[0], blob[1], blob[2], blob[3]]));
        let start = kind.stream_start();
        let end = blob.len() - FOOTER_SIZE;

        Ok(Self {
            cursor: BlobCursor::new(&blob[start..end], start),
            names,
            class_id,
            done: false,
        })
    }

    /// Class id from the blob's first four bytes
    pub fn class_id(&self) -> NameId {
        self.class_id
    }

    /// Current blob offset
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    fn next_entry(&mut self) -> Result<PropertyEntry, DecodeError> {
        let offset = self.cursor.position();

        let name_id = self.cursor.read_name_id()?;
        self.cursor.skip(4)?;
        let type_id = self.cursor.read_name_id()?;
        self.cursor.skip(4)?;

        let tag = PropertyTag::from_type_name(self.names.resolve(type_id));
        let decoded = decode_payload(&tag, type_id, offset, &mut self.cursor, self.names)?;

        let entry = PropertyEntry {
            name_id,
            name: self.names.resolve(name_id).to_string(),
            tag,
            value: decoded.value,
            index: decoded.index,
            offset,
            consumed: self.cursor.position() - offset,
        };
        trace!(
            "Property {} ({}) at {}: {:?}",
            entry.name,
            entry.tag,
            entry.offset,
            entry.value
        );
        Ok(entry)
    }
}

impl<'a> Iterator for PropertyStream<'a> {
    type Item = Result<PropertyEntry, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let remaining = self.cursor.remaining();
        if remaining == 0 {
            self.done = true;
            return None;
        }
        if remaining < ENTRY_HEAD_SIZE {
            self.done = true;
            return Some(Err(DecodeError::Leftover {
                offset: self.cursor.position(),
                remaining,
            }));
        }

        let result = self.next_entry();
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

// =============================================================================
// Whole-object decoding
// =============================================================================

/// Every property of one blob, plus what went wrong along the way
#[derive(Debug, Clone)]
pub struct DecodedObject {
    pub class_id: NameId,
    pub class_name: String,
    pub kind: BlobKind,
    /// Entries decoded before any fatal error
    pub entries: Vec<PropertyEntry>,
    /// Recoverable per-entry problems
    pub diagnostics: Vec<Diagnostic>,
    /// The error that stopped decoding, if any
    pub error: Option<DecodeError>,
}

impl DecodedObject {
    /// Whether the whole stream was decoded
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// First entry with the given name
    pub fn find(&self, name: &str) -> Option<&PropertyEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Every entry with the given name, in declaration order
    pub fn find_all<'s>(&'s self, name: &'s str) -> impl Iterator<Item = &'s PropertyEntry> + 's {
        self.entries.iter().filter(move |e| e.name == name)
    }

    /// Bytes accounted for: class id, header, entries and footer
    pub fn bytes_consumed(&self) -> usize {
        let entries: usize = self.entries.iter().map(|e| e.consumed).sum();
        CLASS_ID_SIZE + self.kind.header_len() + entries + FOOTER_SIZE
    }
}

/// Decode every property of `blob`.
///
/// Never fails outright: a fatal decode error is kept in
/// [`DecodedObject::error`] next to the entries read before it.
pub fn decode_object(blob: &[u8], kind: BlobKind, names: &NameTable) -> DecodedObject {
    let mut stream = match PropertyStream::new(blob, kind, names) {
        Ok(stream) => stream,
        Err(error) => {
            let class_id = if blob.len() >= CLASS_ID_SIZE {
                NameId(u32::from_le_bytes([blob[0], blob[1], blob[2], blob[3]]))
            } else {
                NameId(0)
            };
            return DecodedObject {
                class_id,
                class_name: names.resolve(class_id).to_string(),
                kind,
                entries: Vec::new(),
                diagnostics: Vec::new(),
                error: Some(error),
            };
        }
    };

    let class_id = stream.class_id();
    let mut object = DecodedObject {
        class_id,
        class_name: names.resolve(class_id).to_string(),
        kind,
        entries: Vec::new(),
        diagnostics: Vec::new(),
        error: None,
    };

    if !names.contains(class_id) {
        object.diagnostics.push(Diagnostic::UnknownName {
            id: class_id,
            offset: 0,
        });
    }

    for result in &mut stream {
        match result {
            Ok(entry) => {
                collect_entry_diagnostics(&entry, names, &mut object.diagnostics);
                object.entries.push(entry);
            }
            Err(error) => object.error = Some(error),
        }
    }

    object
}

fn collect_entry_diagnostics(entry: &PropertyEntry, names: &NameTable, out: &mut Vec<Diagnostic>) {
    if !names.contains(entry.name_id) {
        out.push(Diagnostic::UnknownName {
            id: entry.name_id,
            offset: entry.offset,
        });
    }

    match &entry.value {
        DecodeOutcome::Decoded(PropertyValue::Name(name_ref))
        | DecodeOutcome::Decoded(PropertyValue::Enum(name_ref)) => {
            if !names.contains(name_ref.id) {
                out.push(Diagnostic::UnknownName {
                    id: name_ref.id,
                    offset: entry.offset,
                });
            }
        }
        DecodeOutcome::Decoded(_) => {}
        DecodeOutcome::Skipped(reason) => out.push(Diagnostic::SkippedValue {
            property: entry.name.clone(),
            reason: reason.to_string(),
        }),
        DecodeOutcome::Unsupported(kind) => out.push(Diagnostic::UnsupportedPropertyType {
            property: entry.name.clone(),
            tag: kind.to_string(),
        }),
    }
}
