//! Per-type payload handlers
//!
//! Each handler starts right after the entry head and leaves the cursor on
//! the next entry's name field.
//!
//! | Type | Payload after the head |
//! |------|------------------------|
//! | Bool | pad 8, value 1, pad 1 |
//! | Byte | len 4, index 4, enum name 8, flag 1, value `len` |
//! | Str | size 4, pad 5, str_len 4, text `str_len` (UTF-16 units when negative) |
//! | Name | len 4, pad 5, name ref 8 |
//! | numeric | len 4, index 4, flag 1, value `len` |
//! | Struct | len 4, index 4, struct name 8, pad 5, payload `len` |
//! | Object | len 4, pad 5, payload `len` |
//! | Array | len 4, index 4, element name 8, flag 1, payload `len` |

use byteorder::{ByteOrder, LittleEndian};
use tracing::warn;

use crate::names::{NameId, NameTable};

use super::cursor::BlobCursor;
use super::{
    DecodeError, DecodeOutcome, NameRef, PropertyTag, PropertyValue, SkipReason,
    UnsupportedKind,
};

/// Pad bytes after a Bool's 8-byte preamble
const BOOL_PREAMBLE: usize = 8;

/// Index (4) + guid flag (1) skipped by Str, Name and Object
const SHORT_PAD: usize = 5;

/// Fixed bytes between a Struct's length and its payload
const STRUCT_PAD: usize = 17;

/// Payload of one handler call
pub(super) struct Decoded {
    pub value: DecodeOutcome,
    pub index: Option<u32>,
}

impl Decoded {
    fn new(value: DecodeOutcome, index: Option<u32>) -> Self {
        Self { value, index }
    }
}

/// Dispatch on the entry's type tag
pub(super) fn decode_payload(
    tag: &PropertyTag,
    type_id: NameId,
    head_offset: usize,
    cursor: &mut BlobCursor<'_>,
    names: &NameTable,
) -> Result<Decoded, DecodeError> {
    match tag {
        PropertyTag::Bool => decode_bool(cursor),
        PropertyTag::Byte => decode_byte(cursor, names),
        PropertyTag::Str => decode_str(cursor),
        PropertyTag::Name => decode_name(cursor, names),
        PropertyTag::Float | PropertyTag::Double => decode_real(cursor),
        PropertyTag::Int8 => decode_fixed(cursor, 1, |b| PropertyValue::Int8(b[0] as i8)),
        PropertyTag::Int => decode_fixed(cursor, 4, |b| {
            PropertyValue::Int(LittleEndian::read_i32(b))
        }),
        PropertyTag::UInt16 => decode_fixed(cursor, 2, |b| {
            PropertyValue::UInt16(LittleEndian::read_u16(b))
        }),
        PropertyTag::UInt32 => decode_fixed(cursor, 4, |b| {
            PropertyValue::UInt32(LittleEndian::read_u32(b))
        }),
        PropertyTag::Int64 => decode_fixed(cursor, 8, |b| {
            PropertyValue::Int64(LittleEndian::read_i64(b))
        }),
        PropertyTag::UInt64 => decode_fixed(cursor, 8, |b| {
            PropertyValue::UInt64(LittleEndian::read_u64(b))
        }),
        PropertyTag::Struct => decode_struct(cursor, names),
        PropertyTag::Object => decode_object_ref(cursor),
        PropertyTag::Array => decode_array(cursor, names),
        PropertyTag::Unknown(tag) => {
            warn!(
                "Unrecognized property type {} ({}) at offset {}",
                tag, type_id, head_offset
            );
            Err(DecodeError::UnrecognizedTag {
                tag: tag.clone(),
                type_id,
                offset: head_offset,
            })
        }
    }
}

fn read_name_ref(cursor: &mut BlobCursor<'_>, names: &NameTable) -> Result<NameRef, DecodeError> {
    let id = cursor.read_name_id()?;
    let number = cursor.read_u32()?;
    Ok(NameRef {
        id,
        name: names.resolve(id).to_string(),
        number,
    })
}

fn decode_bool(cursor: &mut BlobCursor<'_>) -> Result<Decoded, DecodeError> {
    cursor.skip(BOOL_PREAMBLE)?;
    let value = cursor.read_u8()? != 0;
    cursor.skip(1)?;
    Ok(Decoded::new(
        DecodeOutcome::Decoded(PropertyValue::Bool(value)),
        None,
    ))
}

fn decode_byte(cursor: &mut BlobCursor<'_>, names: &NameTable) -> Result<Decoded, DecodeError> {
    let len = cursor.read_u32()?;
    let index = cursor.read_u32()?;
    let _enum_type = read_name_ref(cursor, names)?;
    cursor.skip(1)?;

    let value = match len {
        1 => DecodeOutcome::Decoded(PropertyValue::Byte(cursor.read_u8()?)),
        // The 8-byte form is read as a little-endian name id plus an ignored
        // instance number. Whether some saves frame it big-endian is unknown.
        8 => DecodeOutcome::Decoded(PropertyValue::Enum(read_name_ref(cursor, names)?)),
        other => {
            cursor.skip(other as usize)?;
            DecodeOutcome::Skipped(SkipReason::LengthMismatch {
                expected: vec![1, 8],
                declared: other,
            })
        }
    };

    Ok(Decoded::new(value, Some(index)))
}

fn decode_str(cursor: &mut BlobCursor<'_>) -> Result<Decoded, DecodeError> {
    let size = cursor.read_u32()?;
    cursor.skip(SHORT_PAD)?;
    let len = cursor.read_i32()?;

    // `size` covers the length field and the text. A negative length counts
    // UTF-16 units.
    let text_bytes = size.saturating_sub(4) as usize;
    let implied = if len < 0 {
        u64::from(len.unsigned_abs()) * 2
    } else {
        len as u64
    };

    if implied != text_bytes as u64 {
        warn!(
            "StrProperty length {} disagrees with size {} at offset {}, skipped",
            len,
            size,
            cursor.position()
        );
        cursor.skip(text_bytes)?;
        return Ok(Decoded::new(
            DecodeOutcome::Skipped(SkipReason::LengthMismatch {
                expected: vec![u32::try_from(implied + 4).unwrap_or(u32::MAX)],
                declared: size,
            }),
            None,
        ));
    }

    if text_bytes == 0 {
        return Ok(Decoded::new(
            DecodeOutcome::Decoded(PropertyValue::Str(String::new())),
            None,
        ));
    }

    let raw = cursor.take(text_bytes)?;
    let text = if len < 0 {
        decode_utf16(raw)
    } else {
        // Drop the NUL terminator
        std::str::from_utf8(&raw[..text_bytes - 1])
            .ok()
            .map(str::to_string)
    };
    let value = match text {
        Some(text) => DecodeOutcome::Decoded(PropertyValue::Str(text)),
        None => DecodeOutcome::Skipped(SkipReason::InvalidText),
    };
    Ok(Decoded::new(value, None))
}

/// Little-endian UTF-16 with a trailing NUL unit
fn decode_utf16(raw: &[u8]) -> Option<String> {
    let mut units: Vec<u16> = raw.chunks_exact(2).map(LittleEndian::read_u16).collect();
    if units.last() == Some(&0) {
        units.pop();
    }
    String::from_utf16(&units).ok()
}

fn decode_name(cursor: &mut BlobCursor<'_>, names: &NameTable) -> Result<Decoded, DecodeError> {
    let _len = cursor.read_u32()?;
    cursor.skip(SHORT_PAD)?;
    let name = read_name_ref(cursor, names)?;
    Ok(Decoded::new(
        DecodeOutcome::Decoded(PropertyValue::Name(name)),
        None,
    ))
}

fn decode_real(cursor: &mut BlobCursor<'_>) -> Result<Decoded, DecodeError> {
    let len = cursor.read_u32()?;
    let index = cursor.read_u32()?;
    cursor.skip(1)?;

    let value = match len {
        4 => DecodeOutcome::Decoded(PropertyValue::Float(cursor.read_f32()?)),
        8 => DecodeOutcome::Decoded(PropertyValue::Double(cursor.read_f64()?)),
        other => {
            warn!(
                "Floating point property with length {} at offset {}, skipped",
                other,
                cursor.position()
            );
            cursor.skip(other as usize)?;
            DecodeOutcome::Skipped(SkipReason::LengthMismatch {
                expected: vec![4, 8],
                declared: other,
            })
        }
    };

    Ok(Decoded::new(value, Some(index)))
}

/// Shared framing of the fixed-width integer types
fn decode_fixed(
    cursor: &mut BlobCursor<'_>,
    width: usize,
    read: impl FnOnce(&[u8]) -> PropertyValue,
) -> Result<Decoded, DecodeError> {
    let len = cursor.read_u32()?;
    let index = cursor.read_u32()?;
    cursor.skip(1)?;

    let value = if len as usize == width {
        DecodeOutcome::Decoded(read(cursor.take(width)?))
    } else {
        cursor.skip(len as usize)?;
        DecodeOutcome::Skipped(SkipReason::LengthMismatch {
            expected: vec![width as u32],
            declared: len,
        })
    };

    Ok(Decoded::new(value, Some(index)))
}

fn decode_struct(cursor: &mut BlobCursor<'_>, names: &NameTable) -> Result<Decoded, DecodeError> {
    let len = cursor.read_u32()?;
    let index = cursor.read_u32()?;
    let inner = read_name_ref(cursor, names)?;
    cursor.skip(STRUCT_PAD - 12)?;
    cursor.skip(len as usize)?;

    // Vector, Quat, DinoAncestorsEntry and the rest are stepped over alike
    Ok(Decoded::new(
        DecodeOutcome::Unsupported(UnsupportedKind::Struct(inner.name)),
        Some(index),
    ))
}

fn decode_object_ref(cursor: &mut BlobCursor<'_>) -> Result<Decoded, DecodeError> {
    let len = cursor.read_u32()?;
    cursor.skip(SHORT_PAD + len as usize)?;
    Ok(Decoded::new(
        DecodeOutcome::Unsupported(UnsupportedKind::Object),
        None,
    ))
}

fn decode_array(cursor: &mut BlobCursor<'_>, names: &NameTable) -> Result<Decoded, DecodeError> {
    let len = cursor.read_u32()?;
    let index = cursor.read_u32()?;
    let element = read_name_ref(cursor, names)?;
    cursor.skip(1 + len as usize)?;
    Ok(Decoded::new(
        DecodeOutcome::Unsupported(UnsupportedKind::Array(element.name)),
        Some(index),
    ))
}
