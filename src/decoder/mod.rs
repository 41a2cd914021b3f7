//! Decoder Module
//!
//! Turns a raw object blob into an ordered sequence of typed properties.
//!
//! ## Blob Layout
//! ```text
//! ┌──────────┬──────────────────┬─────────────────────────┬─────────────┐
//! │ Class(4) │ Header (25 | 33) │ Property stream         │ Footer (32) │
//! └──────────┴──────────────────┴─────────────────────────┴─────────────┘
//! ```
//!
//! ## Property Entry
//! ```text
//! ┌──────────┬──────────┬──────────┬──────────┬───────────────────────┐
//! │ Name (4) │ -1 (4)   │ Type (4) │ -1 (4)   │ Type-specific payload │
//! └──────────┴──────────┴──────────┴──────────┴───────────────────────┘
//! ```
//!
//! Every handler consumes exactly the bytes its framing declares. One
//! miscounted byte desynchronizes every entry after it, so a type without a
//! declared length (an unrecognized tag) stops decoding of the object.

mod cursor;
mod handlers;
mod stream;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::names::NameId;

pub use stream::{decode_object, DecodedObject, PropertyStream};

/// Size of the class id at the start of every blob
pub const CLASS_ID_SIZE: usize = 4;

/// Trailing bytes of every blob that are not properties
pub const FOOTER_SIZE: usize = 32;

/// Name (4) + marker (4) + type (4) + marker (4)
pub const ENTRY_HEAD_SIZE: usize = 16;

// =============================================================================
// Blob Kinds
// =============================================================================

/// Which kind of object a blob holds; decides the header length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlobKind {
    /// Creature actor instance
    Instance,
    /// Creature status component
    Status,
}

impl BlobKind {
    /// Header bytes between the class id and the property stream
    pub fn header_len(self) -> usize {
        match self {
            BlobKind::Instance => 25,
            BlobKind::Status => 33,
        }
    }

    /// Offset of the first property entry
    pub fn stream_start(self) -> usize {
        CLASS_ID_SIZE + self.header_len()
    }

    /// Smallest blob that holds a class id, header and footer
    pub fn min_blob_len(self) -> usize {
        self.stream_start() + FOOTER_SIZE
    }
}

// =============================================================================
// Property Types
// =============================================================================

/// Property type, resolved from the type tag's name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PropertyTag {
    Bool,
    Byte,
    Str,
    Name,
    Float,
    Double,
    Int8,
    Int,
    UInt16,
    UInt32,
    Int64,
    UInt64,
    Struct,
    Object,
    Array,
    /// Any other type name; carries the name as found
    Unknown(String),
}

impl PropertyTag {
    /// Map an engine type name to a tag
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "BoolProperty" => PropertyTag::Bool,
            "ByteProperty" => PropertyTag::Byte,
            "StrProperty" => PropertyTag::Str,
            "NameProperty" => PropertyTag::Name,
            "FloatProperty" => PropertyTag::Float,
            "DoubleProperty" => PropertyTag::Double,
            "Int8Property" => PropertyTag::Int8,
            "IntProperty" => PropertyTag::Int,
            "UInt16Property" => PropertyTag::UInt16,
            "UInt32Property" => PropertyTag::UInt32,
            "Int64Property" => PropertyTag::Int64,
            "UInt64Property" => PropertyTag::UInt64,
            "StructProperty" => PropertyTag::Struct,
            "ObjectProperty" => PropertyTag::Object,
            "ArrayProperty" => PropertyTag::Array,
            other => PropertyTag::Unknown(other.to_string()),
        }
    }

    /// Engine type name of the tag
    pub fn type_name(&self) -> &str {
        match self {
            PropertyTag::Bool => "BoolProperty",
            PropertyTag::Byte => "ByteProperty",
            PropertyTag::Str => "StrProperty",
            PropertyTag::Name => "NameProperty",
            PropertyTag::Float => "FloatProperty",
            PropertyTag::Double => "DoubleProperty",
            PropertyTag::Int8 => "Int8Property",
            PropertyTag::Int => "IntProperty",
            PropertyTag::UInt16 => "UInt16Property",
            PropertyTag::UInt32 => "UInt32Property",
            PropertyTag::Int64 => "Int64Property",
            PropertyTag::UInt64 => "UInt64Property",
            PropertyTag::Struct => "StructProperty",
            PropertyTag::Object => "ObjectProperty",
            PropertyTag::Array => "ArrayProperty",
            PropertyTag::Unknown(name) => name,
        }
    }
}

impl fmt::Display for PropertyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// 8-byte name reference: id plus instance number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameRef {
    pub id: NameId,
    pub name: String,
    pub number: u32,
}

/// A decoded property value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PropertyValue {
    Bool(bool),
    Byte(u8),
    /// 8-byte ByteProperty value: an enum entry name
    Enum(NameRef),
    Str(String),
    Name(NameRef),
    Float(f32),
    Double(f64),
    Int8(i8),
    Int(i32),
    UInt16(u16),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
}

impl PropertyValue {
    /// Non-negative integer values as u32
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            PropertyValue::Byte(v) => Some(u32::from(v)),
            PropertyValue::Int8(v) => u32::try_from(v).ok(),
            PropertyValue::Int(v) => u32::try_from(v).ok(),
            PropertyValue::UInt16(v) => Some(u32::from(v)),
            PropertyValue::UInt32(v) => Some(v),
            PropertyValue::Int64(v) => u32::try_from(v).ok(),
            PropertyValue::UInt64(v) => u32::try_from(v).ok(),
            _ => None,
        }
    }

    /// 32-bit integer values bit for bit, so a negative `Int` keeps its
    /// bits instead of being rejected. Narrower unsigned values widen.
    pub fn as_raw_u32(&self) -> Option<u32> {
        match *self {
            PropertyValue::Int(v) => Some(v as u32),
            PropertyValue::UInt32(v) => Some(v),
            PropertyValue::Byte(_) | PropertyValue::UInt16(_) => self.as_u32(),
            _ => None,
        }
    }

    /// Integer values as i64
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            PropertyValue::Byte(v) => Some(i64::from(v)),
            PropertyValue::Int8(v) => Some(i64::from(v)),
            PropertyValue::Int(v) => Some(i64::from(v)),
            PropertyValue::UInt16(v) => Some(i64::from(v)),
            PropertyValue::UInt32(v) => Some(i64::from(v)),
            PropertyValue::Int64(v) => Some(v),
            PropertyValue::UInt64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }
}

// =============================================================================
// Entry Outcomes
// =============================================================================

/// Why a supported property's value was stepped over
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Declared length does not fit the type
    LengthMismatch { expected: Vec<u32>, declared: u32 },
    /// String bytes are not valid UTF-8 or UTF-16
    InvalidText,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::LengthMismatch { expected, declared } => write!(
                f,
                "declared length {} (expected one of {:?})",
                declared, expected
            ),
            SkipReason::InvalidText => f.write_str("text is not valid UTF-8 or UTF-16"),
        }
    }
}

/// Property types that are stepped over by declared length
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UnsupportedKind {
    /// Struct with its inner struct type name (Vector, Quat, ...)
    Struct(String),
    Object,
    /// Array with its element type name
    Array(String),
}

impl fmt::Display for UnsupportedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnsupportedKind::Struct(inner) => write!(f, "StructProperty<{}>", inner),
            UnsupportedKind::Object => f.write_str("ObjectProperty"),
            UnsupportedKind::Array(inner) => write!(f, "ArrayProperty<{}>", inner),
        }
    }
}

/// Result of decoding one entry's payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DecodeOutcome {
    Decoded(PropertyValue),
    Skipped(SkipReason),
    Unsupported(UnsupportedKind),
}

impl DecodeOutcome {
    /// The value, if decoded
    pub fn value(&self) -> Option<&PropertyValue> {
        match self {
            DecodeOutcome::Decoded(value) => Some(value),
            _ => None,
        }
    }
}

/// One decoded property
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyEntry {
    pub name_id: NameId,
    pub name: String,
    pub tag: PropertyTag,
    pub value: DecodeOutcome,
    /// Array index, for types whose framing carries one
    pub index: Option<u32>,
    /// Offset of the entry's name field within the blob
    pub offset: usize,
    /// Bytes occupied by the entry, head included
    pub consumed: usize,
}

// =============================================================================
// Errors
// =============================================================================

/// Failures that stop decoding of the rest of an object
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Blob too short: {len} bytes, need at least {min}")]
    BlobTooShort { len: usize, min: usize },

    #[error("Truncated read at offset {offset}: need {needed} bytes, {available} before footer")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Unrecognized property type {tag} ({type_id}) at offset {offset}")]
    UnrecognizedTag {
        tag: String,
        type_id: NameId,
        offset: usize,
    },

    #[error("{remaining} leftover bytes at offset {offset} cannot hold a property")]
    Leftover { offset: usize, remaining: usize },
}

impl DecodeError {
    /// Blob offset where decoding stopped
    pub fn offset(&self) -> usize {
        match *self {
            DecodeError::BlobTooShort { .. } => 0,
            DecodeError::Truncated { offset, .. } => offset,
            DecodeError::UnrecognizedTag { offset, .. } => offset,
            DecodeError::Leftover { offset, .. } => offset,
        }
    }
}
