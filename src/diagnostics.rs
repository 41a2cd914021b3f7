//! Recoverable conditions
//!
//! Anything that degrades a result without aborting the query is reported as
//! a [`Diagnostic`], attached to the record it concerns or, for creatures that
//! were excluded, to the query output.

use std::fmt;

use serde::Serialize;

use crate::names::NameId;
use crate::store::ObjectKey;

/// A recoverable problem observed while building results
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An id had no entry in the name table; the sentinel was substituted
    UnknownName { id: NameId, offset: usize },

    /// Several ids share a name; the first was used
    AmbiguousNameLookup { name: String, ids: Vec<NameId> },

    /// A property type the decoder only skips over
    UnsupportedPropertyType { property: String, tag: String },

    /// A supported property whose value could not be interpreted
    SkippedValue { property: String, reason: String },

    /// Decoding of an object stopped early; entries before `offset` were kept
    DecodeAborted { object: ObjectKey, offset: usize, error: String },

    /// A stat-bearing property carried an index outside the stat mapping
    StatIndexOutOfRange { property: String, index: u32 },

    /// An instance blob had no creature id property
    MissingCreatureId { object: ObjectKey, property: String },

    /// A tamed instance blob had no status link marker
    MissingLinkId { object: ObjectKey },

    /// No status blob matched the creature's link id
    MissingStatusBlob { object: ObjectKey, link_id: u32 },

    /// Several status blobs matched; the first was used
    AmbiguousRangeMatch { object: ObjectKey, link_id: u32, matches: usize },

    /// The tamed-flag property is not in the name table, so no creature
    /// counts as tamed
    TamedFlagUnresolved { property: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownName { id, offset } => {
                write!(f, "unknown name id {} at offset {}", id, offset)
            }
            Diagnostic::AmbiguousNameLookup { name, ids } => match ids.first() {
                Some(first) => {
                    write!(f, "name {:?} maps to {} ids, using {}", name, ids.len(), first)
                }
                None => write!(f, "name {:?} is ambiguous", name),
            },
            Diagnostic::UnsupportedPropertyType { property, tag } => {
                write!(f, "property {} has unsupported type {}", property, tag)
            }
            Diagnostic::SkippedValue { property, reason } => {
                write!(f, "property {} skipped: {}", property, reason)
            }
            Diagnostic::DecodeAborted { object, offset, error } => {
                write!(f, "decoding {} stopped at offset {}: {}", object, offset, error)
            }
            Diagnostic::StatIndexOutOfRange { property, index } => {
                write!(f, "property {} has stat index {} outside the mapping", property, index)
            }
            Diagnostic::MissingCreatureId { object, property } => {
                write!(f, "{} has no {} property", object, property)
            }
            Diagnostic::MissingLinkId { object } => {
                write!(f, "{} has no status link marker", object)
            }
            Diagnostic::MissingStatusBlob { object, link_id } => {
                write!(f, "{} has no status blob for link id {:#010x}", object, link_id)
            }
            Diagnostic::AmbiguousRangeMatch { object, link_id, matches } => write!(
                f,
                "{} matched {} status blobs for link id {:#010x}, using the first",
                object, matches, link_id
            ),
            Diagnostic::TamedFlagUnresolved { property } => write!(
                f,
                "tamed flag property {:?} is not in the name table, no creature counts as tamed",
                property
            ),
        }
    }
}
