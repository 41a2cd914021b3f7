//! Creature record assembly
//!
//! Two steps, so callers can drop untamed or unlinked creatures before paying
//! for the status lookup:
//! 1. [`CreatureRecordBuilder::inspect_instance`] reads the instance blob
//! 2. [`CreatureRecordBuilder::build`] adds the status blob

use tracing::debug;

use crate::decoder::{decode_object, BlobKind, DecodedObject};
use crate::diagnostics::Diagnostic;
use crate::names::{NameId, NameTable};
use crate::store::{ObjectKey, StoredObject};

use super::properties;
use super::signatures::{self, Signatures};
use super::{CreatureId, CreatureRecord, StatPoints};

/// What an instance blob says about its creature
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceSummary {
    pub key: ObjectKey,
    pub class_id: NameId,
    pub class_name: String,
    pub creature_id: CreatureId,
    /// Id of the linked status blob, if the link marker is present
    pub link_id: Option<u32>,
    pub tamed: bool,
    pub tamed_name: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Builds [`CreatureRecord`]s from instance and status blobs
pub struct CreatureRecordBuilder<'a> {
    names: &'a NameTable,
    signatures: &'a Signatures,
}

impl<'a> CreatureRecordBuilder<'a> {
    pub fn new(names: &'a NameTable, signatures: &'a Signatures) -> Self {
        Self { names, signatures }
    }

    /// Decode an instance blob and run the signature lookups on it
    pub fn inspect_instance(&self, instance: &StoredObject) -> InstanceSummary {
        let blob = &instance.value;
        let decoded = decode_object(blob, BlobKind::Instance, self.names);
        let mut diagnostics = decoded.diagnostics.clone();
        push_abort(&decoded, instance.key, &mut diagnostics);

        // Ids are random 32-bit values; an IntProperty id keeps its bits
        let mut creature_id = CreatureId::default();
        for (name, slot) in [
            (properties::DINO_ID_1, &mut creature_id.id1),
            (properties::DINO_ID_2, &mut creature_id.id2),
        ] {
            let value = decoded.find(name).and_then(|e| e.value.value());
            match value.and_then(|v| v.as_raw_u32()) {
                Some(id) => *slot = id,
                None => diagnostics.push(Diagnostic::MissingCreatureId {
                    object: instance.key,
                    property: name.to_string(),
                }),
            }
        }

        InstanceSummary {
            key: instance.key,
            class_id: decoded.class_id,
            class_name: decoded.class_name,
            creature_id,
            link_id: signatures::status_link_id(blob),
            tamed: self.signatures.is_tamed(blob),
            tamed_name: signatures::tamed_name(blob),
            diagnostics,
        }
    }

    /// Combine an inspected instance with its status blob.
    ///
    /// Returns `None` for creatures that are not tamed.
    pub fn build(&self, summary: InstanceSummary, status: &StoredObject) -> Option<CreatureRecord> {
        if !summary.tamed {
            debug!("{} is not tamed, no record", summary.key);
            return None;
        }

        let decoded = decode_object(&status.value, BlobKind::Status, self.names);
        let mut diagnostics = summary.diagnostics;
        diagnostics.extend(decoded.diagnostics.iter().cloned());
        push_abort(&decoded, status.key, &mut diagnostics);

        let mut base_points = StatPoints::default();
        let mut tamed_points = StatPoints::default();
        let mut mutation_points = StatPoints::default();
        let mut base_level = None;

        for entry in &decoded.entries {
            let group = match entry.name.as_str() {
                properties::BASE_POINTS => &mut base_points,
                properties::TAMED_POINTS => &mut tamed_points,
                properties::MUTATION_POINTS => &mut mutation_points,
                properties::BASE_LEVEL => {
                    base_level = entry
                        .value
                        .value()
                        .and_then(|v| v.as_i64())
                        .and_then(|v| i32::try_from(v).ok());
                    continue;
                }
                _ => continue,
            };

            // Skipped values are already reported by the decoder
            let Some(points) = entry.value.value().and_then(|v| v.as_u32()) else {
                continue;
            };
            let index = entry.index.unwrap_or(0);
            if !group.apply(index, points) {
                diagnostics.push(Diagnostic::StatIndexOutOfRange {
                    property: entry.name.clone(),
                    index,
                });
            }
        }

        Some(CreatureRecord {
            class_name: summary.class_name,
            instance_key: summary.key,
            status_key: status.key,
            creature_id: summary.creature_id,
            link_id: summary.link_id.unwrap_or_default(),
            tamed_name: summary.tamed_name,
            base_level,
            base_points,
            tamed_points,
            mutation_points,
            diagnostics,
        })
    }
}

fn push_abort(decoded: &DecodedObject, object: ObjectKey, out: &mut Vec<Diagnostic>) {
    if let Some(error) = &decoded.error {
        out.push(Diagnostic::DecodeAborted {
            object,
            offset: error.offset(),
            error: error.to_string(),
        });
    }
}
