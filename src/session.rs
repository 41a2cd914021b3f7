//! Session Module
//!
//! The context every query runs in: one store handle plus the name table
//! built from it.
//!
//! ## Responsibilities
//! - Read the header record and build the name table on open
//! - Resolve the session's byte signatures
//! - Run class queries: scan, link, decode, group
//! - Answer name lookups for diagnostic tooling

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::config::Config;
use crate::creature::{signatures, CreatureRecord, CreatureRecordBuilder, Signatures};
use crate::diagnostics::Diagnostic;
use crate::error::{ArkError, Result};
use crate::locator::{ObjectLocator, StatusMatch};
use crate::names::{NameId, NameTable};
use crate::store::{
    MemoryStore, ObjectScan, SaveStore, SnapshotReader, SqliteStore, StoredObject,
};

/// Result of a creature query
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryOutput {
    /// Records grouped by blueprint class name
    pub creatures: BTreeMap<String, Vec<CreatureRecord>>,
    /// Problems that excluded creatures or affected the whole query
    pub diagnostics: Vec<Diagnostic>,
}

impl QueryOutput {
    /// Every record, class by class
    pub fn records(&self) -> impl Iterator<Item = &CreatureRecord> {
        self.creatures.values().flatten()
    }

    /// Number of records
    pub fn total(&self) -> usize {
        self.creatures.values().map(Vec::len).sum()
    }
}

/// A tamed instance paired with its status blob
struct LinkedPair {
    instance: StoredObject,
    status: StoredObject,
    /// Number of status rows that matched, when more than one
    ambiguous: Option<(u32, usize)>,
}

/// Read-only session over a save container
///
/// ## Concurrency Model
///
/// - Store access is sequential: one class scan, then one status lookup per
///   tamed candidate
/// - Decoding of instance/status pairs fans out over `worker_threads`
///   scoped threads; the name table is shared by reference
pub struct Session<S: SaveStore> {
    /// Session configuration
    config: Config,

    /// Store handle, released by `close()`
    store: S,

    /// Name table built from the header record
    names: NameTable,

    /// Markers resolved against the name table
    signatures: Signatures,
}

impl Session<SqliteStore> {
    /// Open the save database named by `config.save_path`
    pub fn open_save(config: Config) -> Result<Self> {
        let store = SqliteStore::open(&config.save_path)?;
        Self::open(store, config)
    }
}

impl Session<MemoryStore> {
    /// Open the snapshot file named by `config.snapshot_path`
    pub fn open_snapshot(config: Config) -> Result<Self> {
        let store = SnapshotReader::open(&config.snapshot_path)?;
        Self::open(store, config)
    }
}

impl<S: SaveStore> Session<S> {
    /// Open a session over a store
    ///
    /// On open:
    /// 1. Validate config
    /// 2. Read the header record
    /// 3. Build the name table
    /// 4. Resolve the tamed marker
    pub fn open(store: S, config: Config) -> Result<Self> {
        config.validate()?;

        let header = store
            .custom_record(&config.header_key)?
            .ok_or_else(|| ArkError::MissingHeader(config.header_key.clone()))?;

        let names = NameTable::from_header(&header)?;
        let signatures = Signatures::from_names(&names, &config.tamed_flag_property);

        info!(
            "Session opened: {} names, {} header strings",
            names.len(),
            names.header_strings().len()
        );

        Ok(Self {
            config,
            store,
            names,
            signatures,
        })
    }

    /// Extract tamed creatures, optionally restricted to one class
    ///
    /// Steps:
    /// 1. Class range scan (or full scan without a filter)
    /// 2. Keep tamed instances, find each one's status blob
    /// 3. Decode instance/status pairs into records
    /// 4. Group records by class name
    pub fn query(&self, class_filter: Option<&str>) -> Result<QueryOutput> {
        let mut output = QueryOutput::default();
        let locator = ObjectLocator::new(&self.store);

        if self.signatures.tamed_marker().is_none() {
            output.diagnostics.push(Diagnostic::TamedFlagUnresolved {
                property: self.config.tamed_flag_property.clone(),
            });
        }

        // Step 1: Pick the scan
        let scan: ObjectScan<'_> = match class_filter {
            Some(class) => {
                let ids = self.names.reverse_lookup_all(class);
                let Some(&id) = ids.first() else {
                    return Err(ArkError::NameNotFound(class.to_string()));
                };
                if ids.len() > 1 {
                    output.diagnostics.push(Diagnostic::AmbiguousNameLookup {
                        name: class.to_string(),
                        ids: ids.clone(),
                    });
                }
                output.creatures.insert(class.to_string(), Vec::new());
                locator.find_class_objects(id)?
            }
            None => self.store.scan_all()?,
        };

        // Step 2: Tamed candidates and their status blobs
        let mut pairs = Vec::new();
        let mut scanned = 0usize;
        for row in scan {
            let instance = row?;
            scanned += 1;

            if !self.signatures.is_tamed(&instance.value) {
                trace!("{} not tamed, skipped", instance.key);
                continue;
            }

            let Some(link_id) = signatures::status_link_id(&instance.value) else {
                output.diagnostics.push(Diagnostic::MissingLinkId {
                    object: instance.key,
                });
                continue;
            };

            match locator.find_status_blob(link_id)? {
                StatusMatch::NotFound => {
                    output.diagnostics.push(Diagnostic::MissingStatusBlob {
                        object: instance.key,
                        link_id,
                    });
                }
                StatusMatch::Unique(status) => pairs.push(LinkedPair {
                    instance,
                    status,
                    ambiguous: None,
                }),
                StatusMatch::Ambiguous { first, matches } => pairs.push(LinkedPair {
                    instance,
                    status: first,
                    ambiguous: Some((link_id, matches)),
                }),
            }
        }

        debug!(
            "Scanned {} objects, {} linked tamed candidates",
            scanned,
            pairs.len()
        );

        // Step 3: Decode
        let records = self.decode_pairs(&pairs)?;

        // Step 4: Group
        for record in records.into_iter().flatten() {
            output
                .creatures
                .entry(record.class_name.clone())
                .or_default()
                .push(record);
        }

        info!(
            "Query {:?}: {} records, {} diagnostics",
            class_filter,
            output.total(),
            output.diagnostics.len()
        );

        Ok(output)
    }

    /// Decode pairs, in parallel when configured. Output order follows input.
    fn decode_pairs(&self, pairs: &[LinkedPair]) -> Result<Vec<Option<CreatureRecord>>> {
        let builder = CreatureRecordBuilder::new(&self.names, &self.signatures);
        let workers = self.config.worker_threads;

        if workers <= 1 || pairs.len() <= 1 {
            return Ok(pairs.iter().map(|pair| decode_pair(&builder, pair)).collect());
        }

        let chunk_size = pairs.len().div_ceil(workers);
        let builder = &builder;

        let chunks = crossbeam::thread::scope(|scope| {
            let handles: Vec<_> = pairs
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move |_| {
                        chunk
                            .iter()
                            .map(|pair| decode_pair(builder, pair))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<std::thread::Result<Vec<_>>>()
        })
        .map_err(|_| ArkError::Worker("decode scope panicked".to_string()))?
        .map_err(|_| ArkError::Worker("decode worker panicked".to_string()))?;

        Ok(chunks.into_iter().flatten().collect())
    }

    /// Every stored object of a class, raw
    pub fn objects_of_class(&self, class: &str) -> Result<Vec<StoredObject>> {
        let id = self.names.reverse_lookup(class)?;
        ObjectLocator::new(&self.store)
            .find_class_objects(id)?
            .collect()
    }

    /// Resolve a name id (sentinel when unknown)
    pub fn resolve_name(&self, id: NameId) -> &str {
        self.names.resolve(id)
    }

    /// Find the id of a name (first match)
    pub fn reverse_lookup_name(&self, name: &str) -> Result<NameId> {
        self.names.reverse_lookup(name)
    }

    /// Release the session, handing the store back
    pub fn close(self) -> S {
        debug!("Session closed");
        self.store
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the name table
    pub fn names(&self) -> &NameTable {
        &self.names
    }

    /// Get the resolved signatures
    pub fn signatures(&self) -> &Signatures {
        &self.signatures
    }

    /// Get the store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn decode_pair(builder: &CreatureRecordBuilder<'_>, pair: &LinkedPair) -> Option<CreatureRecord> {
    let summary = builder.inspect_instance(&pair.instance);
    let mut record = builder.build(summary, &pair.status)?;
    if let Some((link_id, matches)) = pair.ambiguous {
        record.diagnostics.push(Diagnostic::AmbiguousRangeMatch {
            object: pair.instance.key,
            link_id,
            matches,
        });
    }
    Some(record)
}
