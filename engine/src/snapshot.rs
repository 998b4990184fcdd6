//! Snapshots for persisting and restoring a [`MemoryStore`].
//!
//! Collections are keyed in a BTreeMap for deterministic serialization.
//! Records inside a collection keep insertion order because that order is
//! the tie-break for equal order values.

use crate::{error::Result, CollectionName, Error, MemoryStore, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Version of the snapshot format for future compatibility.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// One stored record and its soft-delete flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRow {
    pub record: Record,
    #[serde(default)]
    pub trashed: bool,
}

/// The rows of one collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSnapshot {
    #[serde(default)]
    pub soft_deletes: bool,
    pub rows: Vec<SnapshotRow>,
}

/// A point-in-time snapshot of a memory store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    /// Snapshot format version
    pub format_version: u32,
    /// Collections by name
    pub collections: BTreeMap<CollectionName, CollectionSnapshot>,
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreSnapshot {
    /// Create a new empty snapshot.
    pub fn new() -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            collections: BTreeMap::new(),
        }
    }

    /// Count total records across all collections, trashed included.
    pub fn record_count(&self) -> usize {
        self.collections.values().map(|c| c.rows.len()).sum()
    }

    /// Serialize to JSON with deterministic ordering.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidInput(e.to_string()))
    }

    /// Serialize to pretty JSON with deterministic ordering.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidInput(e.to_string()))
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidInput(e.to_string()))?;

        if snapshot.format_version > SNAPSHOT_FORMAT_VERSION {
            return Err(Error::InvalidInput(format!(
                "unsupported snapshot format version: {} (max supported: {})",
                snapshot.format_version, SNAPSHOT_FORMAT_VERSION
            )));
        }

        Ok(snapshot)
    }
}

impl MemoryStore<Record> {
    /// Export every collection.
    pub fn export_state(&self) -> StoreSnapshot {
        let collections = self
            .collection_names()
            .filter_map(|name| {
                let collection = self.collection(name)?;
                let rows = collection
                    .rows()
                    .map(|(record, trashed)| SnapshotRow {
                        record: record.clone(),
                        trashed,
                    })
                    .collect();
                Some((
                    name.clone(),
                    CollectionSnapshot {
                        soft_deletes: collection.soft_deletes(),
                        rows,
                    },
                ))
            })
            .collect();

        StoreSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            collections,
        }
    }

    /// Build a store from a snapshot. Every record comes back clean.
    pub fn import_state(snapshot: StoreSnapshot) -> Result<Self> {
        let mut store: MemoryStore = MemoryStore::new();
        for (name, collection) in snapshot.collections {
            store = if collection.soft_deletes {
                store.with_soft_deletes(name.clone())
            } else {
                store.with_collection(name.clone())
            };
            for row in collection.rows {
                store.load(&name, row.record, row.trashed)?;
            }
        }
        Ok(store)
    }
}
