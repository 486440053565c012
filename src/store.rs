//! Per-node record store for merged sync state.
//!
//! One record per tracked node, keyed by the node's opaque id. Upserts
//! replace only the field group they carry; everything else on the record is
//! retained. Records are never evicted here: entries live until an external
//! caller removes them.

use crate::merge::{SnapshotDownloadStatus, SnapshotIndexingStatus};
use crate::stages::SyncStages;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// The merged sync state for one tracked node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SyncRecord {
    pub node_id: String,
    pub download_status: SnapshotDownloadStatus,
    pub index_status: SnapshotIndexingStatus,
    pub sync_stages: SyncStages,
}

/// Keyed-by-node-id store holding the latest merged record per node.
///
/// Each upsert is a single lock-guarded map mutation, so a node's record is
/// never observed half-written. Polls for different nodes only contend on the
/// map lock itself.
#[derive(Default)]
pub struct SyncStore {
    records: RwLock<HashMap<String, SyncRecord>>,
    /// Snapshot file listings, keyed by node id. Kept beside the sync records
    /// because the files feed arrives on its own cadence and has no merge
    /// step, only replacement.
    files: RwLock<HashMap<String, Vec<String>>>,
}

impl SyncStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the snapshot download/indexing statuses for `node_id`,
    /// creating the record when this is the first poll for that node.
    ///
    /// This is the record-creating path: both statuses arrive together from a
    /// single merge step, so a new record is never created with only half of
    /// the snapshot state.
    pub fn upsert_snapshot(
        &self,
        node_id: &str,
        download_status: SnapshotDownloadStatus,
        index_status: SnapshotIndexingStatus,
    ) {
        let mut records = self.records.write().unwrap();
        let record = records
            .entry(node_id.to_string())
            .or_insert_with(|| SyncRecord {
                node_id: node_id.to_string(),
                ..Default::default()
            });
        record.download_status = download_status;
        record.index_status = index_status;
    }

    /// Replaces the committed stage state for `node_id`.
    ///
    /// Stages may arrive later than the snapshot statuses but never before a
    /// record exists; a stages-only upsert for an unknown node is dropped.
    pub fn upsert_stages(&self, node_id: &str, sync_stages: SyncStages) {
        let mut records = self.records.write().unwrap();
        match records.get_mut(node_id) {
            Some(record) => record.sync_stages = sync_stages,
            None => {
                debug!("Dropping stages for unknown node '{}'", node_id);
            }
        }
    }

    /// Replaces the snapshot file listing for `node_id`.
    pub fn upsert_files(&self, node_id: &str, files: Vec<String>) {
        self.files
            .write()
            .unwrap()
            .insert(node_id.to_string(), files);
    }

    /// Returns a clone of the latest record for `node_id`, if any.
    pub fn get(&self, node_id: &str) -> Option<SyncRecord> {
        self.records.read().unwrap().get(node_id).cloned()
    }

    /// Returns the latest snapshot file listing for `node_id`, if any.
    pub fn files(&self, node_id: &str) -> Option<Vec<String>> {
        self.files.read().unwrap().get(node_id).cloned()
    }

    /// Node ids currently tracked, in no particular order.
    pub fn node_ids(&self) -> Vec<String> {
        self.records.read().unwrap().keys().cloned().collect()
    }
}
