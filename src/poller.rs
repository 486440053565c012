//! Polling loop wiring: per node, per metric category, independent requests.
//!
//! Each fetch runs as its own spawned task and applies its own store upsert
//! when it succeeds. A transport failure is logged and skipped; it never
//! cancels or delays sibling fetches for the same or other nodes, and it
//! never touches the previously committed record. There is no retry here:
//! the next poll cycle supersedes whatever this one missed.

use crate::fetch::DiagnosticsClient;
use crate::merge::merge_snapshot_status;
use crate::stages::resolve_stages;
use crate::store::SyncStore;
use crate::types::{MonitorConfig, SnapshotSyncPayload};
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, warn};

/// One node under observation: its opaque id and a client for its
/// diagnostics API.
#[derive(Debug, Clone)]
pub struct TrackedNode {
    pub node_id: String,
    pub client: DiagnosticsClient,
}

impl TrackedNode {
    pub fn new(node_id: impl Into<String>, client: DiagnosticsClient) -> Self {
        Self {
            node_id: node_id.into(),
            client,
        }
    }
}

/// Applies one snapshot-sync payload to the store for `node_id`.
///
/// The merge reads the previous record and produces both snapshot statuses
/// from this single payload, then commits them together. Stage resolution is
/// committed separately and only when it yields a non-empty stage list; a
/// rejected resolution leaves the previously committed stages in place.
pub fn apply_snapshot_sync(store: &SyncStore, node_id: &str, payload: &SnapshotSyncPayload) {
    let previous = store.get(node_id);

    let (download_status, index_status) = merge_snapshot_status(
        previous.as_ref().map(|r| &r.download_status),
        previous.as_ref().map(|r| &r.index_status),
        &payload.snapshot_download,
        &payload.snapshot_indexing,
    );
    store.upsert_snapshot(node_id, download_status, index_status);

    match resolve_stages(
        payload.sync_stages.current_stage,
        payload.sync_stages.stages_list.as_deref(),
    ) {
        Some(sync_stages) => store.upsert_stages(node_id, sync_stages),
        None => debug!(
            "Empty stage list for node '{}', retaining previous stages",
            node_id
        ),
    }
}

/// Runs one poll cycle for a single node.
///
/// The snapshot-sync fetch and the files-list fetch are spawned as
/// independent tasks; each commits its own result.
pub async fn poll_node(store: Arc<SyncStore>, node: TrackedNode) {
    let sync_task = {
        let store = Arc::clone(&store);
        let node = node.clone();
        tokio::spawn(async move {
            match node.client.fetch_snapshot_sync().await {
                Ok(payload) => apply_snapshot_sync(&store, &node.node_id, &payload),
                Err(e) => warn!(
                    "Error fetching snapshot sync for node '{}': {}",
                    node.node_id, e
                ),
            }
        })
    };

    let files_task = {
        let store = Arc::clone(&store);
        let node = node.clone();
        tokio::spawn(async move {
            match node.client.fetch_snapshot_files_list().await {
                Ok(listing) => store.upsert_files(&node.node_id, listing.files),
                Err(e) => warn!(
                    "Error fetching snapshot files list for node '{}': {}",
                    node.node_id, e
                ),
            }
        })
    };

    for result in join_all([sync_task, files_task]).await {
        if let Err(e) = result {
            warn!("Poll task panicked for node '{}': {}", node.node_id, e);
        }
    }
}

/// Runs one poll cycle across all tracked nodes concurrently.
pub async fn poll_cycle(store: &Arc<SyncStore>, nodes: &[TrackedNode]) {
    let polls = nodes
        .iter()
        .map(|node| poll_node(Arc::clone(store), node.clone()));
    join_all(polls).await;
}

/// Polls all tracked nodes forever at the configured cadence.
///
/// The rendering side reads the store on its own schedule; nothing here
/// blocks it. A cycle that overruns the interval simply delays the next tick.
pub async fn run_poll_loop(store: Arc<SyncStore>, nodes: Vec<TrackedNode>, config: MonitorConfig) {
    let mut ticker = tokio::time::interval(config.poll_interval);
    loop {
        ticker.tick().await;
        poll_cycle(&store, &nodes).await;
    }
}
