//! SyncWatch - Live sync-progress monitoring for blockchain nodes
//!
//! This library polls the diagnostics HTTP API of one or more node processes
//! and merges the partially-overlapping status feeds (snapshot download,
//! snapshot indexing, sync-stage list) into one consistent per-node view
//! model with display-ready derived metrics.
//!
//! # Features
//!
//! - **Multi-Node Tracking**: One record store keyed by opaque node id
//! - **Last Known Good**: Partial or malformed telemetry never erases
//!   previously committed state
//! - **Single-Step Merge**: Download and indexing statuses are produced
//!   together from one payload, so they never drift
//! - **Pure Projections**: All display figures derive from the record with
//!   no side effects
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use syncwatch::{poll_cycle, total_sync_time, DiagnosticsClient, SyncStore, TrackedNode};
//!
//! # async fn example() {
//! let store = Arc::new(SyncStore::new());
//! let node = TrackedNode::new(
//!     "node-1",
//!     DiagnosticsClient::new("http://127.0.0.1:6060/debug/diagnostics"),
//! );
//!
//! poll_cycle(&store, &[node]).await;
//!
//! if let Some(record) = store.get("node-1") {
//!     println!("Total sync time: {}", total_sync_time(&record));
//! }
//! # }
//! ```

pub mod error;
pub mod fetch;
pub mod merge;
pub mod poller;
pub mod stages;
pub mod store;
pub mod types;
pub mod view;

pub use error::MonitorError;
pub use fetch::DiagnosticsClient;
pub use merge::{
    merge_snapshot_status, non_beacon_segment_count, SnapshotDownloadStatus,
    SnapshotIndexingStatus, SnapshotSegment,
};
pub use poller::{apply_snapshot_sync, poll_cycle, poll_node, run_poll_loop, TrackedNode};
pub use stages::{
    expand_stages, position_of, resolve_stages, SyncStageDescriptor, SyncStages, SNAPSHOTS_STAGE,
};
pub use store::{SyncRecord, SyncStore};
pub use types::{
    MonitorConfig, NodeFlags, NodeVersion, RawSnapshotDownload, RawSnapshotIndexing,
    RawSyncStages, ReorgReport, SnapshotFilesList, SnapshotSyncPayload,
};
pub use view::{
    classify_phase, percent_downloaded, percent_string, row_display_name, row_number,
    row_progress, row_state, row_total_time, secs_to_hms, total_sync_time, SnapshotSyncPhase,
};
