//! Raw payload types for the diagnostics API and the monitor configuration.
//!
//! Everything the backend sends is treated as best-effort: every field is
//! `#[serde(default)]` so absent or null values decode to zero/false/empty
//! instead of failing the poll.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// One snapshot segment as reported by the download status feed.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSnapshotSegment {
    /// Segment name (e.g. `"snapshots-bodies"`, `"beaconblocks-1"`).
    pub name: String,
    /// Bytes downloaded so far for this segment.
    pub downloaded: u64,
    /// Total bytes for this segment.
    pub total: u64,
}

/// Raw snapshot download status as reported by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSnapshotDownload {
    /// Bytes downloaded across all segments.
    pub downloaded: u64,
    /// Total bytes to download.
    pub total: u64,
    /// Number of snapshot files the torrent client knows about.
    pub files: u64,
    /// Number of files whose torrent metadata has been resolved.
    pub torrent_metadata_ready: u64,
    /// True once the bulk download has completed.
    pub download_finished: bool,
    /// Per-segment progress. May be empty on early polls.
    pub segments: Vec<RawSnapshotSegment>,
    /// Seconds elapsed in the interval covered by this report.
    #[serde(rename = "totalTime")]
    pub total_time_sec: f64,
}

/// One indexing segment as reported by the indexing status feed.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawIndexSegment {
    /// Segment name, matching the download segment naming.
    pub name: String,
    /// Indexing completion for this segment, 0-100.
    pub percent: f64,
}

/// Raw snapshot indexing status as reported by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSnapshotIndexing {
    /// Per-segment indexing progress.
    pub segments: Vec<RawIndexSegment>,
    /// Seconds elapsed in the interval covered by this report.
    #[serde(rename = "totalTime")]
    pub total_time_sec: f64,
}

/// Raw sync-stage listing as reported by the backend.
///
/// `current_stage` is 1-based; the backend is known to emit `0` transiently,
/// which the resolver corrects. `stages_list` may be null.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSyncStages {
    /// 1-based index of the stage the node is currently in.
    pub current_stage: u64,
    /// Ordered stage names, or null when the node has not reported them yet.
    pub stages_list: Option<Vec<String>>,
}

/// The combined snapshot-sync payload returned by `fetchSnapshotSync`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotSyncPayload {
    pub snapshot_download: RawSnapshotDownload,
    pub snapshot_indexing: RawSnapshotIndexing,
    pub sync_stages: RawSyncStages,
}

/// Snapshot files listing returned by `fetchSnapshotFilesList`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SnapshotFilesList {
    pub files: Vec<String>,
}

/// Node version report (simple 1:1 mapping, no aggregation).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeVersion {
    pub node_version: u64,
    pub supported_version: u64,
    pub git_commit: String,
}

/// Command-line flags the node was started with, keyed by flag name (simple
/// 1:1 mapping, no aggregation). Values keep their raw JSON shape since flag
/// types vary by node.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct NodeFlags {
    pub flags: BTreeMap<String, serde_json::Value>,
}

/// Result of a reorg scan (simple 1:1 mapping, no aggregation).
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ReorgReport {
    /// Total blocks scanned.
    #[serde(rename = "TotalScanned")]
    pub total_scanned: u64,
    /// Block numbers where a reorg was detected. May be null on the wire.
    #[serde(rename = "WrongBlocks")]
    pub wrong_blocks: Option<Vec<u64>>,
    /// Scan duration in milliseconds.
    #[serde(rename = "TimeTook")]
    pub time_took: f64,
}

/// Configuration for the monitor.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use syncwatch::MonitorConfig;
///
/// let config = MonitorConfig {
///     diagnostics_url: "http://127.0.0.1:6060/debug/diagnostics".to_string(),
///     poll_interval: Duration::from_secs(2),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Base URL of the node's diagnostics API.
    pub diagnostics_url: String,
    /// How often to poll each tracked node (default: 2s).
    ///
    /// Note: the poll interval is also the effective retry cadence. A failed
    /// fetch is logged and skipped; the next cycle simply polls again.
    pub poll_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            diagnostics_url: "http://127.0.0.1:6060/debug/diagnostics".to_string(),
            poll_interval: Duration::from_secs(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default_to_zero_and_false() {
        let payload: SnapshotSyncPayload = serde_json::from_str("{}").unwrap();
        assert_eq!(payload.snapshot_download.downloaded, 0);
        assert_eq!(payload.snapshot_download.total, 0);
        assert!(!payload.snapshot_download.download_finished);
        assert!(payload.snapshot_download.segments.is_empty());
        assert_eq!(payload.sync_stages.current_stage, 0);
        assert!(payload.sync_stages.stages_list.is_none());
    }

    #[test]
    fn decodes_camel_case_wire_names() {
        let raw = r#"{
            "snapshotDownload": {
                "downloaded": 50,
                "total": 100,
                "files": 2,
                "torrentMetadataReady": 2,
                "downloadFinished": false,
                "segments": [{"name": "snapshots-bodies", "downloaded": 50, "total": 100}],
                "totalTime": 5.0
            },
            "snapshotIndexing": {
                "segments": [{"name": "snapshots-bodies", "percent": 10.0}],
                "totalTime": 1.5
            },
            "syncStages": {
                "currentStage": 0,
                "stagesList": ["Snapshots", "Execution"]
            }
        }"#;

        let payload: SnapshotSyncPayload = serde_json::from_str(raw).unwrap();
        assert_eq!(payload.snapshot_download.downloaded, 50);
        assert_eq!(payload.snapshot_download.torrent_metadata_ready, 2);
        assert_eq!(payload.snapshot_download.total_time_sec, 5.0);
        assert_eq!(payload.snapshot_indexing.segments.len(), 1);
        assert_eq!(payload.sync_stages.current_stage, 0);
        assert_eq!(
            payload.sync_stages.stages_list.as_deref(),
            Some(["Snapshots".to_string(), "Execution".to_string()].as_slice())
        );
    }

    #[test]
    fn node_version_decodes_wire_names() {
        let version: NodeVersion = serde_json::from_str(
            r#"{"nodeVersion": 2, "supportedVersion": 2, "gitCommit": "4a1b2c3d"}"#,
        )
        .unwrap();
        assert_eq!(version.node_version, 2);
        assert_eq!(version.supported_version, 2);
        assert_eq!(version.git_commit, "4a1b2c3d");
    }

    #[test]
    fn node_flags_decode_as_a_map_of_raw_values() {
        let flags: NodeFlags = serde_json::from_str(
            r#"{"datadir": "/var/lib/node", "maxpeers": 100, "snapshots": true}"#,
        )
        .unwrap();
        assert_eq!(flags.flags.len(), 3);
        assert_eq!(flags.flags["datadir"], "/var/lib/node");
        assert_eq!(flags.flags["maxpeers"], 100);
        assert_eq!(flags.flags["snapshots"], true);
    }

    #[test]
    fn reorg_report_tolerates_null_wrong_blocks() {
        let report: ReorgReport =
            serde_json::from_str(r#"{"TotalScanned": 1000, "WrongBlocks": null, "TimeTook": 1.2}"#)
                .unwrap();
        assert_eq!(report.total_scanned, 1000);
        assert!(report.wrong_blocks.is_none());
    }
}
