//! Snapshot metrics merging.
//!
//! The backend reports download status and indexing status as two independent
//! feeds that are only consistent when derived from the same poll. The merge
//! here produces both updated records in a single step from one raw payload
//! plus the previously known per-node state, so the two never drift across
//! separate mutations.

use crate::types::{RawSnapshotDownload, RawSnapshotIndexing};
use serde::{Deserialize, Serialize};

/// Substring marking beacon-chain segments. These index on a different
/// timeline and are excluded from indexing-segment counts so they don't skew
/// the completion percentage.
pub const BEACON_SEGMENT_MARKER: &str = "beaconblocks";

/// One snapshot segment in the merged record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SnapshotSegment {
    pub name: String,
    pub downloaded: u64,
    pub total: u64,
}

/// Merged snapshot download status for one node.
///
/// `total_time` accumulates the per-interval elapsed seconds reported by each
/// poll; it is appended to, never replaced.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SnapshotDownloadStatus {
    pub downloaded: u64,
    pub total: u64,
    pub files: u64,
    pub torrent_metadata_ready: u64,
    pub download_finished: bool,
    pub segments: Vec<SnapshotSegment>,
    pub total_time: Vec<f64>,
}

/// Merged snapshot indexing status for one node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SnapshotIndexingStatus {
    /// Average indexing completion across non-beacon segments, 0-100.
    pub progress: f64,
    pub total_time: Vec<f64>,
}

/// Counts the segments that participate in indexing progress (everything
/// whose name does not contain [`BEACON_SEGMENT_MARKER`]).
pub fn non_beacon_segment_count(segments: &[SnapshotSegment]) -> usize {
    segments
        .iter()
        .filter(|seg| !seg.name.contains(BEACON_SEGMENT_MARKER))
        .count()
}

/// Merges one poll's raw download and indexing payloads with the previously
/// known statuses into updated records.
///
/// The non-beacon segment count comes from the *previous* download status
/// (zero when no record exists yet), since the indexing feed does not carry a
/// segment list of its own. This merge never fails: absent upstream data
/// degrades to zeros rather than propagating an error.
pub fn merge_snapshot_status(
    prev_download: Option<&SnapshotDownloadStatus>,
    prev_index: Option<&SnapshotIndexingStatus>,
    raw_download: &RawSnapshotDownload,
    raw_index: &RawSnapshotIndexing,
) -> (SnapshotDownloadStatus, SnapshotIndexingStatus) {
    let segment_count = prev_download
        .map(|d| non_beacon_segment_count(&d.segments))
        .unwrap_or(0);

    let index_status = merge_index_status(prev_index, raw_index, segment_count);
    let download_status = merge_download_status(prev_download, raw_download);

    (download_status, index_status)
}

fn merge_index_status(
    previous: Option<&SnapshotIndexingStatus>,
    raw: &RawSnapshotIndexing,
    segment_count: usize,
) -> SnapshotIndexingStatus {
    let progress = if segment_count == 0 {
        0.0
    } else {
        let summed: f64 = raw
            .segments
            .iter()
            .filter(|seg| !seg.name.contains(BEACON_SEGMENT_MARKER))
            .map(|seg| seg.percent)
            .sum();
        summed / segment_count as f64
    };

    let mut total_time = previous.map(|p| p.total_time.clone()).unwrap_or_default();
    total_time.push(raw.total_time_sec);

    SnapshotIndexingStatus {
        progress,
        total_time,
    }
}

fn merge_download_status(
    previous: Option<&SnapshotDownloadStatus>,
    raw: &RawSnapshotDownload,
) -> SnapshotDownloadStatus {
    // Early polls sometimes report an empty segment list; carry the previous
    // segments forward so the indexing divisor does not collapse to zero.
    let segments = if raw.segments.is_empty() {
        previous.map(|p| p.segments.clone()).unwrap_or_default()
    } else {
        raw.segments
            .iter()
            .map(|seg| SnapshotSegment {
                name: seg.name.clone(),
                downloaded: seg.downloaded,
                total: seg.total,
            })
            .collect()
    };

    let mut total_time = previous.map(|p| p.total_time.clone()).unwrap_or_default();
    total_time.push(raw.total_time_sec);

    SnapshotDownloadStatus {
        downloaded: raw.downloaded,
        total: raw.total,
        files: raw.files,
        torrent_metadata_ready: raw.torrent_metadata_ready,
        download_finished: raw.download_finished,
        segments,
        total_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RawIndexSegment, RawSnapshotSegment};

    fn seg(name: &str) -> SnapshotSegment {
        SnapshotSegment {
            name: name.to_string(),
            downloaded: 0,
            total: 0,
        }
    }

    #[test]
    fn beacon_segments_are_excluded_from_count() {
        let segments = vec![
            seg("snapshots-bodies"),
            seg("beaconblocks-1"),
            seg("beaconblocks-2"),
        ];
        assert_eq!(non_beacon_segment_count(&segments), 1);
    }

    #[test]
    fn first_merge_has_zero_segment_count_context() {
        let raw_index = RawSnapshotIndexing {
            segments: vec![RawIndexSegment {
                name: "snapshots-bodies".to_string(),
                percent: 80.0,
            }],
            total_time_sec: 3.0,
        };

        let (download, index) =
            merge_snapshot_status(None, None, &RawSnapshotDownload::default(), &raw_index);

        // No previous record means no divisor context: progress stays 0.
        assert_eq!(index.progress, 0.0);
        assert_eq!(index.total_time, vec![3.0]);
        assert_eq!(download.total_time.len(), 1);
    }

    #[test]
    fn index_progress_divides_by_non_beacon_count() {
        let prev_download = SnapshotDownloadStatus {
            segments: vec![
                seg("snapshots-bodies"),
                seg("snapshots-headers"),
                seg("beaconblocks-1"),
            ],
            ..Default::default()
        };
        let raw_index = RawSnapshotIndexing {
            segments: vec![
                RawIndexSegment {
                    name: "snapshots-bodies".to_string(),
                    percent: 100.0,
                },
                RawIndexSegment {
                    name: "snapshots-headers".to_string(),
                    percent: 50.0,
                },
                RawIndexSegment {
                    name: "beaconblocks-1".to_string(),
                    percent: 10.0,
                },
            ],
            total_time_sec: 0.0,
        };

        let (_, index) = merge_snapshot_status(
            Some(&prev_download),
            None,
            &RawSnapshotDownload::default(),
            &raw_index,
        );

        // (100 + 50) / 2 non-beacon segments; the beacon percent is ignored.
        assert_eq!(index.progress, 75.0);
    }

    #[test]
    fn total_time_appends_and_never_shrinks() {
        let raw_download = RawSnapshotDownload {
            total_time_sec: 5.0,
            ..Default::default()
        };
        let raw_index = RawSnapshotIndexing::default();

        let (first_download, first_index) =
            merge_snapshot_status(None, None, &raw_download, &raw_index);
        let (second_download, second_index) = merge_snapshot_status(
            Some(&first_download),
            Some(&first_index),
            &raw_download,
            &raw_index,
        );

        // Identical raw payloads still append a new interval each poll.
        assert_eq!(first_download.total_time, vec![5.0]);
        assert_eq!(second_download.total_time, vec![5.0, 5.0]);
        assert_eq!(second_index.total_time.len(), 2);
    }

    #[test]
    fn previous_total_time_is_carried_forward() {
        let prev = SnapshotDownloadStatus {
            total_time: vec![10.0],
            ..Default::default()
        };
        let raw = RawSnapshotDownload {
            total_time_sec: 5.0,
            ..Default::default()
        };

        let (merged, _) =
            merge_snapshot_status(Some(&prev), None, &raw, &RawSnapshotIndexing::default());
        assert_eq!(merged.total_time, vec![10.0, 5.0]);
    }

    #[test]
    fn empty_raw_segments_carry_previous_segments_over() {
        let prev = SnapshotDownloadStatus {
            segments: vec![seg("snapshots-bodies")],
            ..Default::default()
        };
        let raw = RawSnapshotDownload::default();

        let (merged, _) =
            merge_snapshot_status(Some(&prev), None, &raw, &RawSnapshotIndexing::default());
        assert_eq!(merged.segments, prev.segments);
    }

    #[test]
    fn fresh_raw_segments_replace_previous() {
        let prev = SnapshotDownloadStatus {
            segments: vec![seg("stale")],
            ..Default::default()
        };
        let raw = RawSnapshotDownload {
            segments: vec![RawSnapshotSegment {
                name: "snapshots-bodies".to_string(),
                downloaded: 10,
                total: 20,
            }],
            ..Default::default()
        };

        let (merged, _) =
            merge_snapshot_status(Some(&prev), None, &raw, &RawSnapshotIndexing::default());
        assert_eq!(merged.segments.len(), 1);
        assert_eq!(merged.segments[0].name, "snapshots-bodies");
        assert_eq!(merged.segments[0].downloaded, 10);
    }
}
