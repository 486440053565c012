//! Display derivations over a node's merged sync record.
//!
//! Everything here is a pure function of the record: the rendering side calls
//! these per render pass and never mutates state. Stage rows other than
//! `"Snapshots"` carry no live telemetry and always show as waiting
//! placeholders.

use crate::merge::{SnapshotDownloadStatus, SnapshotIndexingStatus};
use crate::stages::{position_of, SyncStageDescriptor, SyncStages, SNAPSHOTS_STAGE};
use crate::store::SyncRecord;

/// Macro phase of the snapshot sync, computed once per render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSyncPhase {
    /// Torrent metadata is still resolving.
    WaitingForMetadata,
    /// Metadata ready, bulk download in progress.
    Downloading,
    /// Download finished, indexing in progress.
    Indexing,
    /// Download and indexing both complete.
    Finished,
}

impl std::fmt::Display for SnapshotSyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SnapshotSyncPhase::WaitingForMetadata => "Waiting for metadata",
            SnapshotSyncPhase::Downloading => "Downloading",
            SnapshotSyncPhase::Indexing => "Indexing",
            SnapshotSyncPhase::Finished => "Finished",
        };
        write!(f, "{}", label)
    }
}

/// Classifies the current snapshot-sync phase from the merged statuses.
pub fn classify_phase(
    download: &SnapshotDownloadStatus,
    index: &SnapshotIndexingStatus,
) -> SnapshotSyncPhase {
    if download.torrent_metadata_ready < download.files {
        SnapshotSyncPhase::WaitingForMetadata
    } else if !download.download_finished {
        SnapshotSyncPhase::Downloading
    } else if index.progress < 100.0 {
        SnapshotSyncPhase::Indexing
    } else {
        SnapshotSyncPhase::Finished
    }
}

/// Human-readable state label for one stage row.
pub fn row_state(
    stage: &SyncStageDescriptor,
    download: &SnapshotDownloadStatus,
    index: &SnapshotIndexingStatus,
) -> &'static str {
    if stage.name != SNAPSHOTS_STAGE {
        return "Waiting";
    }

    if stage.sub_stage {
        if download.download_finished {
            "Finished"
        } else if download.torrent_metadata_ready < download.files {
            "Waiting for metadata"
        } else {
            "In progress"
        }
    } else if !download.download_finished {
        "Waiting"
    } else if index.progress < 100.0 {
        "In progress"
    } else {
        "Finished"
    }
}

/// Progress string for one stage row.
///
/// The download row reports downloaded/total; no clamp is applied, so
/// upstream values with `downloaded > total` produce an over-100% string.
pub fn row_progress(
    stage: &SyncStageDescriptor,
    download: &SnapshotDownloadStatus,
    index: &SnapshotIndexingStatus,
) -> String {
    if stage.name != SNAPSHOTS_STAGE {
        return "0%".to_string();
    }

    if stage.sub_stage {
        percent_string(percent_downloaded(download.downloaded, download.total))
    } else {
        percent_string(index.progress)
    }
}

/// Elapsed-time string for one stage row. Non-Snapshots rows have no
/// telemetry and report `"0s"`.
pub fn row_total_time(
    stage: &SyncStageDescriptor,
    download: &SnapshotDownloadStatus,
    index: &SnapshotIndexingStatus,
) -> String {
    if stage.name != SNAPSHOTS_STAGE {
        return "0s".to_string();
    }

    let total: f64 = if stage.sub_stage {
        download.total_time.iter().sum()
    } else {
        index.total_time.iter().sum()
    };
    secs_to_hms(total)
}

/// Display name for one stage row, spelling out which half of a split stage
/// the row represents.
pub fn row_display_name(stage: &SyncStageDescriptor) -> String {
    if stage.name == SNAPSHOTS_STAGE {
        if stage.sub_stage {
            format!("{} (Downloading)", SNAPSHOTS_STAGE)
        } else {
            format!("{} (Indexing)", SNAPSHOTS_STAGE)
        }
    } else {
        stage.name.clone()
    }
}

/// `position/total` numbering for one stage row, computed against the
/// unexpanded stage list so both halves of a split stage share a position.
/// Unmatched names degrade to `0/N`.
pub fn row_number(stage: &SyncStageDescriptor, sync_stages: &SyncStages) -> String {
    let unexpanded: Vec<SyncStageDescriptor> = sync_stages
        .stages
        .iter()
        .filter(|s| !s.sub_stage)
        .cloned()
        .collect();

    format!(
        "{}/{}",
        position_of(&stage.name, &unexpanded),
        unexpanded.len()
    )
}

/// Aggregate sync time: download plus indexing elapsed, reported only when
/// the record has a committed stage list to attribute it to.
pub fn total_sync_time(record: &SyncRecord) -> String {
    if record.sync_stages.stages.is_empty() {
        return "0s".to_string();
    }

    let total: f64 = record.download_status.total_time.iter().sum::<f64>()
        + record.index_status.total_time.iter().sum::<f64>();
    secs_to_hms(total)
}

/// Percent downloaded, without clamping. A zero total degrades to 0.
pub fn percent_downloaded(downloaded: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    downloaded as f64 / total as f64 * 100.0
}

/// Formats a percentage, dropping the fraction when it is whole.
pub fn percent_string(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}%", value as i64)
    } else {
        format!("{:.1}%", value)
    }
}

/// Formats elapsed seconds as `H:MM:SS`, truncating fractional seconds.
pub fn secs_to_hms(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{}:{:02}:{:02}", hours, minutes, secs)
}
