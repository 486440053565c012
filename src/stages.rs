//! Sync-stage catalog and resolution.
//!
//! The backend reports a flat, ordered list of stage names plus a 1-based
//! current-stage index. The `"Snapshots"` stage has two sub-phases (download,
//! then indexing) that are displayed as two separate rows, so the catalog
//! expands that one name into a pair of descriptors.

use serde::{Deserialize, Serialize};

/// The reserved stage name whose download/indexing halves are split into two
/// display entries.
pub const SNAPSHOTS_STAGE: &str = "Snapshots";

/// One entry in the expanded stage sequence.
///
/// `sub_stage` marks the download half of a split stage; the indexing half is
/// the `sub_stage: false` entry of the same name that immediately follows it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SyncStageDescriptor {
    /// Raw stage name as reported by the backend.
    pub name: String,
    /// True for the download half of a split stage.
    pub sub_stage: bool,
}

/// The committed stage state for a node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncStages {
    /// Expanded stage sequence (split stages appear as two entries).
    pub stages: Vec<SyncStageDescriptor>,
    /// 1-based index of the current stage. Never 0 in a committed record.
    pub current_stage: u64,
}

/// Expands raw stage names into display descriptors.
///
/// `"Snapshots"` emits the download-half descriptor followed by the
/// indexing-half descriptor; every other name emits a single entry. An empty
/// input produces an empty output; the caller decides whether that is
/// committable.
pub fn expand_stages(raw_names: &[String]) -> Vec<SyncStageDescriptor> {
    let mut stages = Vec::with_capacity(raw_names.len() + 1);
    for name in raw_names {
        if name == SNAPSHOTS_STAGE {
            stages.push(SyncStageDescriptor {
                name: name.clone(),
                sub_stage: true,
            });
        }
        stages.push(SyncStageDescriptor {
            name: name.clone(),
            sub_stage: false,
        });
    }
    stages
}

/// Returns the 1-based position of the first descriptor matching `name`, or 0
/// when absent.
///
/// Matching is by name only: both halves of a split stage share the same
/// catalog slot, so they report the same position in the stage numbering.
pub fn position_of(name: &str, stages: &[SyncStageDescriptor]) -> usize {
    stages
        .iter()
        .position(|s| s.name == name)
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// Resolves the raw stage report into a committable [`SyncStages`].
///
/// A null stage list is treated as zero stages. The known sentinel
/// `current_stage == 0` is coerced to 1 (the backend emits 0 transiently; it
/// never means "before stage 1"). Returns `None` when the expanded sequence
/// is empty so the caller retains whatever it previously held: partial
/// telemetry must never erase the display.
pub fn resolve_stages(raw_current_stage: u64, raw_names: Option<&[String]>) -> Option<SyncStages> {
    let current_stage = if raw_current_stage == 0 {
        1
    } else {
        raw_current_stage
    };

    let stages = expand_stages(raw_names.unwrap_or_default());
    if stages.is_empty() {
        return None;
    }

    Some(SyncStages {
        stages,
        current_stage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn expand_splits_snapshots_into_adjacent_pair() {
        let expanded = expand_stages(&names(&["Snapshots", "Execution", "Finish"]));

        assert_eq!(expanded.len(), 4);
        assert_eq!(expanded[0].name, "Snapshots");
        assert!(expanded[0].sub_stage);
        assert_eq!(expanded[1].name, "Snapshots");
        assert!(!expanded[1].sub_stage);
        assert_eq!(expanded[2].name, "Execution");
        assert!(!expanded[2].sub_stage);
    }

    #[test]
    fn expand_adds_one_entry_per_snapshots_occurrence() {
        let input = names(&["Headers", "Snapshots", "Execution"]);
        let expanded = expand_stages(&input);
        assert_eq!(expanded.len(), input.len() + 1);
    }

    #[test]
    fn expand_empty_input_is_empty() {
        assert!(expand_stages(&[]).is_empty());
    }

    #[test]
    fn position_matches_by_name_only_first_wins() {
        let expanded = expand_stages(&names(&["Snapshots", "Execution"]));
        // Both halves of the split stage share slot 1.
        assert_eq!(position_of("Snapshots", &expanded), 1);
        assert_eq!(position_of("Execution", &expanded), 3);
        assert_eq!(position_of("Unknown", &expanded), 0);
    }

    #[test]
    fn resolve_coerces_sentinel_zero_to_one() {
        let resolved = resolve_stages(0, Some(&names(&["A", "B"]))).unwrap();
        assert_eq!(resolved.current_stage, 1);
    }

    #[test]
    fn resolve_keeps_valid_current_stage() {
        let resolved = resolve_stages(2, Some(&names(&["A", "B"]))).unwrap();
        assert_eq!(resolved.current_stage, 2);
    }

    #[test]
    fn resolve_rejects_null_stage_list() {
        assert!(resolve_stages(2, None).is_none());
    }

    #[test]
    fn resolve_rejects_empty_stage_list() {
        assert!(resolve_stages(1, Some(&[])).is_none());
    }
}
