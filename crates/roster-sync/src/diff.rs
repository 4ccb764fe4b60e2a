//! Snapshot diff
//!
//! Partitions the union of the master snapshot and the live list: every key
//! lands in exactly one of `added` (live only), `removed` (master only) or
//! neither (present in both).

use std::collections::BTreeSet;

use roster_core::PlayerKey;

use crate::snapshot::FriendSnapshot;

/// How a single key compares between master and live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// On the live list, not in master
    Added,
    /// In master, not on the live list
    Removed,
    /// In both
    Unchanged,
}

/// Keys that differ between a master snapshot and the live list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub added: BTreeSet<PlayerKey>,
    pub removed: BTreeSet<PlayerKey>,
}

impl SnapshotDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Classification of `key`; keys in neither set count as unchanged
    pub fn classify(&self, key: &PlayerKey) -> Classification {
        if self.added.contains(key) {
            Classification::Added
        } else if self.removed.contains(key) {
            Classification::Removed
        } else {
            Classification::Unchanged
        }
    }
}

/// Diff `master` against the live list
pub fn snapshot_diff(master: &FriendSnapshot, live: &FriendSnapshot) -> SnapshotDiff {
    SnapshotDiff {
        added: live.iter().filter(|k| !master.contains(k)).cloned().collect(),
        removed: master.iter().filter(|k| !live.contains(k)).cloned().collect(),
    }
}
