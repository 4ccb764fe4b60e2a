//! Snapshot reconciler
//!
//! Owns the realm-group master snapshot and the character's overlay, and
//! reconciles them against the live friends list in both directions:
//!
//! - [`SnapshotReconciler::refresh`]: live list → snapshots, on every
//!   friends-list-changed event
//! - [`SnapshotReconciler::restore`]: snapshots → live list, once per session
//!   after the host list becomes available
//!
//! Stale friends (on the live list but not in master) are removed only when
//! deletions are authorized (`full_sync || do_deletions`). Otherwise they are
//! remembered in the overlay so later cycles neither propagate nor delete them.

use std::time::Duration;

use roster_core::{ChangeNotifications, FriendsApi, PlayerKey, RealmGroup};
use roster_storage::SavedState;
use tracing::{debug, info, warn};

use crate::diff::snapshot_diff;
use crate::live::LiveFriendsList;
use crate::snapshot::{FriendSource, FriendSnapshot};

/// Delay before friends-list-changed events resume after a mutation block
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);

/// What a refresh changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Refresh did not run (not restored yet, or the live list was incomplete)
    pub skipped: bool,
    pub added_to_master: Vec<PlayerKey>,
    pub removed_from_master: Vec<PlayerKey>,
    /// Tolerated strays deleted after deletions were enabled
    pub removed_from_live: Vec<PlayerKey>,
    /// Overlay entries dropped because they left the live list
    pub forgotten: Vec<PlayerKey>,
}

impl RefreshOutcome {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    /// Whether the refresh changed any state
    pub fn is_noop(&self) -> bool {
        self.added_to_master.is_empty()
            && self.removed_from_master.is_empty()
            && self.removed_from_live.is_empty()
            && self.forgotten.is_empty()
    }
}

/// What a restore changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreOutcome {
    /// Set replayed onto the live list: master, or the overlay when master is empty
    pub source: FriendSource,
    pub added_to_live: Vec<PlayerKey>,
    pub removed_from_live: Vec<PlayerKey>,
    /// Stale friends kept and recorded in the overlay
    pub tolerated: Vec<PlayerKey>,
    /// Master keys still missing from the live list afterwards
    pub unsynced: Vec<PlayerKey>,
}

/// Reconciles master and overlay snapshots with the live friends list
#[derive(Debug, Clone)]
pub struct SnapshotReconciler {
    group: RealmGroup,
    character: PlayerKey,
    master: FriendSnapshot,
    overlay: FriendSnapshot,
    do_deletions: bool,
    full_sync: bool,
    restored: bool,
    settle_delay: Duration,
}

impl SnapshotReconciler {
    /// Fresh state for a never-seen realm-group and character
    pub fn new(group: RealmGroup, character: PlayerKey) -> Self {
        Self {
            group,
            character,
            master: FriendSnapshot::new(),
            overlay: FriendSnapshot::new(),
            do_deletions: false,
            full_sync: false,
            restored: false,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Load the group's and character's state from the persisted store
    pub fn from_saved(state: &SavedState, group: RealmGroup, character: PlayerKey) -> Self {
        let mut reconciler = Self::new(group, character);
        reconciler.do_deletions = state.deletion_flag(reconciler.character.as_str());
        if let Some(record) = state.group(&reconciler.group) {
            reconciler.master = FriendSnapshot::from_key_list(record.master.keys());
            reconciler.overlay =
                FriendSnapshot::from_key_list(record.overlay(reconciler.character.as_str()));
            reconciler.full_sync = record.full_sync;
        }
        debug!(
            group = %reconciler.group,
            character = %reconciler.character,
            master = reconciler.master.len(),
            overlay = reconciler.overlay.len(),
            "Loaded snapshots"
        );
        reconciler
    }

    /// Set the settle delay used when resuming change notifications
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Write the group's and character's state into the persisted store
    pub fn write_to(&self, state: &mut SavedState) {
        state.set_deletion_flag(self.character.as_str(), self.do_deletions);
        let record = state.group_mut(&self.group);
        record.master = self.master.to_key_list();
        record.full_sync = self.full_sync;
        if self.overlay.is_empty() {
            record.overlays.remove(self.character.as_str());
        } else {
            record
                .overlays
                .insert(self.character.to_string(), self.overlay.to_key_list());
        }
    }

    pub fn group(&self) -> &RealmGroup {
        &self.group
    }

    pub fn character(&self) -> &PlayerKey {
        &self.character
    }

    pub fn master(&self) -> &FriendSnapshot {
        &self.master
    }

    pub fn overlay(&self) -> &FriendSnapshot {
        &self.overlay
    }

    /// Whether the initial restore has completed this session
    pub fn is_restored(&self) -> bool {
        self.restored
    }

    pub fn is_deletion_active(&self) -> bool {
        self.do_deletions
    }

    pub fn is_full_sync_active(&self) -> bool {
        self.full_sync
    }

    /// Whether stale friends may be removed from the live list
    pub fn deletions_authorized(&self) -> bool {
        self.full_sync || self.do_deletions
    }

    /// Set the per-character deletion flag
    pub fn set_deletion(&mut self, enabled: bool) {
        if self.do_deletions != enabled {
            info!(character = %self.character, enabled, "Deletion policy changed");
        }
        self.do_deletions = enabled;
    }

    /// Set the group-wide full-sync flag
    ///
    /// A change is applied at once through a refresh, so strays tolerated
    /// under the old policy are deleted if the new one authorizes it.
    pub fn set_full_sync<F: FriendsApi>(
        &mut self,
        enabled: bool,
        live: &mut LiveFriendsList<F>,
        notifications: &mut dyn ChangeNotifications,
    ) -> Option<RefreshOutcome> {
        if self.full_sync == enabled {
            return None;
        }
        info!(group = %self.group, enabled, "Full-sync policy changed");
        self.full_sync = enabled;
        Some(self.refresh(live, notifications))
    }

    /// Number of friends in the given set
    pub fn count_friends<F: FriendsApi>(&self, which: FriendSource, live: &LiveFriendsList<F>) -> usize {
        match which {
            FriendSource::Live => live.count(),
            FriendSource::Master => self.master.len(),
            FriendSource::Overlay => self.overlay.len(),
        }
    }

    /// Sorted keys of the given set
    pub fn dump_friend_snapshot<F: FriendsApi>(
        &self,
        which: FriendSource,
        live: &LiveFriendsList<F>,
    ) -> Vec<String> {
        match which {
            FriendSource::Live => live.enumerate().snapshot().dump(),
            FriendSource::Master => self.master.dump(),
            FriendSource::Overlay => self.overlay.dump(),
        }
    }

    /// Fold live-list changes into the snapshots
    ///
    /// New friends join master, friends gone from the live list leave it.
    /// A tolerated stray is deleted from the live list once deletions are
    /// authorized. Does nothing until [`Self::restore`] has completed.
    pub fn refresh<F: FriendsApi>(
        &mut self,
        live: &mut LiveFriendsList<F>,
        notifications: &mut dyn ChangeNotifications,
    ) -> RefreshOutcome {
        if !self.restored {
            debug!("Refresh skipped: snapshots not restored yet");
            return RefreshOutcome::skipped();
        }

        let enumeration = live.enumerate();
        if !enumeration.is_complete() {
            warn!(
                pending = enumeration.pending,
                "Refresh skipped: live list not fully loaded"
            );
            return RefreshOutcome::skipped();
        }
        let current = enumeration.snapshot();
        let diff = snapshot_diff(&self.master, &current);
        let mut outcome = RefreshOutcome::default();

        for key in diff.removed {
            self.master.remove(&key);
            outcome.removed_from_master.push(key);
        }

        let authorized = self.deletions_authorized();
        let mut suspended = false;
        for key in diff.added {
            if !self.overlay.contains(&key) {
                self.master.insert(key.clone());
                outcome.added_to_master.push(key);
                continue;
            }
            if !authorized {
                continue;
            }
            let Some(host_name) = enumeration.host_name(&key) else {
                continue;
            };
            if !suspended {
                notifications.unregister();
                suspended = true;
            }
            if live.remove_host_entry(host_name) {
                self.overlay.remove(&key);
                outcome.removed_from_live.push(key);
            }
        }

        let gone: Vec<PlayerKey> = self
            .overlay
            .iter()
            .filter(|k| !current.contains(k))
            .cloned()
            .collect();
        for key in gone {
            self.overlay.remove(&key);
            outcome.forgotten.push(key);
        }

        if suspended {
            notifications.reregister_after(self.settle_delay);
        }
        if !outcome.is_noop() {
            info!(
                added = outcome.added_to_master.len(),
                removed = outcome.removed_from_master.len(),
                deleted = outcome.removed_from_live.len(),
                forgotten = outcome.forgotten.len(),
                "Refreshed friend snapshots"
            );
        }
        outcome
    }

    /// Replay the snapshots onto the live list
    ///
    /// Call once per session, after the live list reports available. The
    /// master snapshot is replayed, or the overlay when master is empty.
    /// Friends then on the live list but not in master are stale: deleted
    /// when authorized, otherwise kept and recorded in the overlay.
    pub fn restore<F: FriendsApi>(
        &mut self,
        live: &mut LiveFriendsList<F>,
        notifications: &mut dyn ChangeNotifications,
    ) -> RestoreOutcome {
        notifications.unregister();
        let mut outcome = RestoreOutcome::default();

        let source = if self.master.is_empty() {
            outcome.source = FriendSource::Overlay;
            debug!(group = %self.group, "Master snapshot empty, restoring from overlay");
            &self.overlay
        } else {
            outcome.source = FriendSource::Master;
            &self.master
        };

        for key in source.iter() {
            let record = match live.resolve_key(key) {
                Ok(record) => record,
                Err(err) => {
                    warn!(key = %key, error = %err, "Cannot restore friend");
                    continue;
                }
            };
            if live.add(&record) {
                outcome.added_to_live.push(key.clone());
            }
        }

        let enumeration = live.enumerate();
        let diff = snapshot_diff(&self.master, &enumeration.snapshot());
        let authorized = self.deletions_authorized();
        for key in diff.added {
            if authorized {
                let removed = enumeration
                    .host_name(&key)
                    .is_some_and(|host_name| live.remove_host_entry(host_name));
                if removed {
                    self.overlay.remove(&key);
                    outcome.removed_from_live.push(key);
                    continue;
                }
                warn!(key = %key, "Stale friend could not be removed; keeping it");
            }
            self.overlay.insert(key.clone());
            outcome.tolerated.push(key);
        }
        outcome.unsynced = diff.removed.into_iter().collect();
        if !outcome.unsynced.is_empty() {
            debug!(count = outcome.unsynced.len(), "Master friends not on live list after restore");
        }

        notifications.reregister_after(self.settle_delay);
        self.restored = true;
        info!(
            added = outcome.added_to_live.len(),
            removed = outcome.removed_from_live.len(),
            tolerated = outcome.tolerated.len(),
            "Restored friend snapshots"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::{MockFriendsApi, RealmTopology, RecordingNotifications, StaticRealmInfo};

    fn key(s: &str) -> PlayerKey {
        PlayerKey::parse(s).unwrap()
    }

    fn snapshot(keys: &[&str]) -> FriendSnapshot {
        keys.iter().map(|k| key(k)).collect()
    }

    fn live(names: &[&str]) -> LiveFriendsList<MockFriendsApi> {
        let topology = RealmTopology::new(StaticRealmInfo::new("Realm1", vec!["Realm2"]));
        LiveFriendsList::new(MockFriendsApi::with_friends(names.iter().copied()), topology)
    }

    fn reconciler(master: &[&str], overlay: &[&str]) -> SnapshotReconciler {
        let mut r = SnapshotReconciler::new(RealmGroup::new(["realm1", "realm2"]), key("me-realm1"));
        r.master = snapshot(master);
        r.overlay = snapshot(overlay);
        r
    }

    fn restored(master: &[&str], overlay: &[&str]) -> SnapshotReconciler {
        let mut r = reconciler(master, overlay);
        r.restored = true;
        r
    }

    #[test]
    fn test_refresh_is_noop_before_restore() {
        let mut r = reconciler(&["a-realm1"], &[]);
        let mut list = live(&["a", "b"]);
        let mut notifications = RecordingNotifications::new();

        let outcome = r.refresh(&mut list, &mut notifications);
        assert!(outcome.skipped);
        assert_eq!(r.master().dump(), vec!["a-realm1"]);
    }

    #[test]
    fn test_refresh_adds_new_friend_to_master() {
        let mut r = restored(&["a-realm1"], &[]);
        let mut list = live(&["a-realm1", "b-realm1"]);
        let mut notifications = RecordingNotifications::new();

        let outcome = r.refresh(&mut list, &mut notifications);
        assert_eq!(outcome.added_to_master, vec![key("b-realm1")]);
        assert_eq!(r.master().dump(), vec!["a-realm1", "b-realm1"]);
        assert_eq!(notifications.unregister_calls(), 0);
    }

    #[test]
    fn test_refresh_propagates_removal() {
        let mut r = restored(&["a-realm1", "b-realm2"], &[]);
        let mut list = live(&["a"]);
        let mut notifications = RecordingNotifications::new();

        let outcome = r.refresh(&mut list, &mut notifications);
        assert_eq!(outcome.removed_from_master, vec![key("b-realm2")]);
        assert_eq!(r.master().dump(), vec!["a-realm1"]);
    }

    #[test]
    fn test_refresh_deletes_tolerated_stray_once_authorized() {
        let mut r = restored(&["a-realm1"], &["b-realm1"]);
        r.set_deletion(true);
        let mut list = live(&["a", "b"]);
        let mut notifications = RecordingNotifications::new();

        let outcome = r.refresh(&mut list, &mut notifications);
        assert_eq!(outcome.removed_from_live, vec![key("b-realm1")]);
        assert_eq!(list.api().names(), vec!["a"]);
        assert!(r.overlay().is_empty());
        assert_eq!(r.master().dump(), vec!["a-realm1"]);
        assert_eq!(notifications.unregister_calls(), 1);
        assert_eq!(notifications.resumes(), &[DEFAULT_SETTLE_DELAY]);
    }

    #[test]
    fn test_refresh_keeps_tolerated_stray_without_deletions() {
        let mut r = restored(&["a-realm1"], &["b-realm1"]);
        let mut list = live(&["a", "b"]);
        let mut notifications = RecordingNotifications::new();

        let outcome = r.refresh(&mut list, &mut notifications);
        assert!(outcome.is_noop());
        assert_eq!(list.count(), 2);
        assert_eq!(r.overlay().dump(), vec!["b-realm1"]);
        assert_eq!(r.master().dump(), vec!["a-realm1"]);
    }

    #[test]
    fn test_refresh_forgets_overlay_entries_removed_by_hand() {
        let mut r = restored(&["a-realm1"], &["b-realm1"]);
        let mut list = live(&["a"]);
        let mut notifications = RecordingNotifications::new();

        let outcome = r.refresh(&mut list, &mut notifications);
        assert_eq!(outcome.forgotten, vec![key("b-realm1")]);
        assert!(r.overlay().is_empty());
    }

    #[test]
    fn test_refresh_converges() {
        let mut r = restored(&["a-realm1", "c-realm1"], &["d-realm1"]);
        let mut list = live(&["a", "b-realm2", "d"]);
        let mut notifications = RecordingNotifications::new();

        r.refresh(&mut list, &mut notifications);
        let master = r.master().clone();
        let overlay = r.overlay().clone();

        let second = r.refresh(&mut list, &mut notifications);
        assert!(second.is_noop());
        assert_eq!(r.master(), &master);
        assert_eq!(r.overlay(), &overlay);
    }

    #[test]
    fn test_refresh_skips_incomplete_live_list() {
        let mut r = restored(&["a-realm1", "b-realm1"], &[]);
        let topology = RealmTopology::new(StaticRealmInfo::new("Realm1", Vec::<String>::new()));
        let mut list =
            LiveFriendsList::new(MockFriendsApi::with_friends(["a", "b"]).with_lag(1), topology);
        let mut notifications = RecordingNotifications::new();

        let outcome = r.refresh(&mut list, &mut notifications);
        assert!(outcome.skipped);
        assert_eq!(r.master().len(), 2);
    }

    #[test]
    fn test_restore_adds_master_and_tolerates_strays() {
        let mut r = reconciler(&["a-realm1", "c-realm2"], &[]);
        let mut list = live(&["a", "x"]);
        let mut notifications = RecordingNotifications::new();

        let outcome = r.restore(&mut list, &mut notifications);
        assert!(r.is_restored());
        assert_eq!(outcome.added_to_live, vec![key("c-realm2")]);
        assert_eq!(outcome.tolerated, vec![key("x-realm1")]);
        assert_eq!(list.count(), 3);
        assert_eq!(r.overlay().dump(), vec!["x-realm1"]);
        assert_eq!(notifications.unregister_calls(), 1);
        assert_eq!(notifications.resumes().len(), 1);
    }

    #[test]
    fn test_restore_deletes_strays_under_full_sync() {
        let mut r = reconciler(&["a-realm1", "c-realm2"], &["x-realm1"]);
        r.full_sync = true;
        let mut list = live(&["a", "x", "y-realm2"]);
        let mut notifications = RecordingNotifications::new();

        let outcome = r.restore(&mut list, &mut notifications);
        assert_eq!(outcome.removed_from_live.len(), 2);
        assert_eq!(list.enumerate().snapshot(), *r.master());
        assert!(r.overlay().is_empty());
    }

    #[test]
    fn test_restore_falls_back_to_overlay() {
        let mut r = reconciler(&[], &["x-realm1"]);
        let mut list = live(&[]);
        let mut notifications = RecordingNotifications::new();

        let outcome = r.restore(&mut list, &mut notifications);
        assert_eq!(outcome.source, FriendSource::Overlay);
        assert_eq!(outcome.added_to_live, vec![key("x-realm1")]);
        assert_eq!(list.api().names(), vec!["x"]);
        assert!(r.master().is_empty());
        assert_eq!(r.overlay().dump(), vec!["x-realm1"]);
    }

    #[test]
    fn test_restore_with_empty_master_keeps_strays_in_overlay() {
        let mut r = reconciler(&[], &[]);
        let mut list = live(&["stray"]);
        let mut notifications = RecordingNotifications::new();

        let outcome = r.restore(&mut list, &mut notifications);
        assert_eq!(outcome.tolerated, vec![key("stray-realm1")]);
        assert_eq!(list.api().names(), vec!["stray"]);
        assert_eq!(r.overlay().dump(), vec!["stray-realm1"]);
        assert!(r.master().is_empty());
    }

    #[test]
    fn test_restore_with_empty_master_deletes_strays_when_authorized() {
        let mut r = reconciler(&[], &[]);
        r.set_deletion(true);
        let mut list = live(&["a", "b-realm2"]);
        let mut notifications = RecordingNotifications::new();

        let outcome = r.restore(&mut list, &mut notifications);
        assert_eq!(outcome.removed_from_live, vec![key("a-realm1"), key("b-realm2")]);
        assert_eq!(list.count(), 0);
        assert!(r.master().is_empty());
        assert!(r.overlay().is_empty());
    }

    #[test]
    fn test_restore_removes_host_spelled_strays_under_full_sync() {
        let mut r = reconciler(&["a-realm1"], &[]);
        r.full_sync = true;
        let mut list = live(&["a", "Stray-Realm1", "Bob-Realm 2"]);
        let mut notifications = RecordingNotifications::new();

        let outcome = r.restore(&mut list, &mut notifications);
        assert_eq!(outcome.removed_from_live, vec![key("bob-realm2"), key("stray-realm1")]);
        assert_eq!(list.api().names(), vec!["a"]);
        assert_eq!(list.enumerate().snapshot(), *r.master());
    }

    #[test]
    fn test_refresh_removes_host_spelled_stray() {
        let mut r = restored(&["a-realm1"], &["stray-realm1"]);
        r.set_deletion(true);
        let mut list = live(&["a", "Stray-Realm1"]);
        let mut notifications = RecordingNotifications::new();

        let outcome = r.refresh(&mut list, &mut notifications);
        assert_eq!(outcome.removed_from_live, vec![key("stray-realm1")]);
        assert_eq!(list.api().names(), vec!["a"]);
        assert!(r.overlay().is_empty());
    }

    #[test]
    fn test_restore_skips_keys_on_unconnected_realms() {
        let mut r = reconciler(&["a-realm1", "z-elsewhere"], &[]);
        let mut list = live(&[]);
        let mut notifications = RecordingNotifications::new();

        let outcome = r.restore(&mut list, &mut notifications);
        assert_eq!(outcome.added_to_live, vec![key("a-realm1")]);
        assert_eq!(outcome.unsynced, vec![key("z-elsewhere")]);
    }

    #[test]
    fn test_set_full_sync_applies_policy_retroactively() {
        let mut r = restored(&["a-realm1"], &["b-realm1"]);
        let mut list = live(&["a", "b"]);
        let mut notifications = RecordingNotifications::new();

        assert!(r.set_full_sync(false, &mut list, &mut notifications).is_none());
        let outcome = r
            .set_full_sync(true, &mut list, &mut notifications)
            .expect("flag changed");
        assert_eq!(outcome.removed_from_live, vec![key("b-realm1")]);
        assert!(r.is_full_sync_active());
        assert!(r.deletions_authorized());
        assert_eq!(list.count(), 1);
    }

    #[test]
    fn test_counts_and_dumps() {
        let r = reconciler(&["a-realm1", "b-realm1"], &["c-realm1"]);
        let list = live(&["a", "c", "d"]);
        assert_eq!(r.count_friends(FriendSource::Live, &list), 3);
        assert_eq!(r.count_friends(FriendSource::Master, &list), 2);
        assert_eq!(r.count_friends(FriendSource::Overlay, &list), 1);
        assert_eq!(
            r.dump_friend_snapshot(FriendSource::Live, &list),
            vec!["a-realm1", "c-realm1", "d-realm1"]
        );
        assert_eq!(r.dump_friend_snapshot(FriendSource::Overlay, &list), vec!["c-realm1"]);
    }

    #[test]
    fn test_saved_state_roundtrip() {
        let mut r = reconciler(&["a-realm1"], &["c-realm1"]);
        r.set_deletion(true);
        r.full_sync = true;

        let mut state = SavedState::default();
        r.write_to(&mut state);
        let loaded = SnapshotReconciler::from_saved(&state, r.group().clone(), r.character().clone());

        assert_eq!(loaded.master(), r.master());
        assert_eq!(loaded.overlay(), r.overlay());
        assert!(loaded.is_deletion_active());
        assert!(loaded.is_full_sync_active());
        assert!(!loaded.is_restored());
    }

    #[test]
    fn test_write_to_drops_empty_overlay() {
        let r = reconciler(&["a-realm1"], &[]);
        let mut state = SavedState::default();
        state
            .group_mut(r.group())
            .overlays
            .insert("me-realm1".into(), roster_storage::KeyList::new(["old-realm1"]));
        r.write_to(&mut state);
        assert!(state.group(r.group()).unwrap().overlays.is_empty());
    }
}
