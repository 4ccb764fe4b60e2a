//! # Roster Sync
//!
//! Keeps a friends list consistent across the characters of a realm-group.
//!
//! The realm-group shares a **master snapshot**: the friends every
//! character in the group should have. Each character also keeps an
//! **overlay**: friends on its live list that policy decided neither to
//! propagate nor to delete.
//!
//! ## Key Components
//!
//! - [`SnapshotReconciler`]: refresh (live → snapshots) and restore
//!   (snapshots → live) under the `do_deletions` / `full_sync` policies
//! - [`LiveFriendsList`]: record-level facade over the host friends API
//! - [`snapshot_diff`]: partitions master ∪ live into added / removed / unchanged
//! - [`FriendSnapshot`]: ordered set of player keys
//!
//! ## Example
//!
//! ```rust
//! use roster_core::{MockFriendsApi, PlayerKey, RealmGroup, RealmTopology,
//!     RecordingNotifications, StaticRealmInfo};
//! use roster_sync::{LiveFriendsList, SnapshotReconciler};
//!
//! let topology = RealmTopology::new(StaticRealmInfo::new("Realm1", Vec::<String>::new()));
//! let mut live = LiveFriendsList::new(MockFriendsApi::with_friends(["Alice"]), topology);
//! let mut notifications = RecordingNotifications::new();
//!
//! let me = PlayerKey::parse("me-realm1").unwrap();
//! let mut reconciler = SnapshotReconciler::new(RealmGroup::new(["realm1"]), me);
//! reconciler.restore(&mut live, &mut notifications);
//! assert!(reconciler.master().is_empty());
//! assert_eq!(reconciler.overlay().len(), 1);
//! ```

pub mod diff;
pub mod live;
pub mod reconciler;
pub mod snapshot;

// Re-exports
pub use diff::{Classification, SnapshotDiff, snapshot_diff};
pub use live::{Enumeration, LiveFriendsList};
pub use reconciler::{DEFAULT_SETTLE_DELAY, RefreshOutcome, RestoreOutcome, SnapshotReconciler};
pub use snapshot::{FriendSnapshot, FriendSource};
