//! Host collaborator traits
//!
//! The game client owns the friends list, the realm information and the
//! change notifications. These traits are the narrow surface the rest of
//! the workspace depends on, so the reconciler can be driven by the real
//! client, a file-backed stand-in, or the in-memory mocks in [`crate::mock`].
//!
//! ## Key Traits
//!
//! - [`FriendsApi`]: indexed read access plus add/remove on the live list
//! - [`RealmInfo`]: current realm and its connected realms
//! - [`ChangeNotifications`]: suspend and resume the friends-list-changed event

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One entry as reported by the host friends list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendInfo {
    /// Raw `"Name"` or `"Name-Realm"` string as the host reports it
    pub name: String,
    /// Whether the friend is currently online
    #[serde(default)]
    pub connected: bool,
}

impl FriendInfo {
    /// Create an offline entry with the given raw name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            connected: false,
        }
    }
}

/// The host's friends list
///
/// Indices are zero-based. `info_at` may return `None` (or an entry with an
/// empty name) shortly after login while the host is still loading.
pub trait FriendsApi {
    /// Number of entries the host currently reports
    fn count(&self) -> usize;

    /// Entry at `index`, if the host has data for it yet
    fn info_at(&self, index: usize) -> Option<FriendInfo>;

    /// Entry matching `key` (bare name for local friends, `Name-Realm` otherwise)
    fn info_by_key(&self, key: &str) -> Option<FriendInfo>;

    /// Add a friend by key
    fn add(&mut self, key: &str);

    /// Remove a friend by key
    fn remove(&mut self, key: &str);
}

/// The host's realm information
pub trait RealmInfo {
    /// Display name of the realm the active character is on
    fn current_realm_name(&self) -> String;

    /// Display names of the connected realms (possibly empty)
    fn connected_realm_names(&self) -> Vec<String>;
}

/// Registration of the friends-list-changed notification
///
/// Every block of live-list mutations is wrapped in `unregister` /
/// `reregister_after` so the mutations do not re-trigger a refresh.
pub trait ChangeNotifications {
    /// Stop delivering friends-list-changed events
    fn unregister(&mut self);

    /// Resume delivering events once `settle` has elapsed
    fn reregister_after(&mut self, settle: Duration);
}

impl<T: FriendsApi + ?Sized> FriendsApi for Box<T> {
    fn count(&self) -> usize {
        (**self).count()
    }

    fn info_at(&self, index: usize) -> Option<FriendInfo> {
        (**self).info_at(index)
    }

    fn info_by_key(&self, key: &str) -> Option<FriendInfo> {
        (**self).info_by_key(key)
    }

    fn add(&mut self, key: &str) {
        (**self).add(key)
    }

    fn remove(&mut self, key: &str) {
        (**self).remove(key)
    }
}
