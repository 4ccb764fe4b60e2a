//! In-memory host collaborators for testing
//!
//! Provides a friends list, realm information and change-notification
//! recorder that behave like the game client closely enough to drive the
//! reconciler without one.
//!
//! ## Usage
//!
//! ```rust
//! use roster_core::{FriendsApi, MockFriendsApi};
//!
//! let mut host = MockFriendsApi::with_friends(["Alice", "Bob-OtherRealm"]);
//! host.add("carol");
//! host.add("carol");
//! assert_eq!(host.count(), 3);
//! ```

use std::time::Duration;

use crate::host::{ChangeNotifications, FriendInfo, FriendsApi, RealmInfo};

/// A friends list held in memory
///
/// Lookups are case-insensitive like the host's. Adding a present entry or
/// removing an absent one is ignored. `with_lag` makes the first few
/// `info_at` calls return `None` to mimic the client loading after login.
#[derive(Debug, Clone, Default)]
pub struct MockFriendsApi {
    entries: Vec<FriendInfo>,
    lagging_reads: std::cell::Cell<usize>,
    adds: usize,
    removes: usize,
}

impl MockFriendsApi {
    /// Create an empty friends list
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a friends list with the given raw names
    pub fn with_friends<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: names.into_iter().map(FriendInfo::new).collect(),
            ..Self::default()
        }
    }

    /// Make the next `reads` calls to `info_at` return `None`
    pub fn with_lag(self, reads: usize) -> Self {
        self.lagging_reads.set(reads);
        self
    }

    /// Raw names currently on the list, in host order
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Number of `add` calls that changed the list
    pub fn adds(&self) -> usize {
        self.adds
    }

    /// Number of `remove` calls that changed the list
    pub fn removes(&self) -> usize {
        self.removes
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(key))
    }
}

impl FriendsApi for MockFriendsApi {
    fn count(&self) -> usize {
        self.entries.len()
    }

    fn info_at(&self, index: usize) -> Option<FriendInfo> {
        let lag = self.lagging_reads.get();
        if lag > 0 {
            self.lagging_reads.set(lag - 1);
            return None;
        }
        self.entries.get(index).cloned()
    }

    fn info_by_key(&self, key: &str) -> Option<FriendInfo> {
        self.position(key).map(|i| self.entries[i].clone())
    }

    fn add(&mut self, key: &str) {
        if self.position(key).is_none() {
            self.entries.push(FriendInfo::new(key));
            self.adds += 1;
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(i) = self.position(key) {
            self.entries.remove(i);
            self.removes += 1;
        }
    }
}

/// Fixed realm information
#[derive(Debug, Clone)]
pub struct StaticRealmInfo {
    current: String,
    connected: Vec<String>,
}

impl StaticRealmInfo {
    pub fn new<I, S>(current: impl Into<String>, connected: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            current: current.into(),
            connected: connected.into_iter().map(Into::into).collect(),
        }
    }
}

impl RealmInfo for StaticRealmInfo {
    fn current_realm_name(&self) -> String {
        self.current.clone()
    }

    fn connected_realm_names(&self) -> Vec<String> {
        self.connected.clone()
    }
}

/// Records suspend/resume calls instead of acting on them
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifications {
    registered: bool,
    unregistered: usize,
    resumes: Vec<Duration>,
}

impl RecordingNotifications {
    /// Start in the registered state
    pub fn new() -> Self {
        Self {
            registered: true,
            ..Self::default()
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// How many times `unregister` was called
    pub fn unregister_calls(&self) -> usize {
        self.unregistered
    }

    /// Settle delays passed to `reregister_after`, in call order
    pub fn resumes(&self) -> &[Duration] {
        &self.resumes
    }
}

impl ChangeNotifications for RecordingNotifications {
    fn unregister(&mut self) {
        self.registered = false;
        self.unregistered += 1;
    }

    fn reregister_after(&mut self, settle: Duration) {
        self.registered = true;
        self.resumes.push(settle);
    }
}
