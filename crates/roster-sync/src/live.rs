//! Live friends list facade
//!
//! Wraps the host [`FriendsApi`] in terms of [`PlayerRecord`]s. Raw host
//! entries are resolved on the way in; records are translated back to the
//! host's naming (bare names for local friends) on the way out.

use std::collections::BTreeMap;

use roster_core::{FriendsApi, PlayerKey, PlayerRecord, RealmTopology, RosterError, RosterResult};
use tracing::{debug, trace, warn};

use crate::snapshot::FriendSnapshot;

/// Result of walking the host friends list
#[derive(Debug, Clone, Default)]
pub struct Enumeration {
    /// Resolved entries keyed by canonical key
    pub records: BTreeMap<PlayerKey, PlayerRecord>,
    /// Names exactly as the host reported them, keyed by canonical key
    pub host_names: BTreeMap<PlayerKey, String>,
    /// Entries the host had no data for yet
    pub pending: usize,
    /// Entries dropped as malformed or on an unconnected realm
    pub rejected: usize,
}

impl Enumeration {
    /// Whether every host entry was readable
    pub fn is_complete(&self) -> bool {
        self.pending == 0
    }

    /// Keys of the resolved entries
    pub fn snapshot(&self) -> FriendSnapshot {
        self.records.keys().cloned().collect()
    }

    /// The raw host name behind a key
    pub fn host_name(&self, key: &PlayerKey) -> Option<&str> {
        self.host_names.get(key).map(String::as_str)
    }
}

/// Read/write view of the active character's friends list
#[derive(Debug)]
pub struct LiveFriendsList<F: FriendsApi> {
    api: F,
    topology: RealmTopology,
}

impl<F: FriendsApi> LiveFriendsList<F> {
    pub fn new(api: F, topology: RealmTopology) -> Self {
        Self { api, topology }
    }

    pub fn topology(&self) -> &RealmTopology {
        &self.topology
    }

    /// The wrapped host collaborator
    pub fn api(&self) -> &F {
        &self.api
    }

    pub fn into_api(self) -> F {
        self.api
    }

    /// Number of entries the host reports
    pub fn count(&self) -> usize {
        self.api.count()
    }

    /// Whether the host has finished loading the list
    ///
    /// The host lags behind login: until the first entry carries a name the
    /// list must not be used for any destructive operation. An empty list
    /// counts as available.
    pub fn is_available(&self) -> bool {
        if self.api.count() == 0 {
            return true;
        }
        self.api
            .info_at(0)
            .is_some_and(|info| !info.name.trim().is_empty())
    }

    /// Resolve every host entry
    ///
    /// Entries on unconnected realms are a data fault: they are dropped
    /// with a warning and never reach reconciliation.
    pub fn enumerate(&self) -> Enumeration {
        let mut result = Enumeration::default();
        for index in 0..self.api.count() {
            let Some(info) = self.api.info_at(index).filter(|i| !i.name.trim().is_empty()) else {
                trace!(index, "Friend entry not loaded yet");
                result.pending += 1;
                continue;
            };
            match PlayerRecord::resolve(&info.name, &self.topology) {
                Ok(record) if record.is_template() => result.rejected += 1,
                Ok(record) => {
                    let key = record.key();
                    result.host_names.insert(key.clone(), info.name);
                    result.records.insert(key, record);
                }
                Err(err @ RosterError::UnknownRealm { .. }) => {
                    warn!(name = %info.name, error = %err, "Dropping friend on unconnected realm");
                    result.rejected += 1;
                }
                Err(err) => {
                    warn!(name = %info.name, error = %err, "Dropping malformed friend entry");
                    result.rejected += 1;
                }
            }
        }
        debug!(
            friends = result.records.len(),
            pending = result.pending,
            rejected = result.rejected,
            "Enumerated live friends"
        );
        result
    }

    /// Resolve a snapshot key against the current topology
    pub fn resolve_key(&self, key: &PlayerKey) -> RosterResult<PlayerRecord> {
        PlayerRecord::from_key(key, &self.topology)
    }

    /// Raw host name of the entry for `record`, if on the list
    ///
    /// The host may list a friend under a different spelling than the one
    /// [`PlayerRecord::host_name`] builds (`"Stray-Realm1"` for a local
    /// friend, `"Bob-Other Realm"` with a spaced realm), so a direct lookup
    /// falls back to resolving every entry.
    pub fn locate(&self, record: &PlayerRecord) -> Option<String> {
        if let Some(info) = self.api.info_by_key(&record.host_name()) {
            return Some(info.name);
        }
        let key = record.key();
        (0..self.api.count())
            .filter_map(|index| self.api.info_at(index))
            .find(|info| {
                PlayerRecord::resolve(&info.name, &self.topology)
                    .is_ok_and(|r| !r.is_template() && r.key() == key)
            })
            .map(|info| info.name)
    }

    pub fn contains(&self, record: &PlayerRecord) -> bool {
        self.locate(record).is_some()
    }

    /// Add a friend; returns whether the list changed
    pub fn add(&mut self, record: &PlayerRecord) -> bool {
        if self.contains(record) {
            trace!(key = %record.key(), "Friend already present");
            return false;
        }
        debug!(key = %record.key(), "Adding friend");
        self.api.add(&record.host_name());
        self.contains(record)
    }

    /// Remove a friend; returns whether an entry was removed
    pub fn remove(&mut self, record: &PlayerRecord) -> bool {
        match self.locate(record) {
            Some(host_name) => self.remove_host_entry(&host_name),
            None => {
                trace!(key = %record.key(), "Friend already absent");
                false
            }
        }
    }

    /// Remove the entry the host reported as `host_name`
    ///
    /// Returns `true` only if the entry was present and is gone afterwards.
    pub fn remove_host_entry(&mut self, host_name: &str) -> bool {
        if self.api.info_by_key(host_name).is_none() {
            return false;
        }
        debug!(host_name, "Removing friend");
        self.api.remove(host_name);
        let removed = self.api.info_by_key(host_name).is_none();
        if !removed {
            warn!(host_name, "Host did not remove friend");
        }
        removed
    }
}
