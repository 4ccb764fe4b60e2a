//! Friend snapshots
//!
//! A snapshot is a set of [`PlayerKey`]s. The same type backs the
//! group-wide master snapshot, the per-character overlay and the view of
//! the live list taken during reconciliation.

use std::collections::BTreeSet;
use std::str::FromStr;

use roster_core::PlayerKey;
use roster_storage::KeyList;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// An ordered set of player keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendSnapshot {
    keys: BTreeSet<PlayerKey>,
}

impl FriendSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a persisted key list, skipping keys that do not parse
    pub fn from_key_list(list: &[String]) -> Self {
        list.iter()
            .filter_map(|raw| {
                let key = PlayerKey::parse(raw);
                if key.is_none() {
                    warn!(key = %raw, "Dropping malformed persisted key");
                }
                key
            })
            .collect()
    }

    /// Encode for persistence
    pub fn to_key_list(&self) -> KeyList {
        KeyList::new(self.keys.iter().map(|k| k.as_str().to_string()))
    }

    /// Insert a key, returning whether it was newly added
    pub fn insert(&mut self, key: PlayerKey) -> bool {
        self.keys.insert(key)
    }

    /// Remove a key, returning whether it was present
    pub fn remove(&mut self, key: &PlayerKey) -> bool {
        self.keys.remove(key)
    }

    pub fn contains(&self, key: &PlayerKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerKey> {
        self.keys.iter()
    }

    pub fn retain(&mut self, f: impl FnMut(&PlayerKey) -> bool) {
        self.keys.retain(f)
    }

    /// Keys as sorted strings, for dumps
    pub fn dump(&self) -> Vec<String> {
        self.keys.iter().map(|k| k.to_string()).collect()
    }
}

impl FromIterator<PlayerKey> for FriendSnapshot {
    fn from_iter<T: IntoIterator<Item = PlayerKey>>(iter: T) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FriendSnapshot {
    type Item = &'a PlayerKey;
    type IntoIter = std::collections::btree_set::Iter<'a, PlayerKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

/// Which friend set a count or dump refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendSource {
    /// The host's live friends list
    #[default]
    Live,
    /// The realm-group master snapshot
    Master,
    /// The character's overlay snapshot
    Overlay,
}

impl FromStr for FriendSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "live" | "friends" => Ok(Self::Live),
            "master" | "group" => Ok(Self::Master),
            "overlay" | "character" | "char" => Ok(Self::Overlay),
            other => Err(format!("unknown friend list {other:?}")),
        }
    }
}

impl std::fmt::Display for FriendSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Live => "live",
            Self::Master => "master",
            Self::Overlay => "overlay",
        })
    }
}
