//! Persisted state schema
//!
//! One nested record for the whole account, read once at login and written
//! once at logout:
//!
//! ```json
//! {
//!   "doDeletions": { "alice-realm1": true },
//!   "RealmGroups": [
//!     {
//!       "realmList": ["realm1", "realm2"],
//!       "tMasterSnapshot": ["bob-realm1", "carol-realm2"],
//!       "fullSync": false,
//!       "tSnapshots": { "alice-realm1": ["dave-realm1"] }
//!     }
//!   ]
//! }
//! ```
//!
//! Loading is tolerant. Missing fields default, and key sets are accepted
//! either as sequences or as `key -> marker` maps. They are always written
//! back as sorted sequences.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use roster_core::RealmGroup;
use serde::{Deserialize, Deserializer, Serialize};

/// A persisted set of player keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeyList(Vec<String>);

impl KeyList {
    /// Build a sorted, de-duplicated list
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = keys.into_iter().map(Into::into).collect();
        Self(set.into_iter().collect())
    }

    pub fn keys(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum KeyListRepr {
    Sequence(Vec<String>),
    Association(BTreeMap<String, serde_json::Value>),
    Empty(()),
}

impl<'de> Deserialize<'de> for KeyList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match KeyListRepr::deserialize(deserializer)? {
            KeyListRepr::Sequence(keys) => KeyList::new(keys),
            KeyListRepr::Association(map) => KeyList::new(map.into_keys()),
            KeyListRepr::Empty(()) => KeyList::default(),
        })
    }
}

/// Snapshot state for one realm-group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RealmGroupRecord {
    #[serde(rename = "realmList", default)]
    pub realm_list: Vec<String>,

    #[serde(rename = "tMasterSnapshot", default)]
    pub master: KeyList,

    #[serde(rename = "fullSync", default)]
    pub full_sync: bool,

    /// Per-character overlay snapshots
    #[serde(rename = "tSnapshots", default)]
    pub overlays: BTreeMap<String, KeyList>,
}

impl RealmGroupRecord {
    /// Create an empty record for a group
    pub fn new(group: &RealmGroup) -> Self {
        Self {
            realm_list: group.realms().to_vec(),
            ..Self::default()
        }
    }

    /// Overlay for a character, empty if none was saved
    pub fn overlay(&self, character: &str) -> &[String] {
        self.overlays
            .get(character)
            .map(KeyList::keys)
            .unwrap_or(&[])
    }

    /// Whether the record carries nothing worth keeping
    pub fn is_stale(&self) -> bool {
        self.master.is_empty() && !self.full_sync && self.overlays.values().all(KeyList::is_empty)
    }
}

/// The whole persisted store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    /// Per-character deletion flag
    #[serde(rename = "doDeletions", default)]
    pub do_deletions: BTreeMap<String, bool>,

    #[serde(rename = "RealmGroups", default)]
    pub realm_groups: Vec<RealmGroupRecord>,

    #[serde(rename = "savedAt", default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl SavedState {
    /// Record for a realm-group, matched on its normalized realm list
    pub fn group(&self, group: &RealmGroup) -> Option<&RealmGroupRecord> {
        self.realm_groups
            .iter()
            .find(|r| group.matches(&r.realm_list))
    }

    /// Record for a realm-group, created empty if missing
    pub fn group_mut(&mut self, group: &RealmGroup) -> &mut RealmGroupRecord {
        let index = match self
            .realm_groups
            .iter()
            .position(|r| group.matches(&r.realm_list))
        {
            Some(index) => index,
            None => {
                self.realm_groups.push(RealmGroupRecord::new(group));
                self.realm_groups.len() - 1
            }
        };
        let record = &mut self.realm_groups[index];
        record.realm_list = group.realms().to_vec();
        record
    }

    /// Deletion flag for a character, `false` when never set
    pub fn deletion_flag(&self, character: &str) -> bool {
        self.do_deletions.get(character).copied().unwrap_or(false)
    }

    pub fn set_deletion_flag(&mut self, character: &str, enabled: bool) {
        self.do_deletions.insert(character.to_string(), enabled);
    }

    /// Drop realm-groups that carry no snapshot state
    ///
    /// Returns the number of groups removed.
    pub fn prune_stale_groups(&mut self) -> usize {
        let before = self.realm_groups.len();
        self.realm_groups.retain(|r| !r.is_stale());
        before - self.realm_groups.len()
    }
}
