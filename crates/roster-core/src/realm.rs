//! Realm topology
//!
//! Resolves the current realm and its connected-realm group. Both are asked
//! of the host once and cached for the rest of the session: the connected
//! set cannot change while a client session is active.

use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::host::RealmInfo;

/// Canonical form of a realm name: lowercase, no whitespace
///
/// `"Argent Dawn"` and the `"ArgentDawn"` suffix the host puts on player
/// names both normalize to `"argentdawn"`.
pub fn normalize_realm(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Identity of a realm-group: its sorted, normalized, de-duplicated realms
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RealmGroup(Vec<String>);

impl RealmGroup {
    /// Build a group from any list of realm names
    pub fn new<I, S>(realms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = realms
            .into_iter()
            .map(|r| normalize_realm(r.as_ref()))
            .filter(|r| !r.is_empty())
            .collect();
        Self(set.into_iter().collect())
    }

    /// Member realms in sorted order
    pub fn realms(&self) -> &[String] {
        &self.0
    }

    /// Whether `realm` (any casing or spacing) belongs to this group
    pub fn contains(&self, realm: &str) -> bool {
        let realm = normalize_realm(realm);
        self.0.binary_search(&realm).is_ok()
    }

    /// Whether a persisted realm list describes this group
    pub fn matches(&self, realm_list: &[String]) -> bool {
        *self == Self::new(realm_list)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RealmGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

/// Session-cached view of the current realm and its connected realms
pub struct RealmTopology {
    info: Box<dyn RealmInfo>,
    current: OnceCell<String>,
    connected: OnceCell<BTreeSet<String>>,
}

impl RealmTopology {
    /// Create a topology backed by a host realm collaborator
    pub fn new(info: impl RealmInfo + 'static) -> Self {
        Self {
            info: Box::new(info),
            current: OnceCell::new(),
            connected: OnceCell::new(),
        }
    }

    /// Normalized name of the current realm
    pub fn current_realm(&self) -> &str {
        self.current
            .get_or_init(|| normalize_realm(&self.info.current_realm_name()))
    }

    /// Normalized connected realms, always including the current realm
    pub fn connected_realms(&self) -> &BTreeSet<String> {
        self.connected.get_or_init(|| {
            let mut realms: BTreeSet<String> = self
                .info
                .connected_realm_names()
                .iter()
                .map(|r| normalize_realm(r))
                .filter(|r| !r.is_empty())
                .collect();
            realms.insert(self.current_realm().to_string());
            debug!(count = realms.len(), "Resolved connected realms");
            realms
        })
    }

    /// True iff `realm` is the current realm or connected to it
    pub fn is_connected(&self, realm: &str) -> bool {
        let realm = normalize_realm(realm);
        realm == self.current_realm() || self.connected_realms().contains(&realm)
    }

    /// The realm-group identity used as the persistence key
    pub fn realm_group(&self) -> RealmGroup {
        RealmGroup::new(self.connected_realms())
    }
}

impl fmt::Debug for RealmTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealmTopology")
            .field("current", &self.current.get())
            .field("connected", &self.connected.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::StaticRealmInfo;

    #[test]
    fn test_normalize_realm() {
        assert_eq!(normalize_realm("Argent Dawn"), "argentdawn");
        assert_eq!(normalize_realm("ArgentDawn"), "argentdawn");
        assert_eq!(normalize_realm("  Kul Tiras \t"), "kultiras");
        assert_eq!(normalize_realm(""), "");
    }

    #[test]
    fn test_connected_realms_include_current() {
        let topology = RealmTopology::new(StaticRealmInfo::new("Realm One", Vec::<String>::new()));
        assert_eq!(topology.current_realm(), "realmone");
        assert_eq!(topology.connected_realms().len(), 1);
        assert!(topology.is_connected("Realm One"));
        assert!(!topology.is_connected("Realm Two"));
    }

    #[test]
    fn test_connected_realms_from_host() {
        let topology = RealmTopology::new(StaticRealmInfo::new(
            "Realm1",
            vec!["Realm1", "Realm 2", "Realm3"],
        ));
        assert_eq!(topology.connected_realms().len(), 3);
        assert!(topology.is_connected("realm2"));
        assert!(topology.is_connected("REALM3"));
        assert!(!topology.is_connected("realm4"));
    }

    #[test]
    fn test_realm_group_is_sorted_and_deduplicated() {
        let group = RealmGroup::new(["Zul Jin", "Aegwynn", "aegwynn"]);
        assert_eq!(group.realms(), &["aegwynn".to_string(), "zuljin".to_string()]);
        assert!(group.contains("Zul Jin"));
        assert!(group.matches(&["zuljin".to_string(), "Aegwynn".to_string()]));
        assert_eq!(group.to_string(), "aegwynn,zuljin");
    }

    #[test]
    fn test_topology_realm_group() {
        let topology = RealmTopology::new(StaticRealmInfo::new("B", vec!["C", "A"]));
        assert_eq!(topology.realm_group(), RealmGroup::new(["a", "b", "c"]));
    }
}
