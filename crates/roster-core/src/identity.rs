//! Player identity
//!
//! Normalizes the raw `"Name"` / `"Name-Realm"` strings the host hands out
//! into [`PlayerRecord`]s and their canonical [`PlayerKey`].
//!
//! A key is always fully qualified (`name-realm`) regardless of locality.
//! The bare-name form the host expects for local friends is produced by
//! [`PlayerRecord::host_name`] at the boundary and never used as identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RosterError, RosterResult};
use crate::realm::{RealmTopology, normalize_realm};

/// Canonical player identifier: `name-realm`, lowercase, no whitespace
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerKey(String);

impl PlayerKey {
    /// Canonicalize a key string
    ///
    /// Returns `None` unless the input has a non-empty name and realm.
    pub fn parse(raw: &str) -> Option<Self> {
        let canonical: String = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        let (name, realm) = canonical.split_once('-')?;
        if name.is_empty() || realm.is_empty() {
            return None;
        }
        Some(Self(canonical))
    }

    fn from_parts(name: &str, realm: &str) -> Self {
        Self(format!("{name}-{realm}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name portion of the key
    pub fn name(&self) -> &str {
        self.0.split_once('-').map(|(n, _)| n).unwrap_or(&self.0)
    }

    /// Realm portion of the key
    pub fn realm(&self) -> &str {
        self.0.split_once('-').map(|(_, r)| r).unwrap_or("")
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlayerKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A resolved player: immutable once constructed
///
/// Invariant: `is_local` implies `realm` is the current realm.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerRecord {
    name: String,
    realm: String,
    is_local: bool,
}

impl PlayerRecord {
    /// Resolve a raw `"Name"` or `"Name-Realm"` string
    ///
    /// An empty input yields a nameless record on the current realm, usable
    /// only as an identity template. A name without a dash is on the
    /// current realm; a dash followed by nothing names no realm at all and
    /// fails as `UnknownRealm`.
    pub fn resolve(raw: &str, topology: &RealmTopology) -> RosterResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::local_template(topology));
        }

        let current = topology.current_realm();
        let (name, realm) = match trimmed.split_once('-') {
            Some((name, realm)) => (name.trim().to_lowercase(), normalize_realm(realm)),
            None => (trimmed.to_lowercase(), current.to_string()),
        };
        if name.is_empty() {
            return Err(RosterError::invalid_name(raw));
        }

        if realm == current {
            return Ok(Self {
                name,
                realm: current.to_string(),
                is_local: true,
            });
        }
        if topology.is_connected(&realm) {
            return Ok(Self {
                name,
                realm,
                is_local: false,
            });
        }
        Err(RosterError::unknown_realm(name, realm))
    }

    /// Resolve a canonical key back into a record
    pub fn from_key(key: &PlayerKey, topology: &RealmTopology) -> RosterResult<Self> {
        Self::resolve(key.as_str(), topology)
    }

    /// The nameless record for the current realm
    pub fn local_template(topology: &RealmTopology) -> Self {
        Self {
            name: String::new(),
            realm: topology.current_realm().to_string(),
            is_local: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn is_local(&self) -> bool {
        self.is_local
    }

    /// Whether this is the nameless identity template
    pub fn is_template(&self) -> bool {
        self.name.is_empty()
    }

    /// Canonical `name-realm` key
    pub fn key(&self) -> PlayerKey {
        PlayerKey::from_parts(&self.name, &self.realm)
    }

    /// Form the host friends API expects: bare name for local players
    pub fn host_name(&self) -> String {
        if self.is_local {
            self.name.clone()
        } else {
            format!("{}-{}", self.name, self.realm)
        }
    }
}

impl fmt::Display for PlayerRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.realm)
    }
}
