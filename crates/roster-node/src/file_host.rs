//! File-backed friends list
//!
//! Stands in for the game client when running from the command line: the
//! friends list of one character is a JSON array of [`FriendInfo`] entries.

use std::fs;
use std::path::{Path, PathBuf};

use roster_core::{FriendInfo, FriendsApi};
use tracing::{debug, info};

use crate::error::{NodeError, NodeResult};

/// A friends list stored as a JSON file
#[derive(Debug, Clone)]
pub struct FileFriendsApi {
    path: PathBuf,
    entries: Vec<FriendInfo>,
    dirty: bool,
}

impl FileFriendsApi {
    /// Load the list at `path`; a missing file is an empty list
    pub fn load(path: impl Into<PathBuf>) -> NodeResult<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&raw).map_err(|e| NodeError::Serialization(e.to_string()))?
            }
        } else {
            debug!(path = %path.display(), "No friends file, starting empty");
            Vec::new()
        };
        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[FriendInfo] {
        &self.entries
    }

    /// Write the list back if it changed
    pub fn flush(&mut self) -> NodeResult<()> {
        if !self.dirty {
            return Ok(());
        }
        let raw = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| NodeError::Serialization(e.to_string()))?;
        fs::write(&self.path, raw)?;
        self.dirty = false;
        info!(path = %self.path.display(), friends = self.entries.len(), "Saved friends list");
        Ok(())
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.name.eq_ignore_ascii_case(key))
    }
}

impl FriendsApi for FileFriendsApi {
    fn count(&self) -> usize {
        self.entries.len()
    }

    fn info_at(&self, index: usize) -> Option<FriendInfo> {
        self.entries.get(index).cloned()
    }

    fn info_by_key(&self, key: &str) -> Option<FriendInfo> {
        self.position(key).map(|i| self.entries[i].clone())
    }

    fn add(&mut self, key: &str) {
        if self.position(key).is_none() {
            self.entries.push(FriendInfo::new(key));
            self.dirty = true;
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(i) = self.position(key) {
            self.entries.remove(i);
            self.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let api = FileFriendsApi::load(dir.path().join("friends.json")).unwrap();
        assert_eq!(api.count(), 0);
    }

    #[test]
    fn test_add_remove_and_flush() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("friends.json");
        fs::write(&path, r#"[{"name": "Alice"}, {"name": "Bob-Realm2", "connected": true}]"#)
            .unwrap();

        let mut api = FileFriendsApi::load(&path).unwrap();
        assert_eq!(api.count(), 2);
        assert!(api.info_by_key("alice").is_some());
        assert!(api.info_at(1).unwrap().connected);

        api.add("ALICE");
        assert_eq!(api.count(), 2);
        api.add("carol");
        api.remove("bob-realm2");
        api.flush().unwrap();

        let reloaded = FileFriendsApi::load(&path).unwrap();
        let names: Vec<_> = reloaded.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "carol"]);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("friends.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            FileFriendsApi::load(&path),
            Err(NodeError::Serialization(_))
        ));
    }
}
