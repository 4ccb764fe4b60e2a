//! State store backends
//!
//! The store is read once at login and written once at logout, always as
//! a whole. There are no partial writes to reconcile.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::schema::SavedState;

/// Persistence collaborator for [`SavedState`]
pub trait StateStore {
    /// Read the persisted state
    ///
    /// `Ok(None)` means nothing was ever saved (first run).
    fn load(&self) -> StorageResult<Option<SavedState>>;

    /// Replace the persisted state
    fn save(&mut self, state: &SavedState) -> StorageResult<()>;
}

/// JSON file store
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash mid-write leaves the previous state intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> StorageResult<Option<SavedState>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No saved state, first run");
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let state: Option<SavedState> = serde_json::from_str(&raw)
            .map_err(|e| StorageError::deserialization(e.to_string()))?;
        if let Some(state) = &state {
            info!(
                path = %self.path.display(),
                groups = state.realm_groups.len(),
                "Loaded saved state"
            );
        }
        Ok(state)
    }

    fn save(&mut self, state: &SavedState) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(state)
            .map_err(|e| StorageError::serialization(e.to_string()))?;
        let temp = self.temp_path();
        fs::write(&temp, raw)?;
        fs::rename(&temp, &self.path)?;
        info!(
            path = %self.path.display(),
            groups = state.realm_groups.len(),
            "Saved state"
        );
        Ok(())
    }
}

/// In-memory store for tests
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Option<SavedState>,
    saves: usize,
}

impl InMemoryStore {
    /// Create an empty store (first run)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding previously saved state
    pub fn with_state(state: SavedState) -> Self {
        Self {
            state: Some(state),
            saves: 0,
        }
    }

    /// The last saved (or seeded) state
    pub fn state(&self) -> Option<&SavedState> {
        self.state.as_ref()
    }

    /// Number of completed saves
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl StateStore for InMemoryStore {
    fn load(&self) -> StorageResult<Option<SavedState>> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &SavedState) -> StorageResult<()> {
        self.state = Some(state.clone());
        self.saves += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_store() {
        let mut store = InMemoryStore::new();
        assert!(store.load().unwrap().is_none());

        let mut state = SavedState::default();
        state.set_deletion_flag("alice-realm1", true);
        store.save(&state).unwrap();

        assert_eq!(store.saves(), 1);
        assert_eq!(store.load().unwrap(), Some(state));
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let store = JsonFileStore::new("/tmp/roster/state.json");
        assert_eq!(store.temp_path(), PathBuf::from("/tmp/roster/state.json.tmp"));
    }
}
