//! Integration tests for the JSON file store

use roster_core::RealmGroup;
use roster_storage::{JsonFileStore, KeyList, SavedState, StateStore, StorageError};
use tempfile::TempDir;

#[test]
fn test_missing_file_is_first_run() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("roster.json"));
    assert!(store.load().unwrap().is_none());
}

#[test]
fn test_empty_or_null_file_is_first_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roster.json");

    std::fs::write(&path, "  \n").unwrap();
    assert!(JsonFileStore::new(&path).load().unwrap().is_none());

    std::fs::write(&path, "null").unwrap();
    assert!(JsonFileStore::new(&path).load().unwrap().is_none());
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("roster.json");
    let mut store = JsonFileStore::new(&path);

    let group = RealmGroup::new(["Realm1", "Realm2"]);
    let mut state = SavedState::default();
    state.set_deletion_flag("alice-realm1", true);
    {
        let record = state.group_mut(&group);
        record.master = KeyList::new(["bob-realm1", "carol-realm2"]);
        record.full_sync = true;
        record
            .overlays
            .insert("alice-realm1".into(), KeyList::new(["dave-realm1"]));
    }
    state.saved_at = Some(chrono::Utc::now());

    store.save(&state).unwrap();
    assert!(path.exists());
    assert!(!dir.path().join("nested").join("roster.json.tmp").exists());

    let loaded = store.load().unwrap().expect("state should be present");
    assert_eq!(loaded, state);
}

#[test]
fn test_save_overwrites_previous_state() {
    let dir = TempDir::new().unwrap();
    let mut store = JsonFileStore::new(dir.path().join("roster.json"));

    let mut first = SavedState::default();
    first.set_deletion_flag("alice-realm1", true);
    store.save(&first).unwrap();

    let second = SavedState::default();
    store.save(&second).unwrap();

    let loaded = store.load().unwrap().unwrap();
    assert!(!loaded.deletion_flag("alice-realm1"));
}

#[test]
fn test_corrupt_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("roster.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = JsonFileStore::new(&path).load().unwrap_err();
    assert!(matches!(err, StorageError::Deserialization(_)));
}
