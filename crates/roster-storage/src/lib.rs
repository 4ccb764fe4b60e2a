//! # Roster Storage
//!
//! Persisted snapshot state for the roster friends-list synchronizer.
//!
//! ## Features
//!
//! - **SavedState**: the account-wide record of master snapshots, overlays
//!   and policy flags, grouped by realm-group
//! - **StateStore trait**: load once at login, save once at logout
//! - **JsonFileStore**: JSON file backend with atomic replace
//! - **InMemoryStore**: backend for tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use roster_storage::{JsonFileStore, SavedState, StateStore};
//!
//! let mut store = JsonFileStore::new("roster.json");
//! let mut state = store.load()?.unwrap_or_default();
//! state.set_deletion_flag("alice-realm1", true);
//! store.save(&state)?;
//! ```

pub mod error;
pub mod schema;
pub mod store;

// Re-exports
pub use error::{StorageError, StorageResult};
pub use schema::{KeyList, RealmGroupRecord, SavedState};
pub use store::{InMemoryStore, JsonFileStore, StateStore};
