//! # Roster Node
//!
//! Session coordinator for the roster friends-list synchronizer.
//!
//! This crate provides [`Session`], which ties together:
//! - the live friends list of the active character
//! - the persisted snapshot store
//! - the snapshot reconciler
//! - the friends-list-changed gate and delayed event delivery
//!
//! ## Example
//!
//! ```rust,ignore
//! use roster_node::{HostEvent, Session, SessionConfig, TokioScheduler};
//!
//! let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut session = Session::new(
//!     SessionConfig::default(),
//!     live,
//!     TokioScheduler::new(tx.clone()),
//!     JsonFileStore::new("roster.json"),
//!     "Arthas",
//! )?;
//!
//! tx.send(HostEvent::Login)?;
//! tx.send(HostEvent::Command("status".into()))?;
//! tx.send(HostEvent::Logout)?;
//! session.run(rx, |line| println!("{line}")).await;
//! ```

pub mod commands;
pub mod config;
mod error;
pub mod events;
pub mod file_host;
pub mod gate;
pub mod scheduler;
pub mod session;

pub use commands::Command;
pub use config::{AvailabilityPolicy, Cli, CliCommand, SessionConfig};
pub use error::{NodeError, NodeResult};
pub use events::HostEvent;
pub use file_host::FileFriendsApi;
pub use gate::FriendEventGate;
pub use scheduler::{RecordingScheduler, Scheduler, TokioScheduler};
pub use session::{Session, SessionPhase};
