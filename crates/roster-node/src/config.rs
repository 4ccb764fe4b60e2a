//! Configuration for the session coordinator and the CLI

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use roster_logging::Verbosity;
use roster_sync::DEFAULT_SETTLE_DELAY;

/// Backoff used while waiting for the host friends list to load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvailabilityPolicy {
    /// Total number of checks, including the one at login
    pub max_attempts: u32,
    /// Delay after the first failed check
    pub initial_delay: Duration,
    /// Factor applied to the delay after every further failure
    pub multiplier: u32,
}

impl Default for AvailabilityPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_secs(5),
            multiplier: 2,
        }
    }
}

impl AvailabilityPolicy {
    /// Delay to wait after failed check number `attempt` (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay.saturating_mul(factor)
    }
}

/// Configuration for a [`crate::Session`]
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Delay before friends-list-changed events resume after a mutation block
    pub settle_delay: Duration,
    /// Backoff while waiting for the host friends list
    pub availability: AvailabilityPolicy,
    /// Drop realm-groups with no snapshot state when saving
    pub prune_stale_groups: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            availability: AvailabilityPolicy::default(),
            prune_stale_groups: true,
        }
    }
}

impl SessionConfig {
    /// Set the settle delay
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Set the availability backoff
    pub fn with_availability(mut self, availability: AvailabilityPolicy) -> Self {
        self.availability = availability;
        self
    }

    /// Enable or disable stale realm-group pruning
    pub fn with_prune_stale_groups(mut self, prune: bool) -> Self {
        self.prune_stale_groups = prune;
        self
    }
}

#[derive(Parser)]
#[command(
    name = "roster",
    about = "Keep a friends list in sync across the characters of a realm-group"
)]
pub struct Cli {
    /// Persisted snapshot store (JSON)
    #[arg(long, default_value = "roster.json")]
    pub store: PathBuf,
    /// Friends list of the active character (JSON)
    #[arg(long)]
    pub friends: PathBuf,
    /// Realm the character is on
    #[arg(long)]
    pub realm: String,
    /// Connected realms, comma separated
    #[arg(long, value_delimiter = ',')]
    pub connected: Vec<String>,
    /// Character name
    #[arg(long)]
    pub character: String,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: Verbosity,
    /// Seconds before change events resume after restoring
    #[arg(long)]
    pub settle_secs: Option<u64>,
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand)]
pub enum CliCommand {
    /// Log in, restore the snapshots onto the friends list, and log out
    Sync,
    /// Log in and print the sync status
    Status,
    /// Log in and run slash-style commands, e.g. `run "delete on" "friends master"`
    Run {
        /// Commands to run in order
        commands: Vec<String>,
    },
}
