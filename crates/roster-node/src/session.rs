//! Session coordinator
//!
//! A [`Session`] is the application context for one character session. It
//! owns every component (live list, reconciler, store, change gate, log
//! handle) and is driven by [`HostEvent`]s delivered one at a time.
//!
//! Lifecycle:
//!
//! 1. `Login` loads the persisted state and checks the host friends list.
//!    While the list is not available, checks are retried with backoff; once
//!    the budget is spent, sync is skipped for the session.
//! 2. The first successful check restores the snapshots onto the live list.
//! 3. Every `FriendListChanged` while the gate is registered refreshes the
//!    snapshots.
//! 4. `Logout` writes the snapshots back and saves the store.

use chrono::Utc;
use roster_core::{FriendsApi, PlayerKey, PlayerRecord, RosterError};
use roster_logging::LogLevelHandle;
use roster_storage::{SavedState, StateStore};
use roster_sync::{FriendSource, LiveFriendsList, SnapshotReconciler};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use crate::commands::{Command, HELP_LINES};
use crate::config::SessionConfig;
use crate::error::NodeResult;
use crate::events::HostEvent;
use crate::gate::FriendEventGate;
use crate::scheduler::Scheduler;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Before `Login`
    Idle,
    /// Logged in, waiting for the host friends list
    WaitingForFriends,
    /// Snapshots restored; refreshing on change events
    Synced,
    /// The friends list never became available; sync skipped
    SyncSkipped,
    /// After `Logout`
    Ended,
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

/// Application context for one character session
pub struct Session<F: FriendsApi, S: Scheduler, T: StateStore> {
    config: SessionConfig,
    live: LiveFriendsList<F>,
    gate: FriendEventGate<S>,
    store: T,
    character: PlayerKey,
    state: SavedState,
    reconciler: Option<SnapshotReconciler>,
    persist: bool,
    logging: Option<LogLevelHandle>,
    phase: SessionPhase,
}

impl<F: FriendsApi, S: Scheduler, T: StateStore> Session<F, S, T> {
    /// Create a session for the named character
    pub fn new(
        config: SessionConfig,
        live: LiveFriendsList<F>,
        scheduler: S,
        store: T,
        character: &str,
    ) -> NodeResult<Self> {
        let record = PlayerRecord::resolve(character, live.topology())?;
        if record.is_template() {
            return Err(RosterError::invalid_name(character).into());
        }
        Ok(Self {
            config,
            live,
            gate: FriendEventGate::new(scheduler),
            store,
            character: record.key(),
            state: SavedState::default(),
            reconciler: None,
            persist: true,
            logging: None,
            phase: SessionPhase::Idle,
        })
    }

    /// Attach the log threshold handle used by the `debug` command
    pub fn with_logging(mut self, logging: LogLevelHandle) -> Self {
        self.logging = Some(logging);
        self
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn character(&self) -> &PlayerKey {
        &self.character
    }

    pub fn live(&self) -> &LiveFriendsList<F> {
        &self.live
    }

    /// Mutable access to the live list, as the player editing it in the client
    pub fn live_mut(&mut self) -> &mut LiveFriendsList<F> {
        &mut self.live
    }

    pub fn gate(&self) -> &FriendEventGate<S> {
        &self.gate
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    /// The reconciler, once logged in
    pub fn reconciler(&self) -> Option<&SnapshotReconciler> {
        self.reconciler.as_ref()
    }

    pub fn into_live(self) -> LiveFriendsList<F> {
        self.live
    }

    /// Process events until `Logout`, passing command output to `output`
    pub async fn run(
        &mut self,
        mut events: mpsc::UnboundedReceiver<HostEvent>,
        mut output: impl FnMut(&str),
    ) {
        while let Some(event) = events.recv().await {
            let logout = event == HostEvent::Logout;
            for line in self.handle(event) {
                output(&line);
            }
            if logout {
                break;
            }
        }
    }

    /// Handle a single host event, returning any lines to print
    pub fn handle(&mut self, event: HostEvent) -> Vec<String> {
        trace!(?event, "Handling host event");
        match event {
            HostEvent::Login => self.login(),
            HostEvent::PollAvailability { attempt } => self.poll_availability(attempt),
            HostEvent::FriendListChanged => self.friend_list_changed(),
            HostEvent::ResumeFriendEvents { generation } => {
                self.gate.resume(generation);
            }
            HostEvent::Command(text) => return self.run_command(&text),
            HostEvent::Logout => self.logout(),
        }
        Vec::new()
    }

    fn login(&mut self) {
        if self.reconciler.is_some() {
            warn!("Duplicate login ignored");
            return;
        }
        self.state = match self.store.load() {
            Ok(Some(state)) => state,
            Ok(None) => {
                info!("No saved friend snapshots, starting fresh");
                SavedState::default()
            }
            Err(err) => {
                error!(error = %err, "Failed to load saved state; changes will not be saved");
                self.persist = false;
                SavedState::default()
            }
        };
        let group = self.live.topology().realm_group();
        info!(character = %self.character, group = %group, "Logged in");
        self.reconciler = Some(
            SnapshotReconciler::from_saved(&self.state, group, self.character.clone())
                .with_settle_delay(self.config.settle_delay),
        );
        self.phase = SessionPhase::WaitingForFriends;
        self.poll_availability(1);
    }

    fn poll_availability(&mut self, attempt: u32) {
        if self.phase != SessionPhase::WaitingForFriends {
            trace!(attempt, phase = ?self.phase, "Availability poll ignored");
            return;
        }
        let Some(reconciler) = self.reconciler.as_mut() else {
            warn!(error = %RosterError::missing("reconciler"), "Availability poll before login");
            return;
        };

        if self.live.is_available() {
            debug!(attempt, "Friends list available");
            reconciler.restore(&mut self.live, &mut self.gate);
            self.phase = SessionPhase::Synced;
            return;
        }

        let policy = self.config.availability;
        if attempt >= policy.max_attempts {
            warn!(attempts = attempt, "Friends list never became available; skipping sync");
            self.phase = SessionPhase::SyncSkipped;
            return;
        }
        let delay = policy.delay_after(attempt);
        debug!(attempt, ?delay, "Friends list not available yet");
        self.gate.scheduler().schedule(
            delay,
            HostEvent::PollAvailability {
                attempt: attempt + 1,
            },
        );
    }

    fn friend_list_changed(&mut self) {
        if !self.gate.is_registered() {
            trace!("Friend list change ignored while suspended");
            return;
        }
        if let Some(reconciler) = self.reconciler.as_mut() {
            reconciler.refresh(&mut self.live, &mut self.gate);
        }
    }

    fn logout(&mut self) {
        let Some(reconciler) = self.reconciler.take() else {
            debug!("Logout without login");
            self.phase = SessionPhase::Ended;
            return;
        };
        reconciler.write_to(&mut self.state);
        if self.config.prune_stale_groups {
            let pruned = self.state.prune_stale_groups();
            if pruned > 0 {
                info!(pruned, "Pruned empty realm-groups");
            }
        }
        self.state.saved_at = Some(Utc::now());
        self.phase = SessionPhase::Ended;

        if !self.persist {
            warn!("Saved state was unreadable at login; not overwriting it");
            return;
        }
        if let Err(err) = self.store.save(&self.state) {
            error!(error = %err, "Failed to save friend snapshots");
        }
    }

    fn run_command(&mut self, text: &str) -> Vec<String> {
        match text.parse::<Command>() {
            Ok(command) => self.execute(command),
            Err(err) => vec![err.to_string(), "Type \"help\" for commands.".to_string()],
        }
    }

    /// Execute a parsed command
    pub fn execute(&mut self, command: Command) -> Vec<String> {
        if command == Command::Help {
            return HELP_LINES.iter().map(|l| l.to_string()).collect();
        }
        if let Command::Debug(level) = command {
            return self.debug_command(level);
        }
        let Some(reconciler) = self.reconciler.as_mut() else {
            return vec!["Not logged in.".to_string()];
        };

        match command {
            Command::Status => vec![
                format!("Character: {}", self.character),
                format!("Realm group: {}", reconciler.group()),
                format!("Sync: {:?}", self.phase),
                format!("Deletions: {}", on_off(reconciler.is_deletion_active())),
                format!("Full sync: {}", on_off(reconciler.is_full_sync_active())),
                format!(
                    "Friends: live {}, master {}, overlay {}",
                    reconciler.count_friends(FriendSource::Live, &self.live),
                    reconciler.count_friends(FriendSource::Master, &self.live),
                    reconciler.count_friends(FriendSource::Overlay, &self.live),
                ),
            ],
            Command::Delete(None) => {
                vec![format!("Deletions: {}", on_off(reconciler.is_deletion_active()))]
            }
            Command::Delete(Some(enabled)) => {
                reconciler.set_deletion(enabled);
                vec![format!("Deletions: {}", on_off(enabled))]
            }
            Command::FullSync(None) => {
                vec![format!("Full sync: {}", on_off(reconciler.is_full_sync_active()))]
            }
            Command::FullSync(Some(enabled)) => {
                let mut lines = vec![format!("Full sync: {}", on_off(enabled))];
                if let Some(outcome) = reconciler.set_full_sync(enabled, &mut self.live, &mut self.gate)
                {
                    if !outcome.removed_from_live.is_empty() {
                        lines.push(format!(
                            "Removed {} stale friends",
                            outcome.removed_from_live.len()
                        ));
                    }
                }
                lines
            }
            Command::Friends(which) => {
                let keys = reconciler.dump_friend_snapshot(which, &self.live);
                let mut lines = vec![format!("{} friends ({}):", which, keys.len())];
                lines.extend(keys.into_iter().map(|k| format!("  {k}")));
                lines
            }
            Command::Help | Command::Debug(_) => Vec::new(),
        }
    }

    fn debug_command(&self, level: Option<roster_logging::Verbosity>) -> Vec<String> {
        let Some(logging) = &self.logging else {
            return vec!["Log level control unavailable.".to_string()];
        };
        match level {
            None => vec![format!("Log level: {}", logging.current())],
            Some(level) => match logging.set(level) {
                Ok(()) => vec![format!("Log level: {level}")],
                Err(err) => vec![err.to_string()],
            },
        }
    }
}

impl<F, S, T> std::fmt::Debug for Session<F, S, T>
where
    F: FriendsApi,
    S: Scheduler,
    T: StateStore,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("character", &self.character)
            .field("phase", &self.phase)
            .field("registered", &self.gate.is_registered())
            .finish()
    }
}
