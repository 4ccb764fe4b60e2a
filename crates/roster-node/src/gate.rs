//! Friends-list-changed registration
//!
//! Mutating the live list fires friends-list-changed, which would trigger
//! another refresh. Mutation blocks unregister first and resume only after
//! a settle delay, via a scheduled [`HostEvent::ResumeFriendEvents`]. Each
//! unregister bumps a generation so a resume scheduled for an earlier block
//! cannot re-register in the middle of a later one.

use std::time::Duration;

use roster_core::ChangeNotifications;
use tracing::{debug, trace};

use crate::events::HostEvent;
use crate::scheduler::Scheduler;

/// Registration state for friends-list-changed events
#[derive(Debug)]
pub struct FriendEventGate<S: Scheduler> {
    scheduler: S,
    registered: bool,
    generation: u64,
}

impl<S: Scheduler> FriendEventGate<S> {
    /// Create a gate in the registered state
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            registered: true,
            generation: 0,
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Whether friends-list-changed events should be handled
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Handle a scheduled resume; stale generations are ignored
    pub fn resume(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            trace!(generation, current = self.generation, "Ignoring stale resume");
            return false;
        }
        if !self.registered {
            debug!("Friend list events resumed");
        }
        self.registered = true;
        true
    }
}

impl<S: Scheduler> ChangeNotifications for FriendEventGate<S> {
    fn unregister(&mut self) {
        self.registered = false;
        self.generation += 1;
        debug!(generation = self.generation, "Friend list events suspended");
    }

    fn reregister_after(&mut self, settle: Duration) {
        self.scheduler.schedule(
            settle,
            HostEvent::ResumeFriendEvents {
                generation: self.generation,
            },
        );
    }
}
