//! Delayed event delivery
//!
//! The host offers a single scheduling primitive: run this once after N
//! seconds. Here that means delivering a [`HostEvent`] back into the
//! session's event queue after a delay.

use std::cell::RefCell;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::trace;

use crate::events::HostEvent;

/// Deliver an event once after a delay
pub trait Scheduler {
    fn schedule(&self, delay: Duration, event: HostEvent);
}

/// Scheduler backed by tokio timers
///
/// Must be used from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    events: mpsc::UnboundedSender<HostEvent>,
}

impl TokioScheduler {
    pub fn new(events: mpsc::UnboundedSender<HostEvent>) -> Self {
        Self { events }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, event: HostEvent) {
        trace!(?delay, ?event, "Scheduling event");
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The session may already have shut down.
            let _ = events.send(event);
        });
    }
}

/// Scheduler that only records what it was asked to deliver
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    scheduled: RefCell<Vec<(Duration, HostEvent)>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the recorded events
    pub fn take(&self) -> Vec<(Duration, HostEvent)> {
        self.scheduled.take()
    }

    /// Number of recorded events not yet drained
    pub fn len(&self) -> usize {
        self.scheduled.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled.borrow().is_empty()
    }
}

impl Scheduler for RecordingScheduler {
    fn schedule(&self, delay: Duration, event: HostEvent) {
        self.scheduled.borrow_mut().push((delay, event));
    }
}
