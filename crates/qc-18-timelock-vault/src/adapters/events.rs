//! Event sinks for the `EventPublisher` port.

use crate::domain::VaultEvent;
use crate::ports::outbound::EventPublisher;
use parking_lot::Mutex;
use tracing::info;

/// Logs every event through `tracing`.
#[derive(Default)]
pub struct TracingEventPublisher;

impl EventPublisher for TracingEventPublisher {
    fn publish(&self, event: VaultEvent) {
        info!(
            event = event.name(),
            timestamp = event.timestamp(),
            "[qc-18] {:?}",
            event
        );
    }
}

/// Keeps published events in memory.
#[derive(Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<VaultEvent>>,
}

impl RecordingEventPublisher {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events so far.
    pub fn events(&self) -> Vec<VaultEvent> {
        self.events.lock().clone()
    }

    /// Most recent event.
    pub fn last(&self) -> Option<VaultEvent> {
        self.events.lock().last().cloned()
    }

    /// Number of events recorded.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether nothing was published.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventPublisher for RecordingEventPublisher {
    fn publish(&self, event: VaultEvent) {
        self.events.lock().push(event);
    }
}
