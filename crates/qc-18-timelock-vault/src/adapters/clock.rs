//! Clock adapters for the `TimeSource` port.

use crate::domain::Timestamp;
use crate::ports::outbound::TimeSource;
use parking_lot::RwLock;

/// Default time source using system time.
#[derive(Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Manually driven clock for tests and simulations.
pub struct ManualClock {
    current_time: RwLock<Timestamp>,
}

impl ManualClock {
    /// Create a clock at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            current_time: RwLock::new(start),
        }
    }

    /// Set current time.
    pub fn set_time(&self, time: Timestamp) {
        *self.current_time.write() = time;
    }

    /// Advance time.
    pub fn advance(&self, secs: u64) {
        let mut now = self.current_time.write();
        *now = now.saturating_add(secs);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(1_700_000_000)
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current_time.read()
    }
}
