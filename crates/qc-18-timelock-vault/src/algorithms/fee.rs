//! # Fee Policy
//!
//! Flat fee model: non-exempt submitters pay `base_fee` regardless of
//! the requested lock duration. The owner and whitelisted addresses
//! are exempt.

use crate::domain::{Address, FeeSchedule, VaultError};

/// Fee computation over the current schedule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeePolicy {
    schedule: FeeSchedule,
}

impl FeePolicy {
    /// Create a policy from a schedule.
    pub fn new(schedule: FeeSchedule) -> Self {
        Self { schedule }
    }

    /// Current schedule.
    pub fn schedule(&self) -> FeeSchedule {
        self.schedule
    }

    /// Base fee for non-exempt submitters.
    pub fn base_fee(&self) -> u64 {
        self.schedule.base_fee
    }

    /// Minimum lock duration in seconds.
    pub fn min_lock_duration(&self) -> u64 {
        self.schedule.min_lock_duration
    }

    /// Exempt iff the caller is the owner or on the whitelist.
    pub fn is_exempt(caller: &Address, owner: &Address, whitelisted: bool) -> bool {
        caller == owner || whitelisted
    }

    /// Required payment for a lock of `_duration` seconds.
    pub fn required_fee(&self, _duration: u64, exempt: bool) -> u64 {
        if exempt {
            0
        } else {
            self.schedule.base_fee
        }
    }

    /// Replace the base fee. Returns the previous value.
    pub fn update_fee(&mut self, new_fee: u64) -> u64 {
        std::mem::replace(&mut self.schedule.base_fee, new_fee)
    }

    /// Replace the minimum lock duration, bounded by `max_duration`.
    /// Returns the previous value.
    pub fn update_min_lock_duration(
        &mut self,
        new_duration: u64,
        max_duration: u64,
    ) -> Result<u64, VaultError> {
        if new_duration > max_duration {
            return Err(VaultError::InvalidConfig(format!(
                "minimum lock duration {new_duration}s exceeds maximum {max_duration}s"
            )));
        }
        Ok(std::mem::replace(
            &mut self.schedule.min_lock_duration,
            new_duration,
        ))
    }
}
