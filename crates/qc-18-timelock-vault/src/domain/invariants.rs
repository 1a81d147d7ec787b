//! # Domain Invariants
//!
//! Business rules checked before any state transition.

use super::entities::MessageRecord;
use super::errors::{Address, Timestamp, VaultError, ZERO_ADDRESS};
use super::value_objects::MessageId;

/// Invariant: payload must not be empty.
pub fn invariant_non_empty_payload(payload: &[u8]) -> Result<(), VaultError> {
    if payload.is_empty() {
        return Err(VaultError::EmptyMessage);
    }
    Ok(())
}

/// Invariant: payload must fit the configured size limit.
pub fn invariant_payload_size(payload: &[u8], max: usize) -> Result<(), VaultError> {
    if payload.len() > max {
        return Err(VaultError::PayloadTooLarge {
            size: payload.len(),
            max,
        });
    }
    Ok(())
}

/// Invariant: recipient is not the zero address.
pub fn invariant_valid_recipient(recipient: &Address) -> Result<(), VaultError> {
    if *recipient == ZERO_ADDRESS {
        return Err(VaultError::InvalidRecipient);
    }
    Ok(())
}

/// Invariant: attached payment covers the required fee.
pub fn invariant_sufficient_payment(attempted: u64, required: u64) -> Result<(), VaultError> {
    if attempted < required {
        return Err(VaultError::InsufficientFunds {
            attempted,
            required,
        });
    }
    Ok(())
}

/// Invariant: duration meets the minimum and `now + duration` fits the clock.
///
/// Returns the resulting `unlock_at`.
pub fn invariant_lock_duration(
    now: Timestamp,
    duration: u64,
    minimum: u64,
) -> Result<Timestamp, VaultError> {
    if duration < minimum {
        return Err(VaultError::InvalidLockTime { duration, minimum });
    }
    now.checked_add(duration)
        .ok_or(VaultError::InvalidLockTime { duration, minimum })
}

/// Invariant: the time gate is open.
pub fn invariant_time_gate(
    record: &MessageRecord,
    message_id: MessageId,
    now: Timestamp,
) -> Result<(), VaultError> {
    if !record.is_unlockable(now) {
        return Err(VaultError::MessageStillLocked {
            message_id,
            remaining: record.remaining(now),
        });
    }
    Ok(())
}

/// Invariant: caller is the vault owner.
pub fn invariant_owner(caller: &Address, owner: &Address) -> Result<(), VaultError> {
    if caller != owner {
        return Err(VaultError::Unauthorized { caller: *caller });
    }
    Ok(())
}
