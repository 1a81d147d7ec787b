//! # Domain Value Objects
//!
//! Immutable value types for the Time-Locked Message Vault.

use super::errors::{Address, Hash, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fingerprint of a locked message within its recipient's namespace.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(Hash);

impl MessageId {
    /// Wrap raw digest bytes.
    pub fn new(bytes: Hash) -> Self {
        Self(bytes)
    }

    /// Create from a slice (copies into fixed array).
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: Hash = slice.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MessageId({:02x}{:02x}{:02x}{:02x}..)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

/// Process-wide fee configuration.
///
/// Changes apply to the next submission only; existing records keep
/// the `unlock_at` they were created with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Flat fee charged to non-exempt submitters.
    pub base_fee: u64,
    /// Minimum lock duration in seconds.
    pub min_lock_duration: u64,
}

impl FeeSchedule {
    /// Create a new fee schedule.
    pub fn new(base_fee: u64, min_lock_duration: u64) -> Self {
        Self {
            base_fee,
            min_lock_duration,
        }
    }
}

/// Lock state of a stored message, evaluated against the current time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageState {
    /// Time gate still closed.
    Locked,
    /// Time gate open, awaiting retrieval by the recipient.
    Unlockable,
}

impl MessageState {
    /// Evaluate the time gate `now >= unlock_at`.
    pub fn at(unlock_at: Timestamp, now: Timestamp) -> Self {
        if now >= unlock_at {
            Self::Unlockable
        } else {
            Self::Locked
        }
    }
}

/// Host-supplied identity and value for a single call.
///
/// The execution environment authenticates `caller` and escrows
/// `value` before invoking the vault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// Authenticated caller.
    pub caller: Address,
    /// Payment attached to the call.
    pub value: u64,
}

impl CallContext {
    /// Call without attached payment.
    pub fn new(caller: Address) -> Self {
        Self { caller, value: 0 }
    }

    /// Call with attached payment.
    pub fn with_value(caller: Address, value: u64) -> Self {
        Self { caller, value }
    }
}
