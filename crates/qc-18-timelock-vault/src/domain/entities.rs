//! # Domain Entities
//!
//! Message records and the fee whitelist.

use super::errors::{Address, Timestamp};
use super::value_objects::MessageState;
use serde::{Deserialize, Serialize};

/// A locked message as persisted in the vault store.
///
/// Keyed by (recipient, message id). Never mutated after creation;
/// consumed by a successful unlock.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Caller-encrypted payload. Never inspected.
    pub encrypted_payload: Vec<u8>,
    /// Earliest time the recipient may unlock.
    pub unlock_at: Timestamp,
    /// Submitter of the message.
    pub sender: Address,
    /// Submission time.
    pub locked_at: Timestamp,
}

impl MessageRecord {
    /// Create a new record.
    pub fn new(
        encrypted_payload: Vec<u8>,
        sender: Address,
        locked_at: Timestamp,
        unlock_at: Timestamp,
    ) -> Self {
        Self {
            encrypted_payload,
            unlock_at,
            sender,
            locked_at,
        }
    }

    /// Check the time gate.
    pub fn is_unlockable(&self, now: Timestamp) -> bool {
        now >= self.unlock_at
    }

    /// Seconds until the time gate opens; zero once open.
    pub fn remaining(&self, now: Timestamp) -> u64 {
        self.unlock_at.saturating_sub(now)
    }

    /// Current lock state.
    pub fn state(&self, now: Timestamp) -> MessageState {
        MessageState::at(self.unlock_at, now)
    }

    /// Read-only view without the payload.
    pub fn info(&self, now: Timestamp) -> MessageInfo {
        MessageInfo {
            sender: self.sender,
            locked_at: self.locked_at,
            unlock_at: self.unlock_at,
            payload_len: self.encrypted_payload.len(),
            state: self.state(now),
        }
    }
}

/// Metadata view of a stored message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageInfo {
    /// Submitter.
    pub sender: Address,
    /// Submission time.
    pub locked_at: Timestamp,
    /// Time gate.
    pub unlock_at: Timestamp,
    /// Payload size in bytes.
    pub payload_len: usize,
    /// Lock state at query time.
    pub state: MessageState,
}

/// Fee-exempt addresses.
///
/// Membership is a linear scan. Removal swaps the last entry into the
/// vacated slot, so iteration order is not stable across removals.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Whitelist {
    members: Vec<Address>,
}

impl Whitelist {
    /// Create an empty whitelist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check membership.
    pub fn contains(&self, address: &Address) -> bool {
        self.members.iter().any(|m| m == address)
    }

    /// Append an address. Returns `false` if it was already a member.
    pub fn add(&mut self, address: Address) -> bool {
        if self.contains(&address) {
            return false;
        }
        self.members.push(address);
        true
    }

    /// Swap-remove an address. Returns `false` if it was not a member.
    pub fn remove(&mut self, address: &Address) -> bool {
        match self.members.iter().position(|m| m == address) {
            Some(index) => {
                self.members.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Members in storage order.
    pub fn members(&self) -> &[Address] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the whitelist is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
