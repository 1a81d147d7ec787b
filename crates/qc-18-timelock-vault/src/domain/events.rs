//! # Vault Events
//!
//! Change records emitted after each successful state transition.

use super::errors::{Address, Timestamp};
use super::value_objects::MessageId;
use serde::{Deserialize, Serialize};

/// Event emitted by the vault.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VaultEvent {
    /// A message was locked for `recipient`.
    MessageLocked {
        /// Addressed recipient.
        recipient: Address,
        /// Derived message id.
        message_id: MessageId,
        /// Submission time.
        timestamp: Timestamp,
    },
    /// A message was retrieved and deleted.
    MessageUnlocked {
        /// Recipient that unlocked.
        caller: Address,
        /// Retrieval time.
        timestamp: Timestamp,
    },
    /// Base fee changed.
    FeeUpdated {
        /// Fee before the change.
        previous: u64,
        /// Fee after the change.
        new: u64,
        /// Change time.
        timestamp: Timestamp,
    },
    /// Minimum lock duration changed.
    MinimumLockUpTimeUpdated {
        /// Duration before the change.
        previous: u64,
        /// Duration after the change.
        new: u64,
        /// Change time.
        timestamp: Timestamp,
    },
    /// Address became fee-exempt.
    AddedToWhitelist {
        /// Added address.
        address: Address,
        /// Change time.
        timestamp: Timestamp,
    },
    /// Address lost fee exemption.
    RemovedFromWhitelist {
        /// Removed address.
        address: Address,
        /// Change time.
        timestamp: Timestamp,
    },
    /// Vault ownership moved.
    OwnershipTransferred {
        /// Owner before the change.
        previous: Address,
        /// Owner after the change.
        new: Address,
        /// Change time.
        timestamp: Timestamp,
    },
}

impl VaultEvent {
    /// Time the event was emitted.
    pub fn timestamp(&self) -> Timestamp {
        match self {
            Self::MessageLocked { timestamp, .. }
            | Self::MessageUnlocked { timestamp, .. }
            | Self::FeeUpdated { timestamp, .. }
            | Self::MinimumLockUpTimeUpdated { timestamp, .. }
            | Self::AddedToWhitelist { timestamp, .. }
            | Self::RemovedFromWhitelist { timestamp, .. }
            | Self::OwnershipTransferred { timestamp, .. } => *timestamp,
        }
    }

    /// Short event name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MessageLocked { .. } => "MessageLocked",
            Self::MessageUnlocked { .. } => "MessageUnlocked",
            Self::FeeUpdated { .. } => "FeeUpdated",
            Self::MinimumLockUpTimeUpdated { .. } => "MinimumLockUpTimeUpdated",
            Self::AddedToWhitelist { .. } => "AddedToWhitelist",
            Self::RemovedFromWhitelist { .. } => "RemovedFromWhitelist",
            Self::OwnershipTransferred { .. } => "OwnershipTransferred",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_timestamp_and_name() {
        let event = VaultEvent::FeeUpdated {
            previous: 1,
            new: 2,
            timestamp: 42,
        };
        assert_eq!(event.timestamp(), 42);
        assert_eq!(event.name(), "FeeUpdated");
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = VaultEvent::MessageUnlocked {
            caller: [1u8; 20],
            timestamp: 7,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "MessageUnlocked");
        assert_eq!(json["timestamp"], 7);
    }
}
