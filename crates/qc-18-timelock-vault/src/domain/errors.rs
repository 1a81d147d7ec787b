//! # Domain Errors
//!
//! Error types for the Time-Locked Message Vault.
//!
//! Every error is surfaced synchronously to the caller. A failed operation
//! leaves no trace in the store, the ledger, or the event stream.

use super::value_objects::MessageId;
use thiserror::Error;

/// Hash type (32-byte SHA-256).
pub type Hash = [u8; 32];

/// Address type (20-byte).
pub type Address = [u8; 20];

/// Seconds since the Unix epoch, as supplied by the host clock.
pub type Timestamp = u64;

/// The null address. Never a valid recipient or owner.
pub const ZERO_ADDRESS: Address = [0u8; 20];

/// Vault error types.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Attached payment is below the required fee.
    #[error("Insufficient funds: attempted {attempted}, required {required}")]
    InsufficientFunds {
        /// Amount attached to the submission
        attempted: u64,
        /// Fee required for this submission
        required: u64,
    },

    /// Requested lock duration is below the configured minimum
    /// (or overflows the clock).
    #[error("Invalid lock time: {duration}s (minimum {minimum}s)")]
    InvalidLockTime {
        /// Requested duration in seconds
        duration: u64,
        /// Minimum duration in seconds
        minimum: u64,
    },

    /// Requested lock duration exceeds the configured maximum.
    #[error("Lock time too long: {duration}s (maximum {maximum}s)")]
    LockTimeTooLong {
        /// Requested duration in seconds
        duration: u64,
        /// Maximum duration in seconds
        maximum: u64,
    },

    /// Payload was empty.
    #[error("Empty message")]
    EmptyMessage,

    /// Payload exceeds the configured size limit.
    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Payload size in bytes
        size: usize,
        /// Configured maximum
        max: usize,
    },

    /// Recipient is the zero address.
    #[error("Invalid recipient")]
    InvalidRecipient,

    /// Unlock attempted before the time gate opened.
    #[error("Message {message_id} still locked ({remaining}s remaining)")]
    MessageStillLocked {
        /// Message that is still locked
        message_id: MessageId,
        /// Seconds until the message unlocks
        remaining: u64,
    },

    /// No record for (caller, message id).
    #[error("Invalid message id: {0}")]
    InvalidMessageId(MessageId),

    /// A record already exists under the derived id.
    #[error("Duplicate message id: {0}")]
    DuplicateId(MessageId),

    /// Caller is not the vault owner.
    #[error("Unauthorized caller: {}", hex::encode(.caller))]
    Unauthorized {
        /// Rejected caller
        caller: Address,
    },

    /// Forwarding the attached payment failed.
    #[error("Payment transfer failed: {0}")]
    TransferFailed(String),

    /// Payment forwarding failed and the record could not be removed.
    /// The record stays quarantined until the store is repaired.
    #[error("Rollback of {message_id} failed: transfer {transfer}; storage {storage}")]
    RollbackFailed {
        /// Stranded record
        message_id: MessageId,
        /// Transfer failure reason
        transfer: String,
        /// Storage failure reason
        storage: String,
    },

    /// Rejected configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Stored bytes could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Underlying key-value store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] KVStoreError),
}

impl VaultError {
    /// Whether the caller can succeed by retrying with different input or later.
    ///
    /// `InvalidMessageId` is final for that id, and `DuplicateId` or a
    /// serialization failure indicate an integrity problem.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientFunds { .. }
                | Self::InvalidLockTime { .. }
                | Self::LockTimeTooLong { .. }
                | Self::EmptyMessage
                | Self::PayloadTooLarge { .. }
                | Self::InvalidRecipient
                | Self::MessageStillLocked { .. }
                | Self::Unauthorized { .. }
                | Self::TransferFailed(_)
                | Self::InvalidConfig(_)
        )
    }
}

/// Key-value store errors.
#[derive(Debug, Clone, Error)]
pub enum KVStoreError {
    /// Backend I/O failure.
    #[error("I/O error: {message}")]
    IOError {
        /// Backend message
        message: String,
    },

    /// Atomic batch could not be applied; nothing was written.
    #[error("Batch write failed: {message}")]
    BatchFailed {
        /// Backend message
        message: String,
    },
}
