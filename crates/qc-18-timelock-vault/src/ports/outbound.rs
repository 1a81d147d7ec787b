//! # Outbound Ports
//!
//! Collaborators supplied by the host execution environment: durable
//! storage with atomic commit, a clock, an event sink, and value transfer.

use crate::domain::{Address, KVStoreError, Timestamp, VaultEvent};

/// Abstract interface for key-value database operations.
///
/// Testing: `InMemoryKVStore` (adapters)
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch succeed, or NONE are applied.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError>;

    /// Iterate over keys with a prefix.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put {
        /// Key bytes.
        key: Vec<u8>,
        /// Value bytes.
        value: Vec<u8>,
    },
    /// Delete a key.
    Delete {
        /// Key bytes.
        key: Vec<u8>,
    },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Abstract interface for time operations (for testability).
pub trait TimeSource: Send + Sync {
    /// Get current timestamp in seconds since epoch.
    fn now(&self) -> Timestamp;
}

/// Sink for vault events.
///
/// Called only after the state change the event describes has been committed.
pub trait EventPublisher: Send + Sync {
    /// Publish an event.
    fn publish(&self, event: VaultEvent);
}

/// Value transfer collaborator.
///
/// The host escrows the payment attached to a call; the vault only
/// instructs where it goes.
pub trait ValueTransfer: Send + Sync {
    /// Forward `amount` from `from`'s attached payment to `to`.
    fn forward(&self, from: &Address, to: &Address, amount: u64) -> Result<(), String>;
}
