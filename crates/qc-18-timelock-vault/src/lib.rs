//! # QC-18 Time-Locked Message Vault
//!
//! Fee-gated escrow for encrypted messages that only the addressed
//! recipient can retrieve, and only after a lock duration has elapsed.
//!
//! **Subsystem ID:** 18
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Lock an opaque (caller-encrypted) payload for a recipient
//! - Release it exactly once, to that recipient, once `now >= unlock_at`
//! - Charge a flat fee to submitters that are neither owner nor whitelisted
//!
//! ## Security Properties
//!
//! | Property | Enforcement |
//! |----------|-------------|
//! | Recipient-only unlock | Records keyed by (recipient, id) |
//! | Single retrieval | Record deleted on unlock |
//! | Unguessable ids | SHA-256 over recipient, submitter, time, sequence, payload |
//! | All-or-nothing | One atomic batch per operation, compensated transfers |
//! | Owner-only admin | Caller compared against persisted owner |
//!
//! Payloads are stored as given. Confidentiality is the caller's job.
//!
//! ## Module Structure
//!
//! ```text
//! qc-18-timelock-vault/
//! ├── domain/          # MessageRecord, Whitelist, events, errors, invariants
//! ├── algorithms/      # Fee policy, message id derivation
//! ├── ports/           # TimeVaultApi, KeyValueStore, TimeSource, ...
//! ├── adapters/        # In-memory store, clocks, event sinks, ledger
//! ├── store            # Typed vault persistence
//! ├── config           # VaultConfig
//! └── service          # TimeVaultService (lock/unlock engine)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;
pub mod store;

// Re-exports
pub use adapters::{
    InMemoryKVStore, InMemoryLedger, ManualClock, RecordingEventPublisher, SystemTimeSource,
    TracingEventPublisher,
};
pub use algorithms::{derive_message_id, FeePolicy, MessageIdInput, MESSAGE_ID_DOMAIN};
pub use config::{ConfigError, VaultConfig};
pub use domain::{
    Address, CallContext, FeeSchedule, Hash, KVStoreError, MessageId, MessageInfo,
    MessageRecord, MessageState, Timestamp, VaultError, VaultEvent, Whitelist, ZERO_ADDRESS,
};
pub use ports::{
    BatchOperation, EventPublisher, KeyValueStore, TimeSource, TimeVaultApi, ValueTransfer,
};
pub use service::{ServiceStats, TimeVaultService};
pub use store::{VaultMetadata, VaultStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
