//! # Message Id Derivation
//!
//! `SHA-256(domain || recipient || submitter || timestamp || sequence || len || payload)`
//!
//! Integers are big-endian. The vault-wide sequence number makes ids
//! distinct even for identical resubmissions within the same second,
//! and the payload length prefix keeps the encoding unambiguous.

use crate::domain::{Address, MessageId, Timestamp};
use sha2::{Digest, Sha256};

/// Domain separation tag.
pub const MESSAGE_ID_DOMAIN: &[u8] = b"QC18-TIMELOCK-MSG-V1";

/// Fields feeding the message id.
#[derive(Clone, Copy, Debug)]
pub struct MessageIdInput<'a> {
    /// Addressed recipient.
    pub recipient: &'a Address,
    /// Authenticated submitter.
    pub submitter: &'a Address,
    /// Submission time.
    pub timestamp: Timestamp,
    /// Vault-wide submission counter.
    pub sequence: u64,
    /// Encrypted payload.
    pub payload: &'a [u8],
}

/// Derive the message id.
pub fn derive_message_id(input: MessageIdInput<'_>) -> MessageId {
    let mut hasher = Sha256::new();
    hasher.update(MESSAGE_ID_DOMAIN);
    hasher.update(input.recipient);
    hasher.update(input.submitter);
    hasher.update(input.timestamp.to_be_bytes());
    hasher.update(input.sequence.to_be_bytes());
    hasher.update((input.payload.len() as u64).to_be_bytes());
    hasher.update(input.payload);
    MessageId::new(hasher.finalize().into())
}
