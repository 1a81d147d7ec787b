//! # Vault Store
//!
//! Typed persistence over the `KeyValueStore` port. The only path through
//! which message records and vault metadata are read or written.
//!
//! ## Key Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `vault:owner` | owner address |
//! | `vault:fee` | `FeeSchedule` |
//! | `vault:whitelist` | `Whitelist` |
//! | `vault:seq` | next submission sequence |
//! | `msg:` + recipient (20) + id (32) | `MessageRecord` |
//!
//! Values are bincode-encoded.

use crate::domain::{Address, FeeSchedule, MessageId, MessageRecord, VaultError, Whitelist};
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use serde::de::DeserializeOwned;
use serde::Serialize;

const OWNER_KEY: &[u8] = b"vault:owner";
const FEE_KEY: &[u8] = b"vault:fee";
const WHITELIST_KEY: &[u8] = b"vault:whitelist";
const SEQUENCE_KEY: &[u8] = b"vault:seq";
const MESSAGE_PREFIX: &[u8] = b"msg:";

/// Persisted vault metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VaultMetadata {
    /// Owner address.
    pub owner: Address,
    /// Fee schedule.
    pub fees: FeeSchedule,
    /// Fee-exempt addresses.
    pub whitelist: Whitelist,
    /// Next submission sequence.
    pub sequence: u64,
}

/// Typed vault persistence.
pub struct VaultStore<K: KeyValueStore> {
    kv: K,
}

impl<K: KeyValueStore> VaultStore<K> {
    /// Wrap a key-value store.
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Unwrap the underlying store.
    pub fn into_inner(self) -> K {
        self.kv
    }

    // =========================================================================
    // MESSAGE RECORDS
    // =========================================================================

    fn record_key(owner: &Address, message_id: &MessageId) -> Vec<u8> {
        let mut key = Vec::with_capacity(MESSAGE_PREFIX.len() + 20 + 32);
        key.extend_from_slice(MESSAGE_PREFIX);
        key.extend_from_slice(owner);
        key.extend_from_slice(message_id.as_bytes());
        key
    }

    fn owner_prefix(owner: &Address) -> Vec<u8> {
        let mut prefix = Vec::with_capacity(MESSAGE_PREFIX.len() + 20);
        prefix.extend_from_slice(MESSAGE_PREFIX);
        prefix.extend_from_slice(owner);
        prefix
    }

    /// Insert a record. Fails with `DuplicateId` if the key exists.
    pub fn put(
        &mut self,
        owner: &Address,
        message_id: MessageId,
        record: &MessageRecord,
    ) -> Result<(), VaultError> {
        self.put_with(owner, message_id, record, Vec::new())
    }

    /// Insert a record together with `extra` operations in one atomic batch.
    pub fn put_with(
        &mut self,
        owner: &Address,
        message_id: MessageId,
        record: &MessageRecord,
        extra: Vec<BatchOperation>,
    ) -> Result<(), VaultError> {
        let key = Self::record_key(owner, &message_id);
        if self.kv.exists(&key)? {
            return Err(VaultError::DuplicateId(message_id));
        }

        let mut ops = Vec::with_capacity(extra.len() + 1);
        ops.push(BatchOperation::put(key, encode(record)?));
        ops.extend(extra);
        self.kv.atomic_batch_write(ops)?;
        Ok(())
    }

    /// Look up a record.
    pub fn get(
        &self,
        owner: &Address,
        message_id: &MessageId,
    ) -> Result<Option<MessageRecord>, VaultError> {
        self.kv
            .get(&Self::record_key(owner, message_id))?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    /// Remove a record. No-op if absent.
    pub fn delete(&mut self, owner: &Address, message_id: &MessageId) -> Result<(), VaultError> {
        self.delete_with(owner, message_id, Vec::new())
    }

    /// Remove a record together with `extra` operations in one atomic batch.
    pub fn delete_with(
        &mut self,
        owner: &Address,
        message_id: &MessageId,
        extra: Vec<BatchOperation>,
    ) -> Result<(), VaultError> {
        let mut ops = Vec::with_capacity(extra.len() + 1);
        ops.push(BatchOperation::delete(Self::record_key(owner, message_id)));
        ops.extend(extra);
        self.kv.atomic_batch_write(ops)?;
        Ok(())
    }

    /// All message ids stored for `owner`, sorted.
    pub fn list_ids(&self, owner: &Address) -> Result<Vec<MessageId>, VaultError> {
        let prefix = Self::owner_prefix(owner);
        let mut ids: Vec<MessageId> = self
            .kv
            .prefix_scan(&prefix)?
            .into_iter()
            .filter_map(|(key, _)| MessageId::from_slice(&key[prefix.len()..]))
            .collect();
        ids.sort();
        Ok(ids)
    }

    // =========================================================================
    // METADATA
    // =========================================================================

    /// Load metadata, or `None` if the store was never initialized.
    pub fn load_metadata(&self) -> Result<Option<VaultMetadata>, VaultError> {
        let Some(owner) = self.load::<Address>(OWNER_KEY)? else {
            return Ok(None);
        };
        Ok(Some(VaultMetadata {
            owner,
            fees: self.load(FEE_KEY)?.unwrap_or_default(),
            whitelist: self.load(WHITELIST_KEY)?.unwrap_or_default(),
            sequence: self.load(SEQUENCE_KEY)?.unwrap_or(0),
        }))
    }

    /// Write all metadata in one atomic batch.
    pub fn save_metadata(&mut self, meta: &VaultMetadata) -> Result<(), VaultError> {
        self.kv.atomic_batch_write(vec![
            Self::owner_op(&meta.owner)?,
            Self::fee_op(&meta.fees)?,
            Self::whitelist_op(&meta.whitelist)?,
            Self::sequence_op(meta.sequence)?,
        ])?;
        Ok(())
    }

    /// Apply a batch of metadata operations.
    pub fn commit(&mut self, ops: Vec<BatchOperation>) -> Result<(), VaultError> {
        self.kv.atomic_batch_write(ops)?;
        Ok(())
    }

    /// Operation writing the owner.
    pub fn owner_op(owner: &Address) -> Result<BatchOperation, VaultError> {
        Ok(BatchOperation::put(OWNER_KEY, encode(owner)?))
    }

    /// Operation writing the fee schedule.
    pub fn fee_op(fees: &FeeSchedule) -> Result<BatchOperation, VaultError> {
        Ok(BatchOperation::put(FEE_KEY, encode(fees)?))
    }

    /// Operation writing the whitelist.
    pub fn whitelist_op(whitelist: &Whitelist) -> Result<BatchOperation, VaultError> {
        Ok(BatchOperation::put(WHITELIST_KEY, encode(whitelist)?))
    }

    /// Operation writing the submission sequence.
    pub fn sequence_op(sequence: u64) -> Result<BatchOperation, VaultError> {
        Ok(BatchOperation::put(SEQUENCE_KEY, encode(&sequence)?))
    }

    fn load<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, VaultError> {
        self.kv.get(key)?.map(|bytes| decode(&bytes)).transpose()
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, VaultError> {
    bincode::serialize(value).map_err(|e| VaultError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, VaultError> {
    bincode::deserialize(bytes).map_err(|e| VaultError::Serialization(e.to_string()))
}
