//! # Time Vault Service
//!
//! The lock/unlock engine. Orchestrates validation, fee enforcement, id
//! derivation, state transitions, value forwarding and event emission.
//!
//! ## Transaction Model
//!
//! All mutable state sits behind one mutex, and every state transition
//! commits its store writes in a single atomic batch while holding it.
//! The outbound ports (`ValueTransfer::forward`, `EventPublisher::publish`)
//! are only called after the guard is dropped, so port implementations may
//! call back into the vault.
//!
//! A lock commits its record as *pending* before forwarding the payment.
//! Pending records are invisible to unlock and the read queries. Once the
//! transfer succeeds the record is released; if it fails the record is
//! deleted, so a failed lock leaves no record, no transfer and no event.

use crate::algorithms::{derive_message_id, FeePolicy, MessageIdInput};
use crate::config::VaultConfig;
use crate::domain::{
    invariant_lock_duration, invariant_non_empty_payload, invariant_owner,
    invariant_payload_size, invariant_sufficient_payment, invariant_time_gate,
    invariant_valid_recipient, Address, CallContext, MessageId, MessageInfo, MessageRecord,
    Timestamp, VaultError, VaultEvent, Whitelist,
};
use crate::ports::inbound::TimeVaultApi;
use crate::ports::outbound::{EventPublisher, KeyValueStore, TimeSource, ValueTransfer};
use crate::store::{VaultMetadata, VaultStore};

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Statistics for the vault service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Messages successfully locked.
    pub messages_locked: u64,
    /// Messages successfully unlocked.
    pub messages_unlocked: u64,
    /// Lock attempts rejected by validation, fee checks or transfer failure.
    pub rejected_submissions: u64,
    /// Total value forwarded to the owner.
    pub fees_forwarded: u64,
}

struct VaultState<K: KeyValueStore> {
    store: VaultStore<K>,
    owner: Address,
    fees: FeePolicy,
    whitelist: Whitelist,
    sequence: u64,
    /// Records committed whose payment has not settled yet.
    pending: HashSet<(Address, MessageId)>,
    stats: ServiceStats,
}

impl<K: KeyValueStore> VaultState<K> {
    fn is_exempt(&self, caller: &Address) -> bool {
        FeePolicy::is_exempt(caller, &self.owner, self.whitelist.contains(caller))
    }

    fn visible_record(
        &self,
        recipient: &Address,
        message_id: &MessageId,
    ) -> Result<Option<MessageRecord>, VaultError> {
        if self.pending.contains(&(*recipient, *message_id)) {
            return Ok(None);
        }
        self.store.get(recipient, message_id)
    }
}

/// A record committed under the lock, awaiting payment settlement.
struct StagedLock {
    message_id: MessageId,
    owner: Address,
    unlock_at: Timestamp,
    now: Timestamp,
}

/// The time-locked message vault.
pub struct TimeVaultService<K, C, E, L>
where
    K: KeyValueStore,
    C: TimeSource,
    E: EventPublisher,
    L: ValueTransfer,
{
    config: VaultConfig,
    state: Mutex<VaultState<K>>,
    clock: Arc<C>,
    events: Arc<E>,
    ledger: Arc<L>,
}

impl<K, C, E, L> TimeVaultService<K, C, E, L>
where
    K: KeyValueStore,
    C: TimeSource,
    E: EventPublisher,
    L: ValueTransfer,
{
    /// Open a vault over `kv`.
    ///
    /// An empty store is initialized from `config`. A store that already
    /// holds vault metadata keeps its persisted owner, fees, whitelist and
    /// sequence; `config` then only supplies the hard limits.
    pub fn new(
        config: VaultConfig,
        kv: K,
        clock: Arc<C>,
        events: Arc<E>,
        ledger: Arc<L>,
    ) -> Result<Self, VaultError> {
        config
            .validate()
            .map_err(|e| VaultError::InvalidConfig(e.to_string()))?;

        let mut store = VaultStore::new(kv);
        let meta = match store.load_metadata()? {
            Some(meta) => {
                info!(
                    owner = %hex::encode(meta.owner),
                    sequence = meta.sequence,
                    "[qc-18] Restored vault state"
                );
                meta
            }
            None => {
                let meta = VaultMetadata {
                    owner: config.owner,
                    fees: config.fee_schedule(),
                    whitelist: Whitelist::new(),
                    sequence: 0,
                };
                store.save_metadata(&meta)?;
                info!(
                    owner = %hex::encode(meta.owner),
                    base_fee = meta.fees.base_fee,
                    min_lock_secs = meta.fees.min_lock_duration,
                    "[qc-18] Initialized vault"
                );
                meta
            }
        };

        Ok(Self {
            config,
            state: Mutex::new(VaultState {
                store,
                owner: meta.owner,
                fees: FeePolicy::new(meta.fees),
                whitelist: meta.whitelist,
                sequence: meta.sequence,
                pending: HashSet::new(),
                stats: ServiceStats::default(),
            }),
            clock,
            events,
            ledger,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Get current service statistics.
    pub fn stats(&self) -> ServiceStats {
        self.state.lock().stats.clone()
    }

    /// Whitelist members in storage order.
    pub fn whitelist(&self) -> Vec<Address> {
        self.state.lock().whitelist.members().to_vec()
    }

    /// Ids of all settled messages stored for `recipient`.
    pub fn list_message_ids(&self, recipient: &Address) -> Result<Vec<MessageId>, VaultError> {
        let state = self.state.lock();
        let mut ids = state.store.list_ids(recipient)?;
        ids.retain(|id| !state.pending.contains(&(*recipient, *id)));
        Ok(ids)
    }

    /// Validate and commit a pending record. Runs under the state lock.
    fn stage_lock(
        &self,
        state: &mut VaultState<K>,
        ctx: &CallContext,
        recipient: Address,
        payload: Vec<u8>,
        duration: u64,
    ) -> Result<StagedLock, VaultError> {
        let now = self.clock.now();

        invariant_non_empty_payload(&payload)?;
        invariant_payload_size(&payload, self.config.max_payload_bytes)?;
        invariant_valid_recipient(&recipient)?;

        let maximum = self.config.max_lock_duration_secs;
        if duration > maximum {
            return Err(VaultError::LockTimeTooLong { duration, maximum });
        }
        let unlock_at = invariant_lock_duration(now, duration, state.fees.min_lock_duration())?;

        let exempt = state.is_exempt(&ctx.caller);
        let required = state.fees.required_fee(duration, exempt);
        invariant_sufficient_payment(ctx.value, required)?;

        let sequence = state.sequence;
        let message_id = derive_message_id(MessageIdInput {
            recipient: &recipient,
            submitter: &ctx.caller,
            timestamp: now,
            sequence,
            payload: &payload,
        });

        let record = MessageRecord::new(payload, ctx.caller, now, unlock_at);
        let next_sequence = VaultStore::<K>::sequence_op(sequence + 1)?;
        state
            .store
            .put_with(&recipient, message_id, &record, vec![next_sequence])?;

        state.sequence = sequence + 1;
        state.pending.insert((recipient, message_id));

        Ok(StagedLock {
            message_id,
            owner: state.owner,
            unlock_at,
            now,
        })
    }

    /// Delete a staged record after its payment failed.
    ///
    /// If the delete itself fails the record stays pending, so it can never
    /// be unlocked by this instance.
    fn roll_back(&self, recipient: &Address, message_id: MessageId, reason: String) -> VaultError {
        let mut state = self.state.lock();
        match state.store.delete(recipient, &message_id) {
            Ok(()) => {
                state.pending.remove(&(*recipient, message_id));
                warn!(
                    message_id = %message_id,
                    %reason,
                    "[qc-18] Payment forwarding failed, lock rolled back"
                );
                VaultError::TransferFailed(reason)
            }
            Err(e) => {
                error!(
                    message_id = %message_id,
                    recipient = %hex::encode(recipient),
                    %reason,
                    storage_error = %e,
                    "[qc-18] Rollback failed, record stranded"
                );
                VaultError::RollbackFailed {
                    message_id,
                    transfer: reason,
                    storage: e.to_string(),
                }
            }
        }
    }

    fn lock_and_forward(
        &self,
        ctx: &CallContext,
        recipient: Address,
        payload: Vec<u8>,
        duration: u64,
    ) -> Result<MessageId, VaultError> {
        let staged = {
            let mut state = self.state.lock();
            self.stage_lock(&mut *state, ctx, recipient, payload, duration)?
        };
        let message_id = staged.message_id;

        // Payment is forwarded in full; the owner never pays itself.
        let forwarded = if ctx.value > 0 && ctx.caller != staged.owner {
            if let Err(reason) = self.ledger.forward(&ctx.caller, &staged.owner, ctx.value) {
                return Err(self.roll_back(&recipient, message_id, reason));
            }
            ctx.value
        } else {
            0
        };

        {
            let mut state = self.state.lock();
            state.pending.remove(&(recipient, message_id));
            state.stats.messages_locked += 1;
            state.stats.fees_forwarded = state.stats.fees_forwarded.saturating_add(forwarded);
        }

        info!(
            message_id = %message_id,
            recipient = %hex::encode(recipient),
            unlock_at = staged.unlock_at,
            "[qc-18] Message locked"
        );
        self.events.publish(VaultEvent::MessageLocked {
            recipient,
            message_id,
            timestamp: staged.now,
        });

        Ok(message_id)
    }

    fn admin_commit<F>(&self, ctx: &CallContext, mutate: F) -> Result<(), VaultError>
    where
        F: FnOnce(&mut VaultState<K>, u64) -> Result<Option<VaultEvent>, VaultError>,
    {
        let event = {
            let mut state = self.state.lock();
            if let Err(e) = invariant_owner(&ctx.caller, &state.owner) {
                warn!(
                    caller = %hex::encode(ctx.caller),
                    "[qc-18] Unauthorized admin call rejected"
                );
                return Err(e);
            }
            let now = self.clock.now();
            mutate(&mut *state, now)?
        };

        if let Some(event) = event {
            debug!(event = event.name(), "[qc-18] Admin change committed");
            self.events.publish(event);
        }
        Ok(())
    }
}

impl<K, C, E, L> TimeVaultApi for TimeVaultService<K, C, E, L>
where
    K: KeyValueStore,
    C: TimeSource,
    E: EventPublisher,
    L: ValueTransfer,
{
    #[instrument(skip(self, ctx, payload), fields(caller = %hex::encode(ctx.caller), len = payload.len()))]
    fn lock_message(
        &self,
        ctx: &CallContext,
        recipient: Address,
        payload: Vec<u8>,
        duration: u64,
    ) -> Result<MessageId, VaultError> {
        let result = self.lock_and_forward(ctx, recipient, payload, duration);
        if let Err(e) = &result {
            self.state.lock().stats.rejected_submissions += 1;
            debug!(error = %e, "[qc-18] Lock rejected");
        }
        result
    }

    #[instrument(skip(self, ctx), fields(caller = %hex::encode(ctx.caller)))]
    fn unlock_message(
        &self,
        ctx: &CallContext,
        message_id: MessageId,
    ) -> Result<Vec<u8>, VaultError> {
        let (record, now) = {
            let mut state = self.state.lock();
            let now = self.clock.now();

            let record = state
                .visible_record(&ctx.caller, &message_id)?
                .ok_or(VaultError::InvalidMessageId(message_id))?;
            invariant_time_gate(&record, message_id, now)?;

            state.store.delete(&ctx.caller, &message_id)?;
            state.stats.messages_unlocked += 1;
            (record, now)
        };

        info!(message_id = %message_id, "[qc-18] Message unlocked");
        self.events.publish(VaultEvent::MessageUnlocked {
            caller: ctx.caller,
            timestamp: now,
        });

        Ok(record.encrypted_payload)
    }

    fn get_remaining_time(
        &self,
        ctx: &CallContext,
        message_id: MessageId,
    ) -> Result<u64, VaultError> {
        let state = self.state.lock();
        let now = self.clock.now();
        Ok(state
            .visible_record(&ctx.caller, &message_id)?
            .map_or(0, |record| record.remaining(now)))
    }

    fn get_message(
        &self,
        ctx: &CallContext,
        message_id: MessageId,
    ) -> Result<Option<MessageInfo>, VaultError> {
        let state = self.state.lock();
        let now = self.clock.now();
        Ok(state
            .visible_record(&ctx.caller, &message_id)?
            .map(|record| record.info(now)))
    }

    fn get_fee(&self) -> u64 {
        self.state.lock().fees.base_fee()
    }

    fn get_minimum_lock_time(&self) -> u64 {
        self.state.lock().fees.min_lock_duration()
    }

    fn update_fee(&self, ctx: &CallContext, new_fee: u64) -> Result<(), VaultError> {
        self.admin_commit(ctx, |state, now| {
            let mut fees = state.fees;
            let previous = fees.update_fee(new_fee);
            state
                .store
                .commit(vec![VaultStore::<K>::fee_op(&fees.schedule())?])?;
            state.fees = fees;
            Ok(Some(VaultEvent::FeeUpdated {
                previous,
                new: new_fee,
                timestamp: now,
            }))
        })
    }

    fn update_minimum_lock_time(
        &self,
        ctx: &CallContext,
        new_duration: u64,
    ) -> Result<(), VaultError> {
        let max = self.config.max_lock_duration_secs;
        self.admin_commit(ctx, |state, now| {
            let mut fees = state.fees;
            let previous = fees.update_min_lock_duration(new_duration, max)?;
            state
                .store
                .commit(vec![VaultStore::<K>::fee_op(&fees.schedule())?])?;
            state.fees = fees;
            Ok(Some(VaultEvent::MinimumLockUpTimeUpdated {
                previous,
                new: new_duration,
                timestamp: now,
            }))
        })
    }

    fn add_to_whitelist(&self, ctx: &CallContext, address: Address) -> Result<bool, VaultError> {
        let mut added = false;
        self.admin_commit(ctx, |state, now| {
            let mut whitelist = state.whitelist.clone();
            if !whitelist.add(address) {
                return Ok(None);
            }
            state
                .store
                .commit(vec![VaultStore::<K>::whitelist_op(&whitelist)?])?;
            state.whitelist = whitelist;
            added = true;
            Ok(Some(VaultEvent::AddedToWhitelist {
                address,
                timestamp: now,
            }))
        })?;
        Ok(added)
    }

    fn remove_from_whitelist(
        &self,
        ctx: &CallContext,
        address: Address,
    ) -> Result<bool, VaultError> {
        let mut removed = false;
        self.admin_commit(ctx, |state, now| {
            let mut whitelist = state.whitelist.clone();
            if !whitelist.remove(&address) {
                return Ok(None);
            }
            state
                .store
                .commit(vec![VaultStore::<K>::whitelist_op(&whitelist)?])?;
            state.whitelist = whitelist;
            removed = true;
            Ok(Some(VaultEvent::RemovedFromWhitelist {
                address,
                timestamp: now,
            }))
        })?;
        Ok(removed)
    }

    fn transfer_ownership(&self, ctx: &CallContext, new_owner: Address) -> Result<(), VaultError> {
        self.admin_commit(ctx, |state, now| {
            invariant_valid_recipient(&new_owner)?;
            state
                .store
                .commit(vec![VaultStore::<K>::owner_op(&new_owner)?])?;
            let previous = std::mem::replace(&mut state.owner, new_owner);
            Ok(Some(VaultEvent::OwnershipTransferred {
                previous,
                new: new_owner,
                timestamp: now,
            }))
        })
    }

    fn owner(&self) -> Address {
        self.state.lock().owner
    }

    fn is_whitelisted(&self, address: &Address) -> bool {
        self.state.lock().whitelist.contains(address)
    }
}
