//! # Inbound Ports
//!
//! API trait defining what the Time-Locked Message Vault can do.

use crate::domain::{Address, CallContext, MessageId, MessageInfo, VaultError};

/// Time-locked vault API - inbound port.
///
/// Every method is one serialized transaction: it either completes in its
/// entirety or has no observable effect.
pub trait TimeVaultApi: Send + Sync {
    /// Lock `payload` for `recipient` for `duration` seconds.
    ///
    /// `ctx.value` is the attached payment.
    fn lock_message(
        &self,
        ctx: &CallContext,
        recipient: Address,
        payload: Vec<u8>,
        duration: u64,
    ) -> Result<MessageId, VaultError>;

    /// Retrieve and delete one of the caller's messages once unlockable.
    fn unlock_message(&self, ctx: &CallContext, message_id: MessageId)
        -> Result<Vec<u8>, VaultError>;

    /// Seconds until the caller's message unlocks; zero if absent or open.
    fn get_remaining_time(&self, ctx: &CallContext, message_id: MessageId)
        -> Result<u64, VaultError>;

    /// Metadata for one of the caller's messages.
    fn get_message(
        &self,
        ctx: &CallContext,
        message_id: MessageId,
    ) -> Result<Option<MessageInfo>, VaultError>;

    /// Current base fee.
    fn get_fee(&self) -> u64;

    /// Current minimum lock duration in seconds.
    fn get_minimum_lock_time(&self) -> u64;

    /// Owner-only: set the base fee.
    fn update_fee(&self, ctx: &CallContext, new_fee: u64) -> Result<(), VaultError>;

    /// Owner-only: set the minimum lock duration.
    fn update_minimum_lock_time(&self, ctx: &CallContext, new_duration: u64)
        -> Result<(), VaultError>;

    /// Owner-only: exempt an address from fees. Returns `false` if already exempt.
    fn add_to_whitelist(&self, ctx: &CallContext, address: Address) -> Result<bool, VaultError>;

    /// Owner-only: revoke an exemption. Returns `false` if not exempt.
    fn remove_from_whitelist(&self, ctx: &CallContext, address: Address)
        -> Result<bool, VaultError>;

    /// Owner-only: hand the vault to a new owner.
    fn transfer_ownership(&self, ctx: &CallContext, new_owner: Address) -> Result<(), VaultError>;

    /// Current owner.
    fn owner(&self) -> Address;

    /// Check fee exemption via the whitelist.
    fn is_whitelisted(&self, address: &Address) -> bool;
}
