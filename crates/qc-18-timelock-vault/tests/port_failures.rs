//! # Port Failure Tests for Time-Locked Message Vault (qc-18)
//!
//! Behaviour of the engine when its collaborators misbehave.
//!
//! ## Test Categories
//!
//! 1. **Re-entrant Ports** - publishers and ledgers calling back into the vault
//! 2. **Store Failures** - commits refused mid-operation leave no trace
//! 3. **Rollback Failures** - transfer and compensation both failing
//! 4. **Id Collisions** - `DuplicateId` through the public API

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use qc_18_timelock_vault::{
    derive_message_id, Address, CallContext, EventPublisher, InMemoryKVStore, InMemoryLedger,
    ManualClock, MessageIdInput, MessageRecord, RecordingEventPublisher, TimeSource,
    TimeVaultApi, TimeVaultService, ValueTransfer, VaultConfig, VaultError, VaultEvent,
    VaultStore,
};

// =============================================================================
// TEST HELPERS
// =============================================================================

const OWNER: Address = [0x0Au8; 20];
const SENDER: Address = [0x5Eu8; 20];
const RECIPIENT: Address = [0xEEu8; 20];

fn paid(caller: Address) -> CallContext {
    CallContext::with_value(caller, 1)
}

/// Run `f` on another thread and fail if it does not return in time.
fn within_deadline<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(f());
    });
    rx.recv_timeout(Duration::from_secs(5))
        .expect("vault call did not return (deadlock)")
}

/// Publisher that queries the vault from inside `publish`.
#[derive(Default)]
struct CallbackPublisher {
    vault: Mutex<Option<Arc<dyn TimeVaultApi>>>,
    seen: Mutex<Vec<(&'static str, u64)>>,
}

impl EventPublisher for CallbackPublisher {
    fn publish(&self, event: VaultEvent) {
        let vault = self.vault.lock().clone();
        if let Some(vault) = vault {
            let remaining = match &event {
                VaultEvent::MessageLocked {
                    recipient,
                    message_id,
                    ..
                } => vault
                    .get_remaining_time(&CallContext::new(*recipient), *message_id)
                    .unwrap_or(u64::MAX),
                _ => vault.get_fee(),
            };
            self.seen.lock().push((event.name(), remaining));
        }
    }
}

type CallbackVault =
    TimeVaultService<InMemoryKVStore, ManualClock, CallbackPublisher, InMemoryLedger>;

/// Ledger that inspects the vault while a payment is in flight.
#[derive(Default)]
struct CallbackLedger {
    vault: Mutex<Option<Arc<LedgerVault>>>,
    visible_during_transfer: Mutex<Vec<usize>>,
    inner: InMemoryLedger,
}

impl ValueTransfer for CallbackLedger {
    fn forward(&self, from: &Address, to: &Address, amount: u64) -> Result<(), String> {
        let vault = self.vault.lock().clone();
        if let Some(vault) = vault {
            let visible = vault
                .list_message_ids(&RECIPIENT)
                .map_err(|e| e.to_string())?
                .len();
            self.visible_during_transfer.lock().push(visible);
            let _ = vault.get_fee();
        }
        self.inner.forward(from, to, amount)
    }
}

type LedgerVault =
    TimeVaultService<InMemoryKVStore, ManualClock, RecordingEventPublisher, CallbackLedger>;

/// Ledger that breaks the store and then refuses the payment.
struct StoreBreakingLedger {
    store_switch: Arc<AtomicBool>,
}

impl ValueTransfer for StoreBreakingLedger {
    fn forward(&self, _from: &Address, _to: &Address, _amount: u64) -> Result<(), String> {
        self.store_switch.store(true, Ordering::SeqCst);
        Err("ledger unavailable".to_string())
    }
}

struct FailingStoreEnv<L: ValueTransfer> {
    vault: TimeVaultService<InMemoryKVStore, ManualClock, RecordingEventPublisher, L>,
    switch: Arc<AtomicBool>,
    clock: Arc<ManualClock>,
    events: Arc<RecordingEventPublisher>,
}

fn deploy_with_switch<L: ValueTransfer>(
    kv: InMemoryKVStore,
    ledger: impl FnOnce(Arc<AtomicBool>) -> L,
) -> FailingStoreEnv<L> {
    let switch = kv.failure_switch();
    let clock = Arc::new(ManualClock::default());
    let events = Arc::new(RecordingEventPublisher::new());
    let vault = TimeVaultService::new(
        VaultConfig::with_owner(OWNER),
        kv,
        clock.clone(),
        events.clone(),
        Arc::new(ledger(switch.clone())),
    )
    .unwrap();
    FailingStoreEnv {
        vault,
        switch,
        clock,
        events,
    }
}

// =============================================================================
// RE-ENTRANT PORTS
// =============================================================================

#[test]
fn test_publisher_may_call_back_into_vault() {
    let publisher = Arc::new(CallbackPublisher::default());
    let vault: Arc<CallbackVault> = Arc::new(
        TimeVaultService::new(
            VaultConfig::with_owner(OWNER),
            InMemoryKVStore::new(),
            Arc::new(ManualClock::default()),
            publisher.clone(),
            Arc::new(InMemoryLedger::new()),
        )
        .unwrap(),
    );
    *publisher.vault.lock() = Some(vault.clone() as Arc<dyn TimeVaultApi>);

    let worker = vault.clone();
    within_deadline(move || {
        worker.update_fee(&CallContext::new(OWNER), 5).unwrap();
        worker
            .lock_message(&CallContext::with_value(SENDER, 5), RECIPIENT, b"x".to_vec(), 60)
            .unwrap();
    });

    let seen = publisher.seen.lock().clone();
    // The fee callback sees the committed value; the locked message is
    // already visible with its full duration when the event fires.
    assert_eq!(seen, vec![("FeeUpdated", 5), ("MessageLocked", 60)]);

    // Break the cycle so the vault is dropped.
    *publisher.vault.lock() = None;
}

#[test]
fn test_ledger_may_call_back_into_vault() {
    let ledger = Arc::new(CallbackLedger::default());
    let vault: Arc<LedgerVault> = Arc::new(
        TimeVaultService::new(
            VaultConfig::with_owner(OWNER),
            InMemoryKVStore::new(),
            Arc::new(ManualClock::default()),
            Arc::new(RecordingEventPublisher::new()),
            ledger.clone(),
        )
        .unwrap(),
    );
    *ledger.vault.lock() = Some(vault.clone());

    let worker = vault.clone();
    let id = within_deadline(move || {
        worker
            .lock_message(&paid(SENDER), RECIPIENT, b"x".to_vec(), 60)
            .unwrap()
    });

    // Unsettled records are hidden while the payment is in flight
    assert_eq!(ledger.visible_during_transfer.lock().clone(), vec![0]);
    assert_eq!(vault.list_message_ids(&RECIPIENT).unwrap(), vec![id]);
    assert_eq!(ledger.inner.balance_of(&OWNER), 1);

    *ledger.vault.lock() = None;
}

// =============================================================================
// STORE FAILURES
// =============================================================================

#[test]
fn test_lock_commit_failure_leaves_no_trace() {
    let ledger = Arc::new(InMemoryLedger::new());
    let shared = ledger.clone();
    let env = deploy_with_switch(InMemoryKVStore::new(), move |_| SharedLedger(shared));

    env.switch.store(true, Ordering::SeqCst);
    let result = env
        .vault
        .lock_message(&paid(SENDER), RECIPIENT, b"x".to_vec(), 60);
    assert!(matches!(result, Err(VaultError::Storage(_))));

    env.switch.store(false, Ordering::SeqCst);
    assert!(env.vault.list_message_ids(&RECIPIENT).unwrap().is_empty());
    assert_eq!(ledger.balance_of(&OWNER), 0);
    assert!(env.events.is_empty());
    assert_eq!(env.vault.stats().rejected_submissions, 1);
}

#[test]
fn test_unlock_commit_failure_keeps_record() {
    let env = deploy_with_switch(InMemoryKVStore::new(), |_| InMemoryLedger::new());
    let id = env
        .vault
        .lock_message(&paid(SENDER), RECIPIENT, b"keep".to_vec(), 60)
        .unwrap();
    env.clock.advance(60);

    env.switch.store(true, Ordering::SeqCst);
    assert!(matches!(
        env.vault.unlock_message(&CallContext::new(RECIPIENT), id),
        Err(VaultError::Storage(_))
    ));
    assert_eq!(env.events.len(), 1);

    env.switch.store(false, Ordering::SeqCst);
    assert_eq!(
        env.vault
            .unlock_message(&CallContext::new(RECIPIENT), id)
            .unwrap(),
        b"keep"
    );
}

#[test]
fn test_admin_commit_failure_changes_nothing() {
    let env = deploy_with_switch(InMemoryKVStore::new(), |_| InMemoryLedger::new());
    let owner = CallContext::new(OWNER);

    env.switch.store(true, Ordering::SeqCst);
    assert!(matches!(
        env.vault.update_fee(&owner, 9),
        Err(VaultError::Storage(_))
    ));
    assert!(matches!(
        env.vault.update_minimum_lock_time(&owner, 600),
        Err(VaultError::Storage(_))
    ));
    assert!(matches!(
        env.vault.add_to_whitelist(&owner, SENDER),
        Err(VaultError::Storage(_))
    ));
    assert!(matches!(
        env.vault.transfer_ownership(&owner, SENDER),
        Err(VaultError::Storage(_))
    ));

    assert_eq!(env.vault.get_fee(), 1);
    assert_eq!(env.vault.get_minimum_lock_time(), 60);
    assert!(!env.vault.is_whitelisted(&SENDER));
    assert_eq!(env.vault.owner(), OWNER);
    assert!(env.events.is_empty());

    // Removal of an existing member fails the same way
    env.switch.store(false, Ordering::SeqCst);
    assert!(env.vault.add_to_whitelist(&owner, SENDER).unwrap());
    env.switch.store(true, Ordering::SeqCst);
    assert!(env.vault.remove_from_whitelist(&owner, SENDER).is_err());
    assert!(env.vault.is_whitelisted(&SENDER));
    assert_eq!(env.events.len(), 1);
}

// =============================================================================
// ROLLBACK FAILURES
// =============================================================================

#[test]
fn test_failed_rollback_reports_both_errors_and_quarantines() {
    let env = deploy_with_switch(InMemoryKVStore::new(), |switch| StoreBreakingLedger {
        store_switch: switch,
    });

    let result = env
        .vault
        .lock_message(&paid(SENDER), RECIPIENT, b"stranded".to_vec(), 60);
    let (message_id, transfer, storage) = match result {
        Err(VaultError::RollbackFailed {
            message_id,
            transfer,
            storage,
        }) => (message_id, transfer, storage),
        other => panic!("expected RollbackFailed, got {other:?}"),
    };
    assert!(transfer.contains("ledger unavailable"));
    assert!(!storage.is_empty());

    env.switch.store(false, Ordering::SeqCst);
    env.clock.advance(120);
    let recipient = CallContext::new(RECIPIENT);

    // The stranded record is never handed out
    assert!(env.vault.list_message_ids(&RECIPIENT).unwrap().is_empty());
    assert!(env.vault.get_message(&recipient, message_id).unwrap().is_none());
    assert!(matches!(
        env.vault.unlock_message(&recipient, message_id),
        Err(VaultError::InvalidMessageId(_))
    ));
    assert!(env.events.is_empty());
    assert_eq!(env.vault.stats().messages_locked, 0);
}

// =============================================================================
// ID COLLISIONS
// =============================================================================

#[test]
fn test_duplicate_id_rejected_through_lock_message() {
    let clock = ManualClock::default();
    let payload = b"collide".to_vec();
    let colliding = derive_message_id(MessageIdInput {
        recipient: &RECIPIENT,
        submitter: &SENDER,
        timestamp: clock.now(),
        sequence: 0,
        payload: &payload,
    });

    let mut store = VaultStore::new(InMemoryKVStore::new());
    store
        .put(
            &RECIPIENT,
            colliding,
            &MessageRecord::new(b"planted".to_vec(), OWNER, 0, 10),
        )
        .unwrap();

    let ledger = Arc::new(InMemoryLedger::new());
    let shared = ledger.clone();
    let env = deploy_with_switch(store.into_inner(), move |_| SharedLedger(shared));

    let result = env
        .vault
        .lock_message(&paid(SENDER), RECIPIENT, payload, 60);
    assert!(matches!(result, Err(VaultError::DuplicateId(id)) if id == colliding));

    // Existing record untouched, nothing charged, nothing emitted
    let info = env
        .vault
        .get_message(&CallContext::new(RECIPIENT), colliding)
        .unwrap()
        .unwrap();
    assert_eq!(info.sender, OWNER);
    assert_eq!(ledger.balance_of(&OWNER), 0);
    assert!(env.events.is_empty());
}

/// Forwards to a ledger the test keeps a handle on.
struct SharedLedger(Arc<InMemoryLedger>);

impl ValueTransfer for SharedLedger {
    fn forward(&self, from: &Address, to: &Address, amount: u64) -> Result<(), String> {
        self.0.forward(from, to, amount)
    }
}
