//! In-memory `ValueTransfer` adapter.

use crate::domain::Address;
use crate::ports::outbound::ValueTransfer;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Records forwarded payments per destination.
#[derive(Default)]
pub struct InMemoryLedger {
    balances: RwLock<HashMap<Address, u64>>,
    should_fail: RwLock<bool>,
}

impl InMemoryLedger {
    /// Create a ledger with no balances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total forwarded to `address`.
    pub fn balance_of(&self, address: &Address) -> u64 {
        self.balances.read().get(address).copied().unwrap_or(0)
    }

    /// Make subsequent transfers fail (testing).
    pub fn set_should_fail(&self, fail: bool) {
        *self.should_fail.write() = fail;
    }
}

impl ValueTransfer for InMemoryLedger {
    fn forward(&self, from: &Address, to: &Address, amount: u64) -> Result<(), String> {
        if *self.should_fail.read() {
            return Err("ledger unavailable".to_string());
        }

        let mut balances = self.balances.write();
        let balance = balances.entry(*to).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| "balance overflow".to_string())?;

        debug!(
            from = %hex::encode(from),
            to = %hex::encode(to),
            amount,
            "[qc-18] Forwarded payment"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_accumulates() {
        let ledger = InMemoryLedger::new();
        ledger.forward(&[1u8; 20], &[2u8; 20], 5).unwrap();
        ledger.forward(&[3u8; 20], &[2u8; 20], 7).unwrap();
        assert_eq!(ledger.balance_of(&[2u8; 20]), 12);
        assert_eq!(ledger.balance_of(&[1u8; 20]), 0);
    }

    #[test]
    fn test_forward_failure() {
        let ledger = InMemoryLedger::new();
        ledger.set_should_fail(true);
        assert!(ledger.forward(&[1u8; 20], &[2u8; 20], 5).is_err());
        assert_eq!(ledger.balance_of(&[2u8; 20]), 0);
    }
}
