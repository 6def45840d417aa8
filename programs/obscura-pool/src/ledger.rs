//! Settlement collaborator
//!
//! The mixer never moves value itself. After every validation step has
//! passed it asks a [`Ledger`] to debit the depositor or credit the
//! recipient, and mutates its own tables only once that call succeeded.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque 32-byte account identifier understood by the ledger.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub [u8; 32]);

impl AccountId {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for AccountId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId({}..)", hex::encode(&self.0[..8]))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient funds in {account}: requested {requested}, available {available}")]
    InsufficientFunds {
        account: AccountId,
        requested: u64,
        available: u64,
    },

    #[error("balance overflow crediting {0}")]
    BalanceOverflow(AccountId),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// External value-transfer layer.
///
/// Implementations must make each call atomic: either the full amount
/// moves or nothing does.
pub trait Ledger: Send + Sync {
    fn debit(&self, account: &AccountId, amount: u64) -> Result<(), LedgerError>;

    fn credit(&self, account: &AccountId, amount: u64) -> Result<(), LedgerError>;

    /// Current time in seconds since the Unix epoch.
    fn unix_timestamp(&self) -> i64;
}

/// Balance table with a settable clock, for standalone use and tests.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: Mutex<HashMap<AccountId, u64>>,
    now: AtomicI64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balances(balances: impl IntoIterator<Item = (AccountId, u64)>) -> Self {
        let ledger = Self::new();
        ledger.balances.lock().extend(balances);
        ledger
    }

    pub fn balance(&self, account: &AccountId) -> u64 {
        self.balances.lock().get(account).copied().unwrap_or(0)
    }

    pub fn set_time(&self, unix_timestamp: i64) {
        self.now.store(unix_timestamp, Ordering::SeqCst);
    }

    pub fn advance_time(&self, seconds: i64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Ledger for InMemoryLedger {
    fn debit(&self, account: &AccountId, amount: u64) -> Result<(), LedgerError> {
        let mut balances = self.balances.lock();
        let available = balances.get(account).copied().unwrap_or(0);
        let remaining = available
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientFunds {
                account: *account,
                requested: amount,
                available,
            })?;
        balances.insert(*account, remaining);
        Ok(())
    }

    fn credit(&self, account: &AccountId, amount: u64) -> Result<(), LedgerError> {
        let mut balances = self.balances.lock();
        let current = balances.get(account).copied().unwrap_or(0);
        let updated = current
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow(*account))?;
        balances.insert(*account, updated);
        Ok(())
    }

    fn unix_timestamp(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: AccountId = AccountId::new([1u8; 32]);

    #[test]
    fn test_debit_and_credit() {
        let ledger = InMemoryLedger::with_balances([(ALICE, 100)]);
        ledger.debit(&ALICE, 40).unwrap();
        assert_eq!(ledger.balance(&ALICE), 60);
        ledger.credit(&ALICE, 15).unwrap();
        assert_eq!(ledger.balance(&ALICE), 75);
    }

    #[test]
    fn test_overdraft_leaves_balance_untouched() {
        let ledger = InMemoryLedger::with_balances([(ALICE, 10)]);
        let err = ledger.debit(&ALICE, 11).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                account: ALICE,
                requested: 11,
                available: 10
            }
        );
        assert_eq!(ledger.balance(&ALICE), 10);
    }

    #[test]
    fn test_credit_overflow() {
        let ledger = InMemoryLedger::with_balances([(ALICE, u64::MAX)]);
        assert_eq!(ledger.credit(&ALICE, 1), Err(LedgerError::BalanceOverflow(ALICE)));
    }

    #[test]
    fn test_clock() {
        let ledger = InMemoryLedger::new();
        ledger.set_time(1_000);
        ledger.advance_time(60);
        assert_eq!(ledger.unix_timestamp(), 1_060);
    }
}
