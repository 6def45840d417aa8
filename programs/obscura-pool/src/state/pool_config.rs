//! Pool record
//!
//! Each pool is a disjoint accounting namespace: its own balance,
//! commitments, spent nullifiers and root history.

use serde::{Deserialize, Serialize};

use crate::crypto::poseidon::MerkleRoot;
use crate::error::{MixerError, Result};
use crate::state::merkle_tree;

/// Snapshot of a pool's configuration and counters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pool {
    pub id: u64,

    /// Value currently held by the pool
    pub total_amount: u64,

    /// Number of accepted deposits
    pub participant_count: u64,

    /// Number of completed withdrawals
    pub total_withdrawals: u64,

    /// Advisory delay bounds (seconds) between deposit and withdrawal
    pub min_delay: u64,
    pub max_delay: u64,

    /// Merkle tree depth (immutable after creation)
    pub merkle_depth: u8,

    /// Latest published anonymity-set root
    pub merkle_root: MerkleRoot,

    /// Deposits and withdrawals are rejected while false
    pub is_active: bool,

    pub created_at: i64,
}

impl Pool {
    pub fn new(
        id: u64,
        min_delay: u64,
        max_delay: u64,
        merkle_depth: u8,
        merkle_root: MerkleRoot,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            total_amount: 0,
            participant_count: 0,
            total_withdrawals: 0,
            min_delay,
            max_delay,
            merkle_depth,
            merkle_root,
            is_active: true,
            created_at,
        }
    }

    pub fn require_active(&self) -> Result<()> {
        if !self.is_active {
            return Err(MixerError::PoolInactive(self.id));
        }
        Ok(())
    }

    /// Maximum number of deposits (2^merkle_depth).
    pub fn capacity(&self) -> u64 {
        merkle_tree::capacity(self.merkle_depth)
    }

    pub fn is_full(&self) -> bool {
        self.participant_count >= self.capacity()
    }

    /// Balance and participant count after accepting `amount`.
    pub(crate) fn after_deposit(&self, amount: u64) -> Result<(u64, u64)> {
        let total = self
            .total_amount
            .checked_add(amount)
            .ok_or(MixerError::ArithmeticOverflow)?;
        let participants = self
            .participant_count
            .checked_add(1)
            .ok_or(MixerError::ArithmeticOverflow)?;
        Ok((total, participants))
    }

    /// Balance and withdrawal count after paying out `amount`.
    pub(crate) fn after_withdrawal(&self, amount: u64) -> Result<(u64, u64)> {
        let total = self
            .total_amount
            .checked_sub(amount)
            .ok_or(MixerError::AmountExceedsPoolBalance {
                amount,
                balance: self.total_amount,
            })?;
        let withdrawals = self
            .total_withdrawals
            .checked_add(1)
            .ok_or(MixerError::ArithmeticOverflow)?;
        Ok((total, withdrawals))
    }
}

/// Advisory withdrawal window for a deposit: [deposited + min, deposited + max].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalWindow {
    pub earliest: i64,
    pub latest: i64,
}

impl WithdrawalWindow {
    pub fn for_deposit(pool: &Pool, deposited_at: i64) -> Self {
        let offset = |delay: u64| i64::try_from(delay).unwrap_or(i64::MAX);
        Self {
            earliest: deposited_at.saturating_add(offset(pool.min_delay)),
            latest: deposited_at.saturating_add(offset(pool.max_delay)),
        }
    }

    pub fn contains(&self, unix_timestamp: i64) -> bool {
        (self.earliest..=self.latest).contains(&unix_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Pool {
        Pool::new(7, 3_600, 86_400, 2, MerkleRoot::new([9u8; 32]), 0)
    }

    #[test]
    fn test_new_pool_is_active_and_empty() {
        let pool = pool();
        assert!(pool.require_active().is_ok());
        assert_eq!(pool.total_amount, 0);
        assert_eq!(pool.capacity(), 4);
    }

    #[test]
    fn test_inactive_pool_rejected() {
        let mut pool = pool();
        pool.is_active = false;
        assert_eq!(pool.require_active(), Err(MixerError::PoolInactive(7)));
    }

    #[test]
    fn test_counters_checked() {
        let mut pool = pool();
        pool.total_amount = u64::MAX;
        assert_eq!(pool.after_deposit(1), Err(MixerError::ArithmeticOverflow));
        pool.total_amount = 10;
        assert_eq!(
            pool.after_withdrawal(11),
            Err(MixerError::AmountExceedsPoolBalance {
                amount: 11,
                balance: 10
            })
        );
        assert_eq!(pool.after_withdrawal(10), Ok((0, 1)));
    }

    #[test]
    fn test_withdrawal_window() {
        let window = WithdrawalWindow::for_deposit(&pool(), 1_000);
        assert_eq!(window.earliest, 4_600);
        assert_eq!(window.latest, 87_400);
        assert!(window.contains(10_000));
        assert!(!window.contains(1_000));
    }
}
