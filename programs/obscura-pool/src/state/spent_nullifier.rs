//! Spent Nullifier tracking
//!
//! # Anti-Double-Spend Mechanism
//! 1. User derives nullifier_hash = Poseidon(secret, nullifier_seed)
//! 2. On withdrawal, the mixer looks the hash up in its spent table
//! 3. If present → nullifier already spent → reject
//! 4. If absent → insert after the payout succeeds → accept withdrawal
//!
//! Entries are never removed, so a nullifier moves Unused → Used once.
//! The table is shared by all pools of a mixer.

use std::collections::HashMap;

use crate::crypto::poseidon::NullifierHash;
use crate::error::{MixerError, Result};

/// Spent nullifier marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpentNullifier {
    /// Pool the withdrawal was paid from
    pub pool_id: u64,

    /// Hash of the nullifier, never the seed itself
    pub nullifier_hash: NullifierHash,

    /// Unix timestamp when the nullifier was spent
    pub spent_at: i64,
}

/// Spent set with O(1) lookup.
#[derive(Clone, Debug, Default)]
pub struct NullifierSet {
    spent: HashMap<NullifierHash, SpentNullifier>,
}

impl NullifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_spent(&self, nullifier_hash: &NullifierHash) -> bool {
        self.spent.contains_key(nullifier_hash)
    }

    pub fn get(&self, nullifier_hash: &NullifierHash) -> Option<&SpentNullifier> {
        self.spent.get(nullifier_hash)
    }

    pub fn require_unspent(&self, nullifier_hash: &NullifierHash) -> Result<()> {
        if self.is_spent(nullifier_hash) {
            return Err(MixerError::NullifierAlreadyUsed);
        }
        Ok(())
    }

    /// Record a spend; fails if the hash is already present.
    pub fn mark_spent(&mut self, record: SpentNullifier) -> Result<()> {
        self.require_unspent(&record.nullifier_hash)?;
        self.spent.insert(record.nullifier_hash, record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.spent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spent.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_spent_once() {
        let mut set = NullifierSet::new();
        let hash = NullifierHash::new([5u8; 32]);
        let record = SpentNullifier {
            pool_id: 1,
            nullifier_hash: hash,
            spent_at: 10,
        };
        assert!(!set.is_spent(&hash));
        set.mark_spent(record.clone()).unwrap();
        assert!(set.is_spent(&hash));
        assert_eq!(set.get(&hash), Some(&record));
        assert_eq!(set.mark_spent(record), Err(MixerError::NullifierAlreadyUsed));
        assert_eq!(set.len(), 1);
    }
}
