//! Deposit records
//!
//! Append-only: a record is created when a deposit is accepted and never
//! mutated or removed. The leaf index is the commitment's position in the
//! pool's anonymity-set tree.
//!
//! There is no withdrawn flag. A withdrawal presents only a nullifier, and
//! tying it back to a deposit would undo the unlinkability the proof
//! provides; spent state lives in the nullifier table instead.

use crate::crypto::poseidon::Commitment;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deposit {
    pub commitment: Commitment,
    pub amount: u64,
    pub timestamp: i64,
    pub pool_id: u64,
    pub leaf_index: u64,
}
