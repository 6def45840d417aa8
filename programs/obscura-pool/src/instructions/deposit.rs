//! Deposit Instruction
//!
//! Registers a commitment in a pool and debits the depositor.
//!
//! # Commitment Model (Off-Line)
//!
//! The commitment is computed by the depositor:
//! ```text
//! commitment = Poseidon(secret, amount, nullifier_seed)
//! ```
//! Only the commitment is submitted; secret and seed never leave the
//! depositor. Lost secrets = lost funds (no recovery possible).

use crate::crypto::poseidon::Commitment;
use crate::error::{MixerError, Result};
use crate::events::{self, DepositEvent};
use crate::ledger::{AccountId, Ledger};
use crate::mixer::Mixer;
use crate::state::Deposit;

impl<L: Ledger> Mixer<L> {
    /// Accept a deposit; returns the commitment's leaf index.
    ///
    /// # Errors
    /// * `InvalidCommitment` / `FieldElementOutOfRange` - malformed commitment
    /// * `PoolNotFound`, `PoolInactive`
    /// * `AmountOutOfRange` - outside `[min_deposit, max_deposit]`
    /// * `CommitmentAlreadyExists` - commitment already in this pool
    /// * `MerkleTreeFull` - pool holds 2^depth deposits
    /// * `Ledger` - the depositor could not be debited
    ///
    /// On any error the pool is left unchanged.
    pub fn deposit(
        &self,
        commitment: Commitment,
        pool_id: u64,
        amount: u64,
        depositor: &AccountId,
    ) -> Result<u64> {
        let result = self.try_deposit(commitment, pool_id, amount, depositor);
        if let Err(err) = &result {
            tracing::debug!(
                pool_id,
                commitment = %commitment.short(),
                code = err.code(),
                error = %err,
                "deposit rejected"
            );
        }
        result
    }

    fn try_deposit(
        &self,
        commitment: Commitment,
        pool_id: u64,
        amount: u64,
        depositor: &AccountId,
    ) -> Result<u64> {
        // ========== INPUT VALIDATION ==========

        commitment.validate()?;

        // ========== POOL CHECKS (under the pool lock) ==========

        let state = self.pool_state(pool_id)?;
        let mut state = state.lock();

        state.pool.require_active()?;

        if amount < self.config.min_deposit || amount > self.config.max_deposit {
            return Err(MixerError::AmountOutOfRange {
                amount,
                min: self.config.min_deposit,
                max: self.config.max_deposit,
            });
        }

        if state.commitment_index.contains_key(&commitment) {
            return Err(MixerError::CommitmentAlreadyExists);
        }

        if state.pool.is_full() {
            return Err(MixerError::MerkleTreeFull);
        }

        let (total_amount, participant_count) = state.pool.after_deposit(amount)?;
        let leaf_index = state.deposits.len() as u64;

        // ========== SETTLEMENT ==========

        self.ledger.debit(depositor, amount)?;

        // ========== STATE UPDATE ==========

        let timestamp = self.ledger.unix_timestamp();
        state.deposits.push(Deposit {
            commitment,
            amount,
            timestamp,
            pool_id,
            leaf_index,
        });
        state.commitment_index.insert(commitment, leaf_index);
        state.pool.total_amount = total_amount;
        state.pool.participant_count = participant_count;

        // ========== EVENT EMISSION ==========

        events::emit(&DepositEvent {
            pool_id,
            commitment: commitment.to_string(),
            leaf_index,
            amount,
            timestamp,
        });
        // Only log first 8 bytes for privacy
        tracing::info!(
            pool_id,
            leaf_index,
            amount,
            commitment = %commitment.short(),
            "deposit accepted"
        );

        Ok(leaf_index)
    }
}
