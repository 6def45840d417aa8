//! Withdraw Instruction
//!
//! Pays out a deposit to an unlinked recipient against a Groth16 proof.
//!
//! # Architecture
//! 1. Withdrawer proves off-line, for some root in the pool's history:
//!    - Knowledge of (secret, nullifier_seed) for a commitment in the tree
//!    - The commitment was computed with the claimed amount
//!    - The nullifier_hash is correctly derived
//!
//! 2. The mixer recomputes the public inputs
//!    `[merkle_root, nullifier_hash, recipient, amount]` from the call
//!    arguments, so the proof is bound to this recipient and amount.
//!
//! 3. Checks run in order, under the pool lock:
//!    - Pool active
//!    - Nullifier not already spent in any pool
//!    - Amount within the pool balance
//!    - Root known and public inputs match
//!    - Groth16 pairing check
//!    - Under the mixer-wide spent-set lock: nullifier still unspent,
//!      ledger credit, then mark the nullifier spent
//!
//! Every proof-side failure surfaces as `InvalidProof` without saying
//! which sub-check failed.

use crate::crypto::groth16_verifier::{self, Proof};
use crate::crypto::poseidon::{MerkleRoot, NullifierHash};
use crate::crypto::public_inputs::WithdrawPublicInputs;
use crate::error::{MixerError, Result};
use crate::events::{self, WithdrawEvent};
use crate::ledger::{AccountId, Ledger};
use crate::mixer::Mixer;
use crate::state::SpentNullifier;

impl<L: Ledger> Mixer<L> {
    /// Withdraw `amount` from `pool_id` to `recipient`.
    ///
    /// # Errors
    /// * `InvalidPublicInputs`, `InvalidMerkleRoot`, `InvalidNullifier`, `InvalidAmount` - malformed input
    /// * `PoolNotFound`, `PoolInactive`
    /// * `NullifierAlreadyUsed` - nullifier already spent in any pool
    /// * `AmountExceedsPoolBalance`
    /// * `InvalidProof` - unknown root, input mismatch, or failed pairing check
    /// * `Ledger` - the recipient could not be credited
    pub fn withdraw(
        &self,
        pool_id: u64,
        nullifier_hash: NullifierHash,
        recipient: &AccountId,
        amount: u64,
        proof: &Proof,
    ) -> Result<()> {
        let result = self.try_withdraw(pool_id, nullifier_hash, recipient, amount, proof);
        if let Err(err) = &result {
            tracing::debug!(
                pool_id,
                nullifier = %nullifier_hash.short(),
                code = err.code(),
                error = %err,
                "withdrawal rejected"
            );
        }
        result
    }

    fn try_withdraw(
        &self,
        pool_id: u64,
        nullifier_hash: NullifierHash,
        recipient: &AccountId,
        amount: u64,
        proof: &Proof,
    ) -> Result<()> {
        // ========== INPUT VALIDATION ==========

        if proof.public_inputs.len() != WithdrawPublicInputs::COUNT {
            return Err(MixerError::InvalidPublicInputs {
                expected: WithdrawPublicInputs::COUNT,
                actual: proof.public_inputs.len(),
            });
        }
        // Root comes from the proof; everything else from the call
        let public = WithdrawPublicInputs::new(
            MerkleRoot::from_field(&proof.public_inputs[0]),
            nullifier_hash,
            *recipient,
            amount,
        );
        public.validate()?;

        // ========== POOL CHECKS (under the pool lock) ==========

        let state = self.pool_state(pool_id)?;
        let mut state = state.lock();

        state.pool.require_active()?;
        // Early exit only; re-checked under the spent-set lock below
        self.nullifiers.lock().require_unspent(&nullifier_hash)?;
        let (total_amount, total_withdrawals) = state.pool.after_withdrawal(amount)?;

        // ========== ZK PROOF VERIFICATION ==========

        if !state.roots.contains(&public.merkle_root) {
            tracing::debug!(
                pool_id,
                root = %public.merkle_root.short(),
                "proof references unknown root"
            );
            return Err(MixerError::InvalidProof);
        }

        let expected = public.to_field_elements()?;
        if !groth16_verifier::verify(proof, &self.verification_key, &expected) {
            return Err(MixerError::InvalidProof);
        }

        // ========== SETTLEMENT ==========

        let mut nullifiers = self.nullifiers.lock();
        nullifiers.require_unspent(&nullifier_hash)?;
        self.ledger.credit(recipient, amount)?;

        // ========== STATE UPDATE ==========

        let timestamp = self.ledger.unix_timestamp();
        nullifiers.mark_spent(SpentNullifier {
            pool_id,
            nullifier_hash,
            spent_at: timestamp,
        })?;
        drop(nullifiers);
        state.pool.total_amount = total_amount;
        state.pool.total_withdrawals = total_withdrawals;

        // ========== EVENT EMISSION ==========

        events::emit(&WithdrawEvent {
            pool_id,
            nullifier_hash: nullifier_hash.to_string(),
            recipient: recipient.to_string(),
            amount,
            timestamp,
        });
        tracing::info!(
            pool_id,
            amount,
            nullifier = %nullifier_hash.short(),
            "withdrawal completed"
        );

        Ok(())
    }
}
