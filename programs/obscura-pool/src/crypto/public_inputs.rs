//! Public Inputs for the withdrawal circuit
//!
//! Public inputs are the values visible to the verifier. The mixer
//! recomputes them from the withdrawal arguments and rejects any proof
//! whose committed inputs differ, so a proof cannot be replayed against a
//! different recipient or amount.
//!
//! # Withdrawal Circuit Public Inputs (4 total)
//! 1. merkle_root - Anonymity-set root the membership proof refers to
//! 2. nullifier_hash - Prevents double-spending
//! 3. recipient - SHA-256(account bytes) reduced mod r
//! 4. amount - Withdrawal amount
//!
//! # Field Element Encoding
//! All values are scalar field elements; hashes are read big-endian.

use num_bigint::BigUint;
use sha2::{Digest, Sha256};

use super::field::{FieldArithmetic, Fr};
use super::poseidon::{MerkleRoot, NullifierHash};
use crate::error::{MixerError, Result};
use crate::ledger::AccountId;

// ============================================================================
// PUBLIC INPUTS STRUCTURE
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithdrawPublicInputs {
    /// Root of the anonymity set the proof refers to
    pub merkle_root: MerkleRoot,

    /// Nullifier hash (prevents double-spend)
    pub nullifier_hash: NullifierHash,

    /// Account receiving the funds
    pub recipient: AccountId,

    /// Withdrawal amount
    pub amount: u64,
}

impl WithdrawPublicInputs {
    /// Number of public inputs for verification
    pub const COUNT: usize = 4;

    pub fn new(
        merkle_root: MerkleRoot,
        nullifier_hash: NullifierHash,
        recipient: AccountId,
        amount: u64,
    ) -> Self {
        Self {
            merkle_root,
            nullifier_hash,
            recipient,
            amount,
        }
    }

    /// Root and nullifier must be canonical and non-zero; amount positive.
    pub fn validate(&self) -> Result<()> {
        self.merkle_root.validate()?;
        self.nullifier_hash.validate()?;
        if self.amount == 0 {
            return Err(MixerError::InvalidAmount);
        }
        Ok(())
    }

    /// Field elements in circuit order.
    pub fn to_field_elements(&self) -> Result<Vec<Fr>> {
        Ok(vec![
            self.merkle_root.to_field()?,
            self.nullifier_hash.to_field()?,
            recipient_to_field(&self.recipient),
            Fr::from_u64(self.amount),
        ])
    }
}

/// SHA-256 of the account bytes, reduced into the scalar field.
pub fn recipient_to_field(recipient: &AccountId) -> Fr {
    let digest = Sha256::digest(recipient.as_bytes());
    Fr::reduce(&BigUint::from_bytes_be(&digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WithdrawPublicInputs {
        WithdrawPublicInputs::new(
            MerkleRoot::new([1u8; 32]),
            NullifierHash::new([2u8; 32]),
            AccountId::new([3u8; 32]),
            1_000,
        )
    }

    #[test]
    fn test_field_order() {
        let fields = sample().to_field_elements().unwrap();
        assert_eq!(fields.len(), WithdrawPublicInputs::COUNT);
        assert_eq!(fields[0].to_bytes_be(), [1u8; 32]);
        assert_eq!(fields[1].to_bytes_be(), [2u8; 32]);
        assert_eq!(fields[2], recipient_to_field(&AccountId::new([3u8; 32])));
        assert_eq!(fields[3], Fr::from_u64(1_000));
    }

    #[test]
    fn test_recipient_binding() {
        let a = recipient_to_field(&AccountId::new([3u8; 32]));
        let b = recipient_to_field(&AccountId::new([4u8; 32]));
        assert_ne!(a, b);
    }

    #[test]
    fn test_validation() {
        assert!(sample().validate().is_ok());

        let mut zero_amount = sample();
        zero_amount.amount = 0;
        assert_eq!(zero_amount.validate(), Err(MixerError::InvalidAmount));

        let mut zero_nullifier = sample();
        zero_nullifier.nullifier_hash = NullifierHash::new([0u8; 32]);
        assert_eq!(zero_nullifier.validate(), Err(MixerError::InvalidNullifier));

        let mut bad_root = sample();
        bad_root.merkle_root = MerkleRoot::new([0xffu8; 32]);
        assert!(bad_root.validate().is_err());
    }
}
