//! Unified error types for the Obscura privacy pool
//!
//! Error codes are stable across versions for client compatibility.
//! Variants are grouped by the layer that raises them: arithmetic and
//! decoding errors are malformed input, pool and nullifier errors are
//! protocol violations, and `InvalidProof` covers every proof rejection
//! without saying which sub-check failed.

use thiserror::Error;

use crate::ledger::LedgerError;

pub type Result<T> = std::result::Result<T, MixerError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MixerError {
    // ========== Field / Curve Errors (6000-6009) ==========
    /// Integer is not reduced below the field modulus
    #[error("Field element out of range for {field} modulus")]
    FieldElementOutOfRange { field: &'static str }, // 6000

    /// Point does not satisfy the curve equation
    #[error("Point is not on the curve")]
    PointNotOnCurve, // 6001

    /// G2 point lies on the twist but outside the prime-order subgroup
    #[error("Point is not in the prime-order subgroup")]
    PointNotInSubgroup, // 6002

    /// gcd(a, m) != 1
    #[error("No modular inverse exists")]
    NoInverseExists, // 6003

    /// Pairing check was given G1 and G2 slices of different length
    #[error("Pairing input length mismatch: {g1} G1 points, {g2} G2 points")]
    PairingLengthMismatch { g1: usize, g2: usize }, // 6004

    /// Poseidon permutation rejected its input
    #[error("Poseidon hash failed: {0}")]
    HashFailure(String), // 6005

    // ========== Proof Errors (6010-6019) ==========
    /// ZK proof verification failed
    #[error("Invalid proof")]
    InvalidProof, // 6010

    /// Proof data has incorrect format or length
    #[error("Invalid proof format: {0}")]
    InvalidProofFormat(String), // 6011

    /// Public inputs do not match the verification key arity
    #[error("Invalid public inputs: expected {expected}, got {actual}")]
    InvalidPublicInputs { expected: usize, actual: usize }, // 6012

    /// Verification key malformed
    #[error("Invalid verification key: {0}")]
    InvalidVerificationKey(String), // 6013

    // ========== Pool Errors (6020-6029) ==========
    /// Minimum delay greater than maximum delay
    #[error("Invalid delay range: min {min_delay} > max {max_delay}")]
    InvalidDelayRange { min_delay: u64, max_delay: u64 }, // 6020

    /// Merkle depth zero or above the supported maximum
    #[error("Merkle depth {depth} outside 1..={max}")]
    InvalidMerkleDepth { depth: u8, max: u8 }, // 6021

    /// No pool with this id
    #[error("Pool {0} not found")]
    PoolNotFound(u64), // 6022

    /// Pool is paused
    #[error("Pool {0} is inactive")]
    PoolInactive(u64), // 6023

    /// Anonymity set has reached 2^depth leaves
    #[error("Merkle tree is full")]
    MerkleTreeFull, // 6024

    /// Merkle root is zero or not a canonical scalar
    #[error("Invalid merkle root")]
    InvalidMerkleRoot, // 6025

    // ========== Commitment / Amount Errors (6030-6039) ==========
    /// Commitment already registered in this pool
    #[error("Commitment already exists")]
    CommitmentAlreadyExists, // 6030

    /// Commitment is zero
    #[error("Invalid commitment: cannot be all zeros")]
    InvalidCommitment, // 6031

    /// Deposit amount outside configured bounds
    #[error("Amount {amount} outside [{min}, {max}]")]
    AmountOutOfRange { amount: u64, min: u64, max: u64 }, // 6032

    /// Withdrawal larger than the pool's remaining balance
    #[error("Amount {amount} exceeds pool balance {balance}")]
    AmountExceedsPoolBalance { amount: u64, balance: u64 }, // 6033

    /// Withdrawal amount must be greater than zero
    #[error("Invalid amount: must be greater than zero")]
    InvalidAmount, // 6034

    // ========== Nullifier Errors (6040-6049) ==========
    /// Nullifier has already been spent (double-spend attempt)
    #[error("Nullifier already used")]
    NullifierAlreadyUsed, // 6040

    /// Nullifier is zero
    #[error("Invalid nullifier: cannot be all zeros")]
    InvalidNullifier, // 6041

    // ========== Authorization Errors (6050-6059) ==========
    /// Capability was not issued by this mixer
    #[error("Unauthorized: capability does not belong to this mixer")]
    Unauthorized, // 6050

    // ========== Overflow / Settlement / Config Errors (6060-6069) ==========
    /// Arithmetic overflow occurred
    #[error("Arithmetic overflow")]
    ArithmeticOverflow, // 6060

    /// Ledger refused the debit or credit
    #[error("Ledger rejected transfer: {0}")]
    Ledger(#[from] LedgerError), // 6061

    /// Configuration failed to parse or validate
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String), // 6062
}

impl MixerError {
    /// Stable numeric code for clients.
    pub fn code(&self) -> u32 {
        match self {
            MixerError::FieldElementOutOfRange { .. } => 6000,
            MixerError::PointNotOnCurve => 6001,
            MixerError::PointNotInSubgroup => 6002,
            MixerError::NoInverseExists => 6003,
            MixerError::PairingLengthMismatch { .. } => 6004,
            MixerError::HashFailure(_) => 6005,
            MixerError::InvalidProof => 6010,
            MixerError::InvalidProofFormat(_) => 6011,
            MixerError::InvalidPublicInputs { .. } => 6012,
            MixerError::InvalidVerificationKey(_) => 6013,
            MixerError::InvalidDelayRange { .. } => 6020,
            MixerError::InvalidMerkleDepth { .. } => 6021,
            MixerError::PoolNotFound(_) => 6022,
            MixerError::PoolInactive(_) => 6023,
            MixerError::MerkleTreeFull => 6024,
            MixerError::InvalidMerkleRoot => 6025,
            MixerError::CommitmentAlreadyExists => 6030,
            MixerError::InvalidCommitment => 6031,
            MixerError::AmountOutOfRange { .. } => 6032,
            MixerError::AmountExceedsPoolBalance { .. } => 6033,
            MixerError::InvalidAmount => 6034,
            MixerError::NullifierAlreadyUsed => 6040,
            MixerError::InvalidNullifier => 6041,
            MixerError::Unauthorized => 6050,
            MixerError::ArithmeticOverflow => 6060,
            MixerError::Ledger(_) => 6061,
            MixerError::InvalidConfig(_) => 6062,
        }
    }

    /// True for errors raised while decoding or validating caller input,
    /// before any pool state was read.
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            MixerError::FieldElementOutOfRange { .. }
                | MixerError::PointNotOnCurve
                | MixerError::PointNotInSubgroup
                | MixerError::NoInverseExists
                | MixerError::PairingLengthMismatch { .. }
                | MixerError::InvalidProofFormat(_)
                | MixerError::InvalidPublicInputs { .. }
                | MixerError::InvalidVerificationKey(_)
                | MixerError::InvalidMerkleRoot
                | MixerError::InvalidCommitment
                | MixerError::InvalidNullifier
                | MixerError::InvalidAmount
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let errors = vec![
            MixerError::FieldElementOutOfRange { field: "base" },
            MixerError::PointNotOnCurve,
            MixerError::PointNotInSubgroup,
            MixerError::NoInverseExists,
            MixerError::PairingLengthMismatch { g1: 1, g2: 2 },
            MixerError::HashFailure(String::new()),
            MixerError::InvalidProof,
            MixerError::InvalidProofFormat(String::new()),
            MixerError::InvalidPublicInputs { expected: 4, actual: 3 },
            MixerError::InvalidVerificationKey(String::new()),
            MixerError::InvalidDelayRange { min_delay: 2, max_delay: 1 },
            MixerError::InvalidMerkleDepth { depth: 40, max: 32 },
            MixerError::PoolNotFound(1),
            MixerError::PoolInactive(1),
            MixerError::MerkleTreeFull,
            MixerError::InvalidMerkleRoot,
            MixerError::CommitmentAlreadyExists,
            MixerError::InvalidCommitment,
            MixerError::AmountOutOfRange { amount: 0, min: 1, max: 2 },
            MixerError::AmountExceedsPoolBalance { amount: 2, balance: 1 },
            MixerError::InvalidAmount,
            MixerError::NullifierAlreadyUsed,
            MixerError::InvalidNullifier,
            MixerError::Unauthorized,
            MixerError::ArithmeticOverflow,
            MixerError::Ledger(LedgerError::Unavailable("down".into())),
            MixerError::InvalidConfig(String::new()),
        ];
        let mut codes: Vec<u32> = errors.iter().map(MixerError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_malformed_input_classification() {
        assert!(MixerError::PointNotOnCurve.is_malformed_input());
        assert!(!MixerError::NullifierAlreadyUsed.is_malformed_input());
        assert!(!MixerError::InvalidProof.is_malformed_input());
    }
}
