//! Cryptographic primitives for the Obscura privacy pool
//!
//! - `field`: BN254 base/scalar fields and Fq2
//! - `curve_utils`: G1/G2 group law, validation and encodings
//! - `pairing`: optimal-ate pairing product check
//! - `groth16_verifier`: single-equation Groth16 verification
//! - `poseidon`: commitments, nullifiers, Merkle node hashing
//! - `public_inputs`: withdrawal circuit input layout
//!
//! Everything here is pure and safe to call concurrently.

pub mod curve_utils;
pub mod field;
pub mod groth16_verifier;
pub mod pairing;
pub mod poseidon;
pub mod public_inputs;

pub use curve_utils::{G1Point, G2Point};
pub use field::{mod_inverse, Fq, Fq2, Fr};
pub use groth16_verifier::{verify, Proof};
pub use pairing::pairing_product_check;
pub use poseidon::{
    hash_commitment, hash_nullifier, hash_two_to_one, Commitment, MerkleRoot, Note, NullifierHash,
};
pub use public_inputs::WithdrawPublicInputs;
