//! Poseidon commitment and nullifier scheme
//!
//! ```text
//! commitment     = Poseidon(secret, amount, nullifier_seed)
//! nullifier_hash = Poseidon(secret, nullifier_seed)
//! merkle node    = Poseidon(left, right)
//! ```
//!
//! Parameters are circomlib-compatible (BN254 scalar field, RF = 8,
//! RP = 57 for t = 3, RP = 56 for t = 4), so the same values can be
//! recomputed inside the withdrawal circuit. All hashes are 32-byte
//! big-endian encodings of scalar field elements.

use std::fmt;

use light_poseidon::{Poseidon, PoseidonBytesHasher};
use rand::rngs::OsRng;
use rand::RngCore;

use super::field::{FieldArithmetic, Fr};
use crate::error::{MixerError, Result};

/// Hash length in bytes
pub const HASH_LEN: usize = 32;

/// Random note material is drawn from 31 bytes so it always sits below r.
const NOTE_SECRET_LEN: usize = 31;

// ============================================================================
// HASH NEWTYPES
// ============================================================================

macro_rules! field_hash {
    ($(#[$meta:meta])* $name:ident, $zero_err:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; HASH_LEN]);

        impl $name {
            pub const fn new(bytes: [u8; HASH_LEN]) -> Self {
                Self(bytes)
            }

            pub fn from_field(value: &Fr) -> Self {
                Self(value.to_bytes_be())
            }

            pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
                &self.0
            }

            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|&b| b == 0)
            }

            /// Decode as a scalar; fails when the bytes are not below r.
            pub fn to_field(&self) -> Result<Fr> {
                Fr::from_bytes_be(&self.0)
            }

            /// Submitted values must be canonical scalars and non-zero.
            pub fn validate(&self) -> Result<()> {
                if self.is_zero() {
                    return Err($zero_err);
                }
                self.to_field().map(|_| ())
            }

            /// First 8 bytes, hex encoded, for log lines.
            pub fn short(&self) -> String {
                hex::encode(&self.0[..8])
            }
        }

        impl From<[u8; HASH_LEN]> for $name {
            fn from(bytes: [u8; HASH_LEN]) -> Self {
                Self(bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }
    };
}

field_hash!(
    /// Hiding, binding digest registered at deposit time.
    Commitment,
    MixerError::InvalidCommitment
);

field_hash!(
    /// Digest revealed at withdrawal that marks a note as spent.
    NullifierHash,
    MixerError::InvalidNullifier
);

field_hash!(
    /// Root of a pool's anonymity-set Merkle tree.
    MerkleRoot,
    MixerError::InvalidMerkleRoot
);

// ============================================================================
// HASH FUNCTIONS
// ============================================================================

fn poseidon(inputs: &[&[u8]]) -> Result<[u8; HASH_LEN]> {
    let mut hasher = Poseidon::<ark_bn254::Fr>::new_circom(inputs.len())
        .map_err(|e| MixerError::HashFailure(e.to_string()))?;
    hasher
        .hash_bytes_be(inputs)
        .map_err(|e| MixerError::HashFailure(e.to_string()))
}

/// commitment = Poseidon(secret, amount, nullifier_seed)
pub fn hash_commitment(secret: &Fr, amount: u64, nullifier_seed: &Fr) -> Result<Commitment> {
    let amount = Fr::from_u64(amount);
    poseidon(&[
        &secret.to_bytes_be(),
        &amount.to_bytes_be(),
        &nullifier_seed.to_bytes_be(),
    ])
    .map(Commitment)
}

/// nullifier_hash = Poseidon(secret, nullifier_seed)
pub fn hash_nullifier(secret: &Fr, nullifier_seed: &Fr) -> Result<NullifierHash> {
    poseidon(&[&secret.to_bytes_be(), &nullifier_seed.to_bytes_be()]).map(NullifierHash)
}

/// Hash two 32-byte children into their Merkle parent.
///
/// Both children must be canonical scalars.
pub fn hash_two_to_one(left: &[u8; HASH_LEN], right: &[u8; HASH_LEN]) -> Result<[u8; HASH_LEN]> {
    poseidon(&[left, right])
}

// ============================================================================
// NOTE
// ============================================================================

/// Deposit note: the private opening of a commitment.
///
/// Holders keep this off-line; only the commitment is ever submitted,
/// and only the nullifier hash is revealed at withdrawal.
#[derive(Clone, PartialEq, Eq)]
pub struct Note {
    pub secret: Fr,
    pub nullifier_seed: Fr,
    pub amount: u64,
}

impl Note {
    pub fn new(secret: Fr, nullifier_seed: Fr, amount: u64) -> Self {
        Self {
            secret,
            nullifier_seed,
            amount,
        }
    }

    /// Fresh note with secret and seed drawn from the OS entropy source.
    pub fn generate(amount: u64) -> Self {
        Self::random(&mut OsRng, amount)
    }

    pub fn random<R: RngCore + ?Sized>(rng: &mut R, amount: u64) -> Self {
        Self::new(random_scalar(rng), random_scalar(rng), amount)
    }

    pub fn commitment(&self) -> Result<Commitment> {
        hash_commitment(&self.secret, self.amount, &self.nullifier_seed)
    }

    pub fn nullifier_hash(&self) -> Result<NullifierHash> {
        hash_nullifier(&self.secret, &self.nullifier_seed)
    }
}

/// Secrets are never printed.
impl fmt::Debug for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Note")
            .field("secret", &"<redacted>")
            .field("nullifier_seed", &"<redacted>")
            .field("amount", &self.amount)
            .finish()
    }
}

fn random_scalar<R: RngCore + ?Sized>(rng: &mut R) -> Fr {
    let mut bytes = [0u8; HASH_LEN];
    rng.fill_bytes(&mut bytes[HASH_LEN - NOTE_SECRET_LEN..]);
    // 31 bytes < 2^248 < r
    Fr::reduce(&num_bigint::BigUint::from_bytes_be(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_circomlib_vector() {
        // circomlib poseidon([1, 2])
        let mut one = [0u8; 32];
        one[31] = 1;
        let mut two = [0u8; 32];
        two[31] = 2;
        let hash = hash_two_to_one(&one, &two).unwrap();
        assert_eq!(
            hex::encode(hash),
            "115cc0f5e7d690413df64c6b9662e9cf2a3617f2743245519e19607a4417189a"
        );
    }

    #[test]
    fn test_hash_two_to_one_deterministic() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        assert_eq!(hash_two_to_one(&a, &b).unwrap(), hash_two_to_one(&a, &b).unwrap());
    }

    #[test]
    fn test_hash_two_to_one_non_commutative() {
        let a = [1u8; 32];
        let b = [2u8; 32];
        assert_ne!(hash_two_to_one(&a, &b).unwrap(), hash_two_to_one(&b, &a).unwrap());
    }

    #[test]
    fn test_hash_two_to_one_rejects_non_canonical() {
        let too_big = [0xffu8; 32];
        assert!(matches!(
            hash_two_to_one(&too_big, &[0u8; 32]),
            Err(MixerError::HashFailure(_))
        ));
    }

    #[test]
    fn test_commitment_binds_every_input() {
        let s = Fr::from_u64(1);
        let seed = Fr::from_u64(2);
        let base = hash_commitment(&s, 100, &seed).unwrap();
        assert_ne!(base, hash_commitment(&Fr::from_u64(3), 100, &seed).unwrap());
        assert_ne!(base, hash_commitment(&s, 101, &seed).unwrap());
        assert_ne!(base, hash_commitment(&s, 100, &Fr::from_u64(3)).unwrap());
        assert!(base.validate().is_ok());
    }

    #[test]
    fn test_nullifier_differs_from_commitment() {
        let note = Note::new(Fr::from_u64(1), Fr::from_u64(2), 100);
        assert_ne!(
            note.commitment().unwrap().as_bytes(),
            note.nullifier_hash().unwrap().as_bytes()
        );
    }

    #[test]
    fn test_note_random_is_seeded() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = Note::random(&mut rng, 5);
        let mut rng = StdRng::seed_from_u64(7);
        let b = Note::random(&mut rng, 5);
        assert_eq!(a, b);
        assert_ne!(a.secret, a.nullifier_seed);
    }

    #[test]
    fn test_note_debug_redacts_secret() {
        let note = Note::new(Fr::from_u64(42), Fr::from_u64(43), 1);
        let printed = format!("{:?}", note);
        assert!(printed.contains("redacted"));
        assert!(!printed.contains("42"));
    }

    #[test]
    fn test_validate_zero_and_non_canonical() {
        assert_eq!(
            Commitment::new([0u8; 32]).validate(),
            Err(MixerError::InvalidCommitment)
        );
        assert_eq!(
            NullifierHash::new([0u8; 32]).validate(),
            Err(MixerError::InvalidNullifier)
        );
        assert_eq!(
            MerkleRoot::new([0u8; 32]).validate(),
            Err(MixerError::InvalidMerkleRoot)
        );
        assert!(matches!(
            Commitment::new([0xffu8; 32]).validate(),
            Err(MixerError::FieldElementOutOfRange { .. })
        ));
    }

    #[test]
    fn test_display_and_short() {
        let c = Commitment::new([0xabu8; 32]);
        assert_eq!(c.short(), "abababababababab");
        assert!(c.to_string().starts_with("0xabab"));
        assert!(Commitment::new([0u8; 32]).is_zero());
        assert!(!c.is_zero());
    }
}
