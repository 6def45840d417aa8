//! State definitions for the Obscura privacy pool

pub mod deposit;
pub mod merkle_tree;
pub mod pool_config;
pub mod spent_nullifier;
pub mod verification_key;

pub use deposit::Deposit;
pub use merkle_tree::{IncrementalMerkleTree, MerklePath, RootHistory};
pub use pool_config::{Pool, WithdrawalWindow};
pub use spent_nullifier::{NullifierSet, SpentNullifier};
pub use verification_key::VerificationKey;
