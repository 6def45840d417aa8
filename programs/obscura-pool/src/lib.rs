//! Obscura Privacy Pool
//!
//! Value mixing over BN254: depositors register Poseidon commitments,
//! withdrawers present Groth16 proofs of knowing an opening of some
//! registered commitment, and spent nullifiers make every note
//! withdrawable at most once.
//!
//! ```text
//! deposit(commitment, pool, amount, depositor)   -> ledger.debit
//! withdraw(pool, nullifier, recipient, amount, π) -> ledger.credit
//! ```
//!
//! Value movement is delegated to a [`ledger::Ledger`] implementation; the
//! mixer owns its pool tables and serializes operations per pool.

pub mod config;
pub mod crypto;
pub mod error;
pub mod events;
pub mod instructions;
pub mod ledger;
pub mod mixer;
pub mod state;

#[cfg(test)]
mod test_utils;

pub use config::MixerConfig;
pub use error::{MixerError, Result};
pub use ledger::{AccountId, InMemoryLedger, Ledger, LedgerError};
pub use mixer::{AdminCapability, Mixer};
