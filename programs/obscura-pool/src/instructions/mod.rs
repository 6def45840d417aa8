//! Pool operations, one file per instruction
//!
//! Each file extends [`Mixer`](crate::mixer::Mixer) with one operation.

pub mod admin;
pub mod deposit;
pub mod initialize_pool;
pub mod update_merkle_root;
pub mod withdraw;
