//! Update Merkle Root Instruction
//!
//! Administrators rebuild each pool's anonymity-set tree off-line from
//! `Mixer::commitments` and publish the root here. Previous roots stay in
//! the pool's bounded history, so proofs generated against a slightly
//! stale root remain valid until it is evicted.

use crate::crypto::poseidon::MerkleRoot;
use crate::error::Result;
use crate::events::{self, MerkleRootUpdated};
use crate::ledger::Ledger;
use crate::mixer::{AdminCapability, Mixer};

impl<L: Ledger> Mixer<L> {
    /// Overwrite the pool's current root.
    ///
    /// Publishing the current root again is a no-op.
    pub fn update_merkle_root(
        &self,
        capability: &AdminCapability,
        pool_id: u64,
        new_root: MerkleRoot,
    ) -> Result<()> {
        self.authorize(capability)?;
        new_root.validate()?;

        let state = self.pool_state(pool_id)?;
        let mut state = state.lock();

        if state.pool.merkle_root == new_root {
            return Ok(());
        }
        state.pool.merkle_root = new_root;
        state.roots.push(new_root);

        events::emit(&MerkleRootUpdated {
            pool_id,
            root: new_root.to_string(),
            history_len: state.roots.len(),
            timestamp: self.ledger.unix_timestamp(),
        });
        tracing::info!(pool_id, root = %new_root.short(), "merkle root updated");

        Ok(())
    }
}
