//! Create Pool Instruction
//!
//! Opens a new pool namespace with its delay bounds and tree depth. The
//! pool starts active, empty, and at the empty-tree root for its depth.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{MixerError, Result};
use crate::events::{self, PoolCreated};
use crate::ledger::Ledger;
use crate::mixer::{AdminCapability, Mixer, PoolState};
use crate::state::merkle_tree::{empty_root, validate_depth};
use crate::state::Pool;

impl<L: Ledger> Mixer<L> {
    /// Create a pool; returns its id.
    ///
    /// # Errors
    /// * `Unauthorized` - capability belongs to another mixer
    /// * `InvalidDelayRange` - `min_delay > max_delay`
    /// * `InvalidMerkleDepth` - depth is 0 or above the configured maximum
    pub fn create_pool(
        &self,
        capability: &AdminCapability,
        min_delay: u64,
        max_delay: u64,
        merkle_depth: u8,
    ) -> Result<u64> {
        self.authorize(capability)?;

        if min_delay > max_delay {
            return Err(MixerError::InvalidDelayRange {
                min_delay,
                max_delay,
            });
        }
        validate_depth(merkle_depth, self.config.max_merkle_depth)?;

        let initial_root = empty_root(merkle_depth)?;
        let timestamp = self.ledger.unix_timestamp();

        let pool_id = self.next_pool_id.fetch_add(1, Ordering::Relaxed);
        let pool = Pool::new(
            pool_id,
            min_delay,
            max_delay,
            merkle_depth,
            initial_root,
            timestamp,
        );
        let state = PoolState::new(pool, self.config.root_history_size);
        self.pools
            .write()
            .insert(pool_id, Arc::new(Mutex::new(state)));

        events::emit(&PoolCreated {
            pool_id,
            min_delay,
            max_delay,
            merkle_depth,
            initial_root: initial_root.to_string(),
            timestamp,
        });
        tracing::info!(pool_id, merkle_depth, min_delay, max_delay, "pool created");

        Ok(pool_id)
    }
}
