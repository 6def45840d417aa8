//! Pause Pool Instruction
//!
//! Emergency stop mechanism - disables deposits and withdrawals.
//! Only callable with the mixer's admin capability.

use crate::error::Result;
use crate::events::{self, PoolPaused, PoolUnpaused};
use crate::ledger::Ledger;
use crate::mixer::{AdminCapability, Mixer};

impl<L: Ledger> Mixer<L> {
    pub fn pause_pool(&self, capability: &AdminCapability, pool_id: u64) -> Result<()> {
        self.set_pool_active(capability, pool_id, false)
    }

    /// Toggle whether a pool accepts deposits and withdrawals.
    ///
    /// Setting the current state again changes nothing and emits nothing.
    pub fn set_pool_active(
        &self,
        capability: &AdminCapability,
        pool_id: u64,
        active: bool,
    ) -> Result<()> {
        self.authorize(capability)?;

        let state = self.pool_state(pool_id)?;
        let mut state = state.lock();
        if state.pool.is_active == active {
            return Ok(());
        }
        state.pool.is_active = active;

        let timestamp = self.ledger.unix_timestamp();
        if active {
            events::emit(&PoolUnpaused { pool_id, timestamp });
            tracing::info!(pool_id, "pool unpaused");
        } else {
            events::emit(&PoolPaused { pool_id, timestamp });
            tracing::info!(pool_id, "pool paused");
        }
        Ok(())
    }
}
