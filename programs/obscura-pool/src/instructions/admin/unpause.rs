//! Unpause Pool Instruction
//!
//! Resumes pool operations after emergency pause.

use crate::error::Result;
use crate::ledger::Ledger;
use crate::mixer::{AdminCapability, Mixer};

impl<L: Ledger> Mixer<L> {
    pub fn unpause_pool(&self, capability: &AdminCapability, pool_id: u64) -> Result<()> {
        self.set_pool_active(capability, pool_id, true)
    }
}
