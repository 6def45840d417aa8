//! Mixing ledger core
//!
//! [`Mixer`] owns every pool's tables. Each pool's state sits behind its
//! own mutex, so the check-then-mutate sequences in `deposit` and
//! `withdraw` run with exclusive access to that pool while other pools
//! proceed in parallel. The pool table itself is only write-locked when
//! a pool is created.
//!
//! Spent nullifiers are mixer-wide: one verification key serves every
//! pool, so a nullifier spent in one pool is spent in all of them. The
//! spent set has its own mutex, always taken after a pool lock.
//!
//! Operations live in `instructions/` as `impl Mixer` blocks; this module
//! holds construction, authorization and read-only queries.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::config::MixerConfig;
use crate::crypto::poseidon::{Commitment, MerkleRoot, NullifierHash};
use crate::crypto::public_inputs::WithdrawPublicInputs;
use crate::error::{MixerError, Result};
use crate::ledger::Ledger;
use crate::state::{
    Deposit, NullifierSet, Pool, RootHistory, SpentNullifier, VerificationKey, WithdrawalWindow,
};

static NEXT_MIXER_ID: AtomicU64 = AtomicU64::new(1);

/// Authority over administrative operations of one mixer instance.
///
/// Minted only by [`Mixer::new`]; a capability from another mixer is
/// rejected with `Unauthorized`.
#[derive(Debug)]
pub struct AdminCapability {
    mixer_id: u64,
}

/// Mutable state of a single pool.
#[derive(Debug)]
pub(crate) struct PoolState {
    pub(crate) pool: Pool,
    /// Append-only, indexed by leaf index
    pub(crate) deposits: Vec<Deposit>,
    /// Commitment → leaf index
    pub(crate) commitment_index: HashMap<Commitment, u64>,
    pub(crate) roots: RootHistory,
}

impl PoolState {
    pub(crate) fn new(pool: Pool, root_history_size: usize) -> Self {
        let roots = RootHistory::new(pool.merkle_root, root_history_size);
        Self {
            pool,
            deposits: Vec::new(),
            commitment_index: HashMap::new(),
            roots,
        }
    }
}

pub struct Mixer<L: Ledger> {
    id: u64,
    pub(crate) config: MixerConfig,
    pub(crate) verification_key: VerificationKey,
    pub(crate) ledger: L,
    pub(crate) pools: RwLock<BTreeMap<u64, Arc<Mutex<PoolState>>>>,
    /// Lock order: pool mutex, then this.
    pub(crate) nullifiers: Mutex<NullifierSet>,
    pub(crate) next_pool_id: AtomicU64,
}

impl<L: Ledger> Mixer<L> {
    /// Build a mixer around a trusted-setup key and a settlement ledger.
    ///
    /// The key is fixed for the mixer's lifetime and must expect exactly
    /// the withdrawal circuit's public inputs.
    pub fn new(
        config: MixerConfig,
        verification_key: VerificationKey,
        ledger: L,
    ) -> Result<(Self, AdminCapability)> {
        config.validate()?;
        if verification_key.num_public_inputs() != WithdrawPublicInputs::COUNT {
            return Err(MixerError::InvalidVerificationKey(format!(
                "expected {} public inputs, key has {}",
                WithdrawPublicInputs::COUNT,
                verification_key.num_public_inputs()
            )));
        }

        let id = NEXT_MIXER_ID.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            mixer_id = id,
            max_merkle_depth = config.max_merkle_depth,
            root_history_size = config.root_history_size,
            "mixer initialized"
        );

        let mixer = Self {
            id,
            config,
            verification_key,
            ledger,
            pools: RwLock::new(BTreeMap::new()),
            nullifiers: Mutex::new(NullifierSet::new()),
            next_pool_id: AtomicU64::new(1),
        };
        Ok((mixer, AdminCapability { mixer_id: id }))
    }

    pub(crate) fn authorize(&self, capability: &AdminCapability) -> Result<()> {
        if capability.mixer_id != self.id {
            tracing::warn!(
                mixer_id = self.id,
                presented = capability.mixer_id,
                "admin capability rejected"
            );
            return Err(MixerError::Unauthorized);
        }
        Ok(())
    }

    pub(crate) fn pool_state(&self, pool_id: u64) -> Result<Arc<Mutex<PoolState>>> {
        self.pools
            .read()
            .get(&pool_id)
            .cloned()
            .ok_or(MixerError::PoolNotFound(pool_id))
    }

    fn with_pool<T>(&self, pool_id: u64, f: impl FnOnce(&PoolState) -> T) -> Result<T> {
        let state = self.pool_state(pool_id)?;
        let guard = state.lock();
        Ok(f(&guard))
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    pub fn verification_key(&self) -> &VerificationKey {
        &self.verification_key
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn pool(&self, pool_id: u64) -> Result<Pool> {
        self.with_pool(pool_id, |s| s.pool.clone())
    }

    pub fn pool_ids(&self) -> Vec<u64> {
        self.pools.read().keys().copied().collect()
    }

    /// Deposit metadata for a commitment. Never exposes the opening.
    pub fn deposit_info(&self, pool_id: u64, commitment: &Commitment) -> Result<Option<Deposit>> {
        self.with_pool(pool_id, |s| {
            s.commitment_index
                .get(commitment)
                .and_then(|&i| s.deposits.get(i as usize))
                .cloned()
        })
    }

    pub fn deposits(&self, pool_id: u64) -> Result<Vec<Deposit>> {
        self.with_pool(pool_id, |s| s.deposits.clone())
    }

    /// Commitments in leaf order, for rebuilding the anonymity-set tree.
    pub fn commitments(&self, pool_id: u64) -> Result<Vec<Commitment>> {
        self.with_pool(pool_id, |s| s.deposits.iter().map(|d| d.commitment).collect())
    }

    pub fn is_nullifier_used(&self, nullifier_hash: &NullifierHash) -> bool {
        self.nullifiers.lock().is_spent(nullifier_hash)
    }

    /// Spend record, including the pool the nullifier was spent from.
    pub fn spent_nullifier(&self, nullifier_hash: &NullifierHash) -> Option<SpentNullifier> {
        self.nullifiers.lock().get(nullifier_hash).cloned()
    }

    /// True if `root` is the current root or still in the pool's history.
    pub fn is_known_root(&self, pool_id: u64, root: &MerkleRoot) -> Result<bool> {
        self.with_pool(pool_id, |s| s.roots.contains(root))
    }

    /// Recent roots, oldest first.
    pub fn root_history(&self, pool_id: u64) -> Result<Vec<MerkleRoot>> {
        self.with_pool(pool_id, |s| s.roots.iter().copied().collect())
    }

    /// Advisory withdrawal window of a deposit.
    pub fn withdrawal_window(
        &self,
        pool_id: u64,
        commitment: &Commitment,
    ) -> Result<Option<WithdrawalWindow>> {
        self.with_pool(pool_id, |s| {
            s.commitment_index
                .get(commitment)
                .and_then(|&i| s.deposits.get(i as usize))
                .map(|d| WithdrawalWindow::for_deposit(&s.pool, d.timestamp))
        })
    }
}
