//! Incremental Merkle Tree over commitments
//!
//! Append-only tree using the filled_subtrees pattern for O(log n)
//! insertions. Internal nodes are Poseidon(left, right) and the empty leaf
//! is zero, matching the withdrawal circuit's membership check.
//!
//! The mixer core does not hash leaves itself: administrators run this
//! tree over `Mixer::commitments` and publish the resulting root with
//! `update_merkle_root`. [`RootHistory`] keeps the recent roots a
//! withdrawal proof may reference.

use std::collections::VecDeque;

use crate::config::MAX_SUPPORTED_MERKLE_DEPTH;
use crate::crypto::poseidon::{self, Commitment, MerkleRoot, HASH_LEN};
use crate::error::{MixerError, Result};

/// Incremental Merkle tree state.
#[derive(Clone, Debug)]
pub struct IncrementalMerkleTree {
    /// Tree depth (immutable after construction)
    depth: u8,

    /// Current root hash
    current_root: [u8; HASH_LEN],

    /// Rightmost left-child hash at each level
    /// Length = depth
    filled_subtrees: Vec<[u8; HASH_LEN]>,

    /// zeros[0] = empty leaf
    /// zeros[i] = hash(zeros[i-1], zeros[i-1])
    /// Length = depth + 1
    zeros: Vec<[u8; HASH_LEN]>,

    /// Inserted leaves, kept for authentication paths
    leaves: Vec<[u8; HASH_LEN]>,
}

/// Sibling hashes from leaf to root, with the leaf's index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerklePath {
    pub leaf_index: u64,
    pub siblings: Vec<[u8; HASH_LEN]>,
}

impl IncrementalMerkleTree {
    pub fn new(depth: u8) -> Result<Self> {
        validate_depth(depth, MAX_SUPPORTED_MERKLE_DEPTH)?;
        let zeros = compute_zero_values(depth)?;
        Ok(Self {
            depth,
            current_root: zeros[depth as usize],
            filled_subtrees: zeros[..depth as usize].to_vec(),
            zeros,
            leaves: Vec::new(),
        })
    }

    /// Build a tree from leaves in insertion order.
    pub fn from_commitments<'a>(
        depth: u8,
        commitments: impl IntoIterator<Item = &'a Commitment>,
    ) -> Result<Self> {
        let mut tree = Self::new(depth)?;
        for commitment in commitments {
            tree.insert_leaf(commitment)?;
        }
        Ok(tree)
    }

    /// Insert a new commitment leaf; returns its index.
    pub fn insert_leaf(&mut self, commitment: &Commitment) -> Result<u64> {
        if self.is_full() {
            return Err(MixerError::MerkleTreeFull);
        }

        let leaf_index = self.leaves.len() as u64;
        let mut current_hash = *commitment.as_bytes();
        let mut current_index = leaf_index;

        for level in 0..self.depth as usize {
            let is_right_child = (current_index & 1) == 1;
            current_index >>= 1;

            if is_right_child {
                current_hash =
                    poseidon::hash_two_to_one(&self.filled_subtrees[level], &current_hash)?;
            } else {
                self.filled_subtrees[level] = current_hash;
                current_hash = poseidon::hash_two_to_one(&current_hash, &self.zeros[level])?;
            }
        }

        self.current_root = current_hash;
        self.leaves.push(*commitment.as_bytes());
        Ok(leaf_index)
    }

    pub fn root(&self) -> MerkleRoot {
        MerkleRoot::new(self.current_root)
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn len(&self) -> u64 {
        self.leaves.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn capacity(&self) -> u64 {
        capacity(self.depth)
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    /// Authentication path for the leaf at `leaf_index`.
    pub fn path(&self, leaf_index: u64) -> Result<MerklePath> {
        if leaf_index >= self.len() {
            return Err(MixerError::InvalidCommitment);
        }

        let mut level_nodes = self.leaves.clone();
        let mut index = leaf_index as usize;
        let mut siblings = Vec::with_capacity(self.depth as usize);

        for level in 0..self.depth as usize {
            let sibling = level_nodes
                .get(index ^ 1)
                .copied()
                .unwrap_or(self.zeros[level]);
            siblings.push(sibling);

            let mut parents = Vec::with_capacity(level_nodes.len().div_ceil(2));
            for pair in level_nodes.chunks(2) {
                let right = pair.get(1).unwrap_or(&self.zeros[level]);
                parents.push(poseidon::hash_two_to_one(&pair[0], right)?);
            }
            level_nodes = parents;
            index >>= 1;
        }

        Ok(MerklePath {
            leaf_index,
            siblings,
        })
    }
}

impl MerklePath {
    /// Recompute the root implied by `leaf` and this path.
    pub fn compute_root(&self, leaf: &Commitment) -> Result<MerkleRoot> {
        let mut current = *leaf.as_bytes();
        let mut index = self.leaf_index;
        for sibling in &self.siblings {
            current = if index & 1 == 1 {
                poseidon::hash_two_to_one(sibling, &current)?
            } else {
                poseidon::hash_two_to_one(&current, sibling)?
            };
            index >>= 1;
        }
        Ok(MerkleRoot::new(current))
    }
}

/// Root of an empty tree of `depth` levels.
pub fn empty_root(depth: u8) -> Result<MerkleRoot> {
    let zeros = compute_zero_values(depth)?;
    Ok(MerkleRoot::new(zeros[depth as usize]))
}

/// 2^depth leaves.
pub fn capacity(depth: u8) -> u64 {
    1u64.checked_shl(depth as u32).unwrap_or(u64::MAX)
}

pub(crate) fn validate_depth(depth: u8, max: u8) -> Result<()> {
    if depth == 0 || depth > max {
        return Err(MixerError::InvalidMerkleDepth { depth, max });
    }
    Ok(())
}

/// These MUST match the circuit's zero values exactly.
fn compute_zero_values(depth: u8) -> Result<Vec<[u8; HASH_LEN]>> {
    let mut zeros = Vec::with_capacity(depth as usize + 1);
    zeros.push([0u8; HASH_LEN]);
    for level in 1..=depth as usize {
        let prev = zeros[level - 1];
        zeros.push(poseidon::hash_two_to_one(&prev, &prev)?);
    }
    Ok(zeros)
}

// ============================================================================
// ROOT HISTORY
// ============================================================================

/// Bounded history of recent roots, newest last.
#[derive(Clone, Debug)]
pub struct RootHistory {
    roots: VecDeque<MerkleRoot>,
    capacity: usize,
}

impl RootHistory {
    pub fn new(initial: MerkleRoot, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut roots = VecDeque::with_capacity(capacity);
        roots.push_back(initial);
        Self { roots, capacity }
    }

    /// Append a root, evicting the oldest once full.
    pub fn push(&mut self, root: MerkleRoot) {
        if self.roots.len() == self.capacity {
            self.roots.pop_front();
        }
        self.roots.push_back(root);
    }

    pub fn contains(&self, root: &MerkleRoot) -> bool {
        self.roots.iter().rev().any(|r| r == root)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MerkleRoot> {
        self.roots.iter()
    }
}
