//! Fixed-depth Merkle trees over transaction bytes.
//!
//! - Leaf value: `keccak256(txBytes)`
//! - Missing leaf: `keccak256(0x00 * 32)`
//! - Parent: `keccak256(left || right)`
//!
//! Proofs list siblings from the leaf upward. Bit `i` of the leaf index picks
//! the side at level `i`: 0 puts the running hash on the left.

use alloy_primitives::{keccak256, B256};
use serde::{Deserialize, Serialize};

use crate::crypto::{zero_leaf_hash, Packed};
use crate::error::MerkleError;

/// Depth of the trees committed by the block-submission pipeline.
pub const DEFAULT_TREE_DEPTH: usize = 16;

/// Largest depth a tree may have; leaf indices are `u64`.
pub const MAX_TREE_DEPTH: usize = 64;

fn hash_pair(left: &B256, right: &B256) -> B256 {
    Packed::with_capacity(64).b256(left).b256(right).keccak()
}

fn bit(index: u64, level: usize) -> u64 {
    index.checked_shr(level as u32).unwrap_or(0) & 1
}

/// Zero-subtree hashes for levels `0..=depth`.
fn zero_hashes(depth: usize) -> Vec<B256> {
    let mut zeros = Vec::with_capacity(depth + 1);
    let mut current = zero_leaf_hash();
    zeros.push(current);
    for _ in 0..depth {
        current = hash_pair(&current, &current);
        zeros.push(current);
    }
    zeros
}

/// A Merkle tree over a frozen leaf set.
///
/// Only the populated prefix of each level is stored; everything to its right
/// is a zero subtree.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    depth: usize,
    levels: Vec<Vec<B256>>,
    zeros: Vec<B256>,
}

impl MerkleTree {
    /// Build a tree whose leaves are the hashes of `leaves`.
    pub fn new<T: AsRef<[u8]>>(leaves: &[T], depth: usize) -> Result<Self, MerkleError> {
        Self::from_leaf_hashes(leaves.iter().map(keccak256).collect(), depth)
    }

    /// Build a tree from precomputed leaf hashes.
    pub fn from_leaf_hashes(leaf_hashes: Vec<B256>, depth: usize) -> Result<Self, MerkleError> {
        if depth == 0 || depth > MAX_TREE_DEPTH {
            return Err(MerkleError::UnsupportedDepth(depth));
        }
        let capacity = 1u128 << depth;
        if leaf_hashes.len() as u128 > capacity {
            return Err(MerkleError::TooManyLeaves {
                leaves: leaf_hashes.len(),
                depth,
            });
        }

        let zeros = zero_hashes(depth);
        let mut levels = Vec::with_capacity(depth + 1);
        levels.push(leaf_hashes);
        for level in 0..depth {
            let nodes = &levels[level];
            let parents = nodes
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    [left] => hash_pair(left, &zeros[level]),
                    _ => zeros[level + 1],
                })
                .collect();
            levels.push(parents);
        }

        Ok(Self {
            depth,
            levels,
            zeros,
        })
    }

    /// Tree depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of populated leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// The root hash.
    pub fn root(&self) -> B256 {
        self.levels[self.depth]
            .first()
            .copied()
            .unwrap_or(self.zeros[self.depth])
    }

    /// Build the inclusion proof for the leaf at `index`.
    ///
    /// Any index inside the tree's capacity has a proof; indices past the
    /// populated leaves prove the zero leaf.
    pub fn proof(&self, index: u64) -> Result<MerkleProof, MerkleError> {
        if self.depth < MAX_TREE_DEPTH && index >> self.depth != 0 {
            return Err(MerkleError::IndexOutOfRange {
                index,
                depth: self.depth,
            });
        }

        let mut siblings = Vec::with_capacity(self.depth);
        let mut position = index;
        for level in 0..self.depth {
            let sibling = position ^ 1;
            let node = usize::try_from(sibling)
                .ok()
                .and_then(|i| self.levels[level].get(i))
                .copied()
                .unwrap_or(self.zeros[level]);
            siblings.push(node);
            position >>= 1;
        }
        Ok(MerkleProof { siblings })
    }
}

/// Build the proof for `leaves[index]` in a tree of `depth`.
pub fn build_proof<T: AsRef<[u8]>>(
    leaves: &[T],
    index: u64,
    depth: usize,
) -> Result<MerkleProof, MerkleError> {
    MerkleTree::new(leaves, depth)?.proof(index)
}

/// An inclusion proof: sibling hashes from leaf to root.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MerkleProof {
    pub siblings: Vec<B256>,
}

impl MerkleProof {
    /// Parse the wire form: concatenated 32-byte siblings.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MerkleError> {
        if bytes.len() % 32 != 0 {
            return Err(MerkleError::InvalidProofLength(bytes.len()));
        }
        Ok(Self {
            siblings: bytes.chunks_exact(32).map(B256::from_slice).collect(),
        })
    }

    /// Serialize to the wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.siblings
            .iter()
            .flat_map(|s| s.as_slice().iter().copied())
            .collect()
    }

    /// Depth of the tree this proof is for.
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Fold the proof over a leaf hash. `None` if `index` does not fit.
    pub fn compute_root(&self, leaf_hash: B256, index: u64) -> Option<B256> {
        if index.checked_shr(self.depth() as u32).unwrap_or(0) != 0 {
            return None;
        }
        let root = self
            .siblings
            .iter()
            .enumerate()
            .fold(leaf_hash, |running, (level, sibling)| {
                if bit(index, level) == 0 {
                    hash_pair(&running, sibling)
                } else {
                    hash_pair(sibling, &running)
                }
            });
        Some(root)
    }

    /// Check that `leaf_bytes` sits at `index` under `root`.
    pub fn verify(&self, leaf_bytes: &[u8], index: u64, root: &B256) -> bool {
        self.compute_root(keccak256(leaf_bytes), index)
            .is_some_and(|computed| computed == *root)
    }
}

/// Check inclusion of `leaf_bytes` at `index` under `root`.
pub fn verify(leaf_bytes: &[u8], index: u64, proof: &MerkleProof, root: &B256) -> bool {
    proof.verify(leaf_bytes, index, root)
}

/// Check membership of a leaf hash against wire-form proof bytes.
///
/// Malformed proof bytes are a failed check, not an error.
pub fn check_membership(leaf_hash: B256, index: u64, root: &B256, proof_bytes: &[u8]) -> bool {
    MerkleProof::from_bytes(proof_bytes)
        .ok()
        .and_then(|proof| proof.compute_root(leaf_hash, index))
        .is_some_and(|computed| computed == *root)
}
