//! Root computation and proof building

use super::proofs::MerkleProof;
use crate::hashing::{ContentDigest, Sha256Digest};
use sealcheck_core::is_valid_digest;
use std::fmt;

/// Stateless Merkle tree parameterised by its digest function
pub struct MerkleTree<D: ContentDigest = Sha256Digest> {
    digest: D,
}

impl<D: ContentDigest> MerkleTree<D> {
    /// Create a tree using `digest` for parent hashes
    pub fn new(digest: D) -> Self {
        Self { digest }
    }

    /// Digest used for parent hashes
    pub fn digest(&self) -> &D {
        &self.digest
    }

    /// Compute the root digest, or `None` when no valid leaf remains
    pub fn compute_root<S: AsRef<str>>(&self, leaves: &[S]) -> Option<String> {
        let mut level = valid_leaves(leaves);
        if level.is_empty() {
            return None;
        }

        while level.len() > 1 {
            level = self.next_level(&level);
        }

        level.pop()
    }

    /// Build an inclusion proof for the valid leaf at `target_index`.
    ///
    /// `target_index` indexes the sequence after invalid leaves are dropped.
    /// Returns `None` if it is out of range.
    pub fn build_proof<S: AsRef<str>>(
        &self,
        leaves: &[S],
        target_index: usize,
    ) -> Option<MerkleProof> {
        let mut level = valid_leaves(leaves);
        let leaf = level.get(target_index)?.clone();
        let tree_size = level.len();

        let mut siblings = Vec::new();
        let mut index = target_index;

        while level.len() > 1 {
            let sibling_index = if index % 2 == 0 { index + 1 } else { index - 1 };
            // No right neighbour on an odd level: the node is paired with itself
            let sibling = level.get(sibling_index).unwrap_or(&level[index]).clone();
            siblings.push(sibling);

            level = self.next_level(&level);
            index /= 2;
        }

        let root = level.pop()?;

        Some(MerkleProof {
            leaf,
            leaf_index: target_index,
            siblings,
            root,
            tree_size,
        })
    }

    /// Recompute the root from a proof and compare it with the proof's root
    pub fn verify_proof(&self, proof: &MerkleProof) -> bool {
        self.root_from_proof(proof) == proof.root
    }

    /// Fold the siblings into the leaf, using index parity at each level
    pub fn root_from_proof(&self, proof: &MerkleProof) -> String {
        let mut current = proof.leaf.clone();
        let mut index = proof.leaf_index;

        for sibling in &proof.siblings {
            current = if index % 2 == 0 {
                self.digest.combine(&current, sibling)
            } else {
                self.digest.combine(sibling, &current)
            };
            index /= 2;
        }

        current
    }

    fn next_level(&self, level: &[String]) -> Vec<String> {
        level
            .chunks(2)
            .map(|pair| {
                let left = &pair[0];
                let right = pair.get(1).unwrap_or(left);
                self.digest.combine(left, right)
            })
            .collect()
    }
}

impl Default for MerkleTree<Sha256Digest> {
    fn default() -> Self {
        Self::new(Sha256Digest)
    }
}

impl<D: ContentDigest> fmt::Debug for MerkleTree<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MerkleTree {{ digest: {} }}", self.digest.algorithm())
    }
}

fn valid_leaves<S: AsRef<str>>(leaves: &[S]) -> Vec<String> {
    leaves
        .iter()
        .map(AsRef::as_ref)
        .filter(|leaf| is_valid_digest(leaf))
        .map(String::from)
        .collect()
}
