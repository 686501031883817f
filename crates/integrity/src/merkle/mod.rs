//! Merkle tree over file digests
//!
//! The tree summarises an ordered sequence of leaf digests into one root.
//! Nothing is persisted; the working array of each level is all that exists
//! while the root or a proof is computed.
//!
//! ## Construction
//!
//! - Leaves that are empty or carry the hash error sentinel are dropped
//! - Each level is paired left to right; a parent is `H(left ++ right)` over
//!   the hex strings
//! - An odd level pairs its last node with itself
//! - Leaf order matters: permuting leaves changes the root

pub mod proofs;
pub mod tree;

pub use proofs::MerkleProof;
pub use tree::MerkleTree;

use crate::hashing::Sha256Digest;

/// Root of `leaves` with the default SHA-256 tree
pub fn compute_root<S: AsRef<str>>(leaves: &[S]) -> Option<String> {
    MerkleTree::<Sha256Digest>::default().compute_root(leaves)
}

/// Inclusion proof for the leaf at `target_index` with the default tree
pub fn build_proof<S: AsRef<str>>(leaves: &[S], target_index: usize) -> Option<MerkleProof> {
    MerkleTree::<Sha256Digest>::default().build_proof(leaves, target_index)
}

/// Check a proof with the default tree
pub fn verify_proof(proof: &MerkleProof) -> bool {
    MerkleTree::<Sha256Digest>::default().verify_proof(proof)
}

#[cfg(test)]
mod tests;
#[cfg(test)]
mod tests_proptest;
