//! Merkle inclusion proofs

use serde::{Deserialize, Serialize};

/// Inclusion proof for one leaf
///
/// `siblings` runs from the leaf level up to just below the root. Whether a
/// sibling sits on the left or right is implied by the parity of the
/// tracked index at that level, so no direction flags are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerkleProof {
    /// Digest of the leaf being proven
    pub leaf: String,
    /// Position of the leaf among the valid leaves
    pub leaf_index: usize,
    /// Sibling digests from leaf to root
    pub siblings: Vec<String>,
    /// Root this proof recombines to
    pub root: String,
    /// Number of valid leaves when the proof was built
    pub tree_size: usize,
}
