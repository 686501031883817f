//! Test helper functions

use crate::hashing::{hash_str, ContentDigest, Sha256Digest};

/// Leaf digests for `count` distinct contents
pub fn leaves(count: usize) -> Vec<String> {
    (0..count).map(|i| hash_str(&format!("file-{i}"))).collect()
}

/// Parent digest with the default digest
pub fn parent(left: &str, right: &str) -> String {
    Sha256Digest.combine(left, right)
}
