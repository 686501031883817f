//! Tamper-evidence scoring for source tree snapshots
//!
//! This crate provides:
//! - Deterministic content hashing with a pluggable digest
//! - Merkle root computation and inclusion proofs over file digests
//! - A pattern based policy engine for sensitive files and leaked secrets
//! - Signature file presence detection
//! - The integrity scorer that combines the above into one report

pub mod conclusion;
pub mod hashing;
pub mod loader;
pub mod merkle;
pub mod policy;
pub mod scorer;
pub mod signatures;

pub use conclusion::{derive_conclusion, IntegrityRunRecord};
pub use hashing::{ContentDigest, Sha256Digest};
pub use loader::load_directory;
pub use merkle::{build_proof, compute_root, verify_proof, MerkleProof, MerkleTree};
pub use policy::{PolicyEngine, PolicyReport};
pub use scorer::IntegrityScorer;
pub use signatures::{check_signatures, SignatureCheck};
