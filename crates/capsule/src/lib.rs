//! Provenance capsule verification and storage
//!
//! - [`CapsuleVerifier`] scores a capsule against the configured trust anchors
//! - [`CapsuleRepository`] is the persistence boundary, with an in-memory backend
//! - [`CapsuleStore`] verifies before storing and batch-stores in bounded chunks

pub mod repository;
pub mod store;
pub mod verifier;

pub use repository::{CapsuleRecord, CapsuleRepository, MemoryCapsuleRepository};
pub use store::{BatchOutcome, CapsuleStore, StoreOutcome};
pub use verifier::CapsuleVerifier;
