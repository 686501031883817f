//! Capsule persistence boundary

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sealcheck_core::{normalize_hash, Capsule, CapsuleVerification, Error, Result};
use serde::{Deserialize, Serialize};

/// Persisted form of a verified capsule, keyed by normalized file hash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapsuleRecord {
    pub file_hash: String,
    pub algorithm: String,
    pub timestamp: String,
    pub resonance_value: Option<f64>,
    pub coherence: f64,
    /// The submitted payload. Raw submissions keep their original JSON
    /// untouched; typed submissions carry the re-encoded capsule.
    pub raw_capsule: serde_json::Value,
    pub stored_at: DateTime<Utc>,
}

impl CapsuleRecord {
    /// Build the record for a capsule that passed verification, keeping
    /// `raw_capsule` as the payload it was parsed from
    pub fn from_verified(
        raw_capsule: serde_json::Value,
        capsule: &Capsule,
        verification: &CapsuleVerification,
    ) -> Self {
        Self {
            file_hash: verification.file_hash.clone(),
            algorithm: verification.algorithm.clone(),
            timestamp: capsule.timestamp.clone(),
            resonance_value: capsule.resonance_value,
            coherence: verification.coherence,
            raw_capsule,
            stored_at: Utc::now(),
        }
    }
}

/// Key-value store of capsule records.
///
/// Implementations must make `upsert` atomic per key; no other locking is
/// expected of callers.
#[async_trait]
pub trait CapsuleRepository: Send + Sync {
    /// Fetch the record stored under a normalized file hash
    async fn get(&self, file_hash: &str) -> Result<Option<CapsuleRecord>>;

    /// Insert or replace the record under `record.file_hash`
    async fn upsert(&self, record: CapsuleRecord) -> Result<()>;

    async fn len(&self) -> Result<usize>;

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

/// Process-local repository backed by a concurrent map
#[derive(Debug, Default)]
pub struct MemoryCapsuleRepository {
    records: DashMap<String, CapsuleRecord>,
}

impl MemoryCapsuleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CapsuleRepository for MemoryCapsuleRepository {
    async fn get(&self, file_hash: &str) -> Result<Option<CapsuleRecord>> {
        Ok(self
            .records
            .get(normalize_hash(file_hash))
            .map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, record: CapsuleRecord) -> Result<()> {
        if record.file_hash.is_empty() {
            return Err(Error::storage("upsert", "record has an empty file hash"));
        }
        self.records.insert(record.file_hash.clone(), record);
        Ok(())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.records.len())
    }
}
