//! Verify-then-store front end for a capsule repository

use crate::repository::{CapsuleRecord, CapsuleRepository};
use crate::verifier::CapsuleVerifier;
use sealcheck_core::{normalize_hash, Capsule, Result, CAPSULE_BATCH_SIZE};
use sealcheck_utils::tracing as events;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Result of storing one capsule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoreOutcome {
    fn stored() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn rejected(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Totals of a batch store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    pub success_count: usize,
    pub failed_count: usize,
    /// One entry per failed capsule, prefixed with its input position
    pub errors: Vec<String>,
}

/// Verifies capsules and persists the valid ones
#[derive(Clone)]
pub struct CapsuleStore {
    repository: Arc<dyn CapsuleRepository>,
    verifier: Arc<CapsuleVerifier>,
    batch_size: usize,
}

impl CapsuleStore {
    pub fn new(repository: Arc<dyn CapsuleRepository>, verifier: CapsuleVerifier) -> Self {
        Self {
            repository,
            verifier: Arc::new(verifier),
            batch_size: CAPSULE_BATCH_SIZE,
        }
    }

    /// Override the chunk size used by [`CapsuleStore::batch_store`]
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn repository(&self) -> &Arc<dyn CapsuleRepository> {
        &self.repository
    }

    /// Verify `capsule` and upsert it under its normalized hash.
    ///
    /// An invalid capsule is rejected with its verification errors joined.
    pub async fn store(&self, capsule: &Capsule) -> StoreOutcome {
        match serde_json::to_value(capsule) {
            Ok(raw) => self.verify_and_persist(raw, capsule).await,
            Err(e) => StoreOutcome::rejected(format!("Failed to encode capsule: {e}")),
        }
    }

    /// Parse, verify and store a capsule payload as submitted.
    ///
    /// The stored record keeps `raw` untouched. A payload that is not a JSON
    /// object is rejected as malformed.
    pub async fn store_raw(&self, raw: serde_json::Value) -> StoreOutcome {
        match Capsule::deserialize(&raw) {
            Ok(capsule) => self.verify_and_persist(raw, &capsule).await,
            Err(e) => {
                tracing::warn!(error = %e, "malformed capsule rejected");
                StoreOutcome::rejected(format!("Malformed capsule: {e}"))
            }
        }
    }

    async fn verify_and_persist(&self, raw: serde_json::Value, capsule: &Capsule) -> StoreOutcome {
        let verification = self.verifier.verify(capsule, None);

        if !verification.valid {
            let reason = if verification.errors.is_empty() {
                format!(
                    "Capsule coherence {:.3} is below the acceptance threshold",
                    verification.coherence
                )
            } else {
                verification.errors.join("; ")
            };
            tracing::warn!(file_hash = %verification.file_hash, %reason, "capsule rejected");
            return StoreOutcome::rejected(reason);
        }

        let record = CapsuleRecord::from_verified(raw, capsule, &verification);
        match self.repository.upsert(record).await {
            Ok(()) => StoreOutcome::stored(),
            Err(e) => {
                tracing::warn!(file_hash = %verification.file_hash, error = %e, "capsule not stored");
                StoreOutcome::rejected(e.to_string())
            }
        }
    }

    /// Fetch a stored capsule by file hash, with or without `algorithm:` prefix
    pub async fn lookup(&self, file_hash: &str) -> Result<Option<CapsuleRecord>> {
        self.repository.get(normalize_hash(file_hash)).await
    }

    /// Store many capsules.
    ///
    /// The input is split into chunks of the batch size. Members of a chunk
    /// run concurrently; the next chunk starts only after every member of the
    /// current one has finished.
    pub async fn batch_store(&self, capsules: Vec<Capsule>) -> BatchOutcome {
        self.run_batch(capsules, |store, capsule| async move { store.store(&capsule).await })
            .await
    }

    /// Store many capsule payloads with the chunking of
    /// [`CapsuleStore::batch_store`]. A malformed member counts as a failure
    /// at its position and does not affect the others.
    pub async fn batch_store_raw(&self, payloads: Vec<serde_json::Value>) -> BatchOutcome {
        self.run_batch(payloads, |store, raw| async move { store.store_raw(raw).await })
            .await
    }

    async fn run_batch<T, F, Fut>(&self, items: Vec<T>, store_one: F) -> BatchOutcome
    where
        F: Fn(CapsuleStore, T) -> Fut,
        Fut: Future<Output = StoreOutcome> + Send + 'static,
    {
        let mut outcome = BatchOutcome::default();
        let total = items.len();
        let mut remaining = items.into_iter().enumerate().peekable();
        let mut chunk_index = 0;

        while remaining.peek().is_some() {
            let mut join_set = JoinSet::new();

            for (position, item) in remaining.by_ref().take(self.batch_size) {
                let pending = store_one(self.clone(), item);
                join_set.spawn(async move { (position, pending.await) });
            }

            let mut succeeded = 0;
            let mut failures = Vec::new();
            while let Some(joined) = join_set.join_next().await {
                match joined {
                    Ok((_, result)) if result.success => succeeded += 1,
                    Ok((position, result)) => {
                        let error = result.error.unwrap_or_default();
                        failures.push((position, error));
                    }
                    Err(e) => failures.push((usize::MAX, format!("store task failed: {e}"))),
                }
            }

            // Completion order within a chunk is arbitrary; report by input position
            failures.sort_by_key(|(position, _)| *position);
            events::batch_chunk_completed(chunk_index, succeeded, failures.len());

            outcome.success_count += succeeded;
            outcome.failed_count += failures.len();
            outcome.errors.extend(failures.into_iter().map(|(position, error)| {
                if position == usize::MAX {
                    error
                } else {
                    format!("capsule {position}: {error}")
                }
            }));
            chunk_index += 1;
        }

        tracing::info!(
            total = %total,
            succeeded = %outcome.success_count,
            failed = %outcome.failed_count,
            "batch store completed"
        );
        outcome
    }
}
