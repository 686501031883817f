//! Chunk ordering and in-flight limits of batch stores

use async_trait::async_trait;
use sealcheck_capsule::{CapsuleRecord, CapsuleRepository, CapsuleStore, CapsuleVerifier, MemoryCapsuleRepository};
use sealcheck_core::{Capsule, CapsuleSignatures, HashChain, Result, CAPSULE_BATCH_SIZE};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Started,
    Finished,
}

/// Repository that logs the start and end of every upsert
#[derive(Default)]
struct RecordingRepository {
    inner: MemoryCapsuleRepository,
    log: Mutex<Vec<(Phase, usize)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingRepository {
    fn record(&self, phase: Phase, position: usize) {
        self.log.lock().unwrap().push((phase, position));
    }

    fn entries(&self) -> Vec<(Phase, usize)> {
        self.log.lock().unwrap().clone()
    }
}

fn position_of(record: &CapsuleRecord) -> usize {
    usize::from_str_radix(&record.file_hash, 16).unwrap()
}

#[async_trait]
impl CapsuleRepository for RecordingRepository {
    async fn get(&self, file_hash: &str) -> Result<Option<CapsuleRecord>> {
        self.inner.get(file_hash).await
    }

    async fn upsert(&self, record: CapsuleRecord) -> Result<()> {
        let position = position_of(&record);
        let active = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(active, Ordering::SeqCst);
        self.record(Phase::Started, position);

        tokio::time::sleep(Duration::from_millis(5)).await;

        self.record(Phase::Finished, position);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.inner.upsert(record).await
    }

    async fn len(&self) -> Result<usize> {
        self.inner.len().await
    }
}

fn capsule(position: usize) -> Capsule {
    Capsule {
        protocol_version: "QCM/1".to_string(),
        timestamp: "2025-03-14T09:26:53Z".to_string(),
        source_node: "node:X-Executor".to_string(),
        message_id: format!("batch-{position}"),
        hash_chain: HashChain {
            algorithm: "sha256".to_string(),
            hash: format!("sha256:{position:064x}"),
            standard: "FIPS-180-4".to_string(),
        },
        resonance_value: Some(1.618033988749895),
        signatures: CapsuleSignatures {
            signer_a: Some("node:Q-Quantizer".to_string()),
            signer_b: Some("node:X-Executor".to_string()),
            signer_c: Some("node:Z-Zenith".to_string()),
        },
        root_seal: "root:73bf9d2e4a8c6105".to_string(),
    }
}

fn batch(total: usize, invalid: &[usize]) -> Vec<Capsule> {
    (0..total)
        .map(|position| {
            let mut capsule = capsule(position);
            if invalid.contains(&position) {
                capsule.resonance_value = Some(1.6);
            }
            capsule
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_chunks_run_strictly_in_sequence() {
    let repository = Arc::new(RecordingRepository::default());
    let store = CapsuleStore::new(repository.clone(), CapsuleVerifier::default());

    let outcome = store.batch_store(batch(120, &[3, 77, 101])).await;
    assert_eq!(outcome.success_count, 117);
    assert_eq!(outcome.failed_count, 3);

    let log = repository.entries();
    assert_eq!(log.len(), 2 * 117);

    let chunk_of = |position: usize| position / CAPSULE_BATCH_SIZE;
    for chunk in 1..3 {
        let first_start = log
            .iter()
            .position(|(phase, p)| *phase == Phase::Started && chunk_of(*p) == chunk)
            .unwrap();
        let last_finish_before = log
            .iter()
            .rposition(|(phase, p)| *phase == Phase::Finished && chunk_of(*p) == chunk - 1)
            .unwrap();
        assert!(
            last_finish_before < first_start,
            "chunk {chunk} started before chunk {} finished",
            chunk - 1
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_in_flight_operations_are_capped() {
    let repository = Arc::new(RecordingRepository::default());
    let store = CapsuleStore::new(repository.clone(), CapsuleVerifier::default());

    let outcome = store.batch_store(batch(160, &[])).await;
    assert_eq!(outcome.success_count, 160);

    let peak = repository.max_in_flight.load(Ordering::SeqCst);
    assert!(peak <= CAPSULE_BATCH_SIZE, "peak in-flight was {peak}");
    assert!(peak > 1, "chunk members did not overlap");
    assert_eq!(repository.len().await.unwrap(), 160);
}

#[tokio::test]
async fn test_custom_batch_size() {
    let repository = Arc::new(RecordingRepository::default());
    let store = CapsuleStore::new(repository.clone(), CapsuleVerifier::default()).with_batch_size(4);

    let outcome = store.batch_store(batch(10, &[9])).await;
    assert_eq!(outcome.success_count, 9);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].starts_with("capsule 9: "));
    assert!(repository.max_in_flight.load(Ordering::SeqCst) <= 4);
}
