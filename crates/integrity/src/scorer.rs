//! Integrity scoring
//!
//! The scorer runs the exclude filter, Merkle validation, the signature
//! presence check, the policy engine and the deep-analysis gate over one
//! snapshot and folds the results into an [`IntegrityReport`].

use crate::hashing::{hash_files, ContentDigest, HashedFiles, Sha256Digest};
use crate::merkle::MerkleTree;
use crate::policy::PolicyEngine;
use crate::signatures::check_signatures;
use regex::Regex;
use sealcheck_config::{AnalysisMode, AppConfig, Entitlements, FailedHashPolicy, ScoringConfig};
use sealcheck_core::{Error, FileRecord, IntegrityReport, MAX_SCORE};
use sealcheck_utils::tracing as events;

pub const DEEP_ANALYSIS_DENIED_WARNING: &str =
    "Deep analysis requires an upgraded plan; standard analysis was performed";
pub const NO_MERKLE_ROOT_WARNING: &str =
    "No files could be hashed; Merkle root is unavailable";

/// Scores snapshots under one configuration
#[derive(Debug)]
pub struct IntegrityScorer<D: ContentDigest = Sha256Digest> {
    config: ScoringConfig,
    entitlements: Entitlements,
    policy: PolicyEngine,
    tree: MerkleTree<D>,
}

impl IntegrityScorer<Sha256Digest> {
    pub fn new(config: ScoringConfig, entitlements: Entitlements) -> Self {
        Self::with_digest(config, entitlements, Sha256Digest)
    }

    pub fn from_app_config(config: &AppConfig) -> Self {
        Self::new(config.scoring.clone(), config.entitlements)
    }
}

impl<D: ContentDigest> IntegrityScorer<D> {
    /// Create a scorer hashing with `digest`
    pub fn with_digest(config: ScoringConfig, entitlements: Entitlements, digest: D) -> Self {
        Self {
            config,
            entitlements,
            policy: PolicyEngine::new(),
            tree: MerkleTree::new(digest),
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn tree(&self) -> &MerkleTree<D> {
        &self.tree
    }

    /// Apply the exclude filter and hash what remains.
    ///
    /// These are the files whose digests [`IntegrityScorer::score`] uses as
    /// Merkle leaves, so proofs built from them verify against the report's
    /// root.
    pub fn hashed_snapshot(&self, files: Vec<FileRecord>) -> HashedFiles {
        let files = self.apply_excludes(files, &mut Vec::new());
        hash_files(self.tree.digest(), files)
    }

    /// Score one snapshot. Never fails: problems end up in the report.
    pub fn score(&self, files: Vec<FileRecord>) -> IntegrityReport {
        let _span = events::scoring_span(files.len()).entered();
        let mut report = IntegrityReport::default();

        let received = files.len();
        let files = self.apply_excludes(files, &mut report.errors);
        let filtered = files.len();
        events::scoring_started(filtered, received - filtered);

        let files = if self.config.merkle_validate {
            self.validate_merkle(files, &mut report)
        } else {
            files
        };

        if self.config.signature_verify {
            let check = check_signatures(&files);
            report.signature_status = check.status;
            report.warnings.extend(check.warnings);
        }

        let policy = self.policy.check(&files);
        report.policy_violations = policy.violation_count;
        let score = MAX_SCORE - policy.penalty();
        report.warnings.extend(policy.messages);

        if self.config.mode == AnalysisMode::Deep {
            if self.entitlements.deep_analysis {
                tracing::debug!("deep analysis requested; no additional checks are defined");
            } else {
                report.warnings.push(DEEP_ANALYSIS_DENIED_WARNING.to_string());
            }
        }

        report.score = score.clamp(0, MAX_SCORE) as u8;
        report.files_analyzed = match self.config.failed_hash_policy {
            FailedHashPolicy::Exclude => files.len(),
            FailedHashPolicy::Count => filtered,
        };

        events::scoring_completed(report.score, report.policy_violations, report.files_analyzed);
        report
    }

    /// Drop files whose path matches any exclude pattern.
    ///
    /// Patterns that fail to compile are reported and skipped.
    fn apply_excludes(&self, files: Vec<FileRecord>, errors: &mut Vec<String>) -> Vec<FileRecord> {
        let mut patterns = Vec::with_capacity(self.config.exclude_patterns.len());
        for pattern in &self.config.exclude_patterns {
            match Regex::new(pattern) {
                Ok(regex) => patterns.push(regex),
                Err(e) => {
                    let error = Error::invalid_pattern(pattern, e.to_string());
                    tracing::warn!(%error, "skipping exclude pattern");
                    errors.push(error.to_string());
                }
            }
        }

        if patterns.is_empty() {
            return files;
        }

        files
            .into_iter()
            .filter(|file| !patterns.iter().any(|p| p.is_match(&file.path)))
            .collect()
    }

    /// Hash the files and compute the root; only hashed files are returned
    fn validate_merkle(&self, files: Vec<FileRecord>, report: &mut IntegrityReport) -> Vec<FileRecord> {
        let had_files = !files.is_empty();
        let HashedFiles { hashed, failed } = hash_files(self.tree.digest(), files);

        for path in &failed {
            report.warnings.push(format!("Failed to hash {path}"));
        }

        let leaves: Vec<&str> = hashed.iter().filter_map(FileRecord::valid_digest).collect();
        report.merkle_root = self.tree.compute_root(&leaves);
        tracing::debug!(root = ?report.merkle_root, leaves = %leaves.len(), "merkle root computed");

        if report.merkle_root.is_none() && had_files {
            report.warnings.push(NO_MERKLE_ROOT_WARNING.to_string());
        }

        hashed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::hash_str;
    use crate::merkle::compute_root;
    use crate::signatures::NO_SIGNATURES_WARNING;
    use sealcheck_core::{SignatureStatus, MIB};

    fn scorer(config: ScoringConfig) -> IntegrityScorer {
        IntegrityScorer::new(config, Entitlements::default())
    }

    fn clean_files() -> Vec<FileRecord> {
        vec![
            FileRecord::with_content("src/lib.rs", b"pub fn answer() -> u32 { 42 }".to_vec()),
            FileRecord::with_content("README.md", b"# demo".to_vec()),
            FileRecord::with_content("release.sig", b"signature".to_vec()),
        ]
    }

    #[test]
    fn test_clean_snapshot_scores_full_marks() {
        let report = scorer(ScoringConfig::default()).score(clean_files());

        assert_eq!(report.score, 100);
        assert_eq!(report.signature_status, SignatureStatus::Verified);
        assert_eq!(report.policy_violations, 0);
        assert!(report.warnings.is_empty());
        assert!(report.errors.is_empty());
        assert_eq!(report.files_analyzed, 3);

        let leaves: Vec<String> = clean_files()
            .iter()
            .map(|f| hash_str(std::str::from_utf8(f.content.as_deref().unwrap()).unwrap()))
            .collect();
        assert_eq!(report.merkle_root, compute_root(&leaves));
    }

    #[test]
    fn test_disabled_checks_leave_defaults() {
        let config = ScoringConfig {
            signature_verify: false,
            merkle_validate: false,
            ..ScoringConfig::default()
        };
        let report = scorer(config).score(vec![FileRecord::new("src/main.rs", 10)]);

        assert_eq!(report.signature_status, SignatureStatus::NotChecked);
        assert_eq!(report.merkle_root, None);
        assert_eq!(report.files_analyzed, 1);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_signatures_warns_without_penalty() {
        let files = vec![FileRecord::with_content("src/lib.rs", b"x".to_vec())];
        let report = scorer(ScoringConfig::default()).score(files);

        assert_eq!(report.score, 100);
        assert_eq!(report.signature_status, SignatureStatus::NoSignatures);
        assert_eq!(report.warnings, vec![NO_SIGNATURES_WARNING]);
    }

    #[test]
    fn test_policy_violations_reduce_score() {
        let mut files = clean_files();
        files.push(FileRecord::with_content(".env", b"A=1".to_vec()));
        files.push(FileRecord::with_content("config/credentials.json", b"{}".to_vec()));

        let report = scorer(ScoringConfig::default()).score(files);
        assert_eq!(report.policy_violations, 2);
        assert_eq!(report.score, 90);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_score_is_clamped_at_zero() {
        let files: Vec<FileRecord> = (0..25)
            .map(|i| FileRecord::with_content(format!("env/{i}.env"), b"x".to_vec()))
            .collect();

        let report = scorer(ScoringConfig::default()).score(files);
        assert_eq!(report.policy_violations, 25);
        assert_eq!(report.score, 0);
    }

    #[test]
    fn test_exclude_patterns_drop_files() {
        let config = ScoringConfig {
            exclude_patterns: vec![r"^vendor/".to_string(), r"\.env$".to_string()],
            ..ScoringConfig::default()
        };
        let mut files = clean_files();
        files.push(FileRecord::with_content("vendor/lib.rs", b"x".to_vec()));
        files.push(FileRecord::with_content("prod.env", b"x".to_vec()));

        let report = scorer(config).score(files);
        assert_eq!(report.files_analyzed, 3);
        assert_eq!(report.policy_violations, 0);
        assert_eq!(report.score, 100);
    }

    #[test]
    fn test_hashed_snapshot_matches_scored_root() {
        let config = ScoringConfig {
            exclude_patterns: vec![r"^vendor/".to_string()],
            ..ScoringConfig::default()
        };
        let scorer = scorer(config);
        let mut files = clean_files();
        files.push(FileRecord::with_content("vendor/a.rs", b"vendored".to_vec()));
        files.push(FileRecord::new("broken.txt", 3).hash_failed());

        let snapshot = scorer.hashed_snapshot(files.clone());
        assert!(snapshot.hashed.iter().all(|file| !file.path.starts_with("vendor/")));
        assert_eq!(snapshot.failed, vec!["broken.txt"]);

        let leaves: Vec<&str> = snapshot
            .hashed
            .iter()
            .filter_map(FileRecord::valid_digest)
            .collect();
        let report = scorer.score(files);
        assert_eq!(scorer.tree().compute_root(&leaves), report.merkle_root);

        let proof = scorer.tree().build_proof(&leaves, 1).unwrap();
        assert_eq!(Some(&proof.root), report.merkle_root.as_ref());
        assert!(scorer.tree().verify_proof(&proof));
    }

    #[test]
    fn test_invalid_exclude_pattern_is_reported_not_fatal() {
        let config = ScoringConfig {
            exclude_patterns: vec!["(".to_string(), r"^README".to_string()],
            ..ScoringConfig::default()
        };

        let report = scorer(config).score(clean_files());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].starts_with("invalid pattern '('"));
        assert_eq!(report.files_analyzed, 2);
    }

    #[test]
    fn test_failed_hashes_are_excluded_from_tree() {
        let files = vec![
            FileRecord::with_content("a.txt", b"alpha".to_vec()),
            FileRecord::new("b.txt", 5).hash_failed(),
            FileRecord::with_content("c.sig", b"gamma".to_vec()),
        ];

        let report = scorer(ScoringConfig::default()).score(files.clone());
        assert_eq!(
            report.merkle_root,
            compute_root(&[hash_str("alpha"), hash_str("gamma")])
        );
        assert_eq!(report.warnings, vec!["Failed to hash b.txt"]);
        assert_eq!(report.files_analyzed, 2);

        let config = ScoringConfig {
            failed_hash_policy: FailedHashPolicy::Count,
            ..ScoringConfig::default()
        };
        let report = scorer(config).score(files);
        assert_eq!(report.files_analyzed, 3);
    }

    #[test]
    fn test_failed_hashes_skip_later_checks() {
        // The sensitive file could not be hashed, so it never reaches the policy engine
        let files = vec![
            FileRecord::with_content("a.sig", b"alpha".to_vec()),
            FileRecord::new("id_rsa", 5).hash_failed(),
        ];
        let report = scorer(ScoringConfig::default()).score(files);
        assert_eq!(report.policy_violations, 0);
        assert_eq!(report.score, 100);
    }

    #[test]
    fn test_no_hashable_files_warns() {
        let files = vec![FileRecord::new("a.txt", 5).hash_failed()];
        let report = scorer(ScoringConfig::default()).score(files);

        assert_eq!(report.merkle_root, None);
        assert!(report.warnings.contains(&NO_MERKLE_ROOT_WARNING.to_string()));
        assert_eq!(report.files_analyzed, 0);
    }

    #[test]
    fn test_empty_snapshot() {
        let report = scorer(ScoringConfig::default()).score(Vec::new());
        assert_eq!(report.score, 100);
        assert_eq!(report.merkle_root, None);
        assert_eq!(report.warnings, vec![NO_SIGNATURES_WARNING]);
        assert_eq!(report.files_analyzed, 0);
    }

    #[test]
    fn test_deep_analysis_gate() {
        let config = ScoringConfig {
            mode: AnalysisMode::Deep,
            ..ScoringConfig::default()
        };

        let report = scorer(config.clone()).score(clean_files());
        assert_eq!(report.warnings, vec![DEEP_ANALYSIS_DENIED_WARNING]);
        assert_eq!(report.score, 100);

        let entitled = IntegrityScorer::new(config, Entitlements { deep_analysis: true });
        assert!(entitled.score(clean_files()).warnings.is_empty());
    }

    #[test]
    fn test_large_file_without_content_still_checked() {
        let config = ScoringConfig {
            merkle_validate: false,
            signature_verify: false,
            ..ScoringConfig::default()
        };
        let report = scorer(config).score(vec![FileRecord::new("data.bin", 20 * MIB)]);
        assert_eq!(report.policy_violations, 1);
        assert_eq!(report.score, 95);
    }
}
