//! Policy checks over a snapshot
//!
//! Four checks run in a fixed order: sensitive file names, oversized files,
//! the lockfile advisory, then the secret content scan. Every message is kept
//! in that order; only the advisory leaves the violation count unchanged.

pub mod rules;

use sealcheck_core::{FileRecord, LARGE_FILE_THRESHOLD, MIB, SECRET_SCAN_MAX_SIZE, VIOLATION_PENALTY};
use serde::{Deserialize, Serialize};

const PACKAGE_MANIFEST: &str = "package.json";
const LOCKFILES: [&str; 3] = ["package-lock.json", "yarn.lock", "pnpm-lock.yaml"];

/// Aggregate result of the policy checks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyReport {
    pub violation_count: u32,
    /// Violations and advisories in check order
    pub messages: Vec<String>,
}

impl PolicyReport {
    pub fn push_violation(&mut self, message: impl Into<String>) {
        self.violation_count += 1;
        self.messages.push(message.into());
    }

    pub fn push_advisory(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Points deducted from the score for these violations
    #[must_use]
    pub fn penalty(&self) -> i64 {
        i64::from(self.violation_count) * VIOLATION_PENALTY
    }
}

/// Stateless runner for the built-in rule tables
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEngine;

impl PolicyEngine {
    pub fn new() -> Self {
        Self
    }

    /// Run every check over `files`
    pub fn check(&self, files: &[FileRecord]) -> PolicyReport {
        let mut report = PolicyReport::default();

        self.check_sensitive_files(files, &mut report);
        self.check_large_files(files, &mut report);
        self.check_lockfiles(files, &mut report);
        self.scan_secrets(files, &mut report);

        for message in &report.messages {
            tracing::debug!(%message, "policy finding");
        }

        report
    }

    fn check_sensitive_files(&self, files: &[FileRecord], report: &mut PolicyReport) {
        for file in files {
            for label in rules::sensitive_matches(&file.path) {
                report.push_violation(format!("Potentially sensitive {label}: {}", file.path));
            }
        }
    }

    fn check_large_files(&self, files: &[FileRecord], report: &mut PolicyReport) {
        for file in files.iter().filter(|f| f.size > LARGE_FILE_THRESHOLD) {
            let megabytes = file.size as f64 / MIB as f64;
            report.push_violation(format!(
                "Large file detected: {} ({megabytes:.2}MB)",
                file.path
            ));
        }
    }

    /// Only a manifest at the snapshot root is considered
    fn check_lockfiles(&self, files: &[FileRecord], report: &mut PolicyReport) {
        let has_path = |path: &str| files.iter().any(|f| f.path == path);

        if has_path(PACKAGE_MANIFEST) && !LOCKFILES.iter().any(|lock| has_path(*lock)) {
            report.push_advisory(
                "package.json found without a lockfile (package-lock.json, yarn.lock, or pnpm-lock.yaml)",
            );
        }
    }

    fn scan_secrets(&self, files: &[FileRecord], report: &mut PolicyReport) {
        for file in files.iter().filter(|f| f.size <= SECRET_SCAN_MAX_SIZE) {
            let Some(content) = file.content.as_deref() else {
                continue;
            };
            for label in rules::secret_matches(content) {
                report.push_violation(format!("Potential {label} found in: {}", file.path));
            }
        }
    }
}
