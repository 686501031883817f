//! Check-run conclusion and the persisted run record

use sealcheck_core::{Conclusion, IntegrityReport, PASSING_SCORE};
use serde::{Deserialize, Serialize};

/// Derive the check-run conclusion for a report.
///
/// A score below the passing mark or any error fails the run. Warnings make
/// it neutral, or fail it when `fail_on_warning` is set.
pub fn derive_conclusion(report: &IntegrityReport, fail_on_warning: bool) -> Conclusion {
    let has_warnings = !report.warnings.is_empty();

    if report.score < PASSING_SCORE || !report.errors.is_empty() || (fail_on_warning && has_warnings) {
        Conclusion::Failure
    } else if has_warnings {
        Conclusion::Neutral
    } else {
        Conclusion::Success
    }
}

/// One integrity run, keyed by installation and commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityRunRecord {
    pub installation_id: u64,
    pub commit_sha: String,
    #[serde(flatten)]
    pub report: IntegrityReport,
    pub conclusion: Conclusion,
}

impl IntegrityRunRecord {
    pub fn new(
        installation_id: u64,
        commit_sha: impl Into<String>,
        report: IntegrityReport,
        fail_on_warning: bool,
    ) -> Self {
        let conclusion = derive_conclusion(&report, fail_on_warning);
        Self {
            installation_id,
            commit_sha: commit_sha.into(),
            report,
            conclusion,
        }
    }

    /// Storage key of this run
    pub fn key(&self) -> (u64, &str) {
        (self.installation_id, &self.commit_sha)
    }
}
