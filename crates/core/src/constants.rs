//! Constants used throughout the sealcheck codebase

// Digest sentinel written by file-fetch collaborators when hashing failed
pub const HASH_ERROR_SENTINEL: &str = "error";

// Scoring
pub const MAX_SCORE: i64 = 100;
pub const VIOLATION_PENALTY: i64 = 5;
pub const PASSING_SCORE: u8 = 70;

// Policy size limits
pub const MIB: u64 = 1024 * 1024;
pub const LARGE_FILE_THRESHOLD: u64 = 10 * MIB;
pub const SECRET_SCAN_MAX_SIZE: u64 = MIB;

// Capsule verification
pub const COHERENCE_CHECKS: f64 = 6.0;
pub const COHERENCE_THRESHOLD: f64 = 0.999;
pub const CAPSULE_BATCH_SIZE: usize = 50;

// Environment variable names
pub const SEALCHECK_CONFIG_VAR: &str = "SEALCHECK_CONFIG";
pub const SEALCHECK_MODE_VAR: &str = "SEALCHECK_MODE";
pub const SEALCHECK_SIGNATURE_VERIFY_VAR: &str = "SEALCHECK_SIGNATURE_VERIFY";
pub const SEALCHECK_MERKLE_VALIDATE_VAR: &str = "SEALCHECK_MERKLE_VALIDATE";
pub const SEALCHECK_FAIL_ON_WARNING_VAR: &str = "SEALCHECK_FAIL_ON_WARNING";
pub const SEALCHECK_EXCLUDE_VAR: &str = "SEALCHECK_EXCLUDE";
pub const SEALCHECK_DEEP_ANALYSIS_VAR: &str = "SEALCHECK_DEEP_ANALYSIS";

// Default config file name looked up in the scanned directory
pub const DEFAULT_CONFIG_FILENAME: &str = "sealcheck.json";
