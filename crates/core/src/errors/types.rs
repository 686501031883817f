//! Core error type definitions

use std::path::PathBuf;

/// Result type alias for sealcheck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for sealcheck operations using thiserror
///
/// Verification and policy findings are never reported through this type;
/// they are data on the report. This enum only covers I/O edges.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// File system operations
    #[error("file system {operation} operation failed for '{}': {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// A path or exclusion pattern failed to compile
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Capsule repository failures
    #[error("storage {operation} failed: {message}")]
    Storage { operation: String, message: String },

    /// Content hashing failures
    #[error("failed to hash '{path}': {message}")]
    Hashing { path: String, message: String },
}
