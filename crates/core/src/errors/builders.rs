//! Builder methods for creating errors with context

use super::types::Error;
use std::path::PathBuf;

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    /// Create a JSON error with a message describing what was being parsed
    #[must_use]
    pub fn json(message: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Json {
            message: message.into(),
            source,
        }
    }

    /// Create an invalid pattern error
    #[must_use]
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a storage error
    #[must_use]
    pub fn storage(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Storage {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a hashing error
    #[must_use]
    pub fn hashing(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Hashing {
            path: path.into(),
            message: message.into(),
        }
    }
}
