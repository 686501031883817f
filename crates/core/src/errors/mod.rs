//! Error types for sealcheck operations

mod builders;
mod types;

pub use types::{Error, Result};
