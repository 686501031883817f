//! Core domain types, errors, and constants for `sealcheck`.
//!
//! This crate holds the data contracts shared by the integrity scorer and the
//! capsule verifier. Nothing here performs I/O.
//!
//! ## Key Components
//!
//! - **`errors`**: the `Error` enum and `Result` alias used at I/O edges.
//! - **`types`**: file records, integrity reports, capsules and their
//!   verification verdicts.
//! - **`constants`**: fixed thresholds shared between crates.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result},
    types::*,
};
