//! Shared utilities for sealcheck
//!
//! Currently this is the tracing setup and the structured events every
//! crate emits at well-known points of a run.

pub mod tracing;
