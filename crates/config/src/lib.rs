//! Configuration for sealcheck
//!
//! This crate holds the scoring configuration, plan entitlements and the
//! capsule trust anchors, plus the layered loader that assembles them from
//! defaults, a JSON file, the environment and command line overrides.

pub mod config;
pub mod loader;


pub use config::*;
pub use loader::*;
