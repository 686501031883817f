//! Domain types shared by the scorer and the capsule verifier

mod capsule;
mod files;
mod report;

pub use capsule::*;
pub use files::*;
pub use report::*;
