//! Input/output helpers.
//!
//! - measurement CSV ingest + validation (`ingest`)
//! - JSON result export (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
