//! `photo-reduce` library crate.
//!
//! The binary (`photo`) is a thin wrapper around this library so that:
//!
//! - the reduction core is testable without spawning processes
//! - the external and internal pipelines share one set of units, constants and fitters

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod plot;
pub mod propagate;
pub mod quantity;
pub mod report;
pub mod uncertainty;
