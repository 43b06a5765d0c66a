//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - measurement data (`MeasurementSeries`, `MeasurementTable`)
//! - reduction outputs (`ConfidenceEstimate`, `PolynomialFit`, `Tangent`)
//! - run configuration (`ExternalConfig`, `InternalConfig`, `Lang`)

pub mod types;

pub use types::*;
