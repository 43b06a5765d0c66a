//! Curve fitting.
//!
//! - `polyfit`: least-squares polynomials (linear response, cubic spectral curve)
//! - `tangent`: tangent construction and threshold root search

pub mod polyfit;
pub mod tangent;

pub use polyfit::*;
pub use tangent::*;
