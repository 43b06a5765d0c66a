//! Numeric building blocks: least squares, polynomials, statistics, root finding.

pub mod ols;
pub mod poly;
pub mod roots;
pub mod stats;

pub use ols::*;
pub use poly::*;
pub use roots::*;
pub use stats::*;
