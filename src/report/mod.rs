//! Text reports and uncertainty rounding.

pub mod format;
pub mod rounding;

pub use format::*;
pub use rounding::*;
