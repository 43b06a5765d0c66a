//! Dimensioned quantities: units, unit registry, physical constants, and values
//! with propagated uncertainty.

pub mod constants;
pub mod registry;
pub mod unit;
pub mod value;

pub use constants::*;
pub use registry::*;
pub use unit::*;
pub use value::*;
