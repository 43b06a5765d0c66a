//! Figures for the internal-effect run: SVG artifacts and terminal previews.

pub mod ascii;
pub mod chart;
pub mod figure;

pub use ascii::*;
pub use chart::*;
pub use figure::*;
