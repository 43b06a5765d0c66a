//! Physical constants used by the photoeffect relations.
//!
//! Values are the exact 2019 SI definitions. The table is created once per
//! process and passed by reference; nothing mutates it.

use crate::quantity::registry::ELEMENTARY_CHARGE;
use crate::quantity::unit::Dimension;
use crate::quantity::value::Quantity;

/// Planck constant, J·s.
pub const PLANCK: f64 = 6.626_070_15e-34;
/// Speed of light in vacuum, m/s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

#[derive(Debug, Clone)]
pub struct PhysicalConstants {
    h: Quantity,
    c: Quantity,
    e: Quantity,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicalConstants {
    pub fn new() -> Self {
        Self {
            h: Quantity::from_si(PLANCK, None, Dimension::ACTION),
            c: Quantity::from_si(SPEED_OF_LIGHT, None, Dimension::VELOCITY),
            // Signed: the charge of the electron.
            e: Quantity::from_si(-ELEMENTARY_CHARGE, None, Dimension::CHARGE),
        }
    }

    /// Planck constant `h`.
    pub fn planck(&self) -> &Quantity {
        &self.h
    }

    /// Speed of light `c`.
    pub fn speed_of_light(&self) -> &Quantity {
        &self.c
    }

    /// Electron charge `e` (negative).
    pub fn electron_charge(&self) -> &Quantity {
        &self.e
    }
}
