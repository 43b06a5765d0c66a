//! Dimensions and units.
//!
//! A `Unit` is a symbol, a dimension vector over the SI base quantities we need
//! (mass, length, time, current), and a scale factor to the coherent SI unit of
//! that dimension: `value_si = magnitude * scale`.
//!
//! Angles are dimensionless (`rad` has scale 1, `°` has scale π/180).

use std::fmt;
use std::ops::{Div, Mul};

use serde::{Serialize, Serializer};

/// Exponents of the SI base quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimension {
    pub mass: i8,
    pub length: i8,
    pub time: i8,
    pub current: i8,
}

impl Dimension {
    pub const DIMENSIONLESS: Self = Self::new(0, 0, 0, 0);
    pub const MASS: Self = Self::new(1, 0, 0, 0);
    pub const LENGTH: Self = Self::new(0, 1, 0, 0);
    pub const TIME: Self = Self::new(0, 0, 1, 0);
    pub const CURRENT: Self = Self::new(0, 0, 0, 1);

    pub const FREQUENCY: Self = Self::new(0, 0, -1, 0);
    pub const VELOCITY: Self = Self::new(0, 1, -1, 0);
    pub const CHARGE: Self = Self::new(0, 0, 1, 1);
    pub const ENERGY: Self = Self::new(1, 2, -2, 0);
    pub const POWER: Self = Self::new(1, 2, -3, 0);
    pub const VOLTAGE: Self = Self::new(1, 2, -3, -1);
    pub const ACTION: Self = Self::new(1, 2, -1, 0);

    pub const fn new(mass: i8, length: i8, time: i8, current: i8) -> Self {
        Self {
            mass,
            length,
            time,
            current,
        }
    }

    pub fn powi(self, n: i8) -> Self {
        Self::new(
            self.mass * n,
            self.length * n,
            self.time * n,
            self.current * n,
        )
    }

    pub fn is_dimensionless(self) -> bool {
        self == Self::DIMENSIONLESS
    }

    /// Symbol of the coherent SI unit for this dimension.
    pub fn si_symbol(self) -> String {
        if let Some(alias) = self.alias() {
            return alias.to_string();
        }

        fn push(exp: i8, sym: &str, num: &mut Vec<String>, den: &mut Vec<String>) {
            match exp {
                0 => {}
                1 => num.push(sym.to_string()),
                -1 => den.push(sym.to_string()),
                n if n > 1 => num.push(format!("{sym}{}", superscript(n))),
                n => den.push(format!("{sym}{}", superscript(-n))),
            }
        }

        let mut num = Vec::new();
        let mut den = Vec::new();
        push(self.mass, "kg", &mut num, &mut den);
        push(self.length, "m", &mut num, &mut den);
        push(self.current, "A", &mut num, &mut den);
        push(self.time, "s", &mut num, &mut den);

        match (num.is_empty(), den.is_empty()) {
            (true, true) => String::new(),
            (false, true) => num.join("·"),
            (true, false) => format!("1/{}", den.join("·")),
            (false, false) => format!("{}/{}", num.join("·"), den.join("·")),
        }
    }

    fn alias(self) -> Option<&'static str> {
        let alias = match self {
            Self::MASS => "kg",
            Self::LENGTH => "m",
            Self::TIME => "s",
            Self::CURRENT => "A",
            Self::FREQUENCY => "Hz",
            Self::VELOCITY => "m/s",
            Self::CHARGE => "C",
            Self::ENERGY => "J",
            Self::POWER => "W",
            Self::VOLTAGE => "V",
            Self::ACTION => "J·s",
            _ => return None,
        };
        Some(alias)
    }
}

impl Mul for Dimension {
    type Output = Dimension;
    fn mul(self, rhs: Self) -> Self::Output {
        Dimension::new(
            self.mass + rhs.mass,
            self.length + rhs.length,
            self.time + rhs.time,
            self.current + rhs.current,
        )
    }
}

impl Div for Dimension {
    type Output = Dimension;
    fn div(self, rhs: Self) -> Self::Output {
        Dimension::new(
            self.mass - rhs.mass,
            self.length - rhs.length,
            self.time - rhs.time,
            self.current - rhs.current,
        )
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sym = self.si_symbol();
        if sym.is_empty() {
            f.write_str("dimensionless")
        } else {
            f.write_str(&sym)
        }
    }
}

fn superscript(n: i8) -> String {
    const DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];
    n.unsigned_abs()
        .to_string()
        .chars()
        .filter_map(|c| c.to_digit(10).map(|d| DIGITS[d as usize]))
        .collect()
}

/// A concrete unit: symbol + dimension + scale to coherent SI.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    symbol: String,
    dimension: Dimension,
    scale: f64,
}

impl Unit {
    pub fn new(symbol: impl Into<String>, dimension: Dimension, scale: f64) -> Self {
        Self {
            symbol: symbol.into(),
            dimension,
            scale,
        }
    }

    /// The coherent SI unit of a dimension (scale 1).
    pub fn si(dimension: Dimension) -> Self {
        Self::new(dimension.si_symbol(), dimension, 1.0)
    }

    pub fn dimensionless() -> Self {
        Self::si(Dimension::DIMENSIONLESS)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
    }

    /// Same unit under a different symbol (used for localized rendering).
    pub fn relabel(&self, symbol: impl Into<String>) -> Self {
        Self::new(symbol, self.dimension, self.scale)
    }

    pub fn powi(&self, n: i8) -> Self {
        let symbol = if self.symbol.is_empty() || n == 0 {
            String::new()
        } else {
            let base = if n.unsigned_abs() == 1 {
                self.symbol.clone()
            } else {
                format!("{}{}", self.symbol, superscript(n))
            };
            if n < 0 { format!("1/{base}") } else { base }
        };
        Self::new(symbol, self.dimension.powi(n), self.scale.powi(i32::from(n)))
    }
}

impl Mul for &Unit {
    type Output = Unit;
    fn mul(self, rhs: Self) -> Unit {
        let symbol = match (self.symbol.is_empty(), rhs.symbol.is_empty()) {
            (true, _) => rhs.symbol.clone(),
            (_, true) => self.symbol.clone(),
            _ => format!("{}·{}", self.symbol, rhs.symbol),
        };
        Unit::new(symbol, self.dimension * rhs.dimension, self.scale * rhs.scale)
    }
}

impl Div for &Unit {
    type Output = Unit;
    fn div(self, rhs: Self) -> Unit {
        let symbol = match (self.symbol.is_empty(), rhs.symbol.is_empty()) {
            (_, true) => self.symbol.clone(),
            (true, false) => format!("1/{}", rhs.symbol),
            _ => format!("{}/{}", self.symbol, rhs.symbol),
        };
        Unit::new(symbol, self.dimension / rhs.dimension, self.scale / rhs.scale)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.symbol)
    }
}
