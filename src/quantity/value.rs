//! Dimensioned values with first-order uncertainty propagation.
//!
//! Rules for independent operands (σ = standard uncertainty):
//!
//! - `a ± b`: `σ = √(σa² + σb²)` (after converting `b` into `a`'s unit)
//! - `a · b`: `σ = √((b·σa)² + (a·σb)²)`
//! - `a / b`: `σ = √((σa/b)² + (a·σb/b²)²)`
//! - `f(a)`:  `σ = |f'(a)|·σa`
//!
//! The partial-derivative forms are used for products and quotients so that a
//! zero operand does not poison the result through a relative error.

use std::fmt;
use std::ops::{Div, Mul};

use serde::Serialize;

use crate::error::ReduceError;
use crate::quantity::unit::{Dimension, Unit};

/// A magnitude in a unit, optionally with an uncertainty in the same unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quantity {
    magnitude: f64,
    unit: Unit,
    #[serde(skip_serializing_if = "Option::is_none")]
    uncertainty: Option<f64>,
}

impl Quantity {
    /// An exact quantity (no uncertainty).
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Self {
            magnitude,
            unit,
            uncertainty: None,
        }
    }

    pub fn with_uncertainty(magnitude: f64, uncertainty: f64, unit: Unit) -> Self {
        Self {
            magnitude,
            unit,
            uncertainty: Some(uncertainty.abs()),
        }
    }

    /// Build from a coherent-SI value of the given dimension.
    pub fn from_si(value: f64, uncertainty: Option<f64>, dimension: Dimension) -> Self {
        Self {
            magnitude: value,
            unit: Unit::si(dimension),
            uncertainty: uncertainty.map(f64::abs),
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn dimension(&self) -> Dimension {
        self.unit.dimension()
    }

    pub fn uncertainty(&self) -> Option<f64> {
        self.uncertainty
    }

    /// Standard uncertainty, `0` for exact quantities.
    pub fn std_dev(&self) -> f64 {
        self.uncertainty.unwrap_or(0.0)
    }

    pub fn si_value(&self) -> f64 {
        self.magnitude * self.unit.scale()
    }

    pub fn si_uncertainty(&self) -> Option<f64> {
        self.uncertainty.map(|u| u * self.unit.scale())
    }

    /// Express this quantity in another unit of the same dimension.
    pub fn convert(&self, target: &Unit) -> Result<Quantity, ReduceError> {
        self.require_dimension(target.dimension(), "conversion")?;
        let factor = self.unit.scale() / target.scale();
        Ok(Quantity {
            magnitude: self.magnitude * factor,
            unit: target.clone(),
            uncertainty: self.uncertainty.map(|u| u * factor.abs()),
        })
    }

    /// Fail with `UnitMismatch` unless this quantity has `expected` dimension.
    pub fn require_dimension(&self, expected: Dimension, context: &str) -> Result<(), ReduceError> {
        if self.dimension() == expected {
            Ok(())
        } else {
            Err(ReduceError::UnitMismatch {
                context: context.to_string(),
                expected: expected.to_string(),
                actual: format!("{} ({})", self.unit, self.dimension()),
            })
        }
    }

    /// Dimension-checked addition; the result is expressed in `self`'s unit.
    pub fn try_add(&self, rhs: &Quantity) -> Result<Quantity, ReduceError> {
        rhs.require_dimension(self.dimension(), "addition")?;
        let rhs = rhs.convert(&self.unit)?;
        Ok(Quantity {
            magnitude: self.magnitude + rhs.magnitude,
            unit: self.unit.clone(),
            uncertainty: quadrature([self.uncertainty, rhs.uncertainty]),
        })
    }

    pub fn is_finite(&self) -> bool {
        self.magnitude.is_finite() && self.uncertainty.is_none_or(f64::is_finite)
    }
}

/// `√(Σ σ²)`, or `None` when no operand carries an uncertainty.
pub(crate) fn quadrature<const N: usize>(terms: [Option<f64>; N]) -> Option<f64> {
    if terms.iter().all(Option::is_none) {
        return None;
    }
    Some(terms.iter().map(|t| t.unwrap_or(0.0).powi(2)).sum::<f64>().sqrt())
}

impl Mul for &Quantity {
    type Output = Quantity;
    fn mul(self, rhs: Self) -> Quantity {
        let (a, b) = (self.magnitude, rhs.magnitude);
        Quantity {
            magnitude: a * b,
            unit: &self.unit * &rhs.unit,
            uncertainty: quadrature([
                self.uncertainty.map(|s| b * s),
                rhs.uncertainty.map(|s| a * s),
            ]),
        }
    }
}

impl Mul for Quantity {
    type Output = Quantity;
    fn mul(self, rhs: Self) -> Quantity {
        &self * &rhs
    }
}

impl Div for &Quantity {
    type Output = Quantity;
    fn div(self, rhs: Self) -> Quantity {
        let (a, b) = (self.magnitude, rhs.magnitude);
        Quantity {
            magnitude: a / b,
            unit: &self.unit / &rhs.unit,
            uncertainty: quadrature([
                self.uncertainty.map(|s| s / b),
                rhs.uncertainty.map(|s| a * s / (b * b)),
            ]),
        }
    }
}

impl Div for Quantity {
    type Output = Quantity;
    fn div(self, rhs: Self) -> Quantity {
        &self / &rhs
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.uncertainty {
            Some(u) => write!(f, "({} ± {}) {}", self.magnitude, u, self.unit),
            None => write!(f, "{} {}", self.magnitude, self.unit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::UnitRegistry;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn volts(m: f64, s: f64) -> Quantity {
        Quantity::with_uncertainty(m, s, Unit::si(Dimension::VOLTAGE))
    }

    #[test]
    fn addition_requires_matching_dimension() {
        let reg = UnitRegistry::new();
        let u = Quantity::new(1.0, reg.parse("V").unwrap());
        let i = Quantity::new(1.0, reg.parse("A").unwrap());
        assert!(matches!(u.try_add(&i), Err(ReduceError::UnitMismatch { .. })));
    }

    #[test]
    fn addition_converts_into_left_unit() {
        let reg = UnitRegistry::new();
        let a = Quantity::with_uncertainty(1.0, 0.3, reg.parse("V").unwrap());
        let b = Quantity::with_uncertainty(400.0, 400.0, reg.parse("mV").unwrap());
        let sum = a.try_add(&b).unwrap();
        assert_eq!(sum.unit().symbol(), "V");
        assert_relative_eq!(sum.magnitude(), 1.4, epsilon = 1e-12);
        assert_relative_eq!(sum.std_dev(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn product_propagates_partials_and_units() {
        let reg = UnitRegistry::new();
        let u = Quantity::with_uncertainty(2.0, 0.1, reg.parse("V").unwrap());
        let q = Quantity::with_uncertainty(3.0, 0.2, reg.parse("C").unwrap());
        let w = &u * &q;
        assert_eq!(w.dimension(), Dimension::ENERGY);
        assert_relative_eq!(w.magnitude(), 6.0);
        let expected = ((3.0f64 * 0.1).powi(2) + (2.0f64 * 0.2).powi(2)).sqrt();
        assert_relative_eq!(w.std_dev(), expected, epsilon = 1e-12);
    }

    #[test]
    fn quotient_of_exact_values_stays_exact() {
        let reg = UnitRegistry::new();
        let c = Quantity::new(3.0e8, reg.parse("m/s").unwrap());
        let l = Quantity::new(500.0, reg.parse("nm").unwrap());
        let nu = &c / &l;
        assert_eq!(nu.uncertainty(), None);
        let hz = nu.convert(&Unit::si(Dimension::FREQUENCY)).unwrap();
        assert_relative_eq!(hz.magnitude(), 6.0e14, max_relative = 1e-12);
    }

    #[test]
    fn conversion_rejects_incompatible_units() {
        let reg = UnitRegistry::new();
        let l = Quantity::new(1.0, reg.parse("nm").unwrap());
        assert!(l.convert(&reg.parse("eV").unwrap()).is_err());
    }

    proptest! {
        #[test]
        fn sum_uncertainty_is_quadrature(
            a in -1e3f64..1e3,
            b in -1e3f64..1e3,
            s1 in 0.0f64..10.0,
            s2 in 0.0f64..10.0,
        ) {
            let sum = volts(a, s1).try_add(&volts(b, s2)).unwrap();
            let expected = (s1 * s1 + s2 * s2).sqrt();
            prop_assert!((sum.std_dev() - expected).abs() <= f64::EPSILON * expected.max(1.0));
        }
    }
}
