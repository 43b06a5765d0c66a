//! Closed-form physical relations with first-order uncertainty propagation.
//!
//! Every relation is evaluated in coherent SI units. For inputs `x_i` with
//! independent uncertainties `σ_i` the result uncertainty is
//!
//! ```text
//! σ_f = √(Σ (∂f/∂x_i · σ_i)²)
//! ```
//!
//! with the partial derivatives written out analytically per relation.

use crate::error::ReduceError;
use crate::quantity::{Dimension, PhysicalConstants, Quantity};

/// Supported relations.
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    /// `Σ c_i · x_i`; all operands share one dimension.
    LinearCombination(Vec<f64>),
    /// `Π x_i`.
    Product,
    /// `x_0 / x_1`.
    Quotient,
    /// Photon frequency `ν = c / λ`; operand: wavelength.
    PhotonFrequency,
    /// Photon energy `E = h·c / λ`; operand: wavelength.
    PhotonEnergy,
    /// Work function `A = h·ν − e·U`; operands: frequency, stopping voltage.
    WorkFunction,
}

impl Formula {
    pub fn name(&self) -> &'static str {
        match self {
            Formula::LinearCombination(_) => "linear combination",
            Formula::Product => "product",
            Formula::Quotient => "quotient",
            Formula::PhotonFrequency => "photon frequency",
            Formula::PhotonEnergy => "photon energy",
            Formula::WorkFunction => "work function",
        }
    }
}

/// Value and gradient of a relation at the operands' SI values.
struct Evaluation {
    value: f64,
    gradient: Vec<f64>,
    dimension: Dimension,
}

/// Applies `Formula`s using a shared, read-only constants table.
#[derive(Debug, Clone, Copy)]
pub struct QuantityPropagator<'a> {
    constants: &'a PhysicalConstants,
}

impl<'a> QuantityPropagator<'a> {
    pub fn new(constants: &'a PhysicalConstants) -> Self {
        Self { constants }
    }

    /// Evaluate `formula` on `operands`; the result is in coherent SI units.
    pub fn propagate(&self, formula: &Formula, operands: &[Quantity]) -> Result<Quantity, ReduceError> {
        let x: Vec<f64> = operands.iter().map(Quantity::si_value).collect();
        let eval = self.evaluate(formula, operands, &x)?;

        let uncertainty = if operands.iter().all(|q| q.uncertainty().is_none()) {
            None
        } else {
            let var: f64 = eval
                .gradient
                .iter()
                .zip(operands)
                .map(|(g, q)| (g * q.si_uncertainty().unwrap_or(0.0)).powi(2))
                .sum();
            Some(var.sqrt())
        };

        let out = Quantity::from_si(eval.value, uncertainty, eval.dimension);
        if !out.is_finite() {
            return Err(ReduceError::NonFinite(formula.name().to_string()));
        }
        Ok(out)
    }

    fn evaluate(&self, formula: &Formula, q: &[Quantity], x: &[f64]) -> Result<Evaluation, ReduceError> {
        let h = self.constants.planck().si_value();
        let c = self.constants.speed_of_light().si_value();
        let e = self.constants.electron_charge().si_value();

        match formula {
            Formula::LinearCombination(coeffs) => {
                expect_operands(formula, q, coeffs.len())?;
                let Some(first) = q.first() else {
                    return Err(ReduceError::OperandCount {
                        formula: formula.name(),
                        expected: 1,
                        actual: 0,
                    });
                };
                let dimension = first.dimension();
                for op in q {
                    op.require_dimension(dimension, formula.name())?;
                }
                Ok(Evaluation {
                    value: coeffs.iter().zip(x).map(|(c, x)| c * x).sum(),
                    gradient: coeffs.clone(),
                    dimension,
                })
            }
            Formula::Product => {
                if q.is_empty() {
                    return Err(ReduceError::OperandCount {
                        formula: formula.name(),
                        expected: 1,
                        actual: 0,
                    });
                }
                // ∂/∂x_i Π x_j = Π_{j≠i} x_j
                let gradient = (0..x.len())
                    .map(|i| {
                        x.iter()
                            .enumerate()
                            .filter(|&(j, _)| j != i)
                            .map(|(_, v)| v)
                            .product()
                    })
                    .collect();
                Ok(Evaluation {
                    value: x.iter().product(),
                    gradient,
                    dimension: q
                        .iter()
                        .fold(Dimension::DIMENSIONLESS, |d, op| d * op.dimension()),
                })
            }
            Formula::Quotient => {
                expect_operands(formula, q, 2)?;
                let (a, b) = (x[0], x[1]);
                Ok(Evaluation {
                    value: a / b,
                    gradient: vec![1.0 / b, -a / (b * b)],
                    dimension: q[0].dimension() / q[1].dimension(),
                })
            }
            Formula::PhotonFrequency => {
                expect_operands(formula, q, 1)?;
                q[0].require_dimension(Dimension::LENGTH, "photon frequency (wavelength)")?;
                let l = x[0];
                Ok(Evaluation {
                    value: c / l,
                    gradient: vec![-c / (l * l)],
                    dimension: Dimension::FREQUENCY,
                })
            }
            Formula::PhotonEnergy => {
                expect_operands(formula, q, 1)?;
                q[0].require_dimension(Dimension::LENGTH, "photon energy (wavelength)")?;
                let l = x[0];
                Ok(Evaluation {
                    value: h * c / l,
                    gradient: vec![-h * c / (l * l)],
                    dimension: Dimension::ENERGY,
                })
            }
            Formula::WorkFunction => {
                expect_operands(formula, q, 2)?;
                q[0].require_dimension(Dimension::FREQUENCY, "work function (frequency)")?;
                q[1].require_dimension(Dimension::VOLTAGE, "work function (stopping voltage)")?;
                let (nu, u) = (x[0], x[1]);
                Ok(Evaluation {
                    value: h * nu - e * u,
                    gradient: vec![h, -e],
                    dimension: Dimension::ENERGY,
                })
            }
        }
    }
}

fn expect_operands(formula: &Formula, operands: &[Quantity], expected: usize) -> Result<(), ReduceError> {
    if operands.len() == expected {
        Ok(())
    } else {
        Err(ReduceError::OperandCount {
            formula: formula.name(),
            expected,
            actual: operands.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::{ELEMENTARY_CHARGE, PLANCK, SPEED_OF_LIGHT, Unit, UnitRegistry};
    use approx::assert_relative_eq;

    fn setup() -> (UnitRegistry, PhysicalConstants) {
        (UnitRegistry::new(), PhysicalConstants::new())
    }

    #[test]
    fn photon_energy_at_435nm() {
        let (reg, k) = setup();
        let p = QuantityPropagator::new(&k);
        let l = Quantity::new(435.0, reg.parse("nm").unwrap());

        let e = p.propagate(&Formula::PhotonEnergy, &[l.clone()]).unwrap();
        assert_eq!(e.dimension(), Dimension::ENERGY);
        assert_eq!(e.uncertainty(), None);
        let ev = e.convert(&reg.parse("eV").unwrap()).unwrap();
        assert_relative_eq!(ev.magnitude(), 1_239.841_984 / 435.0, max_relative = 1e-9);

        let nu = p.propagate(&Formula::PhotonFrequency, &[l]).unwrap();
        assert_relative_eq!(nu.magnitude(), SPEED_OF_LIGHT / 435e-9, max_relative = 1e-12);
    }

    #[test]
    fn work_function_uses_signed_electron_charge() {
        let (reg, k) = setup();
        let p = QuantityPropagator::new(&k);
        let nu = Quantity::new(6.0e14, Unit::si(Dimension::FREQUENCY));
        let u = Quantity::with_uncertainty(-1.2, 0.1, reg.parse("V").unwrap());

        let a = p.propagate(&Formula::WorkFunction, &[nu, u]).unwrap();
        let expected = PLANCK * 6.0e14 - ELEMENTARY_CHARGE * 1.2;
        assert_relative_eq!(a.magnitude(), expected, max_relative = 1e-12);
        // σ_A = |e|·σ_U; in eV that is σ_U in volts.
        let ev = a.convert(&reg.parse("eV").unwrap()).unwrap();
        assert_relative_eq!(ev.std_dev(), 0.1, max_relative = 1e-12);
    }

    #[test]
    fn work_function_rejects_wrong_dimensions() {
        let (reg, k) = setup();
        let p = QuantityPropagator::new(&k);
        let l = Quantity::new(435.0, reg.parse("nm").unwrap());
        let u = Quantity::new(1.2, reg.parse("V").unwrap());
        let err = p.propagate(&Formula::WorkFunction, &[l, u]).unwrap_err();
        assert!(matches!(err, ReduceError::UnitMismatch { .. }));
    }

    #[test]
    fn linear_combination_is_quadrature_sum() {
        let (reg, k) = setup();
        let p = QuantityPropagator::new(&k);
        let v = reg.parse("V").unwrap();
        let a = Quantity::with_uncertainty(5.0, 0.3, v.clone());
        let b = Quantity::with_uncertainty(2.0, 0.4, v);

        let diff = p
            .propagate(&Formula::LinearCombination(vec![1.0, -1.0]), &[a, b])
            .unwrap();
        assert_relative_eq!(diff.magnitude(), 3.0);
        assert_relative_eq!(diff.std_dev(), 0.5, max_relative = 1e-12);
    }

    #[test]
    fn linear_combination_requires_one_dimension() {
        let (reg, k) = setup();
        let p = QuantityPropagator::new(&k);
        let a = Quantity::new(1.0, reg.parse("V").unwrap());
        let b = Quantity::new(1.0, reg.parse("A").unwrap());
        assert!(matches!(
            p.propagate(&Formula::LinearCombination(vec![1.0, 1.0]), &[a, b]),
            Err(ReduceError::UnitMismatch { .. })
        ));
    }

    #[test]
    fn product_and_quotient_combine_dimensions() {
        let (reg, k) = setup();
        let p = QuantityPropagator::new(&k);
        let u = Quantity::with_uncertainty(2.0, 0.1, reg.parse("V").unwrap());
        let i = Quantity::with_uncertainty(3.0, 0.2, reg.parse("A").unwrap());

        let w = p.propagate(&Formula::Product, &[u.clone(), i.clone()]).unwrap();
        assert_eq!(w.dimension(), Dimension::POWER);
        assert_relative_eq!(w.magnitude(), 6.0);
        assert_relative_eq!(w.std_dev(), (0.09f64 + 0.16).sqrt(), max_relative = 1e-12);

        let r = p.propagate(&Formula::Quotient, &[u, i]).unwrap();
        assert_eq!(r.dimension(), Dimension::VOLTAGE / Dimension::CURRENT);
        let expected = ((0.1f64 / 3.0).powi(2) + (2.0 * 0.2 / 9.0f64).powi(2)).sqrt();
        assert_relative_eq!(r.std_dev(), expected, max_relative = 1e-12);
    }

    #[test]
    fn wrong_operand_count_is_reported() {
        let (_, k) = setup();
        let p = QuantityPropagator::new(&k);
        assert!(matches!(
            p.propagate(&Formula::PhotonEnergy, &[]),
            Err(ReduceError::OperandCount { expected: 1, actual: 0, .. })
        ));
    }
}
