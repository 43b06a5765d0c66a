//! Bracketed scalar root finding.
//!
//! The bracket is validated here so callers get typed errors; the iteration
//! itself is argmin's `BrentRoot`.

use argmin::core::{CostFunction, Executor, State};
use argmin::solver::brent::BrentRoot;

use crate::error::ReduceError;

const MAX_ITERS: u64 = 200;

/// Adapts a scalar closure to argmin's problem interface.
struct ScalarFn<F>(F);

impl<F: Fn(f64) -> f64> CostFunction for ScalarFn<F> {
    type Param = f64;
    type Output = f64;

    fn cost(&self, x: &f64) -> Result<f64, argmin::core::Error> {
        Ok((self.0)(*x))
    }
}

/// Find `x ∈ [lo, hi]` with `f(x) = 0` to absolute tolerance `tol`.
///
/// Errors:
/// - `InvalidInterval` if the bounds are not finite or `lo >= hi`
/// - `NonFinite` if `f` is not finite at a bound, or the solver produces no finite root
/// - `NoSignChange` if `f(lo)` and `f(hi)` have the same strict sign
///
/// A bound where `f` is exactly zero is returned as the root.
pub fn brent(f: impl Fn(f64) -> f64, lo: f64, hi: f64, tol: f64) -> Result<f64, ReduceError> {
    if !(lo.is_finite() && hi.is_finite()) || lo >= hi {
        return Err(ReduceError::InvalidInterval { lo, hi });
    }
    let tol = tol.abs().max(f64::EPSILON * (hi - lo));

    let (f_lo, f_hi) = (f(lo), f(hi));
    if !(f_lo.is_finite() && f_hi.is_finite()) {
        return Err(ReduceError::NonFinite("root bracket evaluation".to_string()));
    }
    if f_lo == 0.0 {
        return Ok(lo);
    }
    if f_hi == 0.0 {
        return Ok(hi);
    }
    if f_lo.signum() == f_hi.signum() {
        return Err(ReduceError::NoSignChange { lo, hi, f_lo, f_hi });
    }

    let res = Executor::new(ScalarFn(f), BrentRoot::new(lo, hi, tol))
        .configure(|state| state.max_iters(MAX_ITERS))
        .run()
        .map_err(|e| ReduceError::NonFinite(format!("root search on [{lo}, {hi}]: {e}")))?;

    let state = res.state();
    if state.get_iter() >= MAX_ITERS {
        log::warn!("brent: iteration limit reached on [{lo}, {hi}], returning best estimate");
    }
    state
        .get_best_param()
        .or_else(|| state.get_param())
        .copied()
        .filter(|x| x.is_finite())
        .ok_or_else(|| ReduceError::NonFinite(format!("root search on [{lo}, {hi}]")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_root_of_linear_function() {
        let root = brent(|x| 2.0 * x - 3.0, 0.0, 4.0, 1e-12).unwrap();
        assert!((root - 1.5).abs() < 1e-12, "root = {root}");
    }

    #[test]
    fn finds_root_of_cubic() {
        let root = brent(|x| x * x * x - 2.0 * x - 5.0, 2.0, 3.0, 1e-12).unwrap();
        assert!((root - 2.094_551_481_542_326_5).abs() < 1e-10, "root = {root}");
    }

    #[test]
    fn zero_at_bound_is_a_root() {
        assert_eq!(brent(|x| x - 1.0, 1.0, 2.0, 1e-9).unwrap(), 1.0);
    }

    #[test]
    fn same_sign_bounds_are_rejected() {
        let err = brent(|x| x * x + 1.0, -1.0, 1.0, 1e-9).unwrap_err();
        assert!(matches!(err, ReduceError::NoSignChange { .. }));
    }

    #[test]
    fn reversed_interval_is_rejected() {
        let err = brent(|x| x, 1.0, -1.0, 1e-9).unwrap_err();
        assert_eq!(err, ReduceError::InvalidInterval { lo: 1.0, hi: -1.0 });
    }
}
