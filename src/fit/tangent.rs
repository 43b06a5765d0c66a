//! Tangent-line extrapolation of a fitted response curve.
//!
//! The band-gap estimate takes the tangent of the spectral response at the
//! point where the response first becomes non-negative and extrapolates it to
//! zero.

use crate::domain::{PolynomialFit, Tangent};
use crate::error::ReduceError;
use crate::math::{brent, linspace};

/// Default absolute root tolerance, relative to the search interval width.
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 1e-6;

/// Grid resolution used to locate the curve onset.
pub const ONSET_SAMPLES: usize = 100;

/// Tangent of `fit` at `x`, using the analytic derivative.
pub fn tangent_at(fit: &PolynomialFit, x: f64) -> Tangent {
    Tangent {
        slope: fit.derivative(x),
        point_x: x,
        point_y: fit.eval(x),
    }
}

/// Zero crossing of the tangent of `fit` at `boundary_x`, searched in `interval`.
///
/// `tolerance` is an absolute tolerance on `x`; `None` uses
/// `DEFAULT_RELATIVE_TOLERANCE` times the interval width.
///
/// Fails with `NoSignChange` when the tangent does not cross zero inside the
/// interval (including a horizontal, non-zero tangent).
pub fn find_threshold(
    fit: &PolynomialFit,
    boundary_x: f64,
    interval: (f64, f64),
    tolerance: Option<f64>,
) -> Result<f64, ReduceError> {
    let (lo, hi) = interval;
    if !boundary_x.is_finite() {
        return Err(ReduceError::NonFinite("tangent boundary point".to_string()));
    }
    let tangent = tangent_at(fit, boundary_x);
    if !(tangent.slope.is_finite() && tangent.point_y.is_finite()) {
        return Err(ReduceError::NonFinite("tangent".to_string()));
    }

    let tol = tolerance.unwrap_or(DEFAULT_RELATIVE_TOLERANCE * (hi - lo).abs());
    let root = brent(|x| tangent.eval(x), lo, hi, tol)?;

    log::debug!(
        "tangent at x={boundary_x}: slope={} y={} root={root}",
        tangent.slope,
        tangent.point_y
    );
    Ok(root)
}

/// First of `samples` evenly spaced points on `[lo, hi]` where `fit` is
/// non-negative; `lo` when there is none.
pub fn curve_onset(fit: &PolynomialFit, lo: f64, hi: f64, samples: usize) -> f64 {
    linspace(lo, hi, samples)
        .into_iter()
        .find(|&x| fit.eval(x) >= 0.0)
        .unwrap_or_else(|| {
            log::warn!("fitted curve is negative on [{lo}, {hi}]; using {lo} as onset");
            lo
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    fn line(m: f64, b: f64) -> PolynomialFit {
        PolynomialFit {
            degree: 1,
            coefficients: vec![m, b],
            sse: 0.0,
            n: 2,
        }
    }

    #[test]
    fn tangent_of_parabola() {
        // y = x² - 1, tangent at x = 2: slope 4, through (2, 3)
        let fit = PolynomialFit {
            degree: 2,
            coefficients: vec![1.0, 0.0, -1.0],
            sse: 0.0,
            n: 3,
        };
        let t = tangent_at(&fit, 2.0);
        assert_eq!(t.slope, 4.0);
        assert_eq!(t.point_y, 3.0);

        let root = find_threshold(&fit, 2.0, (0.0, 2.0), None).unwrap();
        assert_abs_diff_eq!(root, 1.25, epsilon = 1e-6);
    }

    #[test]
    fn linear_threshold_is_the_line_root() {
        let root = find_threshold(&line(2.0, -3.0), 10.0, (0.0, 5.0), Some(1e-12)).unwrap();
        assert_abs_diff_eq!(root, 1.5, epsilon = 1e-10);
    }

    #[test]
    fn root_outside_interval_is_no_sign_change() {
        let err = find_threshold(&line(2.0, -3.0), 0.0, (2.0, 5.0), None).unwrap_err();
        assert!(matches!(err, ReduceError::NoSignChange { .. }));
    }

    #[test]
    fn horizontal_tangent_is_no_sign_change() {
        let err = find_threshold(&line(0.0, 1.0), 0.5, (0.0, 1.0), None).unwrap_err();
        assert!(matches!(err, ReduceError::NoSignChange { .. }));
    }

    #[test]
    fn onset_is_first_non_negative_sample() {
        // y = x - 1.5 on [1, 2]: first grid point with x >= 1.5
        let x = curve_onset(&line(1.0, -1.5), 1.0, 2.0, 11);
        assert_abs_diff_eq!(x, 1.5, epsilon = 1e-12);

        assert_eq!(curve_onset(&line(0.0, -1.0), 1.0, 2.0, 11), 1.0);
    }

    proptest! {
        #[test]
        fn linear_root_inside_interval_is_found(
            m in prop_oneof![-20.0f64..-0.1, 0.1f64..20.0],
            root in -5.0f64..5.0,
            x0 in -10.0f64..10.0,
        ) {
            let fit = line(m, -m * root);
            let found = find_threshold(&fit, x0, (-6.0, 6.0), Some(1e-12)).unwrap();
            prop_assert!((found - root).abs() <= 1e-9);
        }
    }
}
