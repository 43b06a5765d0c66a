//! Unweighted least-squares polynomial fit.

use nalgebra::DVector;

use crate::domain::PolynomialFit;
use crate::error::ReduceError;
use crate::math::{residual_sum_of_squares, solve_least_squares, vandermonde};

/// Fit a polynomial of `degree` to `points` by ordinary least squares.
///
/// Errors:
/// - `UnderdeterminedFit` if there are not more points than `degree`
/// - `NonFinite` if any coordinate is NaN or infinite
/// - `IllConditionedFit` if the abscissae cannot determine the coefficients
///   (fewer than `degree + 1` distinct `x`, or a numerically singular design)
pub fn fit_polynomial(points: &[(f64, f64)], degree: usize) -> Result<PolynomialFit, ReduceError> {
    let n = points.len();
    if n <= degree {
        return Err(ReduceError::UnderdeterminedFit { points: n, degree });
    }
    if points.iter().any(|(x, y)| !(x.is_finite() && y.is_finite())) {
        return Err(ReduceError::NonFinite("fit points".to_string()));
    }

    let distinct = distinct_count(points.iter().map(|p| p.0));
    if distinct < degree + 1 {
        return Err(ReduceError::IllConditionedFit {
            reason: format!("{distinct} distinct x value(s) for a degree-{degree} polynomial"),
        });
    }

    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let x = vandermonde(&xs, degree);
    let y = DVector::from_iterator(n, points.iter().map(|p| p.1));

    let beta = solve_least_squares(&x, &y).ok_or_else(|| ReduceError::IllConditionedFit {
        reason: format!("singular design matrix for degree {degree} over {n} points"),
    })?;
    let sse = residual_sum_of_squares(&x, &y, &beta);

    log::debug!("fit degree {degree} over {n} points: coefficients={beta:?} sse={sse:e}");

    Ok(PolynomialFit {
        degree,
        coefficients: beta.iter().copied().collect(),
        sse,
        n,
    })
}

fn distinct_count(xs: impl Iterator<Item = f64>) -> usize {
    let mut xs: Vec<f64> = xs.collect();
    xs.sort_by(f64::total_cmp);
    xs.dedup();
    xs.len()
}
