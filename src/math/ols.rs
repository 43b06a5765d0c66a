//! Ordinary least squares.
//!
//! Every fit in this crate is a small dense problem of the form
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2
//! ```
//!
//! with at most a handful of columns (polynomial degree ≤ 3), so we solve it with
//! an SVD of the design matrix. SVD handles tall matrices directly and exposes
//! the singular values, which is how rank deficiency (degenerate abscissae) is
//! detected instead of silently returning a minimum-norm solution.

use nalgebra::{DMatrix, DVector};

/// Smallest admissible ratio `σ_min / σ_max` of the design matrix.
const MIN_RECIPROCAL_CONDITION: f64 = 1e-13;

/// Build the Vandermonde design matrix with columns `x^degree, …, x, 1`.
pub fn vandermonde(xs: &[f64], degree: usize) -> DMatrix<f64> {
    let cols = degree + 1;
    DMatrix::from_fn(xs.len(), cols, |i, j| xs[i].powi((degree - j) as i32))
}

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the design matrix is rank deficient or the solution is not
/// finite.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    if x.nrows() < x.ncols() || x.nrows() != y.len() {
        return None;
    }

    let svd = x.clone().svd(true, true);
    let sv_max = svd.singular_values.max();
    let sv_min = svd.singular_values.min();
    if !(sv_max.is_finite() && sv_max > 0.0) || sv_min / sv_max < MIN_RECIPROCAL_CONDITION {
        return None;
    }

    // Relative cut-off; any singular value surviving the check above is kept.
    let eps = sv_max * MIN_RECIPROCAL_CONDITION * 0.5;
    let beta = svd.solve(y, eps).ok()?;
    beta.iter().all(|v| v.is_finite()).then_some(beta)
}

/// Sum of squared residuals `Σ (y - Xβ)^2`.
pub fn residual_sum_of_squares(x: &DMatrix<f64>, y: &DVector<f64>, beta: &DVector<f64>) -> f64 {
    (y - x * beta).norm_squared()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
        assert!(residual_sum_of_squares(&x, &y, &beta) < 1e-20);
    }

    #[test]
    fn vandermonde_orders_highest_power_first() {
        let v = vandermonde(&[2.0, 3.0], 2);
        assert_eq!(v.row(0).iter().copied().collect::<Vec<_>>(), vec![4.0, 2.0, 1.0]);
        assert_eq!(v.row(1).iter().copied().collect::<Vec<_>>(), vec![9.0, 3.0, 1.0]);
    }

    #[test]
    fn rank_deficient_design_is_rejected() {
        // All abscissae identical: the two columns are collinear.
        let x = vandermonde(&[1.5, 1.5, 1.5], 1);
        let y = DVector::from_row_slice(&[1.0, 2.0, 3.0]);
        assert!(solve_least_squares(&x, &y).is_none());
    }
}
