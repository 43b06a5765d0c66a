//! Polynomial evaluation.
//!
//! Coefficients are ordered from the highest power down to the constant term,
//! e.g. `[2, 1]` is `2x + 1`.

/// Evaluate a polynomial with Horner's scheme.
pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * x + c)
}

/// Coefficients of the analytic first derivative.
///
/// The derivative of a constant is the zero polynomial `[0]`.
pub fn polyder(coeffs: &[f64]) -> Vec<f64> {
    let degree = coeffs.len().saturating_sub(1);
    if degree == 0 {
        return vec![0.0];
    }
    coeffs[..degree]
        .iter()
        .enumerate()
        .map(|(i, &c)| c * (degree - i) as f64)
        .collect()
}

/// Sample `n ≥ 2` evenly spaced points on `[lo, hi]` (inclusive).
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            lo + u * (hi - lo)
        })
        .collect()
}
