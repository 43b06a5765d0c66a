//! Descriptive statistics and Student's t critical values.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::ReduceError;

/// Arithmetic mean; `None` for an empty slice.
///
/// Accumulates offsets from the first value, so a constant series yields that
/// constant exactly.
pub fn mean(values: &[f64]) -> Option<f64> {
    let &shift = values.first()?;
    let offset = values.iter().map(|v| v - shift).sum::<f64>() / values.len() as f64;
    Some(shift + offset)
}

/// Sample standard deviation with Bessel's correction (divisor `n - 1`).
///
/// `None` for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Two-sided critical value `t` such that `P(|T| ≤ t) = confidence` for `df` degrees of freedom.
pub fn t_critical(confidence: f64, df: f64) -> Result<f64, ReduceError> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(ReduceError::InvalidConfidenceLevel(confidence));
    }
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| ReduceError::NonFinite(format!("t distribution with {df} degrees of freedom: {e}")))?;
    let t = dist.inverse_cdf(0.5 * (1.0 + confidence));
    if !t.is_finite() {
        return Err(ReduceError::NonFinite(format!(
            "t quantile for confidence {confidence}, df = {df}"
        )));
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn mean_and_bessel_std() {
        let v = [1.20, 1.22, 1.18, 1.21];
        assert_abs_diff_eq!(mean(&v).unwrap(), 1.2025, epsilon = 1e-12);
        // Σ(v - m)² = 8.75e-4, divided by n - 1 = 3.
        assert_abs_diff_eq!(sample_std_dev(&v).unwrap(), (8.75e-4f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_eq!(sample_std_dev(&[1.0]), None);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn critical_values_match_tables() {
        assert_abs_diff_eq!(t_critical(0.95, 3.0).unwrap(), 3.182_446_305_284_263, epsilon = 1e-6);
        assert_abs_diff_eq!(t_critical(0.95, 10.0).unwrap(), 2.228_138_851_986_274, epsilon = 1e-6);
        assert_abs_diff_eq!(t_critical(0.99, 1.0).unwrap(), 63.656_741_162_871_58, epsilon = 1e-4);
        assert_abs_diff_eq!(t_critical(0.90, 30.0).unwrap(), 1.697_260_886_593_05, epsilon = 1e-6);
    }

    #[test]
    fn one_degree_of_freedom_is_cauchy() {
        // P(|T| ≤ t) = (2/π)·atan(t), so t = tan(π·c/2).
        for c in [0.5, 0.8, 0.95] {
            let expected = (std::f64::consts::FRAC_PI_2 * c).tan();
            assert_abs_diff_eq!(t_critical(c, 1.0).unwrap(), expected, epsilon = 1e-6 * expected);
        }
    }

    #[test]
    fn invalid_confidence_is_rejected() {
        assert!(t_critical(1.0, 3.0).is_err());
        assert!(t_critical(0.0, 3.0).is_err());
        assert!(t_critical(f64::NAN, 3.0).is_err());
    }

    #[test]
    fn invalid_degrees_of_freedom_are_rejected() {
        assert!(matches!(t_critical(0.95, 0.0), Err(ReduceError::NonFinite(_))));
        assert!(matches!(t_critical(0.95, -1.0), Err(ReduceError::NonFinite(_))));
    }
}
