//! Combined uncertainty of a repeated measurement.
//!
//! ```text
//! statistical = t(P, n-1) · s / √n        (s: Bessel-corrected std dev)
//! total       = √(statistical² + instrumental²)
//! ```
//!
//! `t(P, ν)` is the two-sided Student's t critical value for confidence `P`.

use crate::domain::{ConfidenceEstimate, MeasurementSeries};
use crate::error::ReduceError;
use crate::math::{mean, sample_std_dev, t_critical};

/// Estimate mean and combined uncertainty of `series`.
///
/// `instrumental_error` is expressed in the series unit.
pub fn estimate(
    series: &MeasurementSeries,
    instrumental_error: f64,
    confidence_level: f64,
) -> Result<ConfidenceEstimate, ReduceError> {
    let n = series.len();
    if n < 2 {
        return Err(ReduceError::InsufficientData {
            series: series.name().to_string(),
            n,
        });
    }
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(ReduceError::InvalidConfidenceLevel(confidence_level));
    }
    if !instrumental_error.is_finite() {
        return Err(ReduceError::NonFinite(format!(
            "instrumental error of `{}`",
            series.name()
        )));
    }
    if series.values().iter().any(|v| !v.is_finite()) {
        return Err(ReduceError::NonFinite(format!("series `{}`", series.name())));
    }

    let values = series.values();
    let m = mean(values).ok_or_else(|| ReduceError::InsufficientData {
        series: series.name().to_string(),
        n,
    })?;
    let s = sample_std_dev(values).ok_or_else(|| ReduceError::InsufficientData {
        series: series.name().to_string(),
        n,
    })?;

    let t = t_critical(confidence_level, (n - 1) as f64)?;
    let statistical_error = t * s / (n as f64).sqrt();
    let instrumental_error = instrumental_error.abs();
    let total_error = statistical_error.hypot(instrumental_error);

    log::debug!(
        "estimate `{}`: n={n} mean={m} s={s} t={t} stat={statistical_error} total={total_error}",
        series.name()
    );

    Ok(ConfidenceEstimate {
        mean: m,
        statistical_error,
        instrumental_error,
        total_error,
        confidence_level,
        sample_size: n,
        t_factor: t,
        unit: series.unit().clone(),
    })
}
