//! Shared domain types.
//!
//! Measurement data is immutable once ingested: transforms (unit conversion,
//! row averaging, element-wise maps) always produce a new series.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ReduceError;
use crate::math::{polyder, polyval};
use crate::quantity::{Quantity, Unit};

/// One measurement channel: ordered raw values sharing a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementSeries {
    name: String,
    unit: Unit,
    values: Vec<f64>,
}

impl MeasurementSeries {
    pub fn new(name: impl Into<String>, unit: Unit, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            unit,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The same measurements expressed in `target`.
    pub fn to_unit(&self, target: &Unit) -> Result<MeasurementSeries, ReduceError> {
        if !self.unit.is_compatible(target) {
            return Err(ReduceError::UnitMismatch {
                context: format!("series `{}`", self.name),
                expected: target.dimension().to_string(),
                actual: format!("{} ({})", self.unit, self.unit.dimension()),
            });
        }
        let factor = self.unit.scale() / target.scale();
        Ok(MeasurementSeries {
            name: self.name.clone(),
            unit: target.clone(),
            values: self.values.iter().map(|v| v * factor).collect(),
        })
    }

    /// Element-wise transform into a new series.
    pub fn map(&self, name: impl Into<String>, unit: Unit, f: impl Fn(f64) -> f64) -> MeasurementSeries {
        MeasurementSeries {
            name: name.into(),
            unit,
            values: self.values.iter().map(|&v| f(v)).collect(),
        }
    }

    /// The `i`-th measurement as a dimensioned quantity.
    pub fn quantity(&self, i: usize) -> Option<Quantity> {
        self.values.get(i).map(|&v| Quantity::new(v, self.unit.clone()))
    }
}

/// All channels of one measurement file.
#[derive(Debug, Clone)]
pub struct MeasurementTable {
    pub source: PathBuf,
    channels: Vec<MeasurementSeries>,
}

impl MeasurementTable {
    pub fn new(source: PathBuf, channels: Vec<MeasurementSeries>) -> Self {
        Self { source, channels }
    }

    pub fn channels(&self) -> &[MeasurementSeries] {
        &self.channels
    }

    /// Look up a channel by name (case-insensitive).
    pub fn get(&self, name: &str) -> Result<&MeasurementSeries, ReduceError> {
        self.channels
            .iter()
            .find(|c| same_channel(&c.name, name))
            .ok_or_else(|| ReduceError::MissingChannel(format!("{name} in {}", self.source.display())))
    }

    /// Row-wise mean of repeated channels, expressed in the first channel's unit.
    pub fn row_mean(&self, name: &str, channels: &[&str]) -> Result<MeasurementSeries, ReduceError> {
        let Some((&first, rest)) = channels.split_first() else {
            return Err(ReduceError::MissingChannel(name.to_string()));
        };
        let first = self.get(first)?;
        let unit = first.unit().clone();

        let mut columns = vec![first.clone()];
        for &c in rest {
            columns.push(self.get(c)?.to_unit(&unit)?);
        }

        let rows = columns.iter().map(MeasurementSeries::len).min().unwrap_or(0);
        let k = columns.len() as f64;
        let values = (0..rows)
            .map(|i| columns.iter().map(|c| c.values[i]).sum::<f64>() / k)
            .collect();
        Ok(MeasurementSeries::new(name, unit, values))
    }
}

/// Channel names compare case-insensitively, Cyrillic included.
pub fn same_channel(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Combined statistical + instrumental uncertainty of a repeated measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceEstimate {
    pub mean: f64,
    pub statistical_error: f64,
    pub instrumental_error: f64,
    pub total_error: f64,
    pub confidence_level: f64,
    pub sample_size: usize,
    /// Two-sided Student's t factor used for the statistical error.
    pub t_factor: f64,
    pub unit: Unit,
}

impl ConfidenceEstimate {
    /// `mean ± total_error` as a dimensioned quantity.
    pub fn to_quantity(&self) -> Quantity {
        Quantity::with_uncertainty(self.mean, self.total_error, self.unit.clone())
    }
}

/// Least-squares polynomial, coefficients from the highest power down.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolynomialFit {
    pub degree: usize,
    pub coefficients: Vec<f64>,
    /// Sum of squared residuals over the fitted points.
    pub sse: f64,
    /// Number of points the fit used.
    pub n: usize,
}

impl PolynomialFit {
    pub fn eval(&self, x: f64) -> f64 {
        polyval(&self.coefficients, x)
    }

    /// Analytic first derivative at `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        polyval(&polyder(&self.coefficients), x)
    }

    /// Coefficient of `x^power` (0 if beyond the degree).
    pub fn coefficient(&self, power: usize) -> f64 {
        if power > self.degree {
            return 0.0;
        }
        self.coefficients[self.degree - power]
    }

    pub fn rmse(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        (self.sse / self.n as f64).sqrt()
    }
}

/// Tangent line of a fitted curve at one point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tangent {
    pub slope: f64,
    pub point_x: f64,
    pub point_y: f64,
}

impl Tangent {
    pub fn eval(&self, x: f64) -> f64 {
        self.slope * (x - self.point_x) + self.point_y
    }
}

/// Outcome of the external-effect reduction.
#[derive(Debug, Clone, Serialize)]
pub struct ExternalResults {
    pub stopping_voltage: ConfidenceEstimate,
    pub wavelength: Quantity,
    /// Photon frequency in Hz.
    pub frequency: Quantity,
    /// Photon energy in eV.
    pub photon_energy: Quantity,
    /// Work function in eV.
    pub work_function: Quantity,
}

/// A linear fit of mean photocurrent against a transformed abscissa.
#[derive(Debug, Clone, Serialize)]
pub struct LinearResponse {
    pub points: Vec<(f64, f64)>,
    pub fit: PolynomialFit,
}

impl LinearResponse {
    pub fn slope(&self) -> f64 {
        self.fit.coefficient(1)
    }

    pub fn intercept(&self) -> f64 {
        self.fit.coefficient(0)
    }
}

/// Spectral response curve and its band-gap extrapolation.
#[derive(Debug, Clone, Serialize)]
pub struct SpectralResponse {
    /// `(photon energy [eV], normalised photocurrent)` pairs.
    pub points: Vec<(f64, f64)>,
    pub fit: PolynomialFit,
    pub tangent: Tangent,
    /// Band-gap energy in eV.
    pub band_gap: f64,
}

/// Outcome of the internal-effect reduction; each branch may fail on its own.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InternalResults {
    pub angle: Option<LinearResponse>,
    pub distance: Option<LinearResponse>,
    pub spectral: Option<SpectralResponse>,
    /// Human-readable branch failures, in branch order.
    pub failures: Vec<String>,
}

/// Language of the text reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    /// English labels, decimal point.
    #[default]
    En,
    /// Russian labels, decimal comma.
    Ru,
}

/// Configuration of the external-effect (stopping voltage) run.
#[derive(Debug, Clone)]
pub struct ExternalConfig {
    pub measurements: PathBuf,
    pub voltage_channel: String,
    /// Light wavelength.
    pub wavelength: Quantity,
    /// Voltmeter resolution.
    pub instrumental_error: Quantity,
    pub confidence_level: f64,
    pub report: PathBuf,
    pub export_json: Option<PathBuf>,
    pub lang: Lang,
}

/// Configuration of the internal-effect (photoresistor) run.
#[derive(Debug, Clone)]
pub struct InternalConfig {
    pub angle_file: PathBuf,
    pub distance_file: PathBuf,
    pub spectra_file: PathBuf,
    /// Repeated photocurrent columns averaged per row.
    pub current_channels: Vec<String>,
    pub figures_dir: PathBuf,
    pub report: PathBuf,
    pub export_json: Option<PathBuf>,
    pub lang: Lang,
    /// Print ASCII previews of the figures to stdout.
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    /// Absolute tolerance of the band-gap root search, as a fraction of the interval width.
    pub root_tolerance: f64,
}
