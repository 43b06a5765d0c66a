//! The two reduction pipelines.
//!
//! - external effect: voltage series -> confidence estimate -> photon frequency,
//!   photon energy and work function
//! - internal effect: three independent branches (angle, distance, spectral),
//!   each of which may fail without stopping the others
//!
//! Both pipelines only read the shared `UnitRegistry` / `PhysicalConstants`,
//! so separate runs can execute in parallel.

use std::path::PathBuf;

use crate::domain::{
    ExternalConfig, ExternalResults, InternalConfig, InternalResults, LinearResponse, MeasurementSeries,
    MeasurementTable, SpectralResponse,
};
use crate::error::{ReduceError, Stage, StageError};
use crate::fit::{ONSET_SAMPLES, curve_onset, find_threshold, fit_polynomial, tangent_at};
use crate::io::{load_measurements, write_results_json};
use crate::plot::{Figure, save_figure};
use crate::propagate::{Formula, QuantityPropagator};
use crate::quantity::{PhysicalConstants, Quantity, Unit, UnitRegistry};
use crate::report::{format_external_report, format_internal_report, write_report};
use crate::uncertainty::estimate;

pub const EXTERNAL_REPORT: &str = "results-external-photoeffect.txt";
pub const INTERNAL_REPORT: &str = "results-inner-photoeffect.txt";
pub const EXTERNAL_JSON: &str = "results-external-photoeffect.json";
pub const INTERNAL_JSON: &str = "results-inner-photoeffect.json";

const EXTERNAL: &str = "external";
const ANGLE: &str = "internal/angle";
const DISTANCE: &str = "internal/distance";
const SPECTRAL: &str = "internal/spectral";

/// Row-aligned `(x, y)` pairs of two series.
fn paired(x: &MeasurementSeries, y: &MeasurementSeries) -> Vec<(f64, f64)> {
    x.values().iter().copied().zip(y.values().iter().copied()).collect()
}

fn at(branch: &'static str, stage: Stage) -> impl Fn(ReduceError) -> StageError {
    move |e| StageError::new(branch, stage, e)
}

/// Outputs of an external-effect run.
#[derive(Debug, Clone)]
pub struct ExternalRun {
    pub results: ExternalResults,
    pub report: String,
}

/// Stopping voltage → work function.
#[derive(Debug, Clone, Copy)]
pub struct ExternalEffectPipeline<'a> {
    registry: &'a UnitRegistry,
    constants: &'a PhysicalConstants,
}

impl<'a> ExternalEffectPipeline<'a> {
    pub fn new(registry: &'a UnitRegistry, constants: &'a PhysicalConstants) -> Self {
        Self { registry, constants }
    }

    /// Load, reduce, and write the report (plus optional JSON).
    pub fn run(&self, config: &ExternalConfig) -> Result<ExternalRun, StageError> {
        log::info!("[{EXTERNAL}] reading {}", config.measurements.display());
        let ingested = load_measurements(&config.measurements, self.registry).map_err(at(EXTERNAL, Stage::Ingest))?;
        let series = ingested
            .table
            .get(&config.voltage_channel)
            .map_err(at(EXTERNAL, Stage::Ingest))?;

        let results = self.reduce(series, config)?;
        let report = format_external_report(&results, config.lang);

        write_report(&config.report, &report).map_err(at(EXTERNAL, Stage::Render))?;
        if let Some(path) = &config.export_json {
            write_results_json(path, EXTERNAL, &results).map_err(at(EXTERNAL, Stage::Render))?;
        }
        Ok(ExternalRun { results, report })
    }

    /// The numeric part of the run: no file access.
    pub fn reduce(&self, series: &MeasurementSeries, config: &ExternalConfig) -> Result<ExternalResults, StageError> {
        let volt = self.unit("V")?;
        let series = series.to_unit(&volt).map_err(at(EXTERNAL, Stage::Estimate))?;
        let instrumental = config
            .instrumental_error
            .convert(&volt)
            .map_err(at(EXTERNAL, Stage::Estimate))?;

        let est = estimate(&series, instrumental.magnitude(), config.confidence_level)
            .map_err(at(EXTERNAL, Stage::Estimate))?;
        log::info!(
            "[{EXTERNAL}] U = {} ± {} V (n = {}, t = {:.4})",
            est.mean,
            est.total_error,
            est.sample_size,
            est.t_factor
        );
        if est.mean > 0.0 {
            log::warn!(
                "[{EXTERNAL}] mean stopping voltage is positive ({} V); A = h·ν − e·U assumes the recorded sign",
                est.mean
            );
        }

        let propagator = QuantityPropagator::new(self.constants);
        let propagate = |formula: Formula, operands: &[Quantity]| {
            propagator
                .propagate(&formula, operands)
                .map_err(at(EXTERNAL, Stage::Propagate))
        };
        let wavelength = config.wavelength.clone();
        let frequency = propagate(Formula::PhotonFrequency, &[wavelength.clone()])?;
        let photon_energy = propagate(Formula::PhotonEnergy, &[wavelength.clone()])?;
        let work_function = propagate(Formula::WorkFunction, &[frequency.clone(), est.to_quantity()])?;

        let hz = self.unit("Hz")?;
        let ev = self.unit("eV")?;
        let convert = |q: &Quantity, unit: &Unit| q.convert(unit).map_err(at(EXTERNAL, Stage::Propagate));

        Ok(ExternalResults {
            frequency: convert(&frequency, &hz)?,
            photon_energy: convert(&photon_energy, &ev)?,
            work_function: convert(&work_function, &ev)?,
            stopping_voltage: est,
            wavelength,
        })
    }

    fn unit(&self, symbol: &str) -> Result<Unit, StageError> {
        self.registry.parse(symbol).map_err(at(EXTERNAL, Stage::Propagate))
    }
}

/// Outputs of an internal-effect run: whatever succeeded, plus what failed.
#[derive(Debug, Clone)]
pub struct InternalRun {
    pub results: InternalResults,
    pub figures: Vec<Figure>,
    pub saved: Vec<PathBuf>,
    pub report: String,
    pub errors: Vec<StageError>,
}

/// Photoresistor dependences and band gap.
#[derive(Debug, Clone, Copy)]
pub struct InternalEffectPipeline<'a> {
    registry: &'a UnitRegistry,
    constants: &'a PhysicalConstants,
}

impl<'a> InternalEffectPipeline<'a> {
    pub fn new(registry: &'a UnitRegistry, constants: &'a PhysicalConstants) -> Self {
        Self { registry, constants }
    }

    /// Run all three branches; a failing branch is recorded and the rest continue.
    pub fn run(&self, config: &InternalConfig) -> InternalRun {
        let mut results = InternalResults::default();
        let mut figures = Vec::new();
        let mut errors = Vec::new();

        match self.angle_branch(config) {
            Ok((response, figure)) => {
                results.angle = Some(response);
                figures.push(figure);
            }
            Err(e) => errors.push(e),
        }
        match self.distance_branch(config) {
            Ok((response, figure)) => {
                results.distance = Some(response);
                figures.push(figure);
            }
            Err(e) => errors.push(e),
        }
        match self.spectral_branch(config) {
            Ok((response, figure)) => {
                log::info!("[{SPECTRAL}] band gap = {:.3} eV", response.band_gap);
                results.spectral = Some(response);
                figures.push(figure);
            }
            Err(e) => errors.push(e),
        }

        let mut saved = Vec::new();
        for figure in &figures {
            match save_figure(figure, &config.figures_dir) {
                Ok(path) => saved.push(path),
                Err(e) => errors.push(StageError::new(format!("internal/{}", figure.name), Stage::Render, e)),
            }
        }

        for e in &errors {
            log::error!("{e}");
        }
        results.failures = errors.iter().map(ToString::to_string).collect();

        let report = format_internal_report(&results, config.lang);
        if let Err(e) = write_report(&config.report, &report) {
            errors.push(StageError::new("internal/report", Stage::Render, e));
        }
        if let Some(path) = &config.export_json {
            if let Err(e) = write_results_json(path, "internal", &results) {
                errors.push(StageError::new("internal/report", Stage::Render, e));
            }
        }

        InternalRun {
            results,
            figures,
            saved,
            report,
            errors,
        }
    }

    /// Mean photocurrent against `cos α`, linear fit.
    pub fn angle_branch(&self, config: &InternalConfig) -> Result<(LinearResponse, Figure), StageError> {
        let table = self.load(ANGLE, &config.angle_file)?;
        let current = self.mean_current(ANGLE, &table, config)?;
        let angle = table
            .get("angle")
            .and_then(|a| a.to_unit(&Unit::dimensionless()))
            .map_err(at(ANGLE, Stage::Ingest))?;

        let cos_angle = angle.map("cos_angle", Unit::dimensionless(), f64::cos);
        let points = paired(&cos_angle, &current);
        let fit = fit_polynomial(&points, 1).map_err(at(ANGLE, Stage::Fit))?;
        log::info!("[{ANGLE}] ⟨I⟩ = {:.4}·cos α + {:.4}", fit.coefficient(1), fit.coefficient(0));

        let response = LinearResponse { points, fit };
        let figure = Figure::angle(&response, current.unit().symbol(), config.lang);
        Ok((response, figure))
    }

    /// Mean photocurrent against `r⁻²` (r in metres), linear fit.
    pub fn distance_branch(&self, config: &InternalConfig) -> Result<(LinearResponse, Figure), StageError> {
        let table = self.load(DISTANCE, &config.distance_file)?;
        let current = self.mean_current(DISTANCE, &table, config)?;
        let metre = self.registry.parse("m").map_err(at(DISTANCE, Stage::Ingest))?;
        let distance = table
            .get("distance")
            .and_then(|d| d.to_unit(&metre))
            .map_err(at(DISTANCE, Stage::Ingest))?;

        let inverse_square = distance.map("inverse_square_distance", metre.powi(-2), |r| 1.0 / (r * r));
        let points = paired(&inverse_square, &current);
        let fit = fit_polynomial(&points, 1).map_err(at(DISTANCE, Stage::Fit))?;
        log::info!("[{DISTANCE}] ⟨I⟩ = {:.4}·r⁻² + {:.4}", fit.coefficient(1), fit.coefficient(0));

        let response = LinearResponse { points, fit };
        let figure = Figure::distance(&response, current.unit().symbol(), config.lang);
        Ok((response, figure))
    }

    /// Normalised response against photon energy, cubic fit, tangent extrapolation.
    pub fn spectral_branch(&self, config: &InternalConfig) -> Result<(SpectralResponse, Figure), StageError> {
        let table = self.load(SPECTRAL, &config.spectra_file)?;
        let ingest = at(SPECTRAL, Stage::Ingest);
        let current = table.get("current").map_err(&ingest)?;
        let a = table.get("A").and_then(|s| s.to_unit(&Unit::dimensionless())).map_err(&ingest)?;
        let b = table.get("B").and_then(|s| s.to_unit(&Unit::dimensionless())).map_err(&ingest)?;
        let wavelength = table.get("wavelength").map_err(&ingest)?;

        let ev = self.registry.parse("eV").map_err(&ingest)?;
        let propagator = QuantityPropagator::new(self.constants);
        let energies = (0..wavelength.len())
            .filter_map(|i| wavelength.quantity(i))
            .map(|l| {
                propagator
                    .propagate(&Formula::PhotonEnergy, &[l])
                    .and_then(|e| e.convert(&ev))
                    .map(|e| e.magnitude())
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(at(SPECTRAL, Stage::Propagate))?;

        let points: Vec<(f64, f64)> = energies
            .iter()
            .zip(current.values())
            .zip(a.values().iter().zip(b.values()))
            .map(|((&e, &i), (&a, &b))| (e, i / (a * b)))
            .collect();

        let fit = fit_polynomial(&points, 3).map_err(at(SPECTRAL, Stage::Fit))?;

        let (e_min, e_max) = energies
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &e| (lo.min(e), hi.max(e)));
        let boundary = curve_onset(&fit, e_min, e_max, ONSET_SAMPLES);
        let tolerance = config.root_tolerance * boundary.abs();
        let band_gap = find_threshold(&fit, boundary, (0.0, boundary), Some(tolerance))
            .map_err(at(SPECTRAL, Stage::Threshold))?;
        let tangent = tangent_at(&fit, boundary);

        let response = SpectralResponse {
            points,
            fit,
            tangent,
            band_gap,
        };
        let figure = Figure::spectra(&response, current.unit().symbol(), config.lang);
        Ok((response, figure))
    }

    fn load(&self, branch: &'static str, file: &std::path::Path) -> Result<MeasurementTable, StageError> {
        log::info!("[{branch}] reading {}", file.display());
        load_measurements(file, self.registry)
            .map(|ingested| ingested.table)
            .map_err(at(branch, Stage::Ingest))
    }

    fn mean_current(
        &self,
        branch: &'static str,
        table: &MeasurementTable,
        config: &InternalConfig,
    ) -> Result<MeasurementSeries, StageError> {
        let channels: Vec<&str> = config.current_channels.iter().map(String::as_str).collect();
        table
            .row_mean("mean_current", &channels)
            .map_err(at(branch, Stage::Ingest))
    }
}
