//! Synthetic measurement files for demos and smoke tests.
//!
//! Produces the four lab files in the two-row header format, with Gaussian
//! noise from a seeded generator so runs are reproducible:
//!
//! - `435nm.csv`: repeated stopping-voltage readings
//! - `angle-photocurrent.csv`: photocurrent vs incidence angle (`I ∝ cos α`)
//! - `distance-photocurrent.csv`: photocurrent vs lamp distance (`I ∝ r⁻²`)
//! - `spectra.csv`: photoresistor response vs wavelength with correction factors `A`, `B`

use std::path::{Path, PathBuf};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::ReduceError;

/// `h·c` in eV·nm.
const HC_EV_NM: f64 = 1_239.841_984;

pub const VOLTAGE_FILE: &str = "435nm.csv";
pub const ANGLE_FILE: &str = "angle-photocurrent.csv";
pub const DISTANCE_FILE: &str = "distance-photocurrent.csv";
pub const SPECTRA_FILE: &str = "spectra.csv";

/// Parameters of the simulated lab session.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub out_dir: PathBuf,
    pub seed: u64,
    /// Number of stopping-voltage readings.
    pub voltage_samples: usize,
    /// True stopping voltage, V (negative with the lab's sign convention).
    pub stopping_voltage: f64,
    /// Band gap of the simulated photoresistor, eV.
    pub band_gap: f64,
    /// Relative noise level of the photocurrent readings.
    pub noise: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("measurements"),
            seed: 42,
            voltage_samples: 8,
            stopping_voltage: -1.2,
            band_gap: 1.4,
            noise: 0.02,
        }
    }
}

/// Paths of the generated files.
#[derive(Debug, Clone)]
pub struct SimulatedFiles {
    pub voltage: PathBuf,
    pub angle: PathBuf,
    pub distance: PathBuf,
    pub spectra: PathBuf,
}

/// Generate all four measurement files under `config.out_dir`.
pub fn simulate(config: &SimulationConfig) -> Result<SimulatedFiles, ReduceError> {
    if config.voltage_samples == 0 {
        return Err(ReduceError::Input("voltage sample count must be > 0".to_string()));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(ReduceError::Input(format!("invalid noise level {}", config.noise)));
    }
    if !(config.band_gap.is_finite() && config.band_gap > 0.0) {
        return Err(ReduceError::Input(format!("invalid band gap {}", config.band_gap)));
    }
    std::fs::create_dir_all(&config.out_dir)
        .map_err(|e| ReduceError::Input(format!("failed to create '{}': {e}", config.out_dir.display())))?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0).map_err(|e| ReduceError::Input(format!("noise distribution error: {e}")))?;
    let mut noise = |scale: f64| scale * normal.sample(&mut rng);

    // Voltmeter readings scatter by a few hundredths of a volt.
    let voltages: Vec<Vec<f64>> = (0..config.voltage_samples)
        .map(|_| vec![config.stopping_voltage + noise(0.02)])
        .collect();

    let i0 = 2.0;
    let angles: Vec<Vec<f64>> = (0..=8)
        .map(|k| {
            let angle = 10.0 * k as f64;
            let ideal = i0 * angle.to_radians().cos();
            let mut row = vec![angle];
            row.extend((0..3).map(|_| ideal + noise(config.noise * i0)));
            row
        })
        .collect();

    // I = k / r² with r in metres; 10 cm gives ~3 µA.
    let k = 0.03;
    let distances: Vec<Vec<f64>> = (0..7)
        .map(|j| {
            let r_cm = 10.0 + 5.0 * j as f64;
            let r_m = r_cm / 100.0;
            let ideal = k / (r_m * r_m);
            let mut row = vec![r_cm];
            row.extend((0..3).map(|_| ideal + noise(config.noise * ideal)));
            row
        })
        .collect();

    let spectra: Vec<Vec<f64>> = (0..25)
        .map(|j| {
            let wavelength = 400.0 + 25.0 * j as f64;
            let energy = HC_EV_NM / wavelength;
            let excess = (energy - config.band_gap).max(0.0);
            let response = 3.0 * excess / (1.0 + excess) + noise(config.noise * 0.1);
            let a = 1.0 + noise(0.05);
            let b = 1.0 + noise(0.05);
            vec![wavelength, (response * a * b).max(0.0), a, b]
        })
        .collect();

    let dir = &config.out_dir;
    let files = SimulatedFiles {
        voltage: dir.join(VOLTAGE_FILE),
        angle: dir.join(ANGLE_FILE),
        distance: dir.join(DISTANCE_FILE),
        spectra: dir.join(SPECTRA_FILE),
    };

    write_table(&files.voltage, &["Voltage"], &["V"], &voltages)?;
    write_table(
        &files.angle,
        &["angle", "current1", "current2", "current3"],
        &["°", "мкА", "мкА", "мкА"],
        &angles,
    )?;
    write_table(
        &files.distance,
        &["distance", "current1", "current2", "current3"],
        &["см", "мкА", "мкА", "мкА"],
        &distances,
    )?;
    write_table(
        &files.spectra,
        &["wavelength", "current", "A", "B"],
        &["нм", "мкА", "", ""],
        &spectra,
    )?;

    log::info!("simulated measurements written to {} (seed {})", dir.display(), config.seed);
    Ok(files)
}

fn write_table(path: &Path, names: &[&str], units: &[&str], rows: &[Vec<f64>]) -> Result<(), ReduceError> {
    let io_err = |e: csv::Error| ReduceError::Input(format!("failed to write '{}': {e}", path.display()));

    let mut writer = csv::Writer::from_path(path).map_err(io_err)?;
    writer.write_record(names).map_err(io_err)?;
    writer.write_record(units).map_err(io_err)?;
    for row in rows {
        writer
            .write_record(row.iter().map(|v| format!("{v:.4}")))
            .map_err(io_err)?;
    }
    writer
        .flush()
        .map_err(|e| ReduceError::Input(format!("failed to write '{}': {e}", path.display())))
}
