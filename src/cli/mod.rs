//! Command-line parsing for the photoeffect lab reduction.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! reduction code: `app` turns these structs into immutable run configurations
//! once, and nothing downstream sees clap types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::Lang;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "photo",
    version,
    about = "Reduce photoelectric-effect lab measurements into reports and figures"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// External effect: stopping voltage, photon energy, work function.
    External(ExternalArgs),
    /// Internal effect: angle/distance dependences and band gap of the photoresistor.
    Internal(InternalArgs),
    /// Run both experiments concurrently.
    All(AllArgs),
    /// Write synthetic measurement files.
    Simulate(SimulateArgs),
}

/// Options shared by every reduction command.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Directory holding the measurement CSV files.
    #[arg(long, env = "PHOTO_MEASUREMENTS_DIR", default_value = "measurements")]
    pub measurements_dir: PathBuf,

    /// Directory for the text reports (and JSON exports).
    #[arg(long, env = "PHOTO_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Report language.
    #[arg(long, env = "PHOTO_LANG", value_enum, default_value_t = Lang::En)]
    pub lang: Lang,

    /// Also write the computed results as JSON next to each report.
    #[arg(long)]
    pub export_json: bool,
}

/// External-effect options.
#[derive(Debug, Args, Clone)]
pub struct ExternalOpts {
    /// Stopping-voltage measurement file (relative to the measurements directory).
    #[arg(long, default_value = "435nm.csv")]
    pub voltage_file: PathBuf,

    /// Channel holding the voltage readings.
    #[arg(long, default_value = "Voltage")]
    pub voltage_channel: String,

    /// Light wavelength, nm.
    #[arg(long, default_value_t = 435.0)]
    pub wavelength: f64,

    /// Voltmeter instrumental error (one unit of the least significant digit), V.
    #[arg(long, default_value_t = 0.1)]
    pub instrumental_error: f64,

    /// Confidence level of the Student's t interval.
    #[arg(long, default_value_t = 0.95)]
    pub confidence: f64,
}

/// Internal-effect options.
#[derive(Debug, Args, Clone)]
pub struct InternalOpts {
    /// Angle dependence file.
    #[arg(long, default_value = "angle-photocurrent.csv")]
    pub angle_file: PathBuf,

    /// Distance dependence file.
    #[arg(long, default_value = "distance-photocurrent.csv")]
    pub distance_file: PathBuf,

    /// Spectral response file.
    #[arg(long, default_value = "spectra.csv")]
    pub spectra_file: PathBuf,

    /// Repeated photocurrent channels averaged per row.
    #[arg(long, value_delimiter = ',', default_value = "current1,current2,current3")]
    pub current_channels: Vec<String>,

    /// Directory for the SVG figures.
    #[arg(long, env = "PHOTO_FIGURES_DIR", default_value = "figures")]
    pub figures_dir: PathBuf,

    /// Print ASCII previews of the figures.
    #[arg(long)]
    pub plot: bool,

    /// Preview width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Preview height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Band-gap root tolerance as a fraction of the search interval.
    #[arg(long, default_value_t = 1e-6)]
    pub root_tolerance: f64,
}

#[derive(Debug, Args, Clone)]
pub struct ExternalArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    #[command(flatten)]
    pub opts: ExternalOpts,
}

#[derive(Debug, Args, Clone)]
pub struct InternalArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    #[command(flatten)]
    pub opts: InternalOpts,
}

#[derive(Debug, Args, Clone)]
pub struct AllArgs {
    #[command(flatten)]
    pub common: CommonArgs,
    #[command(flatten)]
    pub external: ExternalOpts,
    #[command(flatten)]
    pub internal: InternalOpts,
}

/// Options for synthetic data generation.
#[derive(Debug, Args, Clone)]
pub struct SimulateArgs {
    /// Output directory for the generated files.
    #[arg(long, env = "PHOTO_MEASUREMENTS_DIR", default_value = "measurements")]
    pub out_dir: PathBuf,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of stopping-voltage readings.
    #[arg(long, default_value_t = 8)]
    pub voltage_samples: usize,

    /// True stopping voltage, V.
    #[arg(long, default_value_t = -1.2, allow_negative_numbers = true)]
    pub stopping_voltage: f64,

    /// Band gap of the simulated photoresistor, eV.
    #[arg(long, default_value_t = 1.4)]
    pub band_gap: f64,

    /// Relative noise of the photocurrent readings.
    #[arg(long, default_value_t = 0.02)]
    pub noise: f64,
}

/// Rewrite argv so a bare `photo` runs `photo all`.
///
/// Rules:
/// - `photo`                       -> `photo all`
/// - `photo --lang ru ...`         -> `photo all --lang ru ...`
/// - `photo --help/--version/-h`   -> unchanged (show top-level help/version)
pub fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("all".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "all".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_runs_all() {
        assert_eq!(rewrite_args(argv(&["photo"])), argv(&["photo", "all"]));
        assert_eq!(
            rewrite_args(argv(&["photo", "--lang", "ru"])),
            argv(&["photo", "all", "--lang", "ru"])
        );
        assert_eq!(rewrite_args(argv(&["photo", "--help"])), argv(&["photo", "--help"]));
        assert_eq!(rewrite_args(argv(&["photo", "external"])), argv(&["photo", "external"]));
    }

    #[test]
    fn external_defaults() {
        let cli = Cli::try_parse_from(["photo", "external", "--measurements-dir", "m"]).unwrap();
        let Command::External(args) = cli.command else {
            panic!("expected external");
        };
        assert_eq!(args.common.measurements_dir, PathBuf::from("m"));
        assert_eq!(args.opts.wavelength, 435.0);
        assert_eq!(args.opts.instrumental_error, 0.1);
        assert_eq!(args.opts.confidence, 0.95);
        assert_eq!(args.opts.voltage_file, PathBuf::from("435nm.csv"));
    }

    #[test]
    fn internal_channels_are_comma_separated() {
        let cli = Cli::try_parse_from(["photo", "internal", "--current-channels", "i1,i2", "--lang", "ru"]).unwrap();
        let Command::Internal(args) = cli.command else {
            panic!("expected internal");
        };
        assert_eq!(args.opts.current_channels, vec!["i1".to_string(), "i2".to_string()]);
        assert_eq!(args.common.lang, Lang::Ru);
    }

    #[test]
    fn simulate_accepts_negative_voltage() {
        let cli = Cli::try_parse_from(["photo", "simulate", "--stopping-voltage", "-0.8", "--seed", "5"]).unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.stopping_voltage, -0.8);
        assert_eq!(args.seed, 5);
    }
}
