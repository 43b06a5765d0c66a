//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - turns arguments into immutable run configurations
//! - runs the external / internal pipelines (both concurrently for `all`)
//! - prints reports and optional ASCII previews

use clap::Parser;

use crate::cli::{Command, CommonArgs, ExternalOpts, InternalOpts, SimulateArgs, rewrite_args};
use crate::domain::{ExternalConfig, InternalConfig};
use crate::error::{AppError, StageError};
use crate::quantity::{PhysicalConstants, Quantity, UnitRegistry};

pub mod pipeline;

use pipeline::{
    EXTERNAL_JSON, EXTERNAL_REPORT, ExternalEffectPipeline, INTERNAL_JSON, INTERNAL_REPORT, InternalEffectPipeline,
    InternalRun,
};

/// Entry point for the `photo` binary.
pub fn run() -> Result<(), AppError> {
    // Defaults for the `PHOTO_*` variables may live in a local `.env`.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            log::warn!("ignoring .env: {e}");
        }
    }

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let registry = UnitRegistry::new();
    let constants = PhysicalConstants::new();

    match cli.command {
        Command::External(args) => handle_external(&args.common, &args.opts, &registry, &constants),
        Command::Internal(args) => handle_internal(&args.common, &args.opts, &registry, &constants),
        Command::All(args) => handle_all(&args.common, &args.external, &args.internal, &registry, &constants),
        Command::Simulate(args) => handle_simulate(&args),
    }
}

fn handle_external(
    common: &CommonArgs,
    opts: &ExternalOpts,
    registry: &UnitRegistry,
    constants: &PhysicalConstants,
) -> Result<(), AppError> {
    let config = external_config(common, opts, registry)?;
    let run = ExternalEffectPipeline::new(registry, constants).run(&config)?;
    println!("{}", run.report);
    Ok(())
}

fn handle_internal(
    common: &CommonArgs,
    opts: &InternalOpts,
    registry: &UnitRegistry,
    constants: &PhysicalConstants,
) -> Result<(), AppError> {
    let config = internal_config(common, opts)?;
    let run = InternalEffectPipeline::new(registry, constants).run(&config);
    print_internal(&run, &config);
    failures_to_error(&run.errors).map_or(Ok(()), Err)
}

fn handle_all(
    common: &CommonArgs,
    external: &ExternalOpts,
    internal: &InternalOpts,
    registry: &UnitRegistry,
    constants: &PhysicalConstants,
) -> Result<(), AppError> {
    let external_config = external_config(common, external, registry)?;
    let internal_config = internal_config(common, internal)?;

    // The pipelines share only read-only state.
    let (external_run, internal_run) = rayon::join(
        || ExternalEffectPipeline::new(registry, constants).run(&external_config),
        || InternalEffectPipeline::new(registry, constants).run(&internal_config),
    );

    let mut errors = Vec::new();
    match external_run {
        Ok(run) => println!("{}", run.report),
        Err(e) => {
            log::error!("{e}");
            errors.push(e);
        }
    }
    print_internal(&internal_run, &internal_config);
    errors.extend(internal_run.errors);

    failures_to_error(&errors).map_or(Ok(()), Err)
}

fn handle_simulate(args: &SimulateArgs) -> Result<(), AppError> {
    let config = crate::data::SimulationConfig {
        out_dir: args.out_dir.clone(),
        seed: args.seed,
        voltage_samples: args.voltage_samples,
        stopping_voltage: args.stopping_voltage,
        band_gap: args.band_gap,
        noise: args.noise,
    };
    let files = crate::data::simulate(&config)?;
    for path in [&files.voltage, &files.angle, &files.distance, &files.spectra] {
        println!("{}", path.display());
    }
    Ok(())
}

fn print_internal(run: &InternalRun, config: &InternalConfig) {
    println!("{}", run.report);
    for path in &run.saved {
        println!("figure: {}", path.display());
    }
    if config.plot {
        for figure in &run.figures {
            println!(
                "{}",
                crate::plot::render_ascii_plot(figure, config.plot_width, config.plot_height)
            );
        }
    }
}

/// Collapse branch failures into one process error; the first failure picks the exit code.
fn failures_to_error(errors: &[StageError]) -> Option<AppError> {
    let first = errors.first()?;
    let message = errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n");
    Some(AppError::new(first.source.exit_code(), message))
}

pub fn external_config(
    common: &CommonArgs,
    opts: &ExternalOpts,
    registry: &UnitRegistry,
) -> Result<ExternalConfig, AppError> {
    if !(opts.wavelength.is_finite() && opts.wavelength > 0.0) {
        return Err(AppError::new(2, format!("wavelength must be positive, got {}", opts.wavelength)));
    }
    if !(opts.instrumental_error.is_finite() && opts.instrumental_error >= 0.0) {
        return Err(AppError::new(
            2,
            format!("instrumental error must be non-negative, got {}", opts.instrumental_error),
        ));
    }

    Ok(ExternalConfig {
        measurements: common.measurements_dir.join(&opts.voltage_file),
        voltage_channel: opts.voltage_channel.clone(),
        wavelength: Quantity::new(opts.wavelength, registry.parse("nm")?),
        instrumental_error: Quantity::new(opts.instrumental_error, registry.parse("V")?),
        confidence_level: opts.confidence,
        report: common.output_dir.join(EXTERNAL_REPORT),
        export_json: common.export_json.then(|| common.output_dir.join(EXTERNAL_JSON)),
        lang: common.lang,
    })
}

pub fn internal_config(common: &CommonArgs, opts: &InternalOpts) -> Result<InternalConfig, AppError> {
    if opts.current_channels.iter().all(|c| c.trim().is_empty()) {
        return Err(AppError::new(2, "at least one current channel is required"));
    }
    if !(opts.root_tolerance.is_finite() && opts.root_tolerance > 0.0) {
        return Err(AppError::new(
            2,
            format!("root tolerance must be positive, got {}", opts.root_tolerance),
        ));
    }

    let dir = &common.measurements_dir;
    Ok(InternalConfig {
        angle_file: dir.join(&opts.angle_file),
        distance_file: dir.join(&opts.distance_file),
        spectra_file: dir.join(&opts.spectra_file),
        current_channels: opts
            .current_channels
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect(),
        figures_dir: opts.figures_dir.clone(),
        report: common.output_dir.join(INTERNAL_REPORT),
        export_json: common.export_json.then(|| common.output_dir.join(INTERNAL_JSON)),
        lang: common.lang,
        plot: opts.plot,
        plot_width: opts.width,
        plot_height: opts.height,
        root_tolerance: opts.root_tolerance,
    })
}
