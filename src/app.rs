//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - builds and writes TempoNest configs
//! - runs the residual simulator
//! - prints reports/plots
//! - writes the export bundle and optional CSV

use clap::Parser;

use crate::backend::{FakePulsarBackend, ParFile};
use crate::cli::{Command, ConfigArgs, SimulateArgs};
use crate::config::{ConfigRequest, GeneratedConfig, build_config};
use crate::error::AppError;
use crate::io::ExportOptions;
use crate::sim::SimulatorSession;

pub mod pipeline;

/// Entry point for the `pulsim` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is the normal case.
    let _ = dotenvy::dotenv();

    let cli = crate::cli::Cli::parse();
    crate::logging::init_logging(&cli.log_level)?;

    match cli.command {
        Command::Config(args) => handle_config(args),
        Command::Simulate(args) => handle_simulate(args),
    }
}

fn handle_config(args: ConfigArgs) -> Result<(), AppError> {
    let base = match &args.request {
        Some(path) => ConfigRequest::from_json_file(path)?,
        None => ConfigRequest::default(),
    };
    let request = args.apply_to(base);

    let config = build_config(&request)?;
    tracing::info!(elements = config.elements.len(), "config built");

    let generated = GeneratedConfig::generate(config)?;
    if !args.quiet {
        println!("{}", generated.json);
    }
    if !args.no_write {
        generated.write_to(&args.output)?;
    }
    Ok(())
}

fn handle_simulate(args: SimulateArgs) -> Result<(), AppError> {
    let request = args.request();

    let template = match &args.par_template {
        Some(path) => ParFile::from_path(path)?,
        None => ParFile::default(),
    };
    // Offset so the backend's noise stream differs from the S/N draws.
    let backend_seed = request.seed.map(|s| s.wrapping_add(1));
    let mut backend = FakePulsarBackend::new(backend_seed, template);
    let mut session = SimulatorSession::new();

    let series = pipeline::run_simulation(&mut backend, &mut session, &request)?;
    println!("{}", crate::report::format_run_summary(series, &request));

    if args.preview {
        match crate::plot::select_frequencies(series, args.plot_frequency) {
            Ok(freqs) => println!(
                "{}",
                crate::plot::render_ascii_plot(series, &freqs, args.width, args.height)
            ),
            Err(err) => tracing::warn!("{}", err.message()),
        }
    }

    if let Some(path) = &args.export_csv {
        crate::io::write_series_csv(path, series)?;
    }

    if !args.no_export {
        let options = ExportOptions {
            out_dir: args.out_dir.clone(),
            par_name: args.par_name.clone(),
            tim_name: args.tim_name.clone(),
            run_id: None,
            plot_frequency: args.plot_frequency,
        };
        let archive = pipeline::export_simulation(&backend, &session, &options)?;
        println!("Exported {}", archive.display());
    }

    Ok(())
}
