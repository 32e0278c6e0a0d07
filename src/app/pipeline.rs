//! Shared simulation workflow, independent of how results are presented.
//!
//! request -> per-band synthesis -> merge -> noise injection -> session,
//! then (optionally) session -> export bundle.

use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::backend::TimingBackend;
use crate::domain::{SimulationRequest, ToaSeries};
use crate::error::AppError;
use crate::io::{ExportOptions, export_bundle};
use crate::sim::{SimulatorSession, simulate};

/// Run one simulation and store it in `session`.
///
/// The session is only replaced when every step succeeds; on error it still
/// holds the previous run (if any).
pub fn run_simulation<'s, B: TimingBackend>(
    backend: &mut B,
    session: &'s mut SimulatorSession<B::Pulsar>,
    request: &SimulationRequest,
) -> Result<&'s ToaSeries, AppError> {
    let mut rng = match request.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    tracing::info!(
        frequencies = ?request.frequencies_mhz,
        toas_per_frequency = request.toas_per_frequency(),
        "simulating residuals"
    );
    let run = simulate(backend, &mut rng, request)?;
    tracing::info!(toas = run.series.len(), "simulation complete");

    session.replace(run);
    session
        .series()
        .ok_or_else(|| AppError::new(4, "Simulation finished without a stored run."))
}

/// Export the session's latest run as a zip bundle.
pub fn export_simulation<B: TimingBackend>(
    backend: &B,
    session: &SimulatorSession<B::Pulsar>,
    options: &ExportOptions,
) -> Result<PathBuf, AppError> {
    export_bundle(backend, session, options)
}
