//! Export bundle: par, tim, residual plot and run summary, zipped together.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::backend::TimingBackend;
use crate::error::AppError;
use crate::io::summary::write_summary;
use crate::plot::{select_frequencies, write_residual_svg};
use crate::sim::{SessionRun, SimulatorSession};

pub const DEFAULT_PAR_NAME: &str = "temponest_sim.par";
pub const DEFAULT_TIM_NAME: &str = "temponest_sim.tim";

/// Where and under which names to write the bundle.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub out_dir: PathBuf,
    pub par_name: String,
    pub tim_name: String,
    /// Fixed bundle id; `None` draws a fresh one.
    pub run_id: Option<String>,
    /// Restrict the bundled plot to one frequency (MHz).
    pub plot_frequency: Option<f64>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("."),
            par_name: DEFAULT_PAR_NAME.to_string(),
            tim_name: DEFAULT_TIM_NAME.to_string(),
            run_id: None,
            plot_frequency: None,
        }
    }
}

/// Short bundle id: the first four hex digits of a v4 UUID.
pub fn new_run_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..4].to_string()
}

/// File names of one bundle, all inside the output directory.
#[derive(Debug, Clone, PartialEq)]
pub struct BundlePaths {
    pub par: PathBuf,
    pub tim: PathBuf,
    pub plot: PathBuf,
    pub summary: PathBuf,
    pub archive: PathBuf,
}

impl BundlePaths {
    pub fn new(options: &ExportOptions, id: &str) -> Self {
        let dir = &options.out_dir;
        Self {
            par: dir.join(format!("{}_{id}.par", stem(&options.par_name))),
            tim: dir.join(format!("{}_{id}.tim", stem(&options.tim_name))),
            plot: dir.join(format!("residual_plot_{id}.svg")),
            summary: dir.join(format!("simulation_summary_{id}.txt")),
            archive: dir.join(format!("temponest_simulation_{id}.zip")),
        }
    }
}

fn stem(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| name.to_string())
}

/// Write the latest run in `session` as a zip bundle and return its path.
///
/// Fails with exit code 3 before touching the filesystem if nothing has been
/// simulated yet. A `plot_frequency` absent from the data is reported and the
/// bundle goes out without a plot. Loose files written by this call are
/// removed whether or not archiving succeeds.
pub fn export_bundle<B: TimingBackend>(
    backend: &B,
    session: &SimulatorSession<B::Pulsar>,
    options: &ExportOptions,
) -> Result<PathBuf, AppError> {
    let Some(run) = session.run() else {
        return Err(AppError::new(3, "Please run the simulation first."));
    };

    fs::create_dir_all(&options.out_dir).map_err(|e| {
        AppError::invalid(format!(
            "Failed to create output directory '{}': {e}",
            options.out_dir.display()
        ))
    })?;

    let id = options.run_id.clone().unwrap_or_else(new_run_id);
    let paths = BundlePaths::new(options, &id);

    let frequencies = match select_frequencies(&run.series, options.plot_frequency) {
        Ok(freqs) => Some(freqs),
        Err(err) => {
            tracing::warn!("{}; bundling without a plot", err.message());
            None
        }
    };

    let mut written = Vec::with_capacity(4);
    let result = write_members(backend, run, &paths, frequencies.as_deref(), &mut written)
        .and_then(|_| write_archive(&paths.archive, &written));

    for member in &written {
        if let Err(e) = fs::remove_file(member) {
            tracing::warn!(path = %member.display(), "could not remove exported file: {e}");
        }
    }
    result?;

    tracing::info!(archive = %paths.archive.display(), "simulation exported");
    Ok(paths.archive)
}

/// Write the loose bundle files, recording each one in `written` as it lands.
fn write_members<B: TimingBackend>(
    backend: &B,
    run: &SessionRun<B::Pulsar>,
    paths: &BundlePaths,
    frequencies: Option<&[f64]>,
    written: &mut Vec<PathBuf>,
) -> Result<(), AppError> {
    backend.write_par(&run.pulsar, &paths.par)?;
    written.push(paths.par.clone());
    backend.write_tim(&run.pulsar, &paths.tim)?;
    written.push(paths.tim.clone());
    if let Some(freqs) = frequencies {
        write_residual_svg(&paths.plot, &run.series, freqs)?;
        written.push(paths.plot.clone());
    }
    write_summary(&paths.summary, &run.request)?;
    written.push(paths.summary.clone());
    Ok(())
}

/// Zip `members` (stored under their file names) into `archive`.
///
/// A partially written archive is removed on failure.
pub fn write_archive<P: AsRef<Path>>(archive: &Path, members: &[P]) -> Result<(), AppError> {
    let file = File::create(archive)
        .map_err(|e| AppError::invalid(format!("Failed to create archive '{}': {e}", archive.display())))?;

    zip_members(file, members).inspect_err(|_| {
        if let Err(e) = fs::remove_file(archive) {
            tracing::warn!(path = %archive.display(), "could not remove partial archive: {e}");
        }
    })
}

fn zip_members<P: AsRef<Path>>(file: File, members: &[P]) -> Result<(), AppError> {
    let zip_err = |e: zip::result::ZipError| AppError::invalid(format!("Failed to write archive: {e}"));
    let io_err = |e: io::Error| AppError::invalid(format!("Failed to write archive: {e}"));

    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for member in members {
        let member = member.as_ref();
        let name = member
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::invalid(format!("Not a file: '{}'", member.display())))?;
        zip.start_file(name, options).map_err(zip_err)?;
        let mut src = File::open(member)
            .map_err(|e| AppError::invalid(format!("Failed to read '{}': {e}", member.display())))?;
        io::copy(&mut src, &mut zip).map_err(io_err)?;
    }
    zip.finish().map_err(zip_err)?;
    Ok(())
}
