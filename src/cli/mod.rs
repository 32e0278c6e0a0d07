//! Command-line parsing for the TempoNest config generator and residual simulator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! config building and simulation code; `app` turns these values into requests.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::config::{ConfigRequest, DEFAULT_CONFIG_FILE, ElementRequest};
use crate::domain::{DEFAULT_START_MJD, PowerLaw, SamplerId, SimulationRequest};
use crate::io::{DEFAULT_PAR_NAME, DEFAULT_TIM_NAME};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pulsim", version, about = "TempoNest config generator and pulsar residual simulator")]
pub struct Cli {
    /// Log level for diagnostics on stderr (overridden by RUST_LOG).
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a TempoNest analysis config (JSON) from element selections.
    Config(ConfigArgs),
    /// Simulate multi-frequency residuals with red/DM noise and EFAC, and export them.
    Simulate(SimulateArgs),
}

/// Options for `pulsim config`.
#[derive(Debug, Parser, Clone)]
pub struct ConfigArgs {
    /// JSON request file (globals, sampler, elements).
    #[arg(long, value_name = "JSON")]
    pub request: Option<PathBuf>,

    /// Add an element: timing, red, dm, efac[:global|:per_flag[=FLAG]], equad[...].
    ///
    /// Repeatable; appended after any elements from --request.
    #[arg(short = 'e', long = "element", value_name = "SPEC")]
    pub elements: Vec<ElementRequest>,

    /// Output path prefix for sampler products.
    #[arg(long)]
    pub root: Option<String>,

    /// Use the original TOA errors.
    #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
    pub use_original_errors: Option<bool>,

    /// Number of tempo2 iterations.
    #[arg(long)]
    pub num_tempo2_its: Option<u32>,

    /// Nested sampler.
    #[arg(long, value_enum)]
    pub sampler: Option<SamplerId>,

    /// Run the sampler.
    #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
    pub sample: Option<bool>,

    /// Importance sampling (0 = off).
    #[arg(long)]
    pub importance_sampling: Option<u32>,

    /// Constant-efficiency mode.
    #[arg(long, action = ArgAction::Set, value_name = "BOOL")]
    pub constant_efficiency: Option<bool>,

    /// Sampling efficiency in [0, 1].
    #[arg(long)]
    pub efficiency: Option<f64>,

    /// Number of live points.
    #[arg(long)]
    pub live_points: Option<u32>,

    /// Where to write the generated config.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub output: PathBuf,

    /// Print only; do not write the config file.
    #[arg(long)]
    pub no_write: bool,

    /// Do not print the generated JSON.
    #[arg(short, long)]
    pub quiet: bool,
}

impl ConfigArgs {
    /// Merge CLI flags over an optional request file's contents.
    pub fn apply_to(&self, mut request: ConfigRequest) -> ConfigRequest {
        let g = &mut request.globals;
        if let Some(root) = &self.root {
            g.root = root.clone();
        }
        if let Some(v) = self.use_original_errors {
            g.use_original_errors = v;
        }
        if let Some(v) = self.num_tempo2_its {
            g.num_tempo2_its = v;
        }

        let s = &mut request.sampler;
        if let Some(id) = self.sampler {
            s.id = id;
        }
        if let Some(v) = self.sample {
            s.sample = v;
        }
        if let Some(v) = self.importance_sampling {
            s.importance_sampling = v;
        }
        if let Some(v) = self.constant_efficiency {
            s.constant_efficiency = v;
        }
        if let Some(v) = self.efficiency {
            s.efficiency = v;
        }
        if let Some(v) = self.live_points {
            s.live_points = v;
        }

        request.elements.extend(self.elements.iter().cloned());
        request
    }
}

/// Options for `pulsim simulate`.
#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Days between observations.
    #[arg(long, default_value_t = 10.0)]
    pub cadence: f64,

    /// Observing frequency in MHz (repeatable).
    #[arg(short = 'f', long = "freq", value_name = "MHZ", default_values_t = [1400.0, 800.0])]
    pub frequencies: Vec<f64>,

    /// Total observing span in years.
    #[arg(long, default_value_t = 5.0)]
    pub years: f64,

    /// Mean signal-to-noise per TOA.
    #[arg(long, default_value_t = 20.0)]
    pub snr: f64,

    /// EFAC applied to the TOA uncertainties.
    #[arg(long, default_value_t = 1.2)]
    pub efac: f64,

    /// Red noise log10 amplitude.
    #[arg(long, default_value_t = -14.0, allow_negative_numbers = true)]
    pub red_amp: f64,

    /// Red noise spectral index.
    #[arg(long, default_value_t = 4.0)]
    pub red_gamma: f64,

    /// DM noise log10 amplitude.
    #[arg(long, default_value_t = -14.0, allow_negative_numbers = true)]
    pub dm_amp: f64,

    /// DM noise spectral index.
    #[arg(long, default_value_t = 4.0)]
    pub dm_gamma: f64,

    /// First observation epoch (MJD).
    #[arg(long, default_value_t = DEFAULT_START_MJD)]
    pub start_mjd: f64,

    /// Random seed (omit for a fresh realization each run).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Par file to use as the pulsar template (built-in fake pulsar otherwise).
    #[arg(long, value_name = "PAR")]
    pub par_template: Option<PathBuf>,

    /// Exported par file name (a short run id is appended to the stem).
    #[arg(long, default_value = DEFAULT_PAR_NAME)]
    pub par_name: String,

    /// Exported tim file name (a short run id is appended to the stem).
    #[arg(long, default_value = DEFAULT_TIM_NAME)]
    pub tim_name: String,

    /// Directory for the export bundle.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Skip writing the zip bundle.
    #[arg(long)]
    pub no_export: bool,

    /// Also write the combined series as CSV.
    #[arg(long, value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// Print an ASCII residual plot.
    #[arg(long)]
    pub preview: bool,

    /// Only plot this frequency (MHz). If it is not in the data, no plot is
    /// produced (neither preview nor bundled SVG).
    #[arg(long, value_name = "MHZ")]
    pub plot_frequency: Option<f64>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

impl SimulateArgs {
    pub fn request(&self) -> SimulationRequest {
        SimulationRequest {
            cadence_days: self.cadence,
            frequencies_mhz: self.frequencies.clone(),
            duration_years: self.years,
            mean_snr: self.snr,
            efac: self.efac,
            red_noise: PowerLaw {
                log10_amplitude: self.red_amp,
                spectral_index: self.red_gamma,
            },
            dm_noise: PowerLaw {
                log10_amplitude: self.dm_amp,
                spectral_index: self.dm_gamma,
            },
            start_mjd: self.start_mjd,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn simulate_defaults_match_request_defaults() {
        let Command::Simulate(args) = parse(&["pulsim", "simulate"]).command else {
            panic!("expected simulate");
        };
        assert_eq!(args.request(), SimulationRequest::default());
        assert_eq!(args.par_name, "temponest_sim.par");
        assert!(!args.no_export);
    }

    #[test]
    fn simulate_accepts_negative_amplitudes_and_repeated_freqs() {
        let cli = parse(&[
            "pulsim", "simulate", "--freq", "430", "--freq", "1400", "--red-amp", "-13.5", "--seed", "7",
        ]);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        let req = args.request();
        assert_eq!(req.frequencies_mhz, vec![430.0, 1400.0]);
        assert_eq!(req.red_noise.log10_amplitude, -13.5);
        assert_eq!(req.seed, Some(7));
    }

    #[test]
    fn config_flags_override_request_values() {
        let cli = parse(&[
            "pulsim",
            "--log-level",
            "debug",
            "config",
            "-e",
            "red",
            "-e",
            "efac:per_flag=-be",
            "--sampler",
            "polychord",
            "--use-original-errors",
            "false",
            "--live-points",
            "500",
        ]);
        assert_eq!(cli.log_level, "debug");
        let Command::Config(args) = cli.command else {
            panic!("expected config");
        };

        let request = args.apply_to(ConfigRequest {
            elements: vec![ElementRequest::TimingModel],
            ..ConfigRequest::default()
        });
        assert_eq!(request.elements.len(), 3);
        assert_eq!(request.elements[0], ElementRequest::TimingModel);
        assert_eq!(request.sampler.id, SamplerId::Polychord);
        assert_eq!(request.sampler.live_points, 500);
        assert!(!request.globals.use_original_errors);
        assert_eq!(request.globals.root, "results/TNest-");
        assert_eq!(args.output, PathBuf::from("temponest_config.json"));
    }
}
