//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - assembled from CLI flags or request files
//! - written out as JSON/CSV
//! - reloaded later (generated configs round-trip through `serde_json`)

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Reference epoch for synthesized observations (MJD 56658 = 2014-01-01).
pub const DEFAULT_START_MJD: f64 = 56658.0;

/// Julian year in days.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Upper bound on TOAs in one simulated run (all frequencies together).
pub const MAX_TOAS: usize = 1_000_000;

/// Two frequencies closer than this (MHz) are treated as the same band.
const FREQ_EPS: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Analysis configuration document
// ---------------------------------------------------------------------------

/// Root of the generated JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub globals: Globals,
    pub sampler: Sampler,
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Globals {
    /// Output path prefix for sampler products.
    pub root: String,
    pub use_original_errors: bool,
    pub num_tempo2_its: u32,
}

impl Default for Globals {
    fn default() -> Self {
        Self {
            root: "results/TNest-".to_string(),
            use_original_errors: true,
            num_tempo2_its: 1,
        }
    }
}

/// Nested-sampling backend consumed downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SamplerId {
    Multinest,
    Polychord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Sampler {
    pub id: SamplerId,
    pub sample: bool,
    pub importance_sampling: u32,
    pub constant_efficiency: bool,
    /// Sampling efficiency fraction in `[0, 1]`.
    pub efficiency: f64,
    pub live_points: u32,
}

impl Default for Sampler {
    fn default() -> Self {
        Self {
            id: SamplerId::Multinest,
            sample: true,
            importance_sampling: 0,
            constant_efficiency: false,
            efficiency: 0.1,
            live_points: 4000,
        }
    }
}

/// The fixed catalog of model/noise elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    #[serde(rename = "Timing Model")]
    TimingModel,
    #[serde(rename = "Power Law Red Noise")]
    PowerLawRedNoise,
    #[serde(rename = "Power Law DM Noise")]
    PowerLawDmNoise,
    #[serde(rename = "EFAC")]
    Efac,
    #[serde(rename = "EQUAD")]
    Equad,
}

impl ElementKind {
    pub const ALL: [ElementKind; 5] = [
        ElementKind::TimingModel,
        ElementKind::PowerLawRedNoise,
        ElementKind::PowerLawDmNoise,
        ElementKind::Efac,
        ElementKind::Equad,
    ];

    /// Name as written into the config document.
    pub fn display_name(self) -> &'static str {
        match self {
            ElementKind::TimingModel => "Timing Model",
            ElementKind::PowerLawRedNoise => "Power Law Red Noise",
            ElementKind::PowerLawDmNoise => "Power Law DM Noise",
            ElementKind::Efac => "EFAC",
            ElementKind::Equad => "EQUAD",
        }
    }

    /// EFAC/EQUAD scale the reported error bars rather than adding a process.
    pub fn is_white_noise(self) -> bool {
        matches!(self, ElementKind::Efac | ElementKind::Equad)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub name: ElementKind,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorType {
    LogUniform,
    Uniform,
}

/// One sampled parameter of an element.
///
/// Field order matches the emitted JSON; `description` and `flag` are only
/// present for EFAC/EQUAD parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub prior_type: PriorType,
    pub include: bool,
    pub fit: bool,
    pub min_value: f64,
    pub max_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
}

// ---------------------------------------------------------------------------
// Time-of-arrival series
// ---------------------------------------------------------------------------

/// A single synthesized observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToaRecord {
    pub epoch_mjd: f64,
    pub residual_us: f64,
    pub uncertainty_us: f64,
    pub frequency_mhz: f64,
}

/// An ordered sequence of TOA rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToaSeries {
    pub records: Vec<ToaRecord>,
}

impl ToaSeries {
    pub fn new(records: Vec<ToaRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToaRecord> {
        self.records.iter()
    }

    pub fn epochs(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.epoch_mjd).collect()
    }

    pub fn uncertainties(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.uncertainty_us).collect()
    }

    pub fn frequencies(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.frequency_mhz).collect()
    }

    /// Distinct observing frequencies, ascending.
    pub fn unique_frequencies(&self) -> Vec<f64> {
        let mut freqs = self.frequencies();
        freqs.sort_by(f64::total_cmp);
        freqs.dedup_by(|a, b| (*a - *b).abs() < FREQ_EPS);
        freqs
    }

    pub fn contains_frequency(&self, frequency_mhz: f64) -> bool {
        self.records
            .iter()
            .any(|r| (r.frequency_mhz - frequency_mhz).abs() < FREQ_EPS)
    }

    /// Rows observed at `frequency_mhz` (input order preserved).
    pub fn at_frequency(&self, frequency_mhz: f64) -> Vec<ToaRecord> {
        self.records
            .iter()
            .filter(|r| (r.frequency_mhz - frequency_mhz).abs() < FREQ_EPS)
            .copied()
            .collect()
    }

    /// `(min, max)` epoch, or `None` for an empty series.
    pub fn epoch_range(&self) -> Option<(f64, f64)> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for r in &self.records {
            lo = lo.min(r.epoch_mjd);
            hi = hi.max(r.epoch_mjd);
        }
        (lo.is_finite() && hi.is_finite()).then_some((lo, hi))
    }
}

// ---------------------------------------------------------------------------
// Simulation request
// ---------------------------------------------------------------------------

/// Power-law spectrum for a correlated noise process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerLaw {
    /// `log10` of the dimensionless strain amplitude.
    pub log10_amplitude: f64,
    pub spectral_index: f64,
}

impl PowerLaw {
    pub fn amplitude(&self) -> f64 {
        10f64.powf(self.log10_amplitude)
    }
}

/// Everything one simulation run needs, collected up front.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub cadence_days: f64,
    pub frequencies_mhz: Vec<f64>,
    pub duration_years: f64,
    pub mean_snr: f64,
    pub efac: f64,
    pub red_noise: PowerLaw,
    pub dm_noise: PowerLaw,
    pub start_mjd: f64,
    /// Fixed RNG seed; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SimulationRequest {
    fn default() -> Self {
        Self {
            cadence_days: 10.0,
            frequencies_mhz: vec![1400.0, 800.0],
            duration_years: 5.0,
            mean_snr: 20.0,
            efac: 1.2,
            red_noise: PowerLaw {
                log10_amplitude: -14.0,
                spectral_index: 4.0,
            },
            dm_noise: PowerLaw {
                log10_amplitude: -14.0,
                spectral_index: 4.0,
            },
            start_mjd: DEFAULT_START_MJD,
            seed: None,
        }
    }
}

impl SimulationRequest {
    pub fn end_mjd(&self) -> f64 {
        self.start_mjd + DAYS_PER_YEAR * self.duration_years
    }

    /// Number of TOAs synthesized per frequency.
    pub fn toas_per_frequency(&self) -> usize {
        observation_count(self.start_mjd, self.end_mjd(), self.cadence_days)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let positive = |v: f64| v.is_finite() && v > 0.0;

        if !positive(self.cadence_days) {
            return Err(AppError::invalid("Cadence must be a positive number of days."));
        }
        if !positive(self.duration_years) {
            return Err(AppError::invalid("Duration must be a positive number of years."));
        }
        if !positive(self.mean_snr) {
            return Err(AppError::invalid("Mean S/N must be positive."));
        }
        if !positive(self.efac) {
            return Err(AppError::invalid("EFAC must be positive."));
        }
        if !self.start_mjd.is_finite() {
            return Err(AppError::invalid("Start MJD must be finite."));
        }
        if self.frequencies_mhz.is_empty() {
            return Err(AppError::invalid("At least one observing frequency is required."));
        }
        for (i, &f) in self.frequencies_mhz.iter().enumerate() {
            if !positive(f) {
                return Err(AppError::invalid(format!("Invalid observing frequency: {f} MHz.")));
            }
            if self.frequencies_mhz[..i].iter().any(|&g| (g - f).abs() < FREQ_EPS) {
                return Err(AppError::invalid(format!("Observing frequency {f} MHz listed twice.")));
            }
        }
        for (label, law) in [("Red", &self.red_noise), ("DM", &self.dm_noise)] {
            if !(law.log10_amplitude.is_finite() && law.spectral_index.is_finite()) {
                return Err(AppError::invalid(format!("{label} noise parameters must be finite.")));
            }
        }
        let per_frequency = self.toas_per_frequency();
        if per_frequency == 0 {
            return Err(AppError::invalid(format!(
                "Cadence of {} days over {} years yields no observations.",
                self.cadence_days, self.duration_years
            )));
        }
        let total = per_frequency.saturating_mul(self.frequencies_mhz.len());
        if total > MAX_TOAS {
            return Err(AppError::invalid(format!(
                "Cadence of {} days over {} years across {} frequencies yields {total} TOAs (limit {MAX_TOAS}).",
                self.cadence_days,
                self.duration_years,
                self.frequencies_mhz.len()
            )));
        }
        Ok(())
    }
}

/// `floor((end - start) / cadence)`, zero for degenerate inputs.
pub fn observation_count(start_mjd: f64, end_mjd: f64, cadence_days: f64) -> usize {
    let n = (end_mjd - start_mjd) / cadence_days;
    if n.is_finite() && n >= 1.0 { n.floor() as usize } else { 0 }
}
