//! Pulsar timing backend: the capability the simulator drives.
//!
//! The pipeline only ever talks to `TimingBackend`, so the synthesis, merge,
//! injection and export logic can run against the built-in fake pulsar
//! (`FakePulsarBackend`) or a stub in tests.

pub mod fake;
pub mod par;
pub mod tim;

#[cfg(test)]
pub mod stub;

pub use fake::*;
pub use par::*;

use std::path::Path;

use crate::domain::PowerLaw;
use crate::error::AppError;

/// Read access to a synthetic pulsar's current TOAs.
pub trait TimingData {
    /// Observation epochs (MJD), one per TOA.
    fn toas(&self) -> Vec<f64>;
    /// Post-fit timing residuals in seconds.
    fn residuals(&self) -> Vec<f64>;
    /// Reported TOA uncertainties in microseconds.
    fn toa_errors(&self) -> Vec<f64>;
    /// Observing frequencies in MHz.
    fn frequencies(&self) -> Vec<f64>;
}

/// Synthetic-pulsar generator and noise injector.
pub trait TimingBackend {
    type Pulsar: TimingData;

    /// Create a pulsar observed at `epochs_mjd` with the given uncertainties
    /// (µs) and observing frequencies (MHz).
    fn generate_series(
        &mut self,
        epochs_mjd: &[f64],
        toa_errors_us: &[f64],
        frequencies_mhz: &[f64],
    ) -> Result<Self::Pulsar, AppError>;

    /// Add achromatic power-law ("red") timing noise.
    fn inject_red_noise(&mut self, psr: &mut Self::Pulsar, law: &PowerLaw) -> Result<(), AppError>;

    /// Add power-law dispersion-measure noise (delay ∝ f⁻²).
    fn inject_dm_noise(&mut self, psr: &mut Self::Pulsar, law: &PowerLaw) -> Result<(), AppError>;

    /// Scale the reported TOA uncertainties by `efac`.
    fn apply_efac(&mut self, psr: &mut Self::Pulsar, efac: f64) -> Result<(), AppError>;

    fn write_par(&self, psr: &Self::Pulsar, path: &Path) -> Result<(), AppError>;

    fn write_tim(&self, psr: &Self::Pulsar, path: &Path) -> Result<(), AppError>;
}
