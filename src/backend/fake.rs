//! Built-in fake-pulsar backend.
//!
//! A `FakePulsar` is a set of TOAs that sit exactly on the timing model plus
//! whatever delays have been injected. Residuals are always reported post-fit:
//! a weighted quadratic spin model (offset, F0, F1) is removed, the same way a
//! timing package would absorb those terms.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::backend::tim::{TimLine, write_tim};
use crate::backend::{ParFile, TimingBackend, TimingData};
use crate::domain::PowerLaw;
use crate::error::AppError;
use crate::math::{fit_residuals, fourier_design, power_law_variances, spin_design};

/// Number of Fourier harmonics used for red and DM noise.
pub const NOISE_COMPONENTS: usize = 10;

/// DM delays are referenced to this observing frequency (MHz).
pub const DM_REFERENCE_MHZ: f64 = 1400.0;

#[derive(Debug, Clone)]
pub struct FakePulsar {
    epochs_mjd: Vec<f64>,
    /// Accumulated TOA offsets from the timing model, in seconds.
    delays_s: Vec<f64>,
    toa_errors_us: Vec<f64>,
    frequencies_mhz: Vec<f64>,
    par: ParFile,
}

impl FakePulsar {
    pub fn len(&self) -> usize {
        self.epochs_mjd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs_mjd.is_empty()
    }

    pub fn par(&self) -> &ParFile {
        &self.par
    }

    fn span_years(&self) -> f64 {
        let lo = self.epochs_mjd.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = self.epochs_mjd.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo.is_finite() && hi.is_finite() { (hi - lo) / 365.25 } else { 0.0 }
    }

    fn reference_mjd(&self) -> f64 {
        self.par
            .pepoch()
            .or_else(|| self.epochs_mjd.first().copied())
            .unwrap_or(0.0)
    }
}

impl TimingData for FakePulsar {
    fn toas(&self) -> Vec<f64> {
        self.epochs_mjd.clone()
    }

    fn residuals(&self) -> Vec<f64> {
        let design = spin_design(&self.epochs_mjd, self.reference_mjd());
        let sigma_s: Vec<f64> = self.toa_errors_us.iter().map(|e| e * 1e-6).collect();
        fit_residuals(&design, &self.delays_s, &sigma_s)
    }

    fn toa_errors(&self) -> Vec<f64> {
        self.toa_errors_us.clone()
    }

    fn frequencies(&self) -> Vec<f64> {
        self.frequencies_mhz.clone()
    }
}

/// Seedable generator of `FakePulsar`s.
#[derive(Debug, Clone)]
pub struct FakePulsarBackend {
    rng: StdRng,
    template: ParFile,
    components: usize,
}

impl FakePulsarBackend {
    /// `seed = None` draws from OS entropy.
    pub fn new(seed: Option<u64>, template: ParFile) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            template,
            components: NOISE_COMPONENTS,
        }
    }

    fn gaussian(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }

    /// One realization of a power-law process on `psr`'s epochs, in seconds.
    fn power_law_delays(&mut self, psr: &FakePulsar, law: &PowerLaw) -> Vec<f64> {
        let design = fourier_design(&psr.epochs_mjd, self.components);
        let variances = power_law_variances(law.amplitude(), law.spectral_index, psr.span_years(), self.components);
        let coeffs: Vec<f64> = variances.iter().map(|v| v.sqrt() * self.gaussian()).collect();

        (0..design.nrows())
            .map(|i| design.row(i).iter().zip(&coeffs).map(|(b, c)| b * c).sum::<f64>())
            .collect()
    }
}

impl TimingBackend for FakePulsarBackend {
    type Pulsar = FakePulsar;

    fn generate_series(
        &mut self,
        epochs_mjd: &[f64],
        toa_errors_us: &[f64],
        frequencies_mhz: &[f64],
    ) -> Result<FakePulsar, AppError> {
        let n = epochs_mjd.len();
        if toa_errors_us.len() != n || frequencies_mhz.len() != n {
            return Err(AppError::new(
                4,
                format!(
                    "Mismatched TOA inputs: {n} epochs, {} errors, {} frequencies.",
                    toa_errors_us.len(),
                    frequencies_mhz.len()
                ),
            ));
        }
        if n == 0 {
            return Err(AppError::new(4, "Cannot build a pulsar without observation epochs."));
        }
        if let Some(bad) = toa_errors_us.iter().find(|e| !(e.is_finite() && **e > 0.0)) {
            return Err(AppError::new(4, format!("Invalid TOA uncertainty: {bad} us.")));
        }

        // Measurement noise at the quoted uncertainty.
        let delays_s = toa_errors_us
            .iter()
            .map(|err| err * 1e-6 * self.gaussian())
            .collect();

        tracing::trace!(toas = n, "fake pulsar generated");

        Ok(FakePulsar {
            epochs_mjd: epochs_mjd.to_vec(),
            delays_s,
            toa_errors_us: toa_errors_us.to_vec(),
            frequencies_mhz: frequencies_mhz.to_vec(),
            par: self.template.clone(),
        })
    }

    fn inject_red_noise(&mut self, psr: &mut FakePulsar, law: &PowerLaw) -> Result<(), AppError> {
        let delays = self.power_law_delays(psr, law);
        for (d, add) in psr.delays_s.iter_mut().zip(delays) {
            *d += add;
        }
        Ok(())
    }

    fn inject_dm_noise(&mut self, psr: &mut FakePulsar, law: &PowerLaw) -> Result<(), AppError> {
        let delays = self.power_law_delays(psr, law);
        for ((d, add), f) in psr.delays_s.iter_mut().zip(delays).zip(&psr.frequencies_mhz) {
            let chromatic = (DM_REFERENCE_MHZ / f).powi(2);
            *d += chromatic * add;
        }
        Ok(())
    }

    fn apply_efac(&mut self, psr: &mut FakePulsar, efac: f64) -> Result<(), AppError> {
        if !(efac.is_finite() && efac > 0.0) {
            return Err(AppError::new(4, format!("Invalid EFAC: {efac}.")));
        }
        for e in &mut psr.toa_errors_us {
            *e *= efac;
        }
        Ok(())
    }

    fn write_par(&self, psr: &FakePulsar, path: &Path) -> Result<(), AppError> {
        let mut par = psr.par.clone();
        let lo = psr.epochs_mjd.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = psr.epochs_mjd.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo.is_finite() && hi.is_finite() {
            par.set("START", format!("{lo:.6}"));
            par.set("FINISH", format!("{hi:.6}"));
        }
        par.set("NTOA", psr.len().to_string());
        par.write(path)
    }

    fn write_tim(&self, psr: &FakePulsar, path: &Path) -> Result<(), AppError> {
        let lines: Vec<TimLine> = (0..psr.len())
            .map(|i| TimLine {
                epoch_mjd: psr.epochs_mjd[i],
                delay_s: psr.delays_s[i],
                error_us: psr.toa_errors_us[i],
                frequency_mhz: psr.frequencies_mhz[i],
            })
            .collect();
        let site = psr.par.get("TZRSITE").unwrap_or("@");
        write_tim(path, psr.par.name(), site, &lines)
    }
}
