//! Deterministic backend for pipeline tests: records every call and adds
//! fixed, easily checked offsets.

use std::fs;
use std::path::Path;

use crate::backend::{TimingBackend, TimingData};
use crate::domain::PowerLaw;
use crate::error::AppError;

/// Red noise adds this many seconds to every residual.
pub const RED_OFFSET_S: f64 = 1e-6;
/// DM noise adds this many seconds at 1400 MHz (scaled by (1400/f)²).
pub const DM_OFFSET_S: f64 = 2e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct StubPulsar {
    pub toas: Vec<f64>,
    pub residuals_s: Vec<f64>,
    pub errors_us: Vec<f64>,
    pub freqs: Vec<f64>,
}

impl TimingData for StubPulsar {
    fn toas(&self) -> Vec<f64> {
        self.toas.clone()
    }
    fn residuals(&self) -> Vec<f64> {
        self.residuals_s.clone()
    }
    fn toa_errors(&self) -> Vec<f64> {
        self.errors_us.clone()
    }
    fn frequencies(&self) -> Vec<f64> {
        self.freqs.clone()
    }
}

#[derive(Debug, Default)]
pub struct StubBackend {
    pub calls: Vec<&'static str>,
    /// Name of the call that should fail.
    pub fail_on: Option<&'static str>,
}

impl StubBackend {
    pub fn failing_on(call: &'static str) -> Self {
        Self {
            calls: Vec::new(),
            fail_on: Some(call),
        }
    }

    fn enter(&mut self, call: &'static str) -> Result<(), AppError> {
        self.calls.push(call);
        self.check(call)
    }

    /// Writers take `&self`, so they only check for the configured failure.
    fn check(&self, call: &'static str) -> Result<(), AppError> {
        if self.fail_on == Some(call) {
            return Err(AppError::new(4, format!("stub failure in {call}")));
        }
        Ok(())
    }
}

impl TimingBackend for StubBackend {
    type Pulsar = StubPulsar;

    fn generate_series(
        &mut self,
        epochs_mjd: &[f64],
        toa_errors_us: &[f64],
        frequencies_mhz: &[f64],
    ) -> Result<StubPulsar, AppError> {
        self.enter("generate_series")?;
        Ok(StubPulsar {
            toas: epochs_mjd.to_vec(),
            residuals_s: vec![0.0; epochs_mjd.len()],
            errors_us: toa_errors_us.to_vec(),
            freqs: frequencies_mhz.to_vec(),
        })
    }

    fn inject_red_noise(&mut self, psr: &mut StubPulsar, _law: &PowerLaw) -> Result<(), AppError> {
        self.enter("inject_red_noise")?;
        for r in &mut psr.residuals_s {
            *r += RED_OFFSET_S;
        }
        Ok(())
    }

    fn inject_dm_noise(&mut self, psr: &mut StubPulsar, _law: &PowerLaw) -> Result<(), AppError> {
        self.enter("inject_dm_noise")?;
        for (r, f) in psr.residuals_s.iter_mut().zip(&psr.freqs) {
            *r += DM_OFFSET_S * (1400.0 / f).powi(2);
        }
        Ok(())
    }

    fn apply_efac(&mut self, psr: &mut StubPulsar, efac: f64) -> Result<(), AppError> {
        self.enter("apply_efac")?;
        for e in &mut psr.errors_us {
            *e *= efac;
        }
        Ok(())
    }

    fn write_par(&self, psr: &StubPulsar, path: &Path) -> Result<(), AppError> {
        self.check("write_par")?;
        fs::write(path, format!("PSRJ STUB\nNTOA {}\n", psr.toas.len()))
            .map_err(|e| AppError::invalid(e.to_string()))
    }

    fn write_tim(&self, psr: &StubPulsar, path: &Path) -> Result<(), AppError> {
        self.check("write_tim")?;
        let body: String = psr.toas.iter().map(|t| format!("{t}\n")).collect();
        fs::write(path, format!("FORMAT 1\n{body}")).map_err(|e| AppError::invalid(e.to_string()))
    }
}
