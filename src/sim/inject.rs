//! Noise injection on the merged series.

use crate::backend::{TimingBackend, TimingData};
use crate::domain::{PowerLaw, ToaSeries};
use crate::error::AppError;

/// The combined pulsar after injection, plus the columns read back from it.
#[derive(Debug)]
pub struct Injected<P> {
    pub pulsar: P,
    /// Post-injection residuals in seconds, one per row of the input series.
    pub residuals_s: Vec<f64>,
    /// Post-EFAC uncertainties in µs.
    pub uncertainties_us: Vec<f64>,
}

impl<P> Injected<P> {
    /// Overwrite `series`' residual and uncertainty columns (residuals → µs).
    pub fn apply_to(&self, series: &mut ToaSeries) {
        for ((record, r), e) in series
            .records
            .iter_mut()
            .zip(&self.residuals_s)
            .zip(&self.uncertainties_us)
        {
            record.residual_us = r * 1e6;
            record.uncertainty_us = *e;
        }
    }
}

/// Build one pulsar from the merged rows, then add red noise, DM noise and
/// EFAC in that order.
pub fn inject<B: TimingBackend>(
    backend: &mut B,
    combined: &ToaSeries,
    red_noise: &PowerLaw,
    dm_noise: &PowerLaw,
    efac: f64,
) -> Result<Injected<B::Pulsar>, AppError> {
    let mut psr = backend.generate_series(
        &combined.epochs(),
        &combined.uncertainties(),
        &combined.frequencies(),
    )?;

    backend.inject_red_noise(&mut psr, red_noise)?;
    backend.inject_dm_noise(&mut psr, dm_noise)?;
    backend.apply_efac(&mut psr, efac)?;

    let residuals_s = psr.residuals();
    let uncertainties_us = psr.toa_errors();
    if residuals_s.len() != combined.len() || uncertainties_us.len() != combined.len() {
        return Err(AppError::new(
            4,
            format!(
                "Timing backend returned {} residuals for {} TOAs.",
                residuals_s.len(),
                combined.len()
            ),
        ));
    }

    tracing::debug!(
        toas = combined.len(),
        red_log10_amp = red_noise.log10_amplitude,
        dm_log10_amp = dm_noise.log10_amplitude,
        efac,
        "noise injected"
    );

    Ok(Injected {
        pulsar: psr,
        residuals_s,
        uncertainties_us,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::stub::{DM_OFFSET_S, RED_OFFSET_S, StubBackend};
    use crate::domain::ToaRecord;

    fn law() -> PowerLaw {
        PowerLaw {
            log10_amplitude: -14.0,
            spectral_index: 4.0,
        }
    }

    fn merged() -> ToaSeries {
        let rows = [(1.0, 700.0), (1.0, 1400.0), (11.0, 700.0), (11.0, 1400.0)];
        ToaSeries::new(
            rows.iter()
                .map(|&(epoch_mjd, frequency_mhz)| ToaRecord {
                    epoch_mjd,
                    residual_us: 9.0,
                    uncertainty_us: 0.5,
                    frequency_mhz,
                })
                .collect(),
        )
    }

    #[test]
    fn applies_red_then_dm_then_efac() {
        let mut backend = StubBackend::default();
        inject(&mut backend, &merged(), &law(), &law(), 1.2).unwrap();
        assert_eq!(
            backend.calls,
            vec!["generate_series", "inject_red_noise", "inject_dm_noise", "apply_efac"]
        );
    }

    #[test]
    fn overwrites_residuals_and_scales_uncertainties() {
        let mut backend = StubBackend::default();
        let mut series = merged();
        let injected = inject(&mut backend, &series, &law(), &law(), 2.0).unwrap();
        injected.apply_to(&mut series);

        assert_eq!(series.len(), 4);
        for r in series.iter() {
            let dm = DM_OFFSET_S * (1400.0 / r.frequency_mhz).powi(2);
            assert!((r.residual_us - (RED_OFFSET_S + dm) * 1e6).abs() < 1e-9);
            assert!((r.uncertainty_us - 1.0).abs() < 1e-12);
        }
        assert_eq!(series.epochs(), vec![1.0, 1.0, 11.0, 11.0]);
        assert_eq!(series.frequencies(), vec![700.0, 1400.0, 700.0, 1400.0]);
    }

    #[test]
    fn backend_failure_stops_the_chain() {
        let mut backend = StubBackend::failing_on("inject_dm_noise");
        let err = inject(&mut backend, &merged(), &law(), &law(), 1.0).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(!backend.calls.contains(&"apply_efac"));
    }
}
