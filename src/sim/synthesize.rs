//! Per-frequency TOA synthesis.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::backend::{TimingBackend, TimingData};
use crate::domain::{DAYS_PER_YEAR, MAX_TOAS, ToaRecord, ToaSeries, observation_count};
use crate::error::AppError;

/// Scatter of the per-TOA signal-to-noise draw around its mean.
pub const SNR_STD: f64 = 5.0;

/// Drawn S/N values are floored here so uncertainties stay finite and positive.
pub const SNR_FLOOR: f64 = 1e-3;

/// Synthesize one band's TOAs.
///
/// Epochs are `floor(span / cadence)` evenly spaced points over
/// `[start, start + 365.25 · years]` (both endpoints included). Each TOA's
/// uncertainty (µs) is `1 / S/N` with `S/N ~ N(mean_snr, 5)` floored at 1e-3.
/// Residuals come back from the backend in seconds and are stored in µs.
pub fn synthesize<B, R>(
    backend: &mut B,
    rng: &mut R,
    cadence_days: f64,
    frequency_mhz: f64,
    duration_years: f64,
    mean_snr: f64,
    start_mjd: f64,
) -> Result<ToaSeries, AppError>
where
    B: TimingBackend,
    R: Rng + ?Sized,
{
    let end_mjd = start_mjd + DAYS_PER_YEAR * duration_years;
    let n = observation_count(start_mjd, end_mjd, cadence_days);
    if n == 0 {
        return Err(AppError::invalid(format!(
            "No observations at {frequency_mhz} MHz: cadence {cadence_days} d over {duration_years} yr."
        )));
    }
    if n > MAX_TOAS {
        return Err(AppError::invalid(format!(
            "{n} TOAs at {frequency_mhz} MHz exceeds the limit of {MAX_TOAS}."
        )));
    }

    let epochs = linspace(start_mjd, end_mjd, n);
    let frequencies = vec![frequency_mhz; n];

    let snr = Normal::new(mean_snr, SNR_STD)
        .map_err(|e| AppError::new(4, format!("S/N distribution error: {e}")))?;
    let uncertainties: Vec<f64> = (0..n).map(|_| 1.0 / snr.sample(rng).max(SNR_FLOOR)).collect();

    let psr = backend.generate_series(&epochs, &uncertainties, &frequencies)?;
    let series = series_from_pulsar(&psr)?;

    tracing::debug!(frequency_mhz, toas = series.len(), "synthesized band");
    Ok(series)
}

/// Read a pulsar's TOAs back as a series (residuals converted to µs).
pub fn series_from_pulsar<P: TimingData>(psr: &P) -> Result<ToaSeries, AppError> {
    let toas = psr.toas();
    let residuals = psr.residuals();
    let errors = psr.toa_errors();
    let freqs = psr.frequencies();

    let n = toas.len();
    if residuals.len() != n || errors.len() != n || freqs.len() != n {
        return Err(AppError::new(4, "Timing backend returned columns of different lengths."));
    }

    let records = (0..n)
        .map(|i| ToaRecord {
            epoch_mjd: toas[i],
            residual_us: residuals[i] * 1e6,
            uncertainty_us: errors[i],
            frequency_mhz: freqs[i],
        })
        .collect();
    Ok(ToaSeries::new(records))
}

/// `n` evenly spaced points over `[start, end]`, endpoint exact.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            out[n - 1] = end;
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FakePulsarBackend, ParFile};
    use crate::domain::DEFAULT_START_MJD;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn linspace_includes_both_endpoints() {
        let v = linspace(0.0, 10.0, 5);
        assert_eq!(v, vec![0.0, 2.5, 5.0, 7.5, 10.0]);
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
        assert!(linspace(3.0, 9.0, 0).is_empty());
    }

    #[test]
    fn one_year_at_ten_days() {
        let mut backend = FakePulsarBackend::new(Some(11), ParFile::default());
        let mut rng = StdRng::seed_from_u64(11);
        let series = synthesize(&mut backend, &mut rng, 10.0, 800.0, 1.0, 20.0, DEFAULT_START_MJD).unwrap();

        assert_eq!(series.len(), 36);
        assert!(series.iter().all(|r| r.frequency_mhz == 800.0));
        assert!(series.iter().all(|r| r.uncertainty_us > 0.0 && r.uncertainty_us <= 1.0 / SNR_FLOOR));

        let (lo, hi) = series.epoch_range().unwrap();
        assert_eq!(lo, DEFAULT_START_MJD);
        assert_eq!(hi, DEFAULT_START_MJD + 365.25);
    }

    #[test]
    fn low_snr_is_floored() {
        // Mean S/N far below zero: every draw hits the floor.
        let mut backend = FakePulsarBackend::new(Some(2), ParFile::default());
        let mut rng = StdRng::seed_from_u64(2);
        let series = synthesize(&mut backend, &mut rng, 30.0, 1400.0, 1.0, -1000.0, DEFAULT_START_MJD).unwrap();
        assert!(series.iter().all(|r| (r.uncertainty_us - 1000.0).abs() < 1e-9));
    }

    #[test]
    fn zero_observations_are_rejected_before_the_backend() {
        let mut backend = FakePulsarBackend::new(Some(0), ParFile::default());
        let mut rng = StdRng::seed_from_u64(0);
        let err = synthesize(&mut backend, &mut rng, 500.0, 1400.0, 1.0, 20.0, DEFAULT_START_MJD).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn oversized_bands_are_rejected_before_the_backend() {
        let mut backend = FakePulsarBackend::new(Some(0), ParFile::default());
        let mut rng = StdRng::seed_from_u64(0);
        let err = synthesize(&mut backend, &mut rng, 1e-300, 1400.0, 1.0, 20.0, DEFAULT_START_MJD).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("limit"));
    }
}
