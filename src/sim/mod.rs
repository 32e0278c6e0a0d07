//! Residual simulation: per-band synthesis, merge, then noise injection on one
//! combined pulsar.

pub mod combine;
pub mod inject;
pub mod session;
pub mod synthesize;

pub use combine::*;
pub use inject::*;
pub use session::*;
pub use synthesize::*;

use rand::Rng;

use crate::backend::TimingBackend;
use crate::domain::SimulationRequest;
use crate::error::AppError;

/// Run the full simulation for `request` and return the completed run.
///
/// Nothing is stored anywhere; the caller decides whether to keep the run.
pub fn simulate<B, R>(
    backend: &mut B,
    rng: &mut R,
    request: &SimulationRequest,
) -> Result<SessionRun<B::Pulsar>, AppError>
where
    B: TimingBackend,
    R: Rng + ?Sized,
{
    request.validate()?;

    let mut bands = Vec::with_capacity(request.frequencies_mhz.len());
    for &freq in &request.frequencies_mhz {
        bands.push(synthesize(
            backend,
            rng,
            request.cadence_days,
            freq,
            request.duration_years,
            request.mean_snr,
            request.start_mjd,
        )?);
    }

    let mut series = combine(bands);
    let injected = inject(
        backend,
        &series,
        &request.red_noise,
        &request.dm_noise,
        request.efac,
    )?;
    injected.apply_to(&mut series);

    Ok(SessionRun {
        pulsar: injected.pulsar,
        series,
        request: request.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::stub::StubBackend;
    use crate::backend::{FakePulsarBackend, ParFile};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn one_year_two_bands() -> SimulationRequest {
        SimulationRequest {
            cadence_days: 10.0,
            frequencies_mhz: vec![800.0, 1400.0],
            duration_years: 1.0,
            ..SimulationRequest::default()
        }
    }

    #[test]
    fn two_bands_over_a_year_give_72_sorted_rows() {
        let mut backend = FakePulsarBackend::new(Some(42), ParFile::default());
        let mut rng = StdRng::seed_from_u64(42);
        let run = simulate(&mut backend, &mut rng, &one_year_two_bands()).unwrap();

        assert_eq!(run.series.len(), 72);
        assert!(is_sorted(&run.series));
        assert_eq!(run.series.at_frequency(800.0).len(), 36);
        assert_eq!(run.series.at_frequency(1400.0).len(), 36);
        assert!(run.series.iter().all(|r| r.residual_us.is_finite()));
    }

    #[test]
    fn band_order_in_request_does_not_matter() {
        let mut request = one_year_two_bands();
        let mut a = StubBackend::default();
        let run_a = simulate(&mut a, &mut StdRng::seed_from_u64(1), &request).unwrap();

        request.frequencies_mhz.reverse();
        let mut b = StubBackend::default();
        let run_b = simulate(&mut b, &mut StdRng::seed_from_u64(1), &request).unwrap();

        assert_eq!(run_a.series.epochs(), run_b.series.epochs());
        assert_eq!(run_a.series.frequencies(), run_b.series.frequencies());
    }

    #[test]
    fn efac_scales_every_uncertainty() {
        let request = SimulationRequest {
            efac: 1.0,
            ..one_year_two_bands()
        };
        let scaled = SimulationRequest { efac: 3.0, ..request.clone() };

        let base = simulate(&mut StubBackend::default(), &mut StdRng::seed_from_u64(9), &request).unwrap();
        let run = simulate(&mut StubBackend::default(), &mut StdRng::seed_from_u64(9), &scaled).unwrap();
        for (a, b) in base.series.iter().zip(run.series.iter()) {
            assert!((b.uncertainty_us - 3.0 * a.uncertainty_us).abs() < 1e-9);
        }
    }

    #[test]
    fn invalid_request_never_reaches_the_backend() {
        let mut backend = StubBackend::default();
        let request = SimulationRequest {
            cadence_days: 1000.0,
            ..one_year_two_bands()
        };
        let err = simulate(&mut backend, &mut StdRng::seed_from_u64(0), &request).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(backend.calls.is_empty());
    }

    #[test]
    fn vanishing_cadence_is_an_error_not_a_panic() {
        let mut backend = StubBackend::default();
        let request = SimulationRequest {
            cadence_days: 1e-300,
            ..one_year_two_bands()
        };
        let err = simulate(&mut backend, &mut StdRng::seed_from_u64(0), &request).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(backend.calls.is_empty());
    }
}
