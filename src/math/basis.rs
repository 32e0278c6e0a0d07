//! Basis functions for timing-noise synthesis.
//!
//! Correlated noise is drawn as a sum of sinusoids at the harmonics `k / T` of
//! the observing span `T`:
//!
//! ```text
//! δt(t) = Σ_k a_k cos(2π k x) + b_k sin(2π k x),   x = (t - t0) / T
//! ```
//!
//! with `a_k, b_k ~ N(0, P(f_k))` and the power-law prior
//!
//! ```text
//! P(f) = A² yr² / (12 π² T) · f^(-γ)      (f in 1/yr, T in yr, P in s²)
//! ```

use std::f64::consts::PI;

use nalgebra::DMatrix;

/// Julian year in seconds.
pub const YEAR_S: f64 = 365.25 * 86400.0;

/// Fourier design matrix with columns `[cos(2πx), sin(2πx), cos(4πx), ...]`.
///
/// `epochs` are MJDs; they are normalized onto `[0, 1]` over their own span.
pub fn fourier_design(epochs: &[f64], components: usize) -> DMatrix<f64> {
    let (lo, hi) = span(epochs);
    let width = (hi - lo).max(f64::MIN_POSITIVE);

    DMatrix::from_fn(epochs.len(), 2 * components, |i, j| {
        let x = (epochs[i] - lo) / width;
        let k = (j / 2 + 1) as f64;
        let phase = 2.0 * PI * k * x;
        if j % 2 == 0 { phase.cos() } else { phase.sin() }
    })
}

/// Per-column prior variance (s²) for a power law over a span of `span_years`.
///
/// Columns pair up (cos, sin) at frequency `k / T`.
pub fn power_law_variances(amplitude: f64, gamma: f64, span_years: f64, components: usize) -> Vec<f64> {
    if !(span_years > 0.0) {
        return vec![0.0; 2 * components];
    }

    let norm = amplitude * amplitude * YEAR_S * YEAR_S / (12.0 * PI * PI * span_years);
    (0..2 * components)
        .map(|j| {
            let f = (j / 2 + 1) as f64 / span_years;
            norm * f.powf(-gamma)
        })
        .collect()
}

/// Quadratic timing-model design (offset, spin frequency, spin-down).
///
/// Time is measured in years from `reference_mjd` to keep columns well scaled.
pub fn spin_design(epochs: &[f64], reference_mjd: f64) -> DMatrix<f64> {
    DMatrix::from_fn(epochs.len(), 3, |i, j| {
        let dt = (epochs[i] - reference_mjd) / 365.25;
        dt.powi(j as i32)
    })
}

fn span(epochs: &[f64]) -> (f64, f64) {
    let lo = epochs.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = epochs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo.is_finite() && hi.is_finite() { (lo, hi) } else { (0.0, 0.0) }
}
