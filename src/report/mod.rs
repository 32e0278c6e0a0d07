//! Formatted terminal output for a completed simulation.
//!
//! We keep formatting code in one place so the simulation code stays free of
//! presentation and output changes are localized.

use chrono::{Duration, NaiveDate};

use crate::domain::{SimulationRequest, ToaSeries};

/// Per-frequency statistics of a residual series.
#[derive(Debug, Clone, PartialEq)]
pub struct BandStats {
    pub frequency_mhz: f64,
    pub toas: usize,
    /// `sqrt(Σ r²/σ² / Σ 1/σ²)` in µs.
    pub weighted_rms_us: f64,
    pub median_uncertainty_us: f64,
}

/// Calendar date of an MJD (days since 1858-11-17).
pub fn mjd_to_date(mjd: f64) -> Option<NaiveDate> {
    if !mjd.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1858, 11, 17)?;
    epoch.checked_add_signed(Duration::try_days(mjd.floor() as i64)?)
}

pub fn band_stats(series: &ToaSeries) -> Vec<BandStats> {
    series
        .unique_frequencies()
        .into_iter()
        .map(|f| {
            let rows = series.at_frequency(f);
            let (num, den) = rows.iter().fold((0.0, 0.0), |(num, den), r| {
                let w = 1.0 / (r.uncertainty_us * r.uncertainty_us);
                (num + w * r.residual_us * r.residual_us, den + w)
            });
            let mut errs: Vec<f64> = rows.iter().map(|r| r.uncertainty_us).collect();
            errs.sort_by(f64::total_cmp);
            let median = match errs.len() {
                0 => f64::NAN,
                n if n % 2 == 1 => errs[n / 2],
                n => 0.5 * (errs[n / 2 - 1] + errs[n / 2]),
            };
            BandStats {
                frequency_mhz: f,
                toas: rows.len(),
                weighted_rms_us: if den > 0.0 { (num / den).sqrt() } else { f64::NAN },
                median_uncertainty_us: median,
            }
        })
        .collect()
}

/// Format the run summary (request echo + data span + per-band table).
pub fn format_run_summary(series: &ToaSeries, request: &SimulationRequest) -> String {
    let mut out = String::new();

    out.push_str("=== pulsim - Simulated Pulsar Residuals ===\n");
    out.push_str(&format!(
        "Cadence: {} d | Span: {} yr | Mean S/N: {} | EFAC: {}\n",
        request.cadence_days, request.duration_years, request.mean_snr, request.efac
    ));
    out.push_str(&format!(
        "Red noise: log10 A={} gamma={} | DM noise: log10 A={} gamma={}\n",
        request.red_noise.log10_amplitude,
        request.red_noise.spectral_index,
        request.dm_noise.log10_amplitude,
        request.dm_noise.spectral_index,
    ));
    if let Some(seed) = request.seed {
        out.push_str(&format!("Seed: {seed}\n"));
    }

    if let Some((lo, hi)) = series.epoch_range() {
        out.push_str(&format!(
            "TOAs: n={} | MJD=[{lo:.3}, {hi:.3}] ({} to {})\n",
            series.len(),
            fmt_date(lo),
            fmt_date(hi),
        ));
    } else {
        out.push_str("TOAs: n=0\n");
    }

    out.push('\n');
    out.push_str(&format!(
        "{:>10} {:>6} {:>14} {:>14}\n",
        "freq_mhz", "toas", "wrms_us", "median_err_us"
    ));
    out.push_str(&format!("{:->10} {:->6} {:->14} {:->14}\n", "", "", "", ""));
    for b in band_stats(series) {
        out.push_str(&format!(
            "{:>10} {:>6} {:>14.4} {:>14.4}\n",
            b.frequency_mhz, b.toas, b.weighted_rms_us, b.median_uncertainty_us
        ));
    }

    out
}

fn fmt_date(mjd: f64) -> String {
    mjd_to_date(mjd)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "?".to_string())
}
