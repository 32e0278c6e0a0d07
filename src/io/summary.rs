//! Run-summary text file (`Parameter<TAB>Value` rows).

use std::fs;
use std::path::Path;

use crate::domain::SimulationRequest;
use crate::error::AppError;

/// Render the summary rows for a completed run.
pub fn format_summary(request: &SimulationRequest) -> String {
    let freqs: Vec<String> = request.frequencies_mhz.iter().map(|f| f.to_string()).collect();
    let red = &request.red_noise;
    let dm = &request.dm_noise;

    let rows = [
        ("Parameter".to_string(), "Value".to_string()),
        ("Cadence (days)".to_string(), request.cadence_days.to_string()),
        ("Frequencies (MHz)".to_string(), freqs.join(", ")),
        ("Total Time (years)".to_string(), request.duration_years.to_string()),
        ("Average S/N Value".to_string(), request.mean_snr.to_string()),
        ("EFAC Value".to_string(), request.efac.to_string()),
        (
            "Red Noise Amplitude".to_string(),
            format!("{:e} (log: {})", red.amplitude(), red.log10_amplitude),
        ),
        ("Red Noise Spectral Index".to_string(), red.spectral_index.to_string()),
        (
            "DM Noise Amplitude".to_string(),
            format!("{:e} (log: {})", dm.amplitude(), dm.log10_amplitude),
        ),
        ("DM Noise Spectral Index".to_string(), dm.spectral_index.to_string()),
    ];

    let mut out = String::new();
    for (k, v) in rows {
        out.push_str(&format!("{k}\t{v}\n"));
    }
    out
}

pub fn write_summary(path: &Path, request: &SimulationRequest) -> Result<(), AppError> {
    fs::write(path, format_summary(request))
        .map_err(|e| AppError::invalid(format!("Failed to write summary '{}': {e}", path.display())))
}
