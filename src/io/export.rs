//! Export the combined series to CSV.
//!
//! One row per TOA, columns named after the record fields, so the file loads
//! straight into a spreadsheet or a dataframe.

use std::path::Path;

use crate::domain::ToaSeries;
use crate::error::AppError;

/// Write `series` to `path` (`epoch_mjd,residual_us,uncertainty_us,frequency_mhz`).
pub fn write_series_csv(path: &Path, series: &ToaSeries) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::invalid(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for record in series.iter() {
        writer
            .serialize(record)
            .map_err(|e| AppError::invalid(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::invalid(format!("Failed to write export CSV: {e}")))?;

    tracing::info!(path = %path.display(), rows = series.len(), "series exported");
    Ok(())
}
