//! tempo2 `FORMAT 1` TOA (`.tim`) files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::AppError;

const SECONDS_PER_DAY: f64 = 86400.0;

/// One TOA line.
#[derive(Debug, Clone, Copy)]
pub struct TimLine {
    pub epoch_mjd: f64,
    /// Offset of the arrival time from `epoch_mjd`, in seconds.
    pub delay_s: f64,
    pub error_us: f64,
    pub frequency_mhz: f64,
}

/// Write a `FORMAT 1` tim file with a `-fe` flag naming the band.
pub fn write_tim(path: &Path, name: &str, site: &str, lines: &[TimLine]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::invalid(format!("Failed to create tim file '{}': {e}", path.display())))?;
    let mut w = BufWriter::new(file);
    let io_err = |e: std::io::Error| AppError::invalid(format!("Failed to write tim file: {e}"));

    writeln!(w, "FORMAT 1").map_err(io_err)?;
    writeln!(w, "MODE 1").map_err(io_err)?;
    for line in lines {
        writeln!(
            w,
            " {name} {:.6} {} {:.5} {site} -fe {:.0}",
            line.frequency_mhz,
            format_mjd(line.epoch_mjd, line.delay_s),
            line.error_us,
            line.frequency_mhz,
        )
        .map_err(io_err)?;
    }
    w.flush().map_err(io_err)?;
    Ok(())
}

/// Format `epoch + delay` as an MJD with 13 fractional digits.
///
/// The integer day is split off before adding the delay so sub-microsecond
/// offsets survive (an `f64` MJD near 56658 only resolves ~1 µs).
pub fn format_mjd(epoch_mjd: f64, delay_s: f64) -> String {
    let mut day = epoch_mjd.floor();
    let mut frac = (epoch_mjd - day) + delay_s / SECONDS_PER_DAY;
    while frac < 0.0 {
        frac += 1.0;
        day -= 1.0;
    }
    while frac >= 1.0 {
        frac -= 1.0;
        day += 1.0;
    }

    let mut frac_str = format!("{frac:.13}");
    if frac_str.starts_with('1') {
        day += 1.0;
        frac_str = format!("{:.13}", 0.0);
    }
    format!("{}{}", day as i64, &frac_str[1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mjd_keeps_fractional_precision() {
        assert_eq!(format_mjd(56658.0, 0.0), "56658.0000000000000");
        assert_eq!(format_mjd(56658.5, 8.64), "56658.5001000000000");
    }

    #[test]
    fn negative_delay_borrows_a_day() {
        assert_eq!(format_mjd(56658.0, -43200.0), "56657.5000000000000");
    }

    #[test]
    fn tim_file_has_header_and_one_line_per_toa() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.tim");
        let lines = [
            TimLine {
                epoch_mjd: 56658.0,
                delay_s: 0.0,
                error_us: 0.05,
                frequency_mhz: 1400.0,
            },
            TimLine {
                epoch_mjd: 56668.0,
                delay_s: 1e-6,
                error_us: 0.06,
                frequency_mhz: 800.0,
            },
        ];
        write_tim(&path, "J0000+0000", "@", &lines).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let rows: Vec<&str> = text.lines().collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], "FORMAT 1");
        assert_eq!(rows[2], " J0000+0000 1400.000000 56658.0000000000000 0.05000 @ -fe 1400");
        assert!(rows[3].contains(" 800.000000 56668.00000000001"));
    }
}
