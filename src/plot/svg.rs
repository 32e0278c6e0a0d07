//! SVG residual figure written into the export bundle.

use std::error::Error;
use std::fs;
use std::path::Path;

use plotters::prelude::*;

use crate::domain::ToaSeries;
use crate::error::AppError;
use crate::plot::MarkerShape;

const SIZE: (u32, u32) = (1200, 600);
const MARKER_RADIUS: i32 = 4;

/// Residual vs MJD with vertical error bars, one viridis color and marker per
/// frequency in `frequencies`.
pub fn write_residual_svg(path: &Path, series: &ToaSeries, frequencies: &[f64]) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::invalid(format!("Failed to create '{}': {e}", parent.display())))?;
    }

    draw(path, series, frequencies)
        .map_err(|e| AppError::new(4, format!("Failed to draw residual plot '{}': {e}", path.display())))?;

    tracing::debug!(path = %path.display(), "residual plot written");
    Ok(())
}

/// Color of the `index`-th of `count` frequencies, sampled evenly along viridis.
pub fn frequency_color(index: usize, count: usize) -> RGBColor {
    let t = if count > 1 { index as f32 / (count - 1) as f32 } else { 0.0 };
    ViridisRGB {}.get_color(t)
}

fn draw(path: &Path, series: &ToaSeries, frequencies: &[f64]) -> Result<(), Box<dyn Error>> {
    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let rows: Vec<_> = frequencies.iter().map(|&f| series.at_frequency(f)).collect();
    let (x_range, y_range) = bounds(&rows);

    let mut chart = ChartBuilder::on(&root)
        .caption("Simulated Residuals", ("sans-serif", 28).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc("MJD")
        .y_desc("Residual (µs)")
        .draw()?;

    for (i, (&freq, band)) in frequencies.iter().zip(&rows).enumerate() {
        let color = frequency_color(i, frequencies.len());
        let shape = MarkerShape::for_index(i);

        chart.draw_series(band.iter().map(|r| {
            ErrorBar::new_vertical(
                r.epoch_mjd,
                r.residual_us - r.uncertainty_us,
                r.residual_us,
                r.residual_us + r.uncertainty_us,
                color.stroke_width(1),
                6,
            )
        }))?;

        chart
            .draw_series(band.iter().map(|r| {
                EmptyElement::at((r.epoch_mjd, r.residual_us))
                    + Polygon::new(shape.vertices(MARKER_RADIUS), color.filled())
            }))?
            .label(format!("{freq} MHz"))
            .legend(move |(x, y)| {
                EmptyElement::at((x + 10, y)) + Polygon::new(shape.vertices(MARKER_RADIUS), color.filled())
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

fn bounds(rows: &[Vec<crate::domain::ToaRecord>]) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    for r in rows.iter().flatten() {
        x = (x.0.min(r.epoch_mjd), x.1.max(r.epoch_mjd));
        y = (
            y.0.min(r.residual_us - r.uncertainty_us),
            y.1.max(r.residual_us + r.uncertainty_us),
        );
    }
    (padded(x, 0.02, 1.0), padded(y, 0.05, 1.0))
}

fn padded((lo, hi): (f64, f64), frac: f64, fallback: f64) -> std::ops::Range<f64> {
    if !(lo.is_finite() && hi.is_finite()) {
        return -fallback..fallback;
    }
    let pad = ((hi - lo) * frac).max(1e-9);
    if hi > lo { (lo - pad)..(hi + pad) } else { (lo - fallback)..(hi + fallback) }
}
