//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - residuals: one glyph per frequency (`o s ^ D v * P X`)
//! - zero residual: `-` line

use crate::domain::ToaSeries;
use crate::plot::MarkerShape;

/// Render residual vs MJD for `frequencies` (others are left out).
pub fn render_ascii_plot(series: &ToaSeries, frequencies: &[f64], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let points: Vec<(f64, f64, char)> = frequencies
        .iter()
        .enumerate()
        .flat_map(|(i, &f)| {
            let glyph = MarkerShape::for_index(i).glyph();
            series
                .at_frequency(f)
                .into_iter()
                .map(move |r| (r.epoch_mjd, r.residual_us, glyph))
        })
        .collect();

    let (t_min, t_max) = extent(points.iter().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = extent(points.iter().map(|p| p.1)).unwrap_or((-1.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Zero line first so points overlay it.
    if y_min <= 0.0 && 0.0 <= y_max {
        let row = map_y(0.0, y_min, y_max, height);
        for cell in &mut grid[row] {
            *cell = '-';
        }
    }

    for &(t, y, glyph) in &points {
        let x = map_x(t, t_min, t_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][x] = glyph;
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: MJD=[{t_min:.2}, {t_max:.2}] | residual=[{y_min:.2}, {y_max:.2}] us\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    let legend: Vec<String> = frequencies
        .iter()
        .enumerate()
        .map(|(i, f)| format!("{} {f} MHz", MarkerShape::for_index(i).glyph()))
        .collect();
    out.push_str(&legend.join("  "));
    out.push('\n');

    out
}

/// `(min, max)` of the data, `None` if empty. A single value `v` spans
/// `[v - 0.5, v + 0.5]`.
fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !(lo.is_finite() && hi.is_finite()) {
        return None;
    }
    Some(if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) })
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}
