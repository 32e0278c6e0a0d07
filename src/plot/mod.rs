//! Residual plots: a terminal preview and an SVG figure for export.
//!
//! Both color/mark frequencies the same way: the n-th plotted frequency gets
//! the n-th marker (cycling through eight shapes).

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;

use crate::domain::ToaSeries;
use crate::error::AppError;

/// Marker shapes, in the order they are handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Square,
    TriangleUp,
    Diamond,
    TriangleDown,
    Star,
    Plus,
    Cross,
}

impl MarkerShape {
    pub const ALL: [MarkerShape; 8] = [
        MarkerShape::Circle,
        MarkerShape::Square,
        MarkerShape::TriangleUp,
        MarkerShape::Diamond,
        MarkerShape::TriangleDown,
        MarkerShape::Star,
        MarkerShape::Plus,
        MarkerShape::Cross,
    ];

    /// Marker for the `index`-th plotted frequency.
    pub fn for_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    /// Terminal glyph.
    pub fn glyph(self) -> char {
        match self {
            MarkerShape::Circle => 'o',
            MarkerShape::Square => 's',
            MarkerShape::TriangleUp => '^',
            MarkerShape::Diamond => 'D',
            MarkerShape::TriangleDown => 'v',
            MarkerShape::Star => '*',
            MarkerShape::Plus => 'P',
            MarkerShape::Cross => 'X',
        }
    }

    /// Outline in pixel offsets around the marker center (`r` = half size).
    pub fn vertices(self, r: i32) -> Vec<(i32, i32)> {
        let h = (r / 3).max(1);
        match self {
            MarkerShape::Circle => (0..12)
                .map(|k| {
                    let a = k as f64 * std::f64::consts::PI / 6.0;
                    ((r as f64 * a.cos()).round() as i32, (r as f64 * a.sin()).round() as i32)
                })
                .collect(),
            MarkerShape::Square => vec![(-r, -r), (r, -r), (r, r), (-r, r)],
            MarkerShape::TriangleUp => vec![(0, -r), (r, r), (-r, r)],
            MarkerShape::Diamond => vec![(0, -r), (r, 0), (0, r), (-r, 0)],
            MarkerShape::TriangleDown => vec![(-r, -r), (r, -r), (0, r)],
            MarkerShape::Star => (0..10)
                .map(|k| {
                    let a = -std::f64::consts::FRAC_PI_2 + k as f64 * std::f64::consts::PI / 5.0;
                    let rad = if k % 2 == 0 { r as f64 } else { r as f64 * 0.45 };
                    ((rad * a.cos()).round() as i32, (rad * a.sin()).round() as i32)
                })
                .collect(),
            MarkerShape::Plus => vec![
                (-h, -r),
                (h, -r),
                (h, -h),
                (r, -h),
                (r, h),
                (h, h),
                (h, r),
                (-h, r),
                (-h, h),
                (-r, h),
                (-r, -h),
                (-h, -h),
            ],
            MarkerShape::Cross => vec![
                (-r, -r + h),
                (-r + h, -r),
                (0, -h),
                (r - h, -r),
                (r, -r + h),
                (h, 0),
                (r, r - h),
                (r - h, r),
                (0, h),
                (-r + h, r),
                (-r, r - h),
                (-h, 0),
            ],
        }
    }
}

/// Frequencies to plot: every distinct one, or just `only` if it is present.
pub fn select_frequencies(series: &ToaSeries, only: Option<f64>) -> Result<Vec<f64>, AppError> {
    match only {
        None => Ok(series.unique_frequencies()),
        Some(f) if series.contains_frequency(f) => Ok(vec![f]),
        Some(f) => Err(AppError::invalid(format!("Frequency {f} MHz not found in the data."))),
    }
}
