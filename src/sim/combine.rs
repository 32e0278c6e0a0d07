//! Merge per-frequency series into one time-ordered series.

use std::cmp::Ordering;

use crate::domain::{ToaRecord, ToaSeries};

/// Concatenate every row and stable-sort by `(epoch, frequency)` ascending.
///
/// Coincident epochs are kept; rows equal in both keys keep their input order.
pub fn combine(series: Vec<ToaSeries>) -> ToaSeries {
    let total = series.iter().map(ToaSeries::len).sum();
    let mut records = Vec::with_capacity(total);
    for s in series {
        records.extend(s.records);
    }
    sort_records(&mut records);
    ToaSeries::new(records)
}

/// Stable sort by epoch, then frequency (total order, so NaNs sort last).
pub fn sort_records(records: &mut [ToaRecord]) {
    records.sort_by(compare);
}

fn compare(a: &ToaRecord, b: &ToaRecord) -> Ordering {
    a.epoch_mjd
        .total_cmp(&b.epoch_mjd)
        .then_with(|| a.frequency_mhz.total_cmp(&b.frequency_mhz))
}

/// `true` if rows are non-decreasing in `(epoch, frequency)`.
pub fn is_sorted(series: &ToaSeries) -> bool {
    series.records.windows(2).all(|w| compare(&w[0], &w[1]) != Ordering::Greater)
}
