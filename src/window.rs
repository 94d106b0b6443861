//! Trailing-window filtering of the aggregated series.

use crate::aggregate::HourlyRow;

/// Window sizes (in days) the display layer offers.
pub const WINDOW_OPTIONS: [u32; 5] = [1, 3, 7, 14, 28];

const MS_PER_DAY: i64 = 86_400_000;

/// Returns the suffix of `series` inside the trailing `window_days` window.
///
/// The anchor is the last row's `sort_key` — the most recent known data, not
/// wall-clock now — so historical datasets filter correctly. The window is
/// the half-open interval `(anchor - days, anchor]`: a row exactly one full
/// window before the anchor falls outside it. Assumes `series` is sorted
/// ascending by `sort_key`, which `finalize` guarantees.
pub fn filter_window(series: &[HourlyRow], window_days: u32) -> &[HourlyRow] {
    let Some(last) = series.last() else {
        return series;
    };

    let lower_bound = last.sort_key - i64::from(window_days) * MS_PER_DAY;
    let start = series.partition_point(|row| row.sort_key <= lower_bound);
    &series[start..]
}
