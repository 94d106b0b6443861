//! Summary statistics derived from an aggregated hourly series.

use crate::aggregate::HourlyRow;
use crate::sources::SourceKey;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Min/max/average of one metric's hourly values over the window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricStats {
    pub min: i64,
    pub max: i64,
    pub avg: f64,
}

/// Min/max/average of the hourly efficiency ratio (labels per unit labor).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EfficiencyStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// The calendar day with the greatest summed count for one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakDay {
    pub count: i64,
    pub date_label: String,
}

impl PeakDay {
    fn none() -> Self {
        PeakDay {
            count: 0,
            date_label: "N/A".to_string(),
        }
    }
}

/// Everything the KPI cards display for the selected window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub orders: MetricStats,
    pub labels: MetricStats,
    pub packers: MetricStats,
    pub pickers: MetricStats,
    pub efficiency: EfficiencyStats,
    pub peak_order_day: PeakDay,
    pub peak_label_day: PeakDay,
}

/// Computes summary statistics over a (usually window-filtered) series.
///
/// Pure function of its input; an empty series yields zeroed stats with
/// "N/A" peak-day labels rather than an error.
pub fn summarize(series: &[HourlyRow]) -> SummaryStats {
    SummaryStats {
        orders: metric_stats(series, SourceKey::Orders),
        labels: metric_stats(series, SourceKey::Labels),
        packers: metric_stats(series, SourceKey::Packers),
        pickers: metric_stats(series, SourceKey::Pickers),
        efficiency: efficiency_stats(series),
        peak_order_day: peak_day(series, SourceKey::Orders),
        peak_label_day: peak_day(series, SourceKey::Labels),
    }
}

/// Arithmetic mean. Returns 0.0 for empty input.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn metric_stats(series: &[HourlyRow], key: SourceKey) -> MetricStats {
    if series.is_empty() {
        return MetricStats::default();
    }

    let values: Vec<i64> = series.iter().map(|row| row.value(key)).collect();
    let as_f64: Vec<f64> = values.iter().map(|v| *v as f64).collect();

    MetricStats {
        min: values.iter().copied().min().unwrap_or(0),
        max: values.iter().copied().max().unwrap_or(0),
        avg: mean(&as_f64),
    }
}

/// Labels per unit labor, over hours with nonzero labor only. Zero-labor
/// hours are excluded outright, not counted as 0.
fn efficiency_stats(series: &[HourlyRow]) -> EfficiencyStats {
    let ratios: Vec<f64> = series
        .iter()
        .filter(|row| row.labor() > 0)
        .map(|row| row.value(SourceKey::Labels) as f64 / row.labor() as f64)
        .collect();

    if ratios.is_empty() {
        return EfficiencyStats::default();
    }

    EfficiencyStats {
        min: ratios.iter().copied().fold(f64::INFINITY, f64::min),
        max: ratios.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        avg: mean(&ratios),
    }
}

/// Groups rows by UTC calendar date, sums the metric per day, and returns
/// the day with the strictly greatest sum. Days iterate in ascending date
/// order, so a tie keeps the earliest day.
fn peak_day(series: &[HourlyRow], key: SourceKey) -> PeakDay {
    let mut day_totals: BTreeMap<NaiveDate, i64> = BTreeMap::new();

    for row in series {
        let Some(instant) = DateTime::<Utc>::from_timestamp_millis(row.sort_key) else {
            continue;
        };
        *day_totals.entry(instant.date_naive()).or_insert(0) += row.value(key);
    }

    let mut best: Option<(NaiveDate, i64)> = None;
    for (date, total) in day_totals {
        match best {
            Some((_, best_total)) if total <= best_total => {}
            _ => best = Some((date, total)),
        }
    }

    match best {
        Some((date, count)) => PeakDay {
            count,
            date_label: date.format("%a %-m/%-d/%Y").to_string(),
        },
        None => PeakDay::none(),
    }
}
