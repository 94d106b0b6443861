//! Merging of per-source records into the master hourly series.

use crate::bucket::{HourBucket, bucket_timestamp};
use crate::parser::RawRecord;
use crate::sources::SourceKey;
use serde::Serialize;
use std::collections::HashMap;

/// One hour bucket of the aggregated series.
///
/// `values` always holds an entry for every configured [`SourceKey`] —
/// sources that contributed nothing to the hour read 0, never absent. The
/// per-source values serialize flattened to top-level fields, which is the
/// shape the rendering layer consumes.
#[derive(Debug, Clone, Serialize)]
pub struct HourlyRow {
    pub bucket_label: String,
    pub sort_key: i64,
    #[serde(flatten)]
    values: HashMap<SourceKey, i64>,
}

impl HourlyRow {
    fn new(bucket: HourBucket) -> Self {
        let mut values = HashMap::with_capacity(SourceKey::ALL.len());
        for key in SourceKey::ALL {
            values.insert(key, 0);
        }

        HourlyRow {
            bucket_label: bucket.label,
            sort_key: bucket.sort_key,
            values,
        }
    }

    pub fn value(&self, key: SourceKey) -> i64 {
        self.values.get(&key).copied().unwrap_or(0)
    }

    /// Total labor headcount (packers + pickers) for the hour.
    pub fn labor(&self) -> i64 {
        self.value(SourceKey::Packers) + self.value(SourceKey::Pickers)
    }
}

/// Ordered hourly series, non-decreasing in `sort_key`, one row per hour.
pub type MasterSeries = Vec<HourlyRow>;

/// Merges records from all sources into hourly rows.
///
/// Owns the hour-to-row map for the duration of one pipeline run and is
/// discarded with it; a refresh builds a fresh aggregator. Rows are keyed by
/// `sort_key` rather than label so hours a year apart never collapse into
/// one row.
#[derive(Debug, Default)]
pub struct SeriesAggregator {
    rows: HashMap<i64, HourlyRow>,
}

impl SeriesAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one source's records into the series. Records whose timestamp
    /// cannot be bucketed are dropped. Values landing in the same hour are
    /// summed, never overwritten.
    pub fn ingest(&mut self, key: SourceKey, records: &[RawRecord]) {
        for record in records {
            let Some(bucket) = bucket_timestamp(&record.timestamp) else {
                continue;
            };

            let row = self
                .rows
                .entry(bucket.sort_key)
                .or_insert_with(|| HourlyRow::new(bucket));

            if let Some(entry) = row.values.get_mut(&key) {
                *entry += record.value;
            }
        }
    }

    /// Consumes the aggregator and returns the series sorted ascending by
    /// `sort_key`.
    pub fn finalize(self) -> MasterSeries {
        let mut series: Vec<_> = self.rows.into_values().collect();
        series.sort_by_key(|row| row.sort_key);
        series
    }
}
