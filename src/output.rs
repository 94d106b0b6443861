//! Emission of aggregated results for the display layer.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::aggregate::HourlyRow;
use crate::sources::SourceKey;
use crate::stats::SummaryStats;

/// Everything one run hands to the display layer: the window-filtered series
/// and the summary stats computed over it.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub window_days: u32,
    pub series: &'a [HourlyRow],
    pub stats: &'a SummaryStats,
}

/// Prints a value as pretty JSON on stdout, where the display front end
/// consumes it.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Exports the master series to a CSV file, one row per hour bucket with a
/// column per source. Overwrites any previous export.
pub fn write_series_csv(path: &str, series: &[HourlyRow]) -> Result<()> {
    debug!(path, rows = series.len(), "Writing series CSV");

    let mut writer = csv::WriterBuilder::new().from_path(path)?;

    let mut header = vec!["bucket_label".to_string(), "sort_key".to_string()];
    header.extend(SourceKey::ALL.iter().map(|key| key.as_str().to_string()));
    writer.write_record(&header)?;

    for row in series {
        let mut fields = vec![row.bucket_label.clone(), row.sort_key.to_string()];
        fields.extend(SourceKey::ALL.iter().map(|key| row.value(*key).to_string()));
        writer.write_record(&fields)?;
    }

    writer.flush()?;
    Ok(())
}
