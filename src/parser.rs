//! Lenient parser for the two-column metric feed CSVs.

use serde::Serialize;

/// One timestamped count parsed from a feed line. Transient; consumed by the
/// aggregator and not retained after bucketing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecord {
    pub timestamp: String,
    pub value: i64,
}

/// Parses a feed payload into records, degrading row by row.
///
/// The first line is always treated as a header and discarded. Each remaining
/// line contributes a record from its first two fields (extra fields are
/// ignored); lines with fewer than two fields are dropped, as are rows whose
/// timestamp is empty after trimming. A value that does not parse as an
/// integer becomes 0. Malformed input never fails the parse as a whole.
pub fn parse_records(text: &str) -> Vec<RawRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    let mut first = true;

    for row in reader.records() {
        // A row that fails CSV framing is dropped like any other bad row.
        let row = match row {
            Ok(row) => row,
            Err(_) => continue,
        };

        if first {
            first = false;
            continue;
        }

        if row.len() < 2 {
            continue;
        }

        let timestamp = row.get(0).unwrap_or("").trim().trim_matches('"').trim();
        if timestamp.is_empty() {
            continue;
        }

        let value = row
            .get(1)
            .unwrap_or("")
            .trim()
            .trim_matches('"')
            .trim()
            .parse::<i64>()
            .unwrap_or(0);

        records.push(RawRecord {
            timestamp: timestamp.to_string(),
            value,
        });
    }

    records
}
