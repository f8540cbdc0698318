use std::collections::BTreeSet;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Well-known column values
// ---------------------------------------------------------------------------

/// Sentinel for a categorical cell that was blank in the source file.
pub const UNKNOWN: &str = "Unknown";

pub const STATUS_COMPLETED: &str = "Completed";
pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_CANCELLED: &str = "Cancelled";

// ---------------------------------------------------------------------------
// Record – one row of the source table
// ---------------------------------------------------------------------------

/// A single order (one row of the source spreadsheet).
///
/// Every field is optional because every source column is optional.  When a
/// categorical column *is* present the loader guarantees `Some` for every
/// row (blank cells become [`UNKNOWN`]); a `date` can still be `None` for an
/// unparsable cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
    pub region: Option<String>,
    pub customer_segment: Option<String>,
    pub volume_barrels: Option<f64>,
    pub revenue_usd: Option<f64>,
}

// ---------------------------------------------------------------------------
// Schema – which source columns exist
// ---------------------------------------------------------------------------

/// Capability flags decided once at load time.
///
/// A missing column silently disables every feature that depends on it; the
/// filter engine and aggregator consult these flags instead of re-probing
/// the rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Schema {
    pub has_date: bool,
    pub has_status: bool,
    pub has_region: bool,
    pub has_segment: bool,
    pub has_volume: bool,
    pub has_revenue: bool,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column summaries.
///
/// Loaded once per process and read-only afterwards; everything downstream
/// is derived from it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All orders (rows).
    pub records: Vec<Record>,
    /// Which of the six known columns the source actually had.
    pub schema: Schema,
    /// Distinct status values, sorted ascending.
    pub statuses: Vec<String>,
    /// Distinct region values, sorted ascending.
    pub regions: Vec<String>,
    /// `(min, max)` over all present dates, `None` when no row has one.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl Dataset {
    /// Build the column summaries from loaded records.
    pub fn from_records(records: Vec<Record>, schema: Schema) -> Self {
        let mut statuses: BTreeSet<String> = BTreeSet::new();
        let mut regions: BTreeSet<String> = BTreeSet::new();
        let mut date_range: Option<(NaiveDate, NaiveDate)> = None;

        for rec in &records {
            if let Some(s) = &rec.status {
                statuses.insert(s.clone());
            }
            if let Some(r) = &rec.region {
                regions.insert(r.clone());
            }
            if let Some(d) = rec.date {
                date_range = Some(match date_range {
                    Some((lo, hi)) => (lo.min(d), hi.max(d)),
                    None => (d, d),
                });
            }
        }

        Dataset {
            records,
            schema,
            statuses: statuses.into_iter().collect(),
            regions: regions.into_iter().collect(),
            date_range,
        }
    }

    /// An empty dataset, used when the source file is missing or unreadable.
    pub fn empty() -> Self {
        Dataset::default()
    }

    /// Number of orders.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn from_records_collects_sorted_distinct_values() {
        let schema = Schema {
            has_status: true,
            has_region: true,
            has_date: true,
            ..Schema::default()
        };
        let records = vec![
            Record {
                status: Some("Pending".into()),
                region: Some("West".into()),
                date: Some(date("2024-02-01")),
                ..Record::default()
            },
            Record {
                status: Some("Completed".into()),
                region: Some("East".into()),
                date: Some(date("2024-01-15")),
                ..Record::default()
            },
            Record {
                status: Some("Completed".into()),
                region: Some("West".into()),
                date: None,
                ..Record::default()
            },
        ];

        let ds = Dataset::from_records(records, schema);
        assert_eq!(ds.statuses, vec!["Completed".to_string(), "Pending".to_string()]);
        assert_eq!(ds.regions, vec!["East".to_string(), "West".to_string()]);
        assert_eq!(ds.date_range, Some((date("2024-01-15"), date("2024-02-01"))));
    }

    #[test]
    fn empty_dataset_has_no_summaries() {
        let ds = Dataset::empty();
        assert!(ds.is_empty());
        assert!(ds.statuses.is_empty());
        assert_eq!(ds.date_range, None);
    }
}
