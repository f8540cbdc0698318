use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::filter::FilteredView;
use super::model::{Record, Schema};

/// Default file name offered when exporting the filtered table.
pub const EXPORT_FILE_NAME: &str = "filtered_orders.csv";

type CellFn = fn(&Record) -> String;

// Fixed column order; only schema-present columns are emitted.
const COLUMN_ORDER: &[(&str, fn(&Schema) -> bool, CellFn)] = &[
    ("Date", |s| s.has_date, |r| {
        r.date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }),
    ("Status", |s| s.has_status, |r| {
        r.status.clone().unwrap_or_default()
    }),
    ("Region", |s| s.has_region, |r| {
        r.region.clone().unwrap_or_default()
    }),
    ("Customer_Segment", |s| s.has_segment, |r| {
        r.customer_segment.clone().unwrap_or_default()
    }),
    ("Volume_Barrels", |s| s.has_volume, |r| {
        r.volume_barrels.map(|v| v.to_string()).unwrap_or_default()
    }),
    ("Revenue_USD", |s| s.has_revenue, |r| {
        r.revenue_usd.map(|v| v.to_string()).unwrap_or_default()
    }),
];

/// Serialize the filtered table as UTF-8 CSV.
///
/// Absent cells (missing dates, unfilled numerics) become empty fields so
/// the export round-trips through the CSV loader.
pub fn write_csv<W: Write>(view: &FilteredView, writer: W) -> Result<()> {
    let schema = view.dataset().schema;
    let mut out = csv::Writer::from_writer(writer);

    let columns: Vec<&(&str, fn(&Schema) -> bool, CellFn)> = COLUMN_ORDER
        .iter()
        .filter(|(_, present, _)| present(&schema))
        .collect();

    out.write_record(columns.iter().map(|(name, _, _)| *name))
        .context("writing CSV header")?;

    for rec in view.records() {
        out.write_record(columns.iter().map(|(_, _, cell)| cell(rec)))
            .context("writing CSV row")?;
    }

    out.flush().context("flushing CSV output")?;
    Ok(())
}

/// Write the filtered table to a file (the save-dialog path).
pub fn write_csv_file(view: &FilteredView, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(view, file)?;
    log::debug!("exported {} rows to {}", view.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::filter::{FilterSelection, apply};
    use crate::data::model::{Dataset, Record};

    #[test]
    fn export_emits_only_present_columns_in_fixed_order() {
        let schema = Schema {
            has_status: true,
            has_revenue: true,
            ..Schema::default()
        };
        let records = vec![
            Record {
                status: Some("Completed".into()),
                revenue_usd: Some(100.0),
                ..Record::default()
            },
            Record {
                status: Some("Pending".into()),
                revenue_usd: None,
                ..Record::default()
            },
        ];
        let ds = Dataset::from_records(records, schema);
        let view = apply(&ds, &FilterSelection::all_of(&ds));

        let mut buf = Vec::new();
        write_csv(&view, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(text, "Status,Revenue_USD\nCompleted,100\nPending,\n");
    }

    #[test]
    fn export_round_trips_through_the_csv_loader() {
        let schema = Schema {
            has_date: true,
            has_status: true,
            has_region: true,
            has_revenue: true,
            ..Schema::default()
        };
        let records = vec![
            Record {
                date: NaiveDate::from_ymd_opt(2024, 1, 15),
                status: Some("Completed".into()),
                region: Some("West".into()),
                revenue_usd: Some(100.5),
                ..Record::default()
            },
            Record {
                date: None,
                status: Some("Pending".into()),
                region: Some("East".into()),
                revenue_usd: Some(50.0),
                ..Record::default()
            },
        ];
        let ds = Dataset::from_records(records.clone(), schema);
        let mut sel = FilterSelection::all_of(&ds);
        // Drop the date bounds so the dateless row is exported too.
        sel.date_start = None;
        sel.date_end = None;
        let view = apply(&ds, &sel);
        assert_eq!(view.len(), 2);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILE_NAME);
        write_csv_file(&view, &path).unwrap();

        let reloaded = crate::data::loader::load(&path).unwrap();
        assert_eq!(reloaded.schema, schema);
        assert_eq!(reloaded.records[0], records[0]);
        assert_eq!(reloaded.records[1].date, None);
        assert_eq!(reloaded.records[1].revenue_usd, Some(50.0));
    }
}
