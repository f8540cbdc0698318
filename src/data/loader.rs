use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use calamine::{Data, ExcelDateTime, ExcelDateTimeType, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{Dataset, Record, Schema, UNKNOWN};

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Loader failures.  Both are recoverable: the caller substitutes an empty
/// [`Dataset`] and the rest of the pipeline short-circuits.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source file not found: {}", .0.display())]
    MissingSource(PathBuf),
    #[error("failed to read {}: {source:#}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the order table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` – first worksheet, header row first (recommended)
/// * `.csv`  – header row first
/// * `.json` – `[{ "Date": "...", "Status": "...", ... }, ...]`
///
/// Column names are whitespace-trimmed before matching; unknown columns are
/// ignored and missing ones simply leave their [`Schema`] flag unset.  Cell
/// coercion is lenient: unparsable dates become absent, blank categoricals
/// become [`UNKNOWN`].  Only a missing or unreadable *file* is an error.
pub fn load(path: &Path) -> Result<Dataset, LoadError> {
    if !path.exists() {
        return Err(LoadError::MissingSource(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let result = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" => load_workbook(path),
        "csv" => load_csv(path),
        "json" => load_json(path),
        other => Err(anyhow!("unsupported file extension: .{other}")),
    };

    result.map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Column detection
// ---------------------------------------------------------------------------

/// Indices of the known columns within a header row.
#[derive(Debug, Default, Clone, Copy)]
struct Columns {
    date: Option<usize>,
    status: Option<usize>,
    region: Option<usize>,
    segment: Option<usize>,
    volume: Option<usize>,
    revenue: Option<usize>,
}

impl Columns {
    fn from_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Self {
        let mut cols = Columns::default();
        for (idx, name) in headers.enumerate() {
            // First occurrence wins on duplicate headers.
            match name.trim() {
                "Date" => cols.date = cols.date.or(Some(idx)),
                "Status" => cols.status = cols.status.or(Some(idx)),
                "Region" => cols.region = cols.region.or(Some(idx)),
                "Customer_Segment" => cols.segment = cols.segment.or(Some(idx)),
                "Volume_Barrels" => cols.volume = cols.volume.or(Some(idx)),
                "Revenue_USD" => cols.revenue = cols.revenue.or(Some(idx)),
                _ => {}
            }
        }
        cols
    }

    fn schema(&self) -> Schema {
        Schema {
            has_date: self.date.is_some(),
            has_status: self.status.is_some(),
            has_region: self.region.is_some(),
            has_segment: self.segment.is_some(),
            has_volume: self.volume.is_some(),
            has_revenue: self.revenue.is_some(),
        }
    }
}

// ---------------------------------------------------------------------------
// Date coercion
// ---------------------------------------------------------------------------

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Lenient date parsing: anything unparsable is absent, never an error.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Excel loader
// ---------------------------------------------------------------------------

fn load_workbook(path: &Path) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let sheet_names = workbook.sheet_names().to_vec();
    let Some(sheet) = sheet_names.first() else {
        bail!("workbook contains no sheets");
    };

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| anyhow!("reading sheet '{sheet}': {e}"))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        // A sheet without even a header row is an empty dataset, not an error.
        return Ok(Dataset::empty());
    };

    let header_texts: Vec<String> = header_row.iter().map(cell_to_header).collect();
    let cols = Columns::from_headers(header_texts.iter().map(String::as_str));

    let mut records = Vec::new();
    for row in rows {
        records.push(Record {
            date: cols.date.and_then(|i| row.get(i)).and_then(cell_date),
            status: categorical_cell(cols.status, row),
            region: categorical_cell(cols.region, row),
            customer_segment: categorical_cell(cols.segment, row),
            volume_barrels: cols.volume.and_then(|i| row.get(i)).and_then(cell_number),
            revenue_usd: cols.revenue.and_then(|i| row.get(i)).and_then(cell_number),
        });
    }

    Ok(Dataset::from_records(records, cols.schema()))
}

fn cell_to_header(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|ndt| ndt.date()),
        // A date cell without a number format arrives as a bare serial number.
        Data::Float(serial) => ExcelDateTime::new(*serial, ExcelDateTimeType::DateTime, false)
            .as_datetime()
            .map(|ndt| ndt.date()),
        Data::String(s) | Data::DateTimeIso(s) => parse_date(s),
        _ => None,
    }
}

fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// `None` when the column is absent; otherwise always `Some`, backfilling
/// blank cells with [`UNKNOWN`].
fn categorical_cell(idx: Option<usize>, row: &[Data]) -> Option<String> {
    let idx = idx?;
    let text = match row.get(idx) {
        Some(Data::String(s)) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Some(Data::Int(i)) => Some(i.to_string()),
        Some(Data::Float(f)) => Some(f.to_string()),
        Some(Data::Bool(b)) => Some(b.to_string()),
        _ => None,
    };
    Some(text.unwrap_or_else(|| UNKNOWN.to_string()))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();
    let cols = Columns::from_headers(headers.iter());

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;
        records.push(Record {
            date: field(cols.date, &row).and_then(parse_date),
            status: categorical_field(cols.status, &row),
            region: categorical_field(cols.region, &row),
            customer_segment: categorical_field(cols.segment, &row),
            volume_barrels: field(cols.volume, &row).and_then(|s| s.trim().parse().ok()),
            revenue_usd: field(cols.revenue, &row).and_then(|s| s.trim().parse().ok()),
        });
    }

    Ok(Dataset::from_records(records, cols.schema()))
}

fn field<'a>(idx: Option<usize>, row: &'a csv::StringRecord) -> Option<&'a str> {
    idx.and_then(|i| row.get(i))
}

fn categorical_field(idx: Option<usize>, row: &csv::StringRecord) -> Option<String> {
    idx.map(|i| {
        let text = row.get(i).unwrap_or("").trim();
        if text.is_empty() {
            UNKNOWN.to_string()
        } else {
            text.to_string()
        }
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Date": "2024-01-15", "Status": "Completed", "Region": "West",
///     "Revenue_USD": 100.0 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let rows = root.as_array().context("expected top-level JSON array")?;

    // Column presence is the union of keys across all rows.
    let mut schema = Schema::default();
    for row in rows {
        if let Some(obj) = row.as_object() {
            for key in obj.keys() {
                match key.trim() {
                    "Date" => schema.has_date = true,
                    "Status" => schema.has_status = true,
                    "Region" => schema.has_region = true,
                    "Customer_Segment" => schema.has_segment = true,
                    "Volume_Barrels" => schema.has_volume = true,
                    "Revenue_USD" => schema.has_revenue = true,
                    _ => {}
                }
            }
        }
    }

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("row {i} is not a JSON object"))?;

        records.push(Record {
            date: json_get(obj, "Date").and_then(json_date),
            status: json_categorical(obj, "Status", schema.has_status),
            region: json_categorical(obj, "Region", schema.has_region),
            customer_segment: json_categorical(obj, "Customer_Segment", schema.has_segment),
            volume_barrels: json_get(obj, "Volume_Barrels").and_then(json_number),
            revenue_usd: json_get(obj, "Revenue_USD").and_then(json_number),
        });
    }

    Ok(Dataset::from_records(records, schema))
}

fn json_get<'a>(
    obj: &'a serde_json::Map<String, JsonValue>,
    name: &str,
) -> Option<&'a JsonValue> {
    obj.iter().find(|(k, _)| k.trim() == name).map(|(_, v)| v)
}

fn json_date(val: &JsonValue) -> Option<NaiveDate> {
    val.as_str().and_then(parse_date)
}

fn json_number(val: &JsonValue) -> Option<f64> {
    match val {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_categorical(
    obj: &serde_json::Map<String, JsonValue>,
    name: &str,
    column_present: bool,
) -> Option<String> {
    if !column_present {
        return None;
    }
    let text = json_get(obj, name).and_then(|v| match v {
        JsonValue::String(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    });
    Some(text.unwrap_or_else(|| UNKNOWN.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(name: &str, contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_is_reported_not_fatal() {
        let err = load(Path::new("no/such/orders.xlsx")).unwrap_err();
        assert!(matches!(err, LoadError::MissingSource(_)));
    }

    #[test]
    fn unsupported_extension_is_a_parse_error() {
        let (_dir, path) = write_temp("orders.txt", "whatever");
        let err = load(&path).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn corrupt_workbook_is_a_parse_error() {
        let (_dir, path) = write_temp("orders.xlsx", "this is not a zip archive");
        let err = load(&path).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn xlsx_cells_coerce_like_the_other_formats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.xlsx");

        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, title) in ["Date", "Status", "Region", "Revenue_USD"].iter().enumerate() {
            sheet.write_string(0, col as u16, *title).unwrap();
        }
        // Format-carrying date cell, blank status, string-typed revenue.
        let date_format = rust_xlsxwriter::Format::new().set_num_format("yyyy-mm-dd");
        let jan15 = rust_xlsxwriter::ExcelDateTime::from_ymd(2024, 1, 15).unwrap();
        sheet.write_datetime_with_format(1, 0, &jan15, &date_format).unwrap();
        sheet.write_string(1, 2, "West").unwrap();
        sheet.write_string(1, 3, "50").unwrap();
        // Date stored as a bare serial number (no cell format).
        sheet.write_number(2, 0, 45306.0).unwrap();
        sheet.write_string(2, 1, "Completed").unwrap();
        sheet.write_string(2, 2, "East").unwrap();
        sheet.write_number(2, 3, 100.0).unwrap();
        workbook.save(&path).unwrap();

        let ds = load(&path).unwrap();

        assert!(ds.schema.has_date);
        assert!(ds.schema.has_status);
        assert!(!ds.schema.has_volume);
        assert_eq!(ds.len(), 2);

        let expected = NaiveDate::from_ymd_opt(2024, 1, 15);
        assert_eq!(ds.records[0].date, expected);
        assert_eq!(ds.records[0].status.as_deref(), Some(UNKNOWN));
        assert_eq!(ds.records[0].revenue_usd, Some(50.0));
        assert_eq!(ds.records[1].date, expected);
        assert_eq!(ds.records[1].status.as_deref(), Some("Completed"));
        assert_eq!(ds.records[1].revenue_usd, Some(100.0));
        // No null categoricals after loading.
        assert!(ds.records.iter().all(|r| r.status.is_some()));
    }

    #[test]
    fn csv_headers_are_trimmed_and_blanks_become_unknown() {
        let (_dir, path) = write_temp(
            "orders.csv",
            " Date ,Status, Region ,Revenue_USD\n\
             2024-01-15,Completed,West,100\n\
             2024-01-20,,East,50\n\
             not-a-date,Pending,,75\n",
        );
        let ds = load(&path).unwrap();

        assert!(ds.schema.has_date);
        assert!(ds.schema.has_status);
        assert!(ds.schema.has_region);
        assert!(ds.schema.has_revenue);
        assert!(!ds.schema.has_volume);

        assert_eq!(ds.len(), 3);
        // No null categoricals after loading.
        assert!(ds.records.iter().all(|r| r.status.is_some()));
        assert_eq!(ds.records[1].status.as_deref(), Some(UNKNOWN));
        assert_eq!(ds.records[2].region.as_deref(), Some(UNKNOWN));
        // Unparsable date coerced to absent, row kept.
        assert_eq!(ds.records[2].date, None);
        assert_eq!(ds.records[2].revenue_usd, Some(75.0));
    }

    #[test]
    fn json_records_load_with_union_schema() {
        let (_dir, path) = write_temp(
            "orders.json",
            r#"[
                {"Date": "2024-01-15", "Status": "Completed", "Revenue_USD": 100},
                {"Date": "2024-02-01", "Status": null, "Region": "West"}
            ]"#,
        );
        let ds = load(&path).unwrap();

        assert!(ds.schema.has_region);
        assert_eq!(ds.records[0].region.as_deref(), Some(UNKNOWN));
        assert_eq!(ds.records[1].status.as_deref(), Some(UNKNOWN));
        assert_eq!(ds.records[0].revenue_usd, Some(100.0));
        assert_eq!(
            ds.date_range,
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
            ))
        );
    }

    #[test]
    fn date_formats_are_lenient() {
        assert_eq!(
            parse_date("2024-01-15 00:00:00"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            parse_date(" 2024/01/15 "),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(parse_date("soon"), None);
    }
}
