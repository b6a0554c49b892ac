//! CSV and spreadsheet ingest.
//!
//! Turns uploaded bytes into a [`Dataset`]: the first two columns are the
//! numeric x and y, every other column is carried along untouched so the
//! inlier/outlier downloads keep whole rows.
//!
//! Design goals:
//! - **Text decoding**: UTF-8 first, ISO-8859-1 when that fails
//! - **Workbooks**: first sheet via `calamine`, same row rules as CSV
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **No partial datasets**: anything unusable is a `Decode` error, never a
//!   half-filled table

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::{DateTime, Local};

use crate::domain::{Dataset, DatasetSource};
use crate::error::{AppError, CoreError};

/// Extensions read as workbooks; anything else is read as delimited text.
pub const WORKBOOK_EXTENSIONS: [&str; 5] = ["xls", "xlsx", "xlsm", "xlsb", "ods"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the dataset plus what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub dataset: Dataset,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// The bytes were not valid UTF-8 and were read as ISO-8859-1.
    pub latin1: bool,
}

impl IngestedData {
    pub fn rows_used(&self) -> usize {
        self.dataset.len()
    }
}

/// Decode an uploaded file into a dataset.
///
/// `file_name` only selects the format: `.xls`/`.xlsx`/`.ods` are read as
/// workbooks (first sheet), everything else as delimited text.
pub fn decode_dataset(bytes: &[u8], file_name: &str) -> Result<IngestedData, CoreError> {
    let is_workbook = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|w| ext.eq_ignore_ascii_case(w))
        });
    if is_workbook {
        decode_workbook(bytes, file_name)
    } else {
        decode_csv(bytes)
    }
}

fn decode_csv(bytes: &[u8]) -> Result<IngestedData, CoreError> {
    let (text, latin1) = decode_text(bytes);
    let text = text.trim_start_matches('\u{feff}');

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| CoreError::Decode(format!("failed to read CSV headers: {e}")))?;
    let mut table = TableBuilder::new(headers.iter().map(str::to_string).collect())?;

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line, lines are 1-based.
        let line = idx + 2;
        match result {
            Ok(record) => table.push(line, record.iter().map(str::to_string).collect()),
            Err(e) => table.reject(line, format!("CSV parse error: {e}")),
        }
    }

    table.finish(latin1)
}

/// First sheet of a workbook: header row, then data rows.
fn decode_workbook(bytes: &[u8], file_name: &str) -> Result<IngestedData, CoreError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| CoreError::Decode(format!("failed to open workbook '{file_name}': {e}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CoreError::Decode(format!("workbook '{file_name}' has no sheets")))?
        .map_err(|e| CoreError::Decode(format!("failed to read the first sheet: {e}")))?;

    // Sheet row of the first used row, 0-based.
    let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);
    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| CoreError::Decode("the first sheet is empty".to_string()))?;
    let mut table = TableBuilder::new(header.iter().map(cell_text).collect())?;

    for (idx, row) in rows.enumerate() {
        if row.iter().all(|c| matches!(c, Data::Empty)) {
            continue;
        }
        let line = first_row + idx + 2;
        table.push(line, row.iter().map(cell_text).collect());
    }

    table.finish(false)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(v) => v.to_string(),
        Data::Int(v) => v.to_string(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Accumulates parsed rows for either input format.
struct TableBuilder {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    x: Vec<f64>,
    y: Vec<f64>,
    row_errors: Vec<RowError>,
    rows_read: usize,
}

impl TableBuilder {
    fn new(columns: Vec<String>) -> Result<Self, CoreError> {
        if columns.len() < 2 {
            return Err(CoreError::Decode(format!(
                "expected at least two columns, found {}",
                columns.len()
            )));
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
            x: Vec::new(),
            y: Vec::new(),
            row_errors: Vec::new(),
            rows_read: 0,
        })
    }

    fn push(&mut self, line: usize, mut cells: Vec<String>) {
        self.rows_read += 1;
        match parse_xy(&cells) {
            Ok((xi, yi)) => {
                cells.resize(self.columns.len().max(cells.len()), String::new());
                self.rows.push(cells);
                self.x.push(xi);
                self.y.push(yi);
            }
            Err(message) => self.row_errors.push(RowError { line, message }),
        }
    }

    fn reject(&mut self, line: usize, message: String) {
        self.rows_read += 1;
        self.row_errors.push(RowError { line, message });
    }

    fn finish(self, latin1: bool) -> Result<IngestedData, CoreError> {
        if self.x.is_empty() {
            return Err(CoreError::Decode(format!(
                "no numeric rows in the first two columns ({} row(s) read)",
                self.rows_read
            )));
        }
        let dataset = Dataset::new(self.columns, self.rows, self.x, self.y)?;
        Ok(IngestedData {
            dataset,
            row_errors: self.row_errors,
            rows_read: self.rows_read,
            latin1,
        })
    }
}

/// Read `path` and decode it, tagging the dataset with the file name and
/// modification time.
pub fn load_dataset(path: &Path) -> Result<IngestedData, AppError> {
    let bytes = std::fs::read(path).map_err(|e| {
        AppError::new(2, format!("Failed to open '{}': {e}", path.display()))
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut ingested = decode_dataset(&bytes, &name)?;

    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(|t| DateTime::<Local>::from(t).naive_local());
    ingested.dataset = ingested
        .dataset
        .with_source(DatasetSource { name: name.clone(), modified });

    if ingested.latin1 {
        tracing::info!(file = %name, "input is not UTF-8; decoded as ISO-8859-1");
    }
    for err in &ingested.row_errors {
        tracing::debug!(file = %name, line = err.line, "{}", err.message);
    }
    tracing::info!(
        file = %name,
        rows_read = ingested.rows_read,
        rows_used = ingested.rows_used(),
        skipped = ingested.row_errors.len(),
        "dataset loaded"
    );

    Ok(ingested)
}

fn decode_text(bytes: &[u8]) -> (String, bool) {
    match std::str::from_utf8(bytes) {
        Ok(s) => (s.to_string(), false),
        // ISO-8859-1 maps every byte to the code point of the same value.
        Err(_) => (bytes.iter().map(|&b| b as char).collect(), true),
    }
}

fn parse_xy(cells: &[String]) -> Result<(f64, f64), String> {
    let x = parse_cell(cells.first().map(String::as_str), "x")?;
    let y = parse_cell(cells.get(1).map(String::as_str), "y")?;
    Ok((x, y))
}

fn parse_cell(cell: Option<&str>, what: &str) -> Result<f64, String> {
    let raw = cell.ok_or_else(|| format!("missing {what} value"))?;
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("{what} value '{raw}' is not a number"))?;
    if !v.is_finite() {
        return Err(format!("{what} value '{raw}' is not finite"));
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_first_two_columns_and_keeps_the_rest() {
        let csv = "Governor Demand,Generator MWG,Unit\n0,0,G1\n10.5,12,G1\n20,25.25,G2\n";
        let out = decode_dataset(csv.as_bytes(), "data.csv").unwrap();
        assert_eq!(out.dataset.columns(), &["Governor Demand", "Generator MWG", "Unit"]);
        assert_eq!(out.dataset.x(), &[0.0, 10.5, 20.0]);
        assert_eq!(out.dataset.y(), &[0.0, 12.0, 25.25]);
        assert_eq!(out.dataset.rows()[2][2], "G2");
        assert!(!out.latin1);
    }

    #[test]
    fn bad_rows_are_skipped_and_reported() {
        let csv = "x,y\n1,2\nfoo,3\n4\n5,6\n";
        let out = decode_dataset(csv.as_bytes(), "d.csv").unwrap();
        assert_eq!(out.dataset.len(), 2);
        assert_eq!(out.rows_read, 4);
        assert_eq!(out.row_errors.len(), 2);
        assert_eq!(out.row_errors[0].line, 3);
        assert_eq!(out.row_errors[1].line, 4);
    }

    #[test]
    fn latin1_fallback() {
        // "Température" in ISO-8859-1 (0xE9 is not valid UTF-8 on its own).
        let mut bytes = b"Temp\xe9rature,y\n".to_vec();
        bytes.extend_from_slice(b"1,2\n");
        let out = decode_dataset(&bytes, "d.csv").unwrap();
        assert!(out.latin1);
        assert_eq!(out.dataset.x_label(), "Température");
    }

    #[test]
    fn bom_is_stripped() {
        let csv = "\u{feff}a,b\n1,2\n";
        let out = decode_dataset(csv.as_bytes(), "d.csv").unwrap();
        assert_eq!(out.dataset.x_label(), "a");
    }

    #[test]
    fn unusable_input_is_a_decode_error() {
        assert!(matches!(
            decode_dataset(b"only\n1\n", "d.csv"),
            Err(CoreError::Decode(_))
        ));
        assert!(matches!(
            decode_dataset(b"x,y\na,b\n", "d.csv"),
            Err(CoreError::Decode(_))
        ));
        assert!(matches!(
            decode_dataset(b"PK\x03\x04", "book.xlsx"),
            Err(CoreError::Decode(_))
        ));
    }

    fn workbook_bytes() -> Vec<u8> {
        let mut book = rust_xlsxwriter::Workbook::new();
        let sheet = book.add_worksheet();
        sheet.write_string(0, 0, "Governor Demand").unwrap();
        sheet.write_string(0, 1, "Generator MWG").unwrap();
        sheet.write_string(0, 2, "Unit").unwrap();
        sheet.write_number(1, 0, 0.0).unwrap();
        sheet.write_number(1, 1, 0.0).unwrap();
        sheet.write_string(1, 2, "G1").unwrap();
        sheet.write_number(2, 0, 0.5).unwrap();
        sheet.write_number(2, 1, 42.25).unwrap();
        sheet.write_string(2, 2, "G2").unwrap();
        sheet.write_string(3, 0, "n/a").unwrap();
        sheet.write_number(3, 1, 7.0).unwrap();
        sheet.write_number(4, 0, 1.0).unwrap();
        sheet.write_number(4, 1, 110.0).unwrap();
        book.save_to_buffer().unwrap()
    }

    #[test]
    fn decodes_first_sheet_of_a_workbook() {
        let out = decode_dataset(&workbook_bytes(), "Unit Data.XLSX").unwrap();
        assert_eq!(out.dataset.columns(), &["Governor Demand", "Generator MWG", "Unit"]);
        assert_eq!(out.dataset.x(), &[0.0, 0.5, 1.0]);
        assert_eq!(out.dataset.y(), &[0.0, 42.25, 110.0]);
        assert_eq!(out.dataset.rows()[1][2], "G2");
        assert_eq!(out.dataset.rows()[2][2], "");
        assert_eq!(out.rows_read, 4);
        assert_eq!(out.row_errors.len(), 1);
        assert_eq!(out.row_errors[0].line, 4);
        assert!(!out.latin1);
    }
}
