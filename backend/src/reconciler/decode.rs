//! Turns an uploaded workbook into a header list and header-keyed data rows.
//!
//! Only the first worksheet is read. Row 1 is the header row; a header cell is
//! significant when it is non-empty after trimming, and cells under blank
//! headers are dropped from every row. CSV uploads go through the `csv` crate
//! with the delimiter guessed from the header line; every other format is
//! handed to `calamine`.

use super::error::ImportError;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use common::model::cell::{CellValue, SheetRow};
use common::model::import::ImportPreview;
use std::io::Cursor;

/// Rows shown to the user before an import is confirmed.
pub const PREVIEW_ROWS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSheet {
    /// Significant headers in sheet order.
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

impl DecodedSheet {
    pub fn preview(&self, limit: usize) -> ImportPreview {
        ImportPreview {
            headers: self.headers.clone(),
            rows: self.rows.iter().take(limit).cloned().collect(),
            total_rows: self.rows.len(),
        }
    }
}

/// Decodes `bytes`, choosing the reader from the file extension.
pub fn decode_workbook(bytes: &[u8], file_name: &str) -> Result<DecodedSheet, ImportError> {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".csv") || lower.ends_with(".tsv") || lower.ends_with(".txt") {
        decode_csv(bytes)
    } else {
        decode_spreadsheet(bytes)
    }
}

fn decode_spreadsheet(bytes: &[u8]) -> Result<DecodedSheet, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ImportError::Decode(e.to_string()))?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| ImportError::Decode(e.to_string()))?,
        None => return Err(ImportError::EmptyFile),
    };
    decode_range(&range)
}

pub(crate) fn decode_range(range: &Range<Data>) -> Result<DecodedSheet, ImportError> {
    let grid: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    project_grid(grid)
}

fn decode_csv(bytes: &[u8]) -> Result<DecodedSheet, ImportError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let header_line = bytes.split(|&b| b == b'\n').next().unwrap_or_default();
    let delimiter = detect_delimiter(&String::from_utf8_lossy(header_line));

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::Decode(e.to_string()))?;
        grid.push(
            record
                .iter()
                .map(|cell| {
                    if cell.is_empty() {
                        CellValue::Null
                    } else {
                        CellValue::Text(cell.to_string())
                    }
                })
                .collect(),
        );
    }
    project_grid(grid)
}

/// Picks whichever of `, ; \t |` occurs most often in the header line.
/// A line with none of them is a single column and reads as comma-separated.
fn detect_delimiter(header_line: &str) -> u8 {
    let mut best = (b',', 0);
    for candidate in [b',', b';', b'\t', b'|'] {
        let count = header_line.matches(candidate as char).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

/// Splits a cell grid into significant headers and header-keyed rows.
fn project_grid(grid: Vec<Vec<CellValue>>) -> Result<DecodedSheet, ImportError> {
    let mut grid = grid.into_iter();
    let header_row = grid.next().ok_or(ImportError::EmptyFile)?;

    let mut columns: Vec<(usize, String)> = Vec::new();
    for (idx, cell) in header_row.iter().enumerate() {
        let title = cell.to_string();
        if title.trim().is_empty() {
            continue;
        }
        let title = disambiguate(&columns, title);
        columns.push((idx, title));
    }

    let rows: Vec<SheetRow> = grid
        .map(|cells| {
            columns
                .iter()
                .map(|(idx, title)| (title.clone(), cells.get(*idx).cloned().unwrap_or_default()))
                .collect::<SheetRow>()
        })
        .filter(|row| !row.is_blank())
        .collect();

    if rows.is_empty() {
        return Err(ImportError::NoDataRows);
    }

    Ok(DecodedSheet {
        headers: columns.into_iter().map(|(_, title)| title).collect(),
        rows,
    })
}

/// Repeated header titles get `_1`, `_2`, ... so every column keeps its own key.
fn disambiguate(columns: &[(usize, String)], title: String) -> String {
    let taken = |candidate: &str| columns.iter().any(|(_, t)| t == candidate);
    if !taken(&title) {
        return title;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{}_{}", title, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) if dt.is_datetime() => excel_serial_to_datetime(dt.as_f64())
            .map(CellValue::Date)
            .unwrap_or(CellValue::Float(dt.as_f64())),
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .or_else(|_| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
            })
            .map(CellValue::Date)
            .unwrap_or_else(|_| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// Converts an Excel 1900-system serial number to a timestamp.
///
/// Serials below 60 predate Excel's phantom 1900-02-29 and are shifted by a day.
fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = if serial < 60.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::milliseconds(millis))
}
