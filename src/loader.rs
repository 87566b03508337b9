use crate::error::{ComplianceError, Result};
use crate::types::{Cell, Dataset};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_empty: usize,
    pub columns: usize,
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string())
}

/// Sheet names of a workbook. A CSV file counts as one sheet named after
/// the file.
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    if is_csv(path) {
        return Ok(vec![file_stem(path)]);
    }
    let workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names();
    if names.is_empty() {
        return Err(ComplianceError::NoSheets);
    }
    Ok(names)
}

/// Load one sheet (the first when `sheet` is `None`) with its first row as
/// the header row.
pub fn load_sheet(path: &Path, sheet: Option<&str>) -> Result<(Dataset, LoadReport)> {
    let (name, headers, raw_rows) = if is_csv(path) {
        read_csv(path)?
    } else {
        read_workbook(path, sheet)?
    };

    let total_rows = raw_rows.len();
    let rows: Vec<Vec<Cell>> = raw_rows
        .into_iter()
        .filter(|r| r.iter().any(|c| *c != Cell::Empty))
        .collect();
    let report = LoadReport {
        total_rows,
        loaded_rows: rows.len(),
        skipped_empty: total_rows - rows.len(),
        columns: headers.len(),
    };
    debug!(skipped = report.skipped_empty, "dropped empty rows");
    info!(
        path = %path.display(),
        sheet = %name,
        rows = report.loaded_rows,
        columns = report.columns,
        "sheet loaded"
    );
    Ok((Dataset::new(name, headers, rows), report))
}

type RawSheet = (String, Vec<String>, Vec<Vec<Cell>>);

fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<RawSheet> {
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names();
    let name = match sheet {
        Some(s) => names
            .iter()
            .find(|n| n.as_str() == s)
            .cloned()
            .ok_or_else(|| ComplianceError::SheetNotFound(s.to_string()))?,
        None => names.first().cloned().ok_or(ComplianceError::NoSheets)?,
    };
    let range = workbook.worksheet_range(&name)?;
    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| ComplianceError::EmptySheet(name.clone()))?;
    let headers = header_names(header_row.iter().map(cell_from_data));
    let data: Vec<Vec<Cell>> = rows
        .map(|r| r.iter().map(cell_from_data).collect())
        .collect();
    Ok((name, headers, data))
}

fn read_csv(path: &Path) -> Result<RawSheet> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let name = file_stem(path);
    let header_record = rdr.headers()?.clone();
    if header_record.is_empty() {
        return Err(ComplianceError::EmptySheet(name));
    }
    let headers = header_names(header_record.iter().map(text_cell));
    let mut data: Vec<Vec<Cell>> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        data.push(record.iter().map(text_cell).collect());
    }
    Ok((name, headers, data))
}

/// Header strings; blank headers get a positional `Unnamed: n` name.
fn header_names(cells: impl Iterator<Item = Cell>) -> Vec<String> {
    cells
        .enumerate()
        .map(|(i, c)| {
            let h = c.header_text();
            if h.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                h
            }
        })
        .collect()
}

fn text_cell(s: &str) -> Cell {
    if s.trim().is_empty() {
        Cell::Empty
    } else {
        Cell::Text(s.to_string())
    }
}

fn cell_from_data(cell: &Data) -> Cell {
    match cell {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) => text_cell(s),
        Data::Float(v) => Cell::Number(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Bool(v) => Cell::Text(v.to_string()),
        Data::DateTime(v) => v
            .as_datetime()
            .map(Cell::Date)
            .unwrap_or(Cell::Number(v.as_f64())),
        Data::DateTimeIso(v) => parse_iso_datetime(v)
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Text(v.clone())),
        Data::DurationIso(v) => Cell::Text(v.clone()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
