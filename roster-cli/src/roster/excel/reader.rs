//! Read roster rows from an xlsx workbook
//!
//! Only the first worksheet is read. Row 1 holds the column headers; every
//! following non-blank row becomes a [`SheetRow`] keyed by header name.

use anyhow::{Context, Result};
use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};
use std::collections::HashMap;
use std::io::Cursor;

use crate::roster::types::{CellValue, RosterRecord, columns};

/// One data row of the sheet, keyed by column header
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    /// Display row number: the first data row is 2
    pub row_index: usize,
    pub cells: HashMap<String, CellValue>,
}

impl SheetRow {
    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells.get(header)
    }

    /// Project the roster columns out of the row.
    ///
    /// Missing columns come through as empty cells and are rejected later by
    /// validation, so a bad header only fails the rows, not the file.
    pub fn to_record(&self) -> RosterRecord {
        let cell = |header: &str| self.get(header).cloned().unwrap_or_default();
        RosterRecord {
            room_no: cell(columns::ROOM_NO),
            current_student: cell(columns::CURRENT_STUDENT),
            total_capacity: cell(columns::TOTAL_CAPACITY),
        }
    }
}

/// Convert a calamine cell into a [`CellValue`]
fn cell_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Text(format!("{}", dt)),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}

/// Parse an in-memory xlsx file into header-keyed rows
pub fn read_roster_sheet(bytes: &[u8]) -> Result<Vec<SheetRow>> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .context("Failed to open spreadsheet (is it a valid .xlsx file?)")?;

    let range = workbook
        .worksheet_range_at(0)
        .context("Workbook contains no worksheets")?
        .context("Failed to read the first worksheet")?;

    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|c| cell_to_value(c).as_text().unwrap_or_default())
            .collect(),
        None => return Ok(Vec::new()),
    };

    let mut parsed = Vec::new();

    for row in rows {
        let mut cells = HashMap::new();

        for (col_idx, cell) in row.iter().enumerate() {
            let header = headers.get(col_idx).map(|s| s.as_str()).unwrap_or("");

            // Cells under an unnamed column cannot be addressed
            if header.is_empty() {
                continue;
            }

            let value = cell_to_value(cell);
            if value.is_blank() {
                continue;
            }

            cells.insert(header.to_string(), value);
        }

        // Skip blank rows
        if cells.is_empty() {
            continue;
        }

        parsed.push(SheetRow {
            row_index: parsed.len() + 2,
            cells,
        });
    }

    log::debug!(
        "Read {} data rows (headers: {})",
        parsed.len(),
        headers.join(", ")
    );

    Ok(parsed)
}
