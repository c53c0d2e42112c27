//! Blank roster template with a few example rows

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

use crate::roster::types::columns;

/// File name offered for the downloaded template
pub const TEMPLATE_FILE_NAME: &str = "room_template.xlsx";

/// (Room No, Current Student, Total Capacity)
const SAMPLE_ROWS: [(&str, u32, u32); 3] = [("101", 2, 4), ("102", 0, 3), ("A201", 1, 2)];

fn build_template() -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Rooms")?;

    let header_format = Format::new().set_bold();

    for (col, header) in columns::ALL.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        sheet.set_column_width(col as u16, 18)?;
    }

    for (idx, (room_no, current, total)) in SAMPLE_ROWS.iter().enumerate() {
        let row = (idx + 1) as u32;
        // Room numbers stay text so values like "A201" and "007" survive
        sheet.write_string(row, 0, *room_no)?;
        sheet.write_number(row, 1, *current)?;
        sheet.write_number(row, 2, *total)?;
    }

    Ok(workbook)
}

/// Build the template as an in-memory xlsx file
pub fn generate_template() -> Result<Vec<u8>> {
    build_template()?
        .save_to_buffer()
        .context("Failed to generate template workbook")
}

/// Write the template to disk
pub fn write_template(path: &Path) -> Result<()> {
    let bytes = generate_template()?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write template: {}", path.display()))
}
