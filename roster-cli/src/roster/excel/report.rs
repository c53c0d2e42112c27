//! Write the outcome of a batch run to an xlsx report

use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};
use std::path::Path;

use crate::roster::types::{BatchRun, RowResult, RowStatus, columns};

const RESULT_COLUMNS: [&str; 7] = [
    "Row",
    "Status",
    "Message",
    columns::ROOM_NO,
    columns::CURRENT_STUDENT,
    columns::TOTAL_CAPACITY,
    "Failure",
];

struct ReportFormats {
    header: Format,
    success: Format,
    failed: Format,
}

impl ReportFormats {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0x4472C4))
                .set_font_color(Color::White),
            success: Format::new().set_background_color(Color::RGB(0xC6EFCE)),
            failed: Format::new().set_background_color(Color::RGB(0xFFC7CE)),
        }
    }
}

fn write_result_row(
    sheet: &mut Worksheet,
    row: u32,
    result: &RowResult,
    formats: &ReportFormats,
) -> Result<()> {
    let format = match result.status {
        RowStatus::Success => &formats.success,
        RowStatus::Failed => &formats.failed,
    };

    let source = &result.source_row;
    let failure = result.failure.map(|f| f.to_string()).unwrap_or_default();

    sheet.write_number_with_format(row, 0, result.row_index as f64, format)?;
    sheet.write_string_with_format(row, 1, result.status.to_string(), format)?;
    sheet.write_string_with_format(row, 2, &result.message, format)?;
    sheet.write_string_with_format(row, 3, source.room_no.to_string(), format)?;
    sheet.write_string_with_format(row, 4, source.current_student.to_string(), format)?;
    sheet.write_string_with_format(row, 5, source.total_capacity.to_string(), format)?;
    sheet.write_string_with_format(row, 6, failure, format)?;
    Ok(())
}

/// Build the report workbook: a "Results" sheet with one row per processed
/// spreadsheet row and a "Summary" sheet with the run counters
pub fn build_results_workbook(run: &BatchRun) -> Result<Workbook> {
    let formats = ReportFormats::new();
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Results")?;

    for (col, name) in RESULT_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &formats.header)?;
    }
    sheet.set_column_width(2, 60)?;
    sheet.set_freeze_panes(1, 0)?;

    for (idx, result) in run.results.iter().enumerate() {
        write_result_row(sheet, (idx + 1) as u32, result, &formats)?;
    }

    let summary = workbook.add_worksheet();
    summary.set_name("Summary")?;
    summary.set_column_width(0, 22)?;

    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let counters = [
        ("Total records", run.total_records),
        ("Successful", run.successful_records),
        ("Failed", run.failed_records),
    ];

    for (idx, (label, value)) in counters.iter().enumerate() {
        summary.write_string_with_format(idx as u32, 0, *label, &formats.header)?;
        summary.write_number(idx as u32, 1, *value as f64)?;
    }
    summary.write_string_with_format(3, 0, "Generated", &formats.header)?;
    summary.write_string(3, 1, &generated)?;

    Ok(workbook)
}

/// Save the report to `path`
pub fn write_results_report(run: &BatchRun, path: &Path) -> Result<()> {
    let mut workbook = build_results_workbook(run)?;
    workbook
        .save(path)
        .with_context(|| format!("Failed to save report: {}", path.display()))?;

    log::info!(
        "Wrote report for {} rows to {}",
        run.results.len(),
        path.display()
    );
    Ok(())
}
