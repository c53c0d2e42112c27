//! Excel import/export for room rosters
//!
//! - `reader`: header-keyed rows from the first sheet of an uploaded file
//! - `template`: the blank roster offered for download
//! - `report`: per-row outcomes of a finished run

mod reader;
mod report;
mod template;

pub use reader::{SheetRow, read_roster_sheet};
pub use report::{build_results_workbook, write_results_report};
pub use template::{TEMPLATE_FILE_NAME, generate_template, write_template};
