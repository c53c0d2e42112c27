//! `import` command

mod handler;

pub use handler::handle_import_command;

use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Roster workbook (.xlsx) with "Room No", "Current Student" and "Total Capacity" columns
    pub file: PathBuf,

    /// Also write per-row results to this .xlsx file
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Print the finished run as JSON instead of progress lines
    #[arg(long)]
    pub json: bool,
}
