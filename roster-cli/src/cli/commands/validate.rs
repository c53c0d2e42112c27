//! `validate` command: dry run without a token or any request

use anyhow::{Result, bail};
use clap::Args;
use colored::*;
use std::path::PathBuf;

use crate::roster::{SourceFile, preview_file};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Roster workbook (.xlsx) to check
    pub file: PathBuf,
}

pub fn handle_validate_command(args: ValidateArgs) -> Result<()> {
    let file = SourceFile::from_path(&args.file)?;
    let rows = preview_file(&file)?;

    let mut invalid = 0;
    for row in &rows {
        match &row.outcome {
            Ok(room) => println!(
                "Row {} {} room {} ({}/{})",
                row.row_index,
                "✓".green(),
                room.room_no.bold(),
                room.current_student,
                room.total_capacity
            ),
            Err(e) => {
                invalid += 1;
                println!(
                    "Row {} {} {}",
                    row.row_index,
                    "✗".red(),
                    e.to_string().red()
                );
            }
        }
    }

    println!();
    println!(
        "{} rows checked, {} valid, {} invalid",
        rows.len(),
        (rows.len() - invalid).to_string().green(),
        invalid.to_string().red()
    );

    if invalid > 0 {
        bail!("{} of {} rows would be rejected", invalid, rows.len());
    }
    Ok(())
}
