//! Import command handler

use anyhow::{Result, bail};
use colored::*;
use std::sync::Arc;
use std::time::Instant;

use super::ImportArgs;
use crate::api::RoomsClient;
use crate::config::{Config, FileStore, StoredCredentials};
use crate::roster::excel::write_results_report;
use crate::roster::{BatchRun, Importer, RowResult, RowStatus, SourceFile};

/// Print results that arrived since the last call; returns the new count
fn print_new_results(run: &BatchRun, printed: usize) -> usize {
    for result in run.results.iter().skip(printed) {
        print_result(result, run.processed(), run.total_records);
    }
    run.results.len().max(printed)
}

fn print_result(result: &RowResult, processed: usize, total: usize) {
    let progress = format!("[{}/{}]", processed, total).dimmed();
    let room = result.source_row.room_no.to_string();
    let room = if room.is_empty() { "-".to_string() } else { room };

    match result.status {
        RowStatus::Success => println!(
            "{} Row {} {} room {} - {}",
            progress,
            result.row_index,
            "✓".green(),
            room.bold(),
            result.message
        ),
        RowStatus::Failed => println!(
            "{} Row {} {} room {} - {}",
            progress,
            result.row_index,
            "✗".red(),
            room.bold(),
            result.message.red()
        ),
    }
}

fn print_summary(run: &BatchRun) {
    println!();
    println!("{}", "Import summary".bold());
    println!("  Total records: {}", run.total_records);
    println!(
        "  Successful:    {}",
        run.successful_records.to_string().green()
    );
    let failed = run.failed_records.to_string();
    println!(
        "  Failed:        {}",
        if run.failed_records > 0 { failed.red() } else { failed.normal() }
    );
}

/// Handle the import command: select the file, run the import, stream progress
pub async fn handle_import_command(args: ImportArgs, config: &Config) -> Result<()> {
    let file = SourceFile::from_path(&args.file)?;

    let credentials = StoredCredentials::new(FileStore::new(config.storage_file()));
    let importer = Importer::new(Arc::new(credentials));
    importer.select_file(&file)?;

    let client = RoomsClient::new(&config.api_base_url, config.request_timeout())?;

    if !args.json {
        println!(
            "Importing {} into {}",
            file.name.cyan(),
            client.base_url().bright_green()
        );
    }

    let start = Instant::now();
    let mut progress = importer.subscribe();
    let mut printed = 0;

    let import = importer.run_import(&file, &client);
    tokio::pin!(import);

    let outcome = loop {
        tokio::select! {
            outcome = &mut import => break outcome,
            Ok(()) = progress.changed() => {
                if !args.json {
                    let run = progress.borrow_and_update();
                    printed = print_new_results(&run, printed);
                }
            }
        }
    };

    let run = outcome?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print_new_results(&run, printed);
        print_summary(&run);
        println!(
            "  Elapsed:       {:.2}s",
            start.elapsed().as_secs_f64()
        );
    }

    if let Some(report_path) = &args.report {
        write_results_report(&run, report_path)?;
        if !args.json {
            println!("Report written to {}", report_path.display().to_string().cyan());
        }
    }

    if run.failed_records > 0 {
        bail!(
            "{} of {} rows failed - fix them and re-upload the file",
            run.failed_records,
            run.total_records
        );
    }

    Ok(())
}
