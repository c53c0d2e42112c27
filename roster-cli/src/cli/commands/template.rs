//! `template` command

use anyhow::Result;
use clap::Args;
use colored::*;
use std::path::PathBuf;

use crate::roster::excel::{TEMPLATE_FILE_NAME, write_template};

#[derive(Args, Debug)]
pub struct TemplateArgs {
    /// Where to write the template
    #[arg(short, long, default_value = TEMPLATE_FILE_NAME)]
    pub output: PathBuf,
}

pub fn handle_template_command(args: TemplateArgs) -> Result<()> {
    write_template(&args.output)?;
    println!(
        "Template written to {}",
        args.output.display().to_string().cyan()
    );
    Ok(())
}
