//! Command-line interface

pub mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;
use commands::auth::{AuthCommands, handle_auth_command};
use commands::import::{ImportArgs, handle_import_command};
use commands::template::{TemplateArgs, handle_template_command};
use commands::validate::{ValidateArgs, handle_validate_command};

#[derive(Parser, Debug)]
#[command(name = "roster-cli", version, about = "Bulk-load room rosters into the dormitory management API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// API base URL (overrides config and ROSTER_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a roster workbook and submit every valid row
    Import(ImportArgs),
    /// Check a roster workbook locally without submitting anything
    Validate(ValidateArgs),
    /// Write a blank roster template
    Template(TemplateArgs),
    /// Manage the stored access token
    #[command(subcommand)]
    Auth(AuthCommands),
}

/// Load configuration, apply CLI overrides and dispatch
pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    log::debug!("Using configuration: {:?}", config);

    match cli.command {
        Commands::Import(args) => handle_import_command(args, &config).await,
        Commands::Validate(args) => handle_validate_command(args),
        Commands::Template(args) => handle_template_command(args),
        Commands::Auth(command) => handle_auth_command(command, &config),
    }
}
