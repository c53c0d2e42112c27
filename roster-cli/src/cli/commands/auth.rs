//! `auth` commands: manage the token the importer sends

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;

use crate::config::{Config, FileStore, StoredCredentials};

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Store an access token (prompts when omitted)
    SetToken {
        /// JWT issued by the dormitory API
        token: Option<String>,
    },
    /// Show whether a token is stored
    Status,
    /// Remove any stored token
    Clear,
}

/// Show only the edges of a token
fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

pub fn handle_auth_command(command: AuthCommands, config: &Config) -> Result<()> {
    let store = FileStore::new(config.storage_file());
    let credentials = StoredCredentials::new(store);

    match command {
        AuthCommands::SetToken { token } => {
            let token = match token {
                Some(token) => token,
                None => rpassword::prompt_password("Access token: ")
                    .context("Failed to read token")?,
            };
            if token.trim().is_empty() {
                bail!("Token cannot be empty");
            }
            credentials.store_token(&token)?;
            println!(
                "{} Token saved to {}",
                "✓".green(),
                credentials.store().path().display()
            );
        }
        AuthCommands::Status => match credentials.find_token() {
            Some((key, token)) => println!(
                "{} Token found under '{}': {}",
                "✓".green(),
                key,
                mask_token(&token).dimmed()
            ),
            None => println!(
                "{} No token stored in {}",
                "✗".red(),
                credentials.store().path().display()
            ),
        },
        AuthCommands::Clear => {
            credentials.clear()?;
            println!("{} Token removed", "✓".green());
        }
    }

    Ok(())
}
