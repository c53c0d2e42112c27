//! Subcommand implementations

pub mod auth;
pub mod import;
pub mod template;
pub mod validate;
