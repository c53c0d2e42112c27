//! Room roster importer for the dormitory management API

pub mod api;
pub mod cli;
pub mod config;
pub mod roster;
