//! CLI module
//!
//! Command-line interface for running the connector.
//!
//! # Commands
//!
//! - `login` - Log in and show the advertised endpoints
//! - `metadata` - Show the resolved field table
//! - `search` - Search listings
//! - `stats` - Summarize recent sold comparables

mod commands;
mod runner;

pub use commands::{Cli, Commands, CriteriaArgs, OutputFormat};
pub use runner::Runner;
