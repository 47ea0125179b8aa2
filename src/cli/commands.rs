//! CLI commands and argument parsing

use crate::query::DEFAULT_MAX_RESULTS;
use crate::stats::DEFAULT_LOOKBACK_DAYS;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// RETS connector CLI
#[derive(Parser, Debug)]
#[command(name = "rets-connector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Password, overriding the configuration file
    #[arg(long, global = true, env = "RETS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and show the advertised endpoints
    Login,

    /// Log in and show the resolved field table
    Metadata,

    /// Search listings
    Search {
        #[command(flatten)]
        criteria: CriteriaArgs,

        /// Full criteria as JSON (overrides the filter flags)
        #[arg(long)]
        criteria_json: Option<String>,

        /// Print the raw response body instead of normalized records
        #[arg(long)]
        raw: bool,
    },

    /// Summarize recent sold comparables
    Stats {
        /// City, or a five-digit zip code
        area: String,

        /// Property type filter
        #[arg(long)]
        property_type: Option<String>,

        /// Days of sales history to include
        #[arg(long, default_value_t = DEFAULT_LOOKBACK_DAYS)]
        lookback_days: u32,
    },
}

/// Search filters
#[derive(Args, Debug, Default, Clone)]
pub struct CriteriaArgs {
    #[arg(long)]
    pub property_type: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub state: Option<String>,

    /// Zip codes (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub zip: Vec<String>,

    #[arg(long)]
    pub min_price: Option<u64>,

    #[arg(long)]
    pub max_price: Option<u64>,

    #[arg(long)]
    pub min_beds: Option<u32>,

    #[arg(long)]
    pub max_beds: Option<u32>,

    #[arg(long)]
    pub min_baths: Option<f64>,

    #[arg(long)]
    pub max_baths: Option<f64>,

    #[arg(long)]
    pub min_sqft: Option<u64>,

    #[arg(long)]
    pub max_sqft: Option<u64>,

    #[arg(long)]
    pub status: Option<String>,

    /// Listed on or after (YYYY-MM-DD)
    #[arg(long)]
    pub listed_since: Option<chrono::NaiveDate>,

    /// Maximum records to return
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    pub limit: u32,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON
    Json,
    /// Indented JSON
    Pretty,
}
