//! Market statistics
//!
//! A canned sold-comparables search reduced to summary figures.

mod aggregate;
mod types;

pub use aggregate::{
    aggregate, comparable_sales_criteria, mean, median, COMPARABLE_MAX_RESULTS,
    DEFAULT_LOOKBACK_DAYS,
};
pub use types::MarketStatistics;

#[cfg(test)]
mod tests;
