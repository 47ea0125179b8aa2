//! Statistics types

use serde::{Deserialize, Serialize};

/// Summary of recent comparable sales for one area
///
/// An area with no sales yields zero counts and zero aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketStatistics {
    /// City or zip code queried
    pub area: String,
    /// Human-readable lookback window, e.g. "last 90 days"
    pub lookback: String,
    pub total_sales: usize,
    /// Median of sale price, falling back to list price
    pub median_price: f64,
    pub mean_price: f64,
    pub median_price_per_sqft: f64,
    pub mean_days_on_market: f64,
    pub min_price: u64,
    pub max_price: u64,
}
