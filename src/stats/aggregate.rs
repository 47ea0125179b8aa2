//! Comparable-sales criteria and reduction

use super::types::MarketStatistics;
use crate::decode::CanonicalProperty;
use crate::query::{DateField, SearchCriteria};
use chrono::{Days, NaiveDate};

/// Default lookback window in days
pub const DEFAULT_LOOKBACK_DAYS: u32 = 90;

/// Result cap for comparable-sales searches
pub const COMPARABLE_MAX_RESULTS: u32 = 500;

/// Criteria for sold listings in `area` over the last `lookback_days`
///
/// A five-digit area is a zip code; anything else is a city.
pub fn comparable_sales_criteria(
    area: &str,
    property_type: Option<&str>,
    lookback_days: u32,
    today: NaiveDate,
) -> SearchCriteria {
    let area = area.trim();
    let mut criteria = SearchCriteria::new()
        .status("Sold")
        .max_results(COMPARABLE_MAX_RESULTS);

    criteria = if is_zip_code(area) {
        criteria.zip_code(area)
    } else {
        criteria.city(area)
    };
    if let Some(property_type) = property_type {
        criteria = criteria.property_type(property_type);
    }

    let since = today
        .checked_sub_days(Days::new(u64::from(lookback_days)))
        .unwrap_or(NaiveDate::MIN);
    criteria.dates(DateField::SaleDate, Some(since), None)
}

fn is_zip_code(area: &str) -> bool {
    area.len() == 5 && area.bytes().all(|b| b.is_ascii_digit())
}

/// Reduce sold listings into market statistics
pub fn aggregate(
    properties: &[CanonicalProperty],
    area: &str,
    lookback_days: u32,
) -> MarketStatistics {
    let mut prices: Vec<f64> = properties
        .iter()
        .filter_map(CanonicalProperty::effective_price)
        .map(|p| p as f64)
        .collect();
    let mut per_sqft: Vec<f64> = properties.iter().filter_map(|p| p.price_per_sqft).collect();
    let days: Vec<f64> = properties
        .iter()
        .filter_map(|p| p.days_on_market)
        .map(f64::from)
        .collect();

    let min_price = properties
        .iter()
        .filter_map(CanonicalProperty::effective_price)
        .min()
        .unwrap_or(0);
    let max_price = properties
        .iter()
        .filter_map(CanonicalProperty::effective_price)
        .max()
        .unwrap_or(0);

    MarketStatistics {
        area: area.to_string(),
        lookback: format!("last {lookback_days} days"),
        total_sales: properties.len(),
        median_price: median(&mut prices),
        mean_price: mean(&prices),
        median_price_per_sqft: median(&mut per_sqft),
        mean_days_on_market: mean(&days),
        min_price,
        max_price,
    }
}

/// Median of the values; zero when empty
pub fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Arithmetic mean; zero when empty
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
