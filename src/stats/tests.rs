//! Tests for the stats module

use super::*;
use crate::decode::CanonicalProperty;
use crate::query::DateField;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;

fn sold(sale_price: Option<u64>, list_price: Option<u64>, sqft: Option<u64>, dom: Option<u32>) -> CanonicalProperty {
    let mut property = CanonicalProperty {
        sale_price,
        list_price,
        square_feet: sqft,
        days_on_market: dom,
        ..CanonicalProperty::default()
    };
    property.price_per_sqft = property
        .effective_price()
        .zip(property.square_feet.filter(|a| *a > 0))
        .map(|(p, a)| p as f64 / a as f64);
    property
}

#[test]
fn test_comparable_criteria_for_city() {
    let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let criteria = comparable_sales_criteria("Austin", Some("Residential"), 90, today);

    assert_eq!(criteria.city.as_deref(), Some("Austin"));
    assert!(criteria.zip_codes.is_empty());
    assert_eq!(criteria.status.as_deref(), Some("Sold"));
    assert_eq!(criteria.property_type.as_deref(), Some("Residential"));
    assert_eq!(criteria.date_field, DateField::SaleDate);
    assert_eq!(criteria.date_from, NaiveDate::from_ymd_opt(2024, 4, 1));
    assert_eq!(criteria.date_to, None);
    assert_eq!(criteria.max_results, COMPARABLE_MAX_RESULTS);
}

#[test]
fn test_comparable_criteria_for_zip() {
    let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let criteria = comparable_sales_criteria("78701", None, 30, today);

    assert_eq!(criteria.zip_codes, vec!["78701".to_string()]);
    assert!(criteria.city.is_none());
    assert!(criteria.property_type.is_none());
}

#[test]
fn test_median_and_mean() {
    assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
    assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), 2.5);
    assert_eq!(median(&mut []), 0.0);
    assert_eq!(mean(&[1.0, 2.0, 6.0]), 3.0);
    assert_eq!(mean(&[]), 0.0);
}

#[test]
fn test_aggregate_empty_is_all_zero() {
    let stats = aggregate(&[], "Austin", 90);

    assert_eq!(
        stats,
        MarketStatistics {
            area: "Austin".to_string(),
            lookback: "last 90 days".to_string(),
            ..MarketStatistics::default()
        }
    );
}

#[test]
fn test_aggregate_falls_back_to_list_price() {
    let properties = vec![
        sold(Some(300_000), Some(310_000), Some(1500), Some(10)),
        sold(None, Some(400_000), Some(2000), Some(20)),
        sold(Some(500_000), None, None, None),
    ];
    let stats = aggregate(&properties, "78701", 60);

    assert_eq!(stats.total_sales, 3);
    assert_eq!(stats.median_price, 400_000.0);
    assert_eq!(stats.mean_price, 400_000.0);
    assert_eq!(stats.median_price_per_sqft, 200.0);
    assert_eq!(stats.mean_days_on_market, 15.0);
    assert_eq!(stats.min_price, 300_000);
    assert_eq!(stats.max_price, 500_000);
    assert_eq!(stats.lookback, "last 60 days");
}

#[test]
fn test_aggregate_counts_records_without_prices() {
    let properties = vec![sold(None, None, Some(1000), Some(5))];
    let stats = aggregate(&properties, "Austin", 90);

    assert_eq!(stats.total_sales, 1);
    assert_eq!(stats.median_price, 0.0);
    assert_eq!(stats.mean_days_on_market, 5.0);
}
