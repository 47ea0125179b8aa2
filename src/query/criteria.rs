//! Search criteria

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default cap on returned records
pub const DEFAULT_MAX_RESULTS: u32 = 100;

/// Which listing date a date range applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    #[default]
    ListDate,
    SaleDate,
}

/// Structured search request
///
/// Every filter is optional; unset filters produce no condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchCriteria {
    pub property_type: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_codes: Vec<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub min_bedrooms: Option<u32>,
    pub max_bedrooms: Option<u32>,
    pub min_bathrooms: Option<f64>,
    pub max_bathrooms: Option<f64>,
    pub min_square_feet: Option<u64>,
    pub max_square_feet: Option<u64>,
    pub min_lot_size: Option<f64>,
    pub max_lot_size: Option<f64>,
    pub min_year_built: Option<i32>,
    pub max_year_built: Option<i32>,
    pub status: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub date_field: DateField,
    /// Cap on returned records
    pub max_results: u32,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            property_type: None,
            city: None,
            state: None,
            zip_codes: Vec::new(),
            min_price: None,
            max_price: None,
            min_bedrooms: None,
            max_bedrooms: None,
            min_bathrooms: None,
            max_bathrooms: None,
            min_square_feet: None,
            max_square_feet: None,
            min_lot_size: None,
            max_lot_size: None,
            min_year_built: None,
            max_year_built: None,
            status: None,
            date_from: None,
            date_to: None,
            date_field: DateField::default(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl SearchCriteria {
    /// Criteria with no filters
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn property_type(mut self, property_type: impl Into<String>) -> Self {
        self.property_type = Some(property_type.into());
        self
    }

    #[must_use]
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Add one zip code to the alternatives
    #[must_use]
    pub fn zip_code(mut self, zip: impl Into<String>) -> Self {
        self.zip_codes.push(zip.into());
        self
    }

    /// Set both price bounds
    #[must_use]
    pub fn price(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    #[must_use]
    pub fn min_price(mut self, price: u64) -> Self {
        self.min_price = Some(price);
        self
    }

    #[must_use]
    pub fn max_price(mut self, price: u64) -> Self {
        self.max_price = Some(price);
        self
    }

    #[must_use]
    pub fn bedrooms(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_bedrooms = min;
        self.max_bedrooms = max;
        self
    }

    #[must_use]
    pub fn min_bedrooms(mut self, bedrooms: u32) -> Self {
        self.min_bedrooms = Some(bedrooms);
        self
    }

    #[must_use]
    pub fn bathrooms(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_bathrooms = min;
        self.max_bathrooms = max;
        self
    }

    #[must_use]
    pub fn square_feet(mut self, min: Option<u64>, max: Option<u64>) -> Self {
        self.min_square_feet = min;
        self.max_square_feet = max;
        self
    }

    #[must_use]
    pub fn lot_size(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_lot_size = min;
        self.max_lot_size = max;
        self
    }

    #[must_use]
    pub fn year_built(mut self, min: Option<i32>, max: Option<i32>) -> Self {
        self.min_year_built = min;
        self.max_year_built = max;
        self
    }

    #[must_use]
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Restrict `field` to the given date window
    ///
    /// Both bounds compile to `from-to`, a lower bound alone to `from+` and an
    /// upper bound alone to `to-` (on or before).
    #[must_use]
    pub fn dates(mut self, field: DateField, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_field = field;
        self.date_from = from;
        self.date_to = to;
        self
    }

    #[must_use]
    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }
}
