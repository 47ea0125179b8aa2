//! Decoder types
//!
//! Defines the response format variants and the canonical property record.

use crate::types::RawRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default column delimiter of compact responses (tab)
pub const DEFAULT_DELIMITER: char = '\t';

/// Shape of a search or metadata response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// `<RETS>` envelope with `<DELIMITER>`, `<COLUMNS>` and `<DATA>` rows
    CompactXml {
        /// Column delimiter announced by the `<DELIMITER>` element
        delimiter: char,
    },
    /// Header line followed by one record per line, tab separated
    #[default]
    Tabular,
}

/// Records decoded from one response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedRecords {
    /// Format the body was decoded as
    pub format: ResponseFormat,
    /// Column tokens in response order
    pub columns: Vec<String>,
    /// One token → value map per well-formed row
    pub records: Vec<RawRecord>,
    /// Rows dropped because they could not be aligned with the header
    pub skipped: usize,
}

impl DecodedRecords {
    /// Number of decoded records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records were decoded
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A listing in the canonical property schema
///
/// Numeric and date fields hold parsed values or nothing; absent fields are
/// left out of serialized output instead of being zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProperty {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
    /// Street address, assembled from components when the service splits it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<f64>,
    /// Living area in square feet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub square_feet: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_on_market: Option<u32>,
    /// Sale price (else list price) divided by square feet, 2 decimals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_per_sqft: Option<f64>,
}

impl CanonicalProperty {
    /// Sale price if known, else list price
    pub fn effective_price(&self) -> Option<u64> {
        self.sale_price.or(self.list_price)
    }
}
