//! Canonical fields and the field translation table

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// A field of the canonical property schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    ListingId,
    ListPrice,
    SalePrice,
    StreetNumber,
    StreetName,
    Address,
    City,
    State,
    PostalCode,
    Latitude,
    Longitude,
    PropertyType,
    Bedrooms,
    Bathrooms,
    SquareFeet,
    LotSize,
    YearBuilt,
    Status,
    ListDate,
    SaleDate,
    DaysOnMarket,
}

impl CanonicalField {
    /// Every canonical field, in schema order
    pub const ALL: [CanonicalField; 21] = [
        CanonicalField::ListingId,
        CanonicalField::ListPrice,
        CanonicalField::SalePrice,
        CanonicalField::StreetNumber,
        CanonicalField::StreetName,
        CanonicalField::Address,
        CanonicalField::City,
        CanonicalField::State,
        CanonicalField::PostalCode,
        CanonicalField::Latitude,
        CanonicalField::Longitude,
        CanonicalField::PropertyType,
        CanonicalField::Bedrooms,
        CanonicalField::Bathrooms,
        CanonicalField::SquareFeet,
        CanonicalField::LotSize,
        CanonicalField::YearBuilt,
        CanonicalField::Status,
        CanonicalField::ListDate,
        CanonicalField::SaleDate,
        CanonicalField::DaysOnMarket,
    ];

    /// Canonical name
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::ListingId => "listing_id",
            CanonicalField::ListPrice => "list_price",
            CanonicalField::SalePrice => "sale_price",
            CanonicalField::StreetNumber => "street_number",
            CanonicalField::StreetName => "street_name",
            CanonicalField::Address => "address",
            CanonicalField::City => "city",
            CanonicalField::State => "state",
            CanonicalField::PostalCode => "postal_code",
            CanonicalField::Latitude => "latitude",
            CanonicalField::Longitude => "longitude",
            CanonicalField::PropertyType => "property_type",
            CanonicalField::Bedrooms => "bedrooms",
            CanonicalField::Bathrooms => "bathrooms",
            CanonicalField::SquareFeet => "square_feet",
            CanonicalField::LotSize => "lot_size",
            CanonicalField::YearBuilt => "year_built",
            CanonicalField::Status => "status",
            CanonicalField::ListDate => "list_date",
            CanonicalField::SaleDate => "sale_date",
            CanonicalField::DaysOnMarket => "days_on_market",
        }
    }

    /// Short-code token used by legacy systems
    pub fn default_token(self) -> &'static str {
        match self {
            CanonicalField::ListingId => "LN",
            CanonicalField::ListPrice => "LP",
            CanonicalField::SalePrice => "SP",
            CanonicalField::StreetNumber => "STNUM",
            CanonicalField::StreetName => "STNAME",
            CanonicalField::Address => "ADDR",
            CanonicalField::City => "CITY",
            CanonicalField::State => "STATE",
            CanonicalField::PostalCode => "ZIP",
            CanonicalField::Latitude => "LAT",
            CanonicalField::Longitude => "LNG",
            CanonicalField::PropertyType => "PTYP",
            CanonicalField::Bedrooms => "BR",
            CanonicalField::Bathrooms => "BTH",
            CanonicalField::SquareFeet => "SQFT",
            CanonicalField::LotSize => "LSZ",
            CanonicalField::YearBuilt => "YB",
            CanonicalField::Status => "ST",
            CanonicalField::ListDate => "LD",
            CanonicalField::SaleDate => "CD",
            CanonicalField::DaysOnMarket => "DOM",
        }
    }

    /// RETS standard names that identify this field in table metadata
    pub fn standard_names(self) -> &'static [&'static str] {
        match self {
            CanonicalField::ListingId => &["ListingID", "ListingId", "MLSNumber", "ListingKey"],
            CanonicalField::ListPrice => &["ListPrice"],
            CanonicalField::SalePrice => &["ClosePrice", "SoldPrice", "SalePrice"],
            CanonicalField::StreetNumber => &["StreetNumber"],
            CanonicalField::StreetName => &["StreetName"],
            CanonicalField::Address => &["UnparsedAddress", "FullAddress", "Address"],
            CanonicalField::City => &["City"],
            CanonicalField::State => &["StateOrProvince", "State"],
            CanonicalField::PostalCode => &["PostalCode", "ZipCode"],
            CanonicalField::Latitude => &["Latitude"],
            CanonicalField::Longitude => &["Longitude"],
            CanonicalField::PropertyType => &["PropertyType"],
            CanonicalField::Bedrooms => &["Bedrooms", "BedroomsTotal"],
            CanonicalField::Bathrooms => &["BathsTotal", "BathroomsTotalDecimal", "BathroomsTotal"],
            CanonicalField::SquareFeet => &["SqFt", "LivingArea", "SquareFeet"],
            CanonicalField::LotSize => &["LotSizeArea", "LotSizeAcres", "LotSize"],
            CanonicalField::YearBuilt => &["YearBuilt"],
            CanonicalField::Status => &["ListingStatus", "StandardStatus", "Status"],
            CanonicalField::ListDate => &["ListDate", "ListingContractDate"],
            CanonicalField::SaleDate => &["CloseDate", "SoldDate"],
            CanonicalField::DaysOnMarket => &["DaysOnMarket", "DOM"],
        }
    }

    /// Find the canonical field a RETS standard name refers to
    pub fn from_standard_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|field| {
            field
                .standard_names()
                .iter()
                .any(|n| n.eq_ignore_ascii_case(name))
        })
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| Error::unknown_field(s))
    }
}

/// Where a field table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSource {
    /// Static short-code defaults
    #[default]
    Default,
    /// Discovered from server metadata
    Metadata,
}

/// Canonical field → service-native token map
///
/// Built once per session and read by the query compiler and the response
/// parser; neither ever hard-codes a vendor token.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldTable {
    source: TableSource,
    tokens: BTreeMap<CanonicalField, String>,
}

impl FieldTable {
    /// An empty table
    pub fn empty() -> Self {
        Self::default()
    }

    /// The static default table covering every canonical field
    pub fn defaults() -> Self {
        Self {
            source: TableSource::Default,
            tokens: CanonicalField::ALL
                .into_iter()
                .map(|f| (f, f.default_token().to_string()))
                .collect(),
        }
    }

    /// Build a table from explicit entries
    pub fn from_entries<I, S>(source: TableSource, entries: I) -> Self
    where
        I: IntoIterator<Item = (CanonicalField, S)>,
        S: Into<String>,
    {
        Self {
            source,
            tokens: entries.into_iter().map(|(f, t)| (f, t.into())).collect(),
        }
    }

    /// Look up the token for a canonical field
    pub fn token(&self, field: CanonicalField) -> Option<&str> {
        self.tokens.get(&field).map(String::as_str)
    }

    /// Look up the token for a canonical field, failing if absent
    pub fn require(&self, field: CanonicalField) -> Result<&str> {
        self.token(field)
            .ok_or_else(|| Error::unknown_field(field.as_str()))
    }

    /// Set the token for a field
    pub fn insert(&mut self, field: CanonicalField, token: impl Into<String>) {
        self.tokens.insert(field, token.into());
    }

    /// Apply `canonical name → token` overrides
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, String>) -> Result<()> {
        for (name, token) in overrides {
            let field: CanonicalField = name.parse()?;
            self.insert(field, token.trim());
        }
        Ok(())
    }

    /// Where the table came from
    pub fn source(&self) -> TableSource {
        self.source
    }

    /// Iterate over entries in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
        self.tokens.iter().map(|(f, t)| (*f, t.as_str()))
    }

    /// Number of mapped fields
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
