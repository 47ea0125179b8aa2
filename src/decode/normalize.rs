//! Reverse field translation and record normalization

use super::coerce::{parse_date, parse_float, parse_int, round2};
use super::decoders::decode_records;
use super::types::CanonicalProperty;
use crate::metadata::{CanonicalField, FieldTable};
use crate::types::RawRecord;
use tracing::debug;

/// Parse a search response body into canonical properties
///
/// Pure and idempotent: the same body and table always give equal output.
/// Malformed rows are skipped, never fatal.
pub fn parse(raw: &str, table: &FieldTable) -> Vec<CanonicalProperty> {
    let decoded = decode_records(raw);
    debug!(
        format = ?decoded.format,
        records = decoded.records.len(),
        skipped = decoded.skipped,
        "Decoded search response"
    );
    decoded
        .records
        .iter()
        .map(|record| normalize(record, table))
        .collect()
}

/// Map one raw record into the canonical schema
pub fn normalize(record: &RawRecord, table: &FieldTable) -> CanonicalProperty {
    let get = |field: CanonicalField| {
        let token = table.token(field)?;
        record
            .get(token)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    };
    let text = |field| get(field).map(str::to_string);
    let int = |field| get(field).and_then(parse_int);
    let float = |field| get(field).and_then(parse_float);

    let mut property = CanonicalProperty {
        listing_id: text(CanonicalField::ListingId),
        address: assemble_address(
            get(CanonicalField::StreetNumber),
            get(CanonicalField::StreetName),
            get(CanonicalField::Address),
        ),
        city: text(CanonicalField::City),
        state: text(CanonicalField::State),
        postal_code: text(CanonicalField::PostalCode),
        latitude: float(CanonicalField::Latitude),
        longitude: float(CanonicalField::Longitude),
        property_type: text(CanonicalField::PropertyType),
        bedrooms: int(CanonicalField::Bedrooms).and_then(|n| u32::try_from(n).ok()),
        bathrooms: float(CanonicalField::Bathrooms),
        square_feet: int(CanonicalField::SquareFeet).and_then(|n| u64::try_from(n).ok()),
        lot_size: float(CanonicalField::LotSize),
        year_built: int(CanonicalField::YearBuilt).and_then(|n| i32::try_from(n).ok()),
        list_price: int(CanonicalField::ListPrice).and_then(|n| u64::try_from(n).ok()),
        sale_price: int(CanonicalField::SalePrice).and_then(|n| u64::try_from(n).ok()),
        status: text(CanonicalField::Status),
        list_date: get(CanonicalField::ListDate).and_then(parse_date),
        sale_date: get(CanonicalField::SaleDate).and_then(parse_date),
        days_on_market: int(CanonicalField::DaysOnMarket).and_then(|n| u32::try_from(n).ok()),
        price_per_sqft: None,
    };
    property.price_per_sqft = price_per_sqft(&property);
    property
}

fn assemble_address(
    number: Option<&str>,
    name: Option<&str>,
    combined: Option<&str>,
) -> Option<String> {
    match (number, name, combined) {
        (Some(number), Some(name), _) => Some(format!("{number} {name}")),
        (_, _, Some(combined)) => Some(combined.to_string()),
        // Partial address beats none
        (Some(part), None, None) | (None, Some(part), None) => Some(part.to_string()),
        (None, None, None) => None,
    }
}

fn price_per_sqft(property: &CanonicalProperty) -> Option<f64> {
    let price = property.effective_price()?;
    let area = property.square_feet.filter(|a| *a > 0)?;
    Some(round2(price as f64 / area as f64))
}
