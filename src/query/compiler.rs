//! DMQL compiler
//!
//! Pure function of (criteria, table). Every populated criterion becomes
//! exactly one parenthesized condition; a criterion whose field has no
//! token is an error, never a dropped condition.

use super::criteria::{DateField, SearchCriteria};
use crate::error::{Error, Result};
use crate::metadata::{CanonicalField, FieldTable};
use std::fmt::Display;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Characters that delimit DMQL conditions or value lists
const RESERVED: [char; 4] = ['(', ')', ',', '|'];

/// Compile criteria into a DMQL query string
pub fn compile(criteria: &SearchCriteria, table: &FieldTable) -> Result<String> {
    let mut conditions = Vec::new();

    let mut push_equals = |field: CanonicalField, value: &Option<String>| -> Result<()> {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            let value = literal(field, value)?;
            conditions.push(format!("({}={value})", table.require(field)?));
        }
        Ok(())
    };
    push_equals(CanonicalField::PropertyType, &criteria.property_type)?;
    push_equals(CanonicalField::City, &criteria.city)?;
    push_equals(CanonicalField::State, &criteria.state)?;

    let zips = criteria
        .zip_codes
        .iter()
        .map(|z| z.trim())
        .filter(|z| !z.is_empty())
        .map(|z| literal(CanonicalField::PostalCode, z))
        .collect::<Result<Vec<_>>>()?;
    if !zips.is_empty() {
        conditions.push(format!(
            "({}={})",
            table.require(CanonicalField::PostalCode)?,
            zips.join("|")
        ));
    }

    let ranges = [
        range(table, CanonicalField::ListPrice, criteria.min_price, criteria.max_price)?,
        range(table, CanonicalField::Bedrooms, criteria.min_bedrooms, criteria.max_bedrooms)?,
        range(table, CanonicalField::Bathrooms, criteria.min_bathrooms, criteria.max_bathrooms)?,
        range(
            table,
            CanonicalField::SquareFeet,
            criteria.min_square_feet,
            criteria.max_square_feet,
        )?,
        range(table, CanonicalField::LotSize, criteria.min_lot_size, criteria.max_lot_size)?,
        range(
            table,
            CanonicalField::YearBuilt,
            criteria.min_year_built,
            criteria.max_year_built,
        )?,
    ];
    conditions.extend(ranges.into_iter().flatten());

    if let Some(status) = criteria.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let status = literal(CanonicalField::Status, status)?;
        conditions.push(format!("({}={status})", table.require(CanonicalField::Status)?));
    }

    if let Some(condition) = date_range(table, criteria)? {
        conditions.push(condition);
    }

    if conditions.is_empty() {
        return Ok(format!("({}=1+)", table.require(CanonicalField::ListPrice)?));
    }
    Ok(conditions.join(","))
}

/// A caller value placed verbatim inside a condition
fn literal(field: CanonicalField, value: &str) -> Result<&str> {
    if value.contains(&RESERVED[..]) {
        return Err(Error::invalid_criteria(field.as_str(), value));
    }
    Ok(value)
}

fn range<T: Display>(
    table: &FieldTable,
    field: CanonicalField,
    min: Option<T>,
    max: Option<T>,
) -> Result<Option<String>> {
    let bounds = match (min, max) {
        (Some(min), Some(max)) => format!("{min}-{max}"),
        (Some(min), None) => format!("{min}+"),
        (None, Some(max)) => format!("0-{max}"),
        (None, None) => return Ok(None),
    };
    Ok(Some(format!("({}={bounds})", table.require(field)?)))
}

fn date_range(table: &FieldTable, criteria: &SearchCriteria) -> Result<Option<String>> {
    let field = match criteria.date_field {
        DateField::ListDate => CanonicalField::ListDate,
        DateField::SaleDate => CanonicalField::SaleDate,
    };
    let from = criteria.date_from.map(|d| d.format(DATE_FORMAT));
    let to = criteria.date_to.map(|d| d.format(DATE_FORMAT));
    let bounds = match (from, to) {
        (Some(from), Some(to)) => format!("{from}-{to}"),
        (Some(from), None) => format!("{from}+"),
        // DMQL has no zero date; `to-` is the on-or-before form
        (None, Some(to)) => format!("{to}-"),
        (None, None) => return Ok(None),
    };
    Ok(Some(format!("({}={bounds})", table.require(field)?)))
}
