//! Metadata resolver
//!
//! Walks RESOURCE → CLASS → TABLE metadata to learn the service's own
//! field tokens. Any failure degrades to the default table; resolving
//! metadata never fails a login.

use super::table::{CanonicalField, FieldTable, TableSource};
use crate::decode::{decode_metadata, DecodedRecords};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Property classes assumed when the class list cannot be read
pub const DEFAULT_PROPERTY_TYPES: &[&str] =
    &["Residential", "Condo", "Land", "MultiFamily", "Commercial"];

/// Result of metadata resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMetadata {
    /// Field translation table for the session
    pub table: FieldTable,
    /// Property classes the service offers
    pub property_types: BTreeSet<String>,
}

impl ResolvedMetadata {
    /// Default table and default property classes
    pub fn defaults() -> Self {
        Self {
            table: FieldTable::defaults(),
            property_types: default_property_types(),
        }
    }
}

fn default_property_types() -> BTreeSet<String> {
    DEFAULT_PROPERTY_TYPES
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Resolves the field table for one session
#[derive(Debug)]
pub struct MetadataResolver<'a> {
    http: &'a HttpClient,
    endpoint: Option<&'a str>,
    resource: &'a str,
    class_name: &'a str,
    timeout: Duration,
}

impl<'a> MetadataResolver<'a> {
    /// Create a resolver for `resource:class_name` on `endpoint`
    pub fn new(
        http: &'a HttpClient,
        endpoint: Option<&'a str>,
        resource: &'a str,
        class_name: &'a str,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            endpoint,
            resource,
            class_name,
            timeout,
        }
    }

    /// Resolve metadata, falling back to defaults on any failure
    pub async fn resolve(&self) -> ResolvedMetadata {
        match self.try_resolve().await {
            Ok(resolved) => {
                info!(
                    fields = resolved.table.len(),
                    classes = resolved.property_types.len(),
                    "Field table resolved from metadata"
                );
                resolved
            }
            Err(e) => {
                warn!(error = %e, "Metadata unavailable, installing default field table");
                ResolvedMetadata::defaults()
            }
        }
    }

    async fn try_resolve(&self) -> Result<ResolvedMetadata> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| Error::metadata("login did not advertise a GetMetadata URL"))?;

        let resources = self
            .fetch(endpoint, "METADATA-RESOURCE", "0")
            .await
            .and_then(|body| decode_metadata(&body, "METADATA-RESOURCE"))?;
        parse_resources(&resources, self.resource)?;

        let property_types = match self
            .fetch(endpoint, "METADATA-CLASS", self.resource)
            .await
            .and_then(|body| decode_metadata(&body, "METADATA-CLASS"))
        {
            Ok(classes) => parse_classes(&classes),
            Err(e) => {
                debug!(error = %e, "Class metadata unavailable, using default classes");
                BTreeSet::new()
            }
        };

        let table_id = format!("{}:{}", self.resource, self.class_name);
        let rows = self
            .fetch(endpoint, "METADATA-TABLE", &table_id)
            .await
            .and_then(|body| decode_metadata(&body, "METADATA-TABLE"))?;
        let table = parse_table(&rows)?;

        Ok(ResolvedMetadata {
            table,
            property_types: if property_types.is_empty() {
                default_property_types()
            } else {
                property_types
            },
        })
    }

    async fn fetch(&self, endpoint: &str, kind: &str, id: &str) -> Result<String> {
        debug!(kind, id, "Requesting metadata");
        let response = self
            .http
            .get_with_config(
                endpoint,
                RequestConfig::new()
                    .query("Type", kind)
                    .query("ID", id)
                    .query("Format", "COMPACT")
                    .timeout(self.timeout),
            )
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(Error::metadata(format!(
                "{kind} request returned HTTP {status}"
            )));
        }
        Ok(response.text().await?)
    }
}

/// Check that the resource list offers `resource`
///
/// An empty resource list is accepted; some servers omit it.
pub fn parse_resources(decoded: &DecodedRecords, resource: &str) -> Result<()> {
    let ids: Vec<&str> = decoded
        .records
        .iter()
        .filter_map(|row| {
            row.get("ResourceID")
                .or_else(|| row.get("StandardName"))
                .map(|id| id.trim())
        })
        .collect();

    if ids.is_empty() || ids.iter().any(|id| id.eq_ignore_ascii_case(resource)) {
        Ok(())
    } else {
        Err(Error::metadata(format!(
            "resource '{resource}' not offered (found: {})",
            ids.join(", ")
        )))
    }
}

/// Collect class names from class metadata
///
/// `ClassName` is what the service accepts as `Class=`, so it wins over
/// `StandardName`.
pub fn parse_classes(decoded: &DecodedRecords) -> BTreeSet<String> {
    decoded
        .records
        .iter()
        .filter_map(|row| {
            row.get("ClassName")
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .or_else(|| row.get("StandardName").map(|n| n.trim()))
        })
        .filter(|name| !name.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Build a field table from table metadata rows
///
/// Each row's `SystemName` becomes the token of the canonical field its
/// `StandardName` identifies. Fields the rows do not cover keep their
/// default token.
pub fn parse_table(decoded: &DecodedRecords) -> Result<FieldTable> {
    let mut table = FieldTable::from_entries(
        TableSource::Metadata,
        CanonicalField::ALL.map(|f| (f, f.default_token())),
    );

    let mut mapped = BTreeSet::new();
    for row in &decoded.records {
        let (Some(system), Some(standard)) = (row.get("SystemName"), row.get("StandardName"))
        else {
            continue;
        };
        let system = system.trim();
        if system.is_empty() {
            continue;
        }
        if let Some(field) = CanonicalField::from_standard_name(standard) {
            // First match wins when several columns claim a field
            if mapped.insert(field) {
                table.insert(field, system);
            }
        }
    }

    if mapped.is_empty() {
        return Err(Error::metadata(
            "table metadata has no fields with recognized standard names",
        ));
    }
    debug!(mapped = mapped.len(), "Mapped standard names to system names");
    Ok(table)
}
