//! Metadata module
//!
//! Owns the canonical field set and the field translation table, and
//! resolves the table for a session from server metadata.

mod resolver;
mod table;

pub use resolver::{
    parse_classes, parse_resources, parse_table, MetadataResolver, ResolvedMetadata,
    DEFAULT_PROPERTY_TYPES,
};
pub use table::{CanonicalField, FieldTable, TableSource};
