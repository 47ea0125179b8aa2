//! Response decoder module
//!
//! Supports: RETS COMPACT / COMPACT-DECODED markup, plain tab-delimited text
//!
//! # Overview
//!
//! The format of a body is chosen up front as an explicit `ResponseFormat`
//! variant, then rows are reduced to `token → value` maps and normalized
//! into `CanonicalProperty` records through the field table.

mod coerce;
mod decoders;
mod normalize;
mod types;

pub use coerce::{parse_date, parse_float, parse_int};
pub use decoders::{
    decode_entities, decode_metadata, decode_records, reply_status, NO_RECORDS_FOUND,
};
pub use normalize::{normalize, parse};
pub use types::{CanonicalProperty, DecodedRecords, ResponseFormat, DEFAULT_DELIMITER};
