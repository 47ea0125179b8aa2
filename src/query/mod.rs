//! Query module
//!
//! `SearchCriteria` and its compilation into DMQL through the field table.

mod compiler;
mod criteria;

pub use compiler::compile;
pub use criteria::{DateField, SearchCriteria, DEFAULT_MAX_RESULTS};
