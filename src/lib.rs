//! # RETS Connector
//!
//! A Rust-native client for MLS systems speaking RETS 1.7.
//!
//! ## Features
//!
//! - **Login**: HTTP Digest/Basic challenge handling, RETS User-Agent authorization
//! - **Metadata discovery**: Field translation table resolved from server metadata,
//!   with a short-code default table when metadata is unavailable
//! - **DMQL compilation**: Structured `SearchCriteria` to DMQL2 queries
//! - **Normalization**: COMPACT / tabular responses to `CanonicalProperty` records
//! - **Market statistics**: Recent sold comparables reduced to summary figures
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rets_connector::{ConnectionCredentials, PropertySource, RetsConnector, SearchCriteria};
//!
//! #[tokio::main]
//! async fn main() -> rets_connector::Result<()> {
//!     let credentials = ConnectionCredentials::new(
//!         "https://rets.example.com/rets/login",
//!         "agent",
//!         "secret",
//!     );
//!     let mut connector = RetsConnector::new(credentials)?;
//!
//!     let criteria = SearchCriteria::new()
//!         .city("Austin")
//!         .price(Some(400_000), Some(600_000))
//!         .min_bedrooms(3)
//!         .status("Active");
//!     let properties = connector.search_properties(&criteria).await?;
//!
//!     let stats = connector.market_statistics("Austin", None, 90).await?;
//!     connector.logout().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        RetsConnector                            │
//! │  authenticate()   search_properties()   market_statistics()     │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │   Metadata    │   Query   │   Decode    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Digest   │ Cookies   │ Resource      │ DMQL2     │ Compact XML │
//! │ Basic    │ Timeouts  │ Class / Table │ Ranges    │ Tabular     │
//! │ UA auth  │ Rate Limit│ Defaults      │ Defaults  │ Coercion    │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the connector
pub mod error;

/// Common types and type aliases
pub mod types;

/// Authentication and the login transaction
pub mod auth;

/// HTTP client with session cookies and rate limiting
pub mod http;

/// Field translation table and metadata resolution
pub mod metadata;

/// Session state
pub mod session;

/// Search criteria and DMQL compilation
pub mod query;

/// Response decoding and normalization
pub mod decode;

/// Market statistics
pub mod stats;

/// Configuration loading
pub mod config;

/// Connector trait and RETS connector
pub mod connector;

/// Environment interpolation for configuration files
pub mod template;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{load_config, load_config_from_str, ConnectionCredentials, ConnectorConfig};
pub use connector::{PropertySource, RetsConnector};
pub use decode::CanonicalProperty;
pub use metadata::{CanonicalField, FieldTable};
pub use query::{DateField, SearchCriteria};
pub use session::SessionState;
pub use stats::MarketStatistics;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
