//! Error types for the RETS connector
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// Maximum number of response body characters kept in an error message
const SNIPPET_LEN: usize = 200;

/// The main error type for the RETS connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Protocol Errors
    // ============================================================================
    #[error("Authentication failed{}: {message}", fmt_status(.status))]
    Auth {
        status: Option<u16>,
        message: String,
    },

    #[error("Metadata unavailable: {message}")]
    MetadataUnavailable { message: String },

    #[error("Unknown field '{field}': not present in the field translation table")]
    UnknownField { field: String },

    #[error("Invalid value '{value}' for {field}: DMQL reserved characters are not allowed")]
    InvalidCriteria { field: String, value: String },

    #[error("Search failed{}: {message}", fmt_status(.status))]
    Search {
        status: Option<u16>,
        message: String,
    },

    #[error("Failed to parse record at line {line}: {message}")]
    RecordParse { line: usize, message: String },

    #[error("RETS operation '{operation}' is not supported")]
    Unsupported { operation: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

fn fmt_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

/// Truncate a response body for inclusion in an error message
pub fn snippet(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(SNIPPET_LEN) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an auth error without an HTTP status
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            status: None,
            message: message.into(),
        }
    }

    /// Create an auth error from a failed HTTP exchange
    pub fn auth_status(status: u16, body: &str) -> Self {
        Self::Auth {
            status: Some(status),
            message: snippet(body),
        }
    }

    /// Create a metadata error
    pub fn metadata(message: impl Into<String>) -> Self {
        Self::MetadataUnavailable {
            message: message.into(),
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField {
            field: field.into(),
        }
    }

    /// Create an invalid criteria error
    pub fn invalid_criteria(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidCriteria {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a search error without an HTTP status
    pub fn search(message: impl Into<String>) -> Self {
        Self::Search {
            status: None,
            message: message.into(),
        }
    }

    /// Create a search error from a failed HTTP exchange
    pub fn search_status(status: u16, body: &str) -> Self {
        Self::Search {
            status: Some(status),
            message: snippet(body),
        }
    }

    /// Create a record parse error
    pub fn record_parse(line: usize, message: impl Into<String>) -> Self {
        Self::RecordParse {
            line,
            message: message.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Reclassify a transport failure as a search error
    ///
    /// Other kinds pass through unchanged.
    #[must_use]
    pub fn into_search(self) -> Self {
        match self {
            e @ (Error::Http(_) | Error::Timeout { .. }) => Error::Search {
                status: e.status(),
                message: e.to_string(),
            },
            other => other,
        }
    }

    /// Reclassify a transport failure as an authentication error
    #[must_use]
    pub fn into_auth(self) -> Self {
        match self {
            e @ (Error::Http(_) | Error::Timeout { .. }) => Error::Auth {
                status: e.status(),
                message: e.to_string(),
            },
            other => other,
        }
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Auth { status, .. } | Error::Search { status, .. } => *status,
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is retryable
    ///
    /// Transport failures and server-side statuses are transient; 4xx-class
    /// service errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Timeout { .. } => true,
            Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Error::Search { status, .. } => match status {
                Some(code) => is_retryable_status(*code),
                None => true,
            },
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for the RETS connector
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
