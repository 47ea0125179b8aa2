//! HTTP client module
//!
//! Provides the HTTP transport shared by every RETS transaction.
//!
//! # Features
//!
//! - **Session Cookies**: One cookie jar per client carries `RETS-Session-ID`
//! - **Authentication**: Integration with the auth module's challenge handling
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Timeouts**: Per-request timeout overrides

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, RequestConfig, SESSION_COOKIE};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
