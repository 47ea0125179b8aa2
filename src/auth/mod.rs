//! Authentication module
//!
//! Supports: HTTP Digest, HTTP Basic, RETS User-Agent authorization
//!
//! The `Authenticator` answers server challenges and caches the last one
//! so every request of a session carries credentials. The login
//! transaction itself lives in `login`.

mod authenticator;
mod digest;
mod login;
mod types;

pub use authenticator::{Authenticator, RETS_VERSION_HEADER, UA_AUTHORIZATION_HEADER};
pub use digest::{digest_authorization, md5_hex, user_agent_digest, DigestRequest};
pub use login::{login, parse_key_values, parse_login_response, LoginBody};
pub use types::{AuthConfig, CapabilityUrls, Challenge, DigestChallenge};
