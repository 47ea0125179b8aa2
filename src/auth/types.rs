//! Auth types
//!
//! Credentials as the authenticator sees them, parsed server challenges,
//! and the capability URLs advertised by a successful login.

use crate::config::ConnectionCredentials;
use crate::types::StringMap;
use regex::Regex;
use std::sync::LazyLock;

/// Regex for `name=value` / `name="value"` challenge parameters
static PARAM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([A-Za-z][A-Za-z0-9_-]*)\s*=\s*(?:"([^"]*)"|([^,\s]*))"#).unwrap());

/// Authentication configuration derived from the connection credentials
#[derive(Clone)]
pub struct AuthConfig {
    /// RETS username
    pub username: String,
    /// RETS password
    pub password: String,
    /// Client identifier (User-Agent)
    pub user_agent: String,
    /// Secondary user-agent secret
    pub user_agent_password: Option<String>,
    /// Protocol version (RETS-Version)
    pub rets_version: String,
}

impl From<&ConnectionCredentials> for AuthConfig {
    fn from(creds: &ConnectionCredentials) -> Self {
        Self {
            username: creds.username.clone(),
            password: creds.password.clone(),
            user_agent: creds.user_agent.clone(),
            user_agent_password: creds.user_agent_password.clone(),
            rets_version: creds.rets_version.clone(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("user_agent", &self.user_agent)
            .field("has_user_agent_password", &self.user_agent_password.is_some())
            .field("rets_version", &self.rets_version)
            .finish_non_exhaustive()
    }
}

/// A `WWW-Authenticate` challenge the client knows how to answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Challenge {
    /// HTTP Basic
    Basic,
    /// HTTP Digest (RFC 2617)
    Digest(DigestChallenge),
}

impl Challenge {
    /// Parse a `WWW-Authenticate` header value
    ///
    /// Returns `None` for schemes other than Basic and Digest.
    pub fn parse(header: &str) -> Option<Self> {
        let header = header.trim();
        let (scheme, params) = header.split_once(char::is_whitespace).unwrap_or((header, ""));

        if scheme.eq_ignore_ascii_case("basic") {
            return Some(Challenge::Basic);
        }
        if !scheme.eq_ignore_ascii_case("digest") {
            return None;
        }

        let mut challenge = DigestChallenge::default();
        for cap in PARAM_REGEX.captures_iter(params) {
            let value = cap
                .get(2)
                .or_else(|| cap.get(3))
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            match cap[1].to_ascii_lowercase().as_str() {
                "realm" => challenge.realm = value,
                "nonce" => challenge.nonce = value,
                "opaque" => challenge.opaque = Some(value),
                "algorithm" => challenge.algorithm = Some(value),
                "qop" => challenge.qop = Some(value),
                "stale" => challenge.stale = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        if challenge.nonce.is_empty() {
            return None;
        }
        Some(Challenge::Digest(challenge))
    }
}

/// Parameters of an HTTP Digest challenge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestChallenge {
    /// Protection space
    pub realm: String,
    /// Server nonce
    pub nonce: String,
    /// Opaque value echoed back verbatim
    pub opaque: Option<String>,
    /// Hash algorithm (`MD5` or `MD5-sess`)
    pub algorithm: Option<String>,
    /// Offered quality-of-protection options, comma separated
    pub qop: Option<String>,
    /// Whether the previous nonce was rejected as stale
    pub stale: bool,
}

impl DigestChallenge {
    /// Whether the server offered `qop=auth`
    pub fn supports_qop_auth(&self) -> bool {
        self.qop
            .as_deref()
            .is_some_and(|q| q.split(',').any(|v| v.trim().eq_ignore_ascii_case("auth")))
    }

    /// Whether the session variant of the algorithm was requested
    pub fn is_session_algorithm(&self) -> bool {
        self.algorithm
            .as_deref()
            .is_some_and(|a| a.eq_ignore_ascii_case("md5-sess"))
    }
}

/// Endpoint URLs and informational entries from a login response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityUrls {
    /// Search transaction URL (required)
    pub search: String,
    /// GetMetadata transaction URL
    pub metadata: Option<String>,
    /// Login URL to use for subsequent logins, if rewritten
    pub login: Option<String>,
    /// Logout transaction URL
    pub logout: Option<String>,
    /// GetObject transaction URL
    pub get_object: Option<String>,
    /// Every other `KEY=VALUE` entry (MemberName, Broker, TimeoutSeconds, ...)
    pub info: StringMap,
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_parse_basic_challenge() {
        assert_eq!(
            Challenge::parse(r#"Basic realm="rets""#),
            Some(Challenge::Basic)
        );
    }

    #[test]
    fn test_parse_digest_challenge() {
        let header = r#"Digest realm="users@mls.example.com", qop="auth,auth-int", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093", opaque="5ccc069c403ebaf9f0171e9517f40e41", algorithm=MD5"#;
        let Some(Challenge::Digest(c)) = Challenge::parse(header) else {
            panic!("expected digest challenge");
        };

        assert_eq!(c.realm, "users@mls.example.com");
        assert_eq!(c.nonce, "dcd98b7102dd2f0e8b11d0f600bfb0c093");
        assert_eq!(c.opaque.as_deref(), Some("5ccc069c403ebaf9f0171e9517f40e41"));
        assert_eq!(c.algorithm.as_deref(), Some("MD5"));
        assert!(c.supports_qop_auth());
        assert!(!c.is_session_algorithm());
        assert!(!c.stale);
    }

    #[test]
    fn test_parse_digest_without_nonce_is_rejected() {
        assert_eq!(Challenge::parse(r#"Digest realm="x""#), None);
    }

    #[test]
    fn test_parse_unknown_scheme() {
        assert_eq!(Challenge::parse("Bearer realm=\"x\""), None);
        assert_eq!(Challenge::parse(""), None);
    }

    #[test]
    fn test_stale_flag() {
        let Some(Challenge::Digest(c)) =
            Challenge::parse(r#"Digest realm="r", nonce="n2", stale=TRUE"#)
        else {
            panic!("expected digest challenge");
        };
        assert!(c.stale);
        assert!(!c.supports_qop_auth());
    }

    #[test]
    fn test_auth_config_from_credentials() {
        let creds = ConnectionCredentials::new("http://x/login", "agent", "pw")
            .with_user_agent("Agent/1.0")
            .with_user_agent_password("ua");
        let auth = AuthConfig::from(&creds);
        assert_eq!(auth.username, "agent");
        assert_eq!(auth.user_agent, "Agent/1.0");
        assert_eq!(auth.user_agent_password.as_deref(), Some("ua"));
        assert!(!format!("{auth:?}").contains("pw\""));
    }
}
