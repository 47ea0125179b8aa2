//! Authenticator implementation
//!
//! Applies RETS headers and HTTP credentials to outgoing requests and
//! caches the most recent server challenge so later requests in the same
//! session are authorized up front.

use super::digest::{digest_authorization, generate_cnonce, user_agent_digest, DigestRequest};
use super::types::{AuthConfig, Challenge};
use reqwest::header::{HeaderMap, AUTHORIZATION, WWW_AUTHENTICATE};
use reqwest::RequestBuilder;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

/// Header carrying the protocol version
pub const RETS_VERSION_HEADER: &str = "RETS-Version";

/// Header carrying the user-agent digest
pub const UA_AUTHORIZATION_HEADER: &str = "RETS-UA-Authorization";

/// Authenticator handles applying authentication to HTTP requests
pub struct Authenticator {
    /// Auth configuration
    config: AuthConfig,
    /// Last challenge received from the server
    challenge: Arc<RwLock<Option<Challenge>>>,
    /// Digest nonce count for the cached challenge
    nonce_count: AtomicU32,
}

impl Authenticator {
    /// Create a new authenticator with the given config
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            challenge: Arc::new(RwLock::new(None)),
            nonce_count: AtomicU32::new(0),
        }
    }

    /// Apply RETS headers and any known credentials to a request builder
    ///
    /// `session_id` is the current `RETS-Session-ID` cookie value, if any.
    pub async fn apply(
        &self,
        req: RequestBuilder,
        method: &str,
        url: &Url,
        session_id: Option<&str>,
    ) -> RequestBuilder {
        let mut req = req.header(RETS_VERSION_HEADER, self.config.rets_version.as_str());

        if let Some(ua_password) = &self.config.user_agent_password {
            let digest = user_agent_digest(
                &self.config.user_agent,
                ua_password,
                "",
                session_id.unwrap_or(""),
                &self.config.rets_version,
            );
            req = req.header(UA_AUTHORIZATION_HEADER, format!("Digest {digest}"));
        }

        match &*self.challenge.read().await {
            None => req,
            Some(Challenge::Basic) => {
                req.basic_auth(&self.config.username, Some(&self.config.password))
            }
            Some(Challenge::Digest(challenge)) => {
                let nonce_count = self.nonce_count.fetch_add(1, Ordering::SeqCst) + 1;
                let cnonce = generate_cnonce();
                let uri = request_uri(url);
                let value = digest_authorization(
                    challenge,
                    &DigestRequest {
                        username: &self.config.username,
                        password: &self.config.password,
                        method,
                        uri: &uri,
                        nonce_count,
                        cnonce: &cnonce,
                    },
                );
                req.header(AUTHORIZATION, value)
            }
        }
    }

    /// Record the challenge from a 401 response
    ///
    /// Returns true when a new, answerable challenge was installed, meaning
    /// the rejected request is worth sending once more.
    pub async fn handle_challenge(&self, headers: &HeaderMap) -> bool {
        let parsed = headers
            .get_all(WWW_AUTHENTICATE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(Challenge::parse)
            // Prefer digest when a server offers both
            .max_by_key(|c| matches!(c, Challenge::Digest(_)));

        let Some(new_challenge) = parsed else {
            return false;
        };

        let mut cached = self.challenge.write().await;
        if cached.as_ref() == Some(&new_challenge) {
            // Same challenge already answered and still rejected: bad credentials
            return false;
        }

        debug!(
            scheme = match new_challenge {
                Challenge::Basic => "basic",
                Challenge::Digest(_) => "digest",
            },
            "Installing new authentication challenge"
        );
        *cached = Some(new_challenge);
        self.nonce_count.store(0, Ordering::SeqCst);
        true
    }

    /// Forget the cached challenge (on logout or session loss)
    pub async fn clear_cache(&self) {
        let mut cached = self.challenge.write().await;
        *cached = None;
        self.nonce_count.store(0, Ordering::SeqCst);
    }

    /// Whether a challenge is currently cached
    pub async fn has_challenge(&self) -> bool {
        self.challenge.read().await.is_some()
    }

    /// Get the current auth config
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// The digest `uri` value: path plus query of the request URL
fn request_uri(url: &Url) -> String {
    match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    }
}
