//! Digest computations
//!
//! HTTP Digest (RFC 2617) credentials for the login handshake and the
//! RETS 1.7 `RETS-UA-Authorization` user-agent digest.

use super::types::DigestChallenge;
use md5::{Digest, Md5};
use rand::Rng;

/// Lowercase hex MD5 of a string
pub fn md5_hex(input: &str) -> String {
    format!("{:x}", Md5::digest(input.as_bytes()))
}

/// Generate a fresh client nonce
pub fn generate_cnonce() -> String {
    format!("{:016x}", rand::thread_rng().gen::<u64>())
}

/// Compute the RETS user-agent digest
///
/// `a1 = MD5(user_agent ":" ua_password)` and the digest is
/// `MD5(a1 ":" request_id ":" session_id ":" version)`. Request id and
/// session id are empty strings when the client has none.
pub fn user_agent_digest(
    user_agent: &str,
    ua_password: &str,
    request_id: &str,
    session_id: &str,
    version: &str,
) -> String {
    let a1 = md5_hex(&format!("{user_agent}:{ua_password}"));
    md5_hex(&format!("{a1}:{request_id}:{session_id}:{version}"))
}

/// Inputs of one digest-authorized request
#[derive(Debug, Clone)]
pub struct DigestRequest<'a> {
    /// Username
    pub username: &'a str,
    /// Password
    pub password: &'a str,
    /// HTTP method
    pub method: &'a str,
    /// Request URI (path and query)
    pub uri: &'a str,
    /// Nonce count for this request
    pub nonce_count: u32,
    /// Client nonce
    pub cnonce: &'a str,
}

/// Build the `Authorization` header value answering a digest challenge
pub fn digest_authorization(challenge: &DigestChallenge, req: &DigestRequest<'_>) -> String {
    let nc = format!("{:08x}", req.nonce_count);

    let mut ha1 = md5_hex(&format!(
        "{}:{}:{}",
        req.username, challenge.realm, req.password
    ));
    if challenge.is_session_algorithm() {
        ha1 = md5_hex(&format!("{ha1}:{}:{}", challenge.nonce, req.cnonce));
    }
    let ha2 = md5_hex(&format!("{}:{}", req.method, req.uri));

    let qop_auth = challenge.supports_qop_auth();
    let response = if qop_auth {
        md5_hex(&format!(
            "{ha1}:{}:{nc}:{}:auth:{ha2}",
            challenge.nonce, req.cnonce
        ))
    } else {
        md5_hex(&format!("{ha1}:{}:{ha2}", challenge.nonce))
    };

    let mut header = format!(
        r#"Digest username="{}", realm="{}", nonce="{}", uri="{}", response="{response}""#,
        req.username, challenge.realm, challenge.nonce, req.uri
    );
    if let Some(algorithm) = &challenge.algorithm {
        header.push_str(&format!(", algorithm={algorithm}"));
    }
    if qop_auth {
        header.push_str(&format!(r#", qop=auth, nc={nc}, cnonce="{}""#, req.cnonce));
    }
    if let Some(opaque) = &challenge.opaque {
        header.push_str(&format!(r#", opaque="{opaque}""#));
    }
    header
}
