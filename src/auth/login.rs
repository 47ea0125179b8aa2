//! Login handshake and login-response parsing
//!
//! RETS servers answer a login with a `<RETS>` envelope whose
//! `<RETS-RESPONSE>` body lists capability URLs as `KEY=VALUE` lines.
//! Some servers omit the markup and return the lines as plain text, so the
//! body is classified first and each shape has its own parse path.

use super::types::CapabilityUrls;
use crate::decode::decode_entities;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::types::StringMap;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

static RETS_OPEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<RETS(\s[^>]*)?>").unwrap());

static RESPONSE_BODY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<RETS-RESPONSE\s*>(.*?)</RETS-RESPONSE\s*>").unwrap());

static ATTR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([A-Za-z][A-Za-z0-9_-]*)\s*=\s*"([^"]*)""#).unwrap());

static CHILD_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<([A-Za-z][A-Za-z0-9_-]*)\s*>([^<]*)</([A-Za-z][A-Za-z0-9_-]*)\s*>").unwrap()
});

/// Shape of a login response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginBody {
    /// `<RETS ReplyCode=..>` envelope
    Markup {
        /// Reply code attribute, if present and numeric
        reply_code: Option<u32>,
        /// Reply text attribute
        reply_text: String,
        /// Capability entries from `<RETS-RESPONSE>`, if that element exists
        entries: Option<StringMap>,
    },
    /// Anything else; scanned line by line
    PlainText,
}

impl LoginBody {
    /// Classify a login response body
    pub fn classify(body: &str) -> Self {
        let Some(open) = RETS_OPEN_REGEX.captures(body) else {
            return LoginBody::PlainText;
        };

        let attrs: StringMap = ATTR_REGEX
            .captures_iter(open.get(1).map_or("", |m| m.as_str()))
            .map(|cap| (cap[1].to_ascii_lowercase(), cap[2].to_string()))
            .collect();

        let entries = RESPONSE_BODY_REGEX
            .captures(body)
            .map(|cap| parse_response_element(&cap[1]));

        LoginBody::Markup {
            reply_code: attrs.get("replycode").and_then(|c| c.trim().parse().ok()),
            reply_text: attrs.get("replytext").cloned().unwrap_or_default(),
            entries,
        }
    }
}

/// Parse the content of a `<RETS-RESPONSE>` element
///
/// Accepts both `KEY=VALUE` lines and `<Key>value</Key>` child tags.
fn parse_response_element(content: &str) -> StringMap {
    let mut entries = parse_key_values(content);
    for cap in CHILD_TAG_REGEX.captures_iter(content) {
        if cap[1].eq_ignore_ascii_case(&cap[3]) {
            entries
                .entry(cap[1].to_string())
                .or_insert_with(|| decode_entities(cap[2].trim()));
        }
    }
    entries
}

/// Scan `KEY=VALUE` lines, ignoring anything that isn't one
pub fn parse_key_values(text: &str) -> StringMap {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.starts_with('<') {
                return None;
            }
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            let value = value.trim();
            if key.is_empty() || value.is_empty() || key.contains(char::is_whitespace) {
                return None;
            }
            Some((key.to_string(), decode_entities(value)))
        })
        .collect()
}

/// Parse a login response into capability URLs
///
/// Relative URLs are resolved against `login_url`.
pub fn parse_login_response(body: &str, login_url: &Url) -> Result<CapabilityUrls> {
    let entries = match LoginBody::classify(body) {
        LoginBody::Markup {
            reply_code: Some(code),
            reply_text,
            ..
        } if code != 0 => {
            return Err(Error::auth(format!(
                "server rejected login with ReplyCode {code}: {reply_text}"
            )));
        }
        LoginBody::Markup {
            entries: Some(entries),
            ..
        } if !entries.is_empty() => entries,
        LoginBody::Markup { .. } => {
            debug!("Login markup has no usable RETS-RESPONSE, scanning as plain text");
            parse_key_values(body)
        }
        LoginBody::PlainText => parse_key_values(body),
    };

    capability_urls(entries, login_url)
}

fn capability_urls(mut entries: StringMap, login_url: &Url) -> Result<CapabilityUrls> {
    let mut take = |name: &str| -> Result<Option<String>> {
        let key = entries.keys().find(|k| k.eq_ignore_ascii_case(name)).cloned();
        match key.and_then(|k| entries.remove(&k)) {
            Some(value) => Ok(Some(login_url.join(&value)?.to_string())),
            None => Ok(None),
        }
    };

    let search = take("Search")?.ok_or_else(|| {
        Error::auth("login response did not advertise a Search URL")
    })?;
    let metadata = take("GetMetadata")?;
    let login = take("Login")?;
    let logout = take("Logout")?;
    let get_object = take("GetObject")?;

    Ok(CapabilityUrls {
        search,
        metadata,
        login,
        logout,
        get_object,
        info: entries,
    })
}

/// Perform the login transaction
///
/// Non-200 responses and bodies without a Search URL are authentication
/// failures carrying the status and a body snippet. Transport failures are
/// authentication failures without a status.
pub async fn login(http: &HttpClient, login_url: &str, timeout: Duration) -> Result<CapabilityUrls> {
    let url = Url::parse(login_url)?;
    let response = http
        .get_with_config(login_url, RequestConfig::new().timeout(timeout))
        .await
        .map_err(Error::into_auth)?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| Error::from(e).into_auth())?;
    if status != 200 {
        return Err(Error::auth_status(status, &body));
    }

    let urls = parse_login_response(&body, &url).map_err(|e| match e {
        Error::Auth { message, .. } => Error::Auth {
            status: Some(status),
            message: format!("{message} (body: {})", crate::error::snippet(&body)),
        },
        other => other,
    })?;

    info!(search = %urls.search, metadata = ?urls.metadata, "RETS login succeeded");
    Ok(urls)
}
