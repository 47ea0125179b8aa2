//! Configuration types for the RETS connector
//!
//! A connector is configured from a YAML (or JSON) file holding the
//! connection credentials plus a handful of protocol and transport knobs.
//! String values may reference environment variables as `${NAME}`.

use crate::error::{Error, Result, ResultExt};
use crate::http::RateLimiterConfig;
use crate::metadata::CanonicalField;
use crate::template;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Credentials
// ============================================================================

/// Connection parameters for one RETS service
///
/// Created once when the connector is built and never mutated afterwards.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionCredentials {
    /// Login endpoint URL
    pub login_url: String,

    /// RETS username
    pub username: String,

    /// RETS password
    pub password: String,

    /// Client identifier sent as the User-Agent header
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Secondary user-agent secret for RETS-UA-Authorization
    #[serde(default)]
    pub user_agent_password: Option<String>,

    /// Protocol version sent as RETS-Version
    #[serde(default = "default_rets_version")]
    pub rets_version: String,

    /// Service identifier (e.g. the MLS board code)
    #[serde(default)]
    pub service_id: String,
}

fn default_user_agent() -> String {
    format!("rets-connector/{}", env!("CARGO_PKG_VERSION"))
}

fn default_rets_version() -> String {
    "RETS/1.7.2".to_string()
}

impl ConnectionCredentials {
    /// Create credentials with default user agent and protocol version
    pub fn new(
        login_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            login_url: login_url.into(),
            username: username.into(),
            password: password.into(),
            user_agent: default_user_agent(),
            user_agent_password: None,
            rets_version: default_rets_version(),
            service_id: String::new(),
        }
    }

    /// Set the user agent
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the user-agent password used for RETS-UA-Authorization
    #[must_use]
    pub fn with_user_agent_password(mut self, password: impl Into<String>) -> Self {
        self.user_agent_password = Some(password.into());
        self
    }

    /// Set the RETS protocol version
    #[must_use]
    pub fn with_rets_version(mut self, version: impl Into<String>) -> Self {
        self.rets_version = version.into();
        self
    }

    /// Set the service identifier
    #[must_use]
    pub fn with_service_id(mut self, service_id: impl Into<String>) -> Self {
        self.service_id = service_id.into();
        self
    }

    /// Validate the credentials
    pub fn validate(&self) -> Result<()> {
        if self.login_url.trim().is_empty() {
            return Err(Error::missing_field("credentials.login_url"));
        }
        url::Url::parse(&self.login_url)
            .map_err(|e| Error::config(format!("Invalid login_url '{}': {e}", self.login_url)))?;

        if self.username.trim().is_empty() {
            return Err(Error::missing_field("credentials.username"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(Error::missing_field("credentials.user_agent"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConnectionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionCredentials")
            .field("login_url", &self.login_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field(
                "user_agent_password",
                &self.user_agent_password.as_ref().map(|_| "<redacted>"),
            )
            .field("rets_version", &self.rets_version)
            .field("service_id", &self.service_id)
            .finish()
    }
}

// ============================================================================
// Timeouts
// ============================================================================

/// Network timeouts, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Timeout for login, logout and metadata requests
    #[serde(default = "default_login_secs")]
    pub login_secs: u64,

    /// Timeout for search requests (result sets can be large)
    #[serde(default = "default_search_secs")]
    pub search_secs: u64,
}

fn default_login_secs() -> u64 {
    30
}

fn default_search_secs() -> u64 {
    120
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            login_secs: default_login_secs(),
            search_secs: default_search_secs(),
        }
    }
}

impl TimeoutConfig {
    /// Timeout for session requests
    pub fn login(&self) -> Duration {
        Duration::from_secs(self.login_secs)
    }

    /// Timeout for search requests
    pub fn search(&self) -> Duration {
        Duration::from_secs(self.search_secs)
    }
}

// ============================================================================
// Connector Config
// ============================================================================

/// Complete connector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Connection credentials
    pub credentials: ConnectionCredentials,

    /// Search resource
    #[serde(default = "default_resource")]
    pub resource: String,

    /// Search class
    #[serde(default = "default_class_name")]
    pub class_name: String,

    /// Network timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Optional client-side rate limit
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Canonical field → service token entries applied over the resolved table
    #[serde(default)]
    pub field_overrides: BTreeMap<String, String>,
}

fn default_resource() -> String {
    "Property".to_string()
}

fn default_class_name() -> String {
    "Residential".to_string()
}

impl ConnectorConfig {
    /// Create a config with default settings for the given credentials
    pub fn new(credentials: ConnectionCredentials) -> Self {
        Self {
            credentials,
            resource: default_resource(),
            class_name: default_class_name(),
            timeouts: TimeoutConfig::default(),
            rate_limit: None,
            field_overrides: BTreeMap::new(),
        }
    }

    /// Set the search class
    #[must_use]
    pub fn with_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Set the timeouts
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set a rate limit
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: RateLimiterConfig) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    /// Add a field override
    #[must_use]
    pub fn with_field_override(
        mut self,
        field: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        self.field_overrides.insert(field.into(), token.into());
        self
    }

    /// Validate the full configuration
    pub fn validate(&self) -> Result<()> {
        self.credentials.validate()?;

        if self.resource.trim().is_empty() {
            return Err(Error::missing_field("resource"));
        }
        if self.class_name.trim().is_empty() {
            return Err(Error::missing_field("class_name"));
        }
        if self.timeouts.login_secs == 0 || self.timeouts.search_secs == 0 {
            return Err(Error::config("Timeouts must be greater than zero"));
        }

        for (field, token) in &self.field_overrides {
            field.parse::<CanonicalField>()?;
            if token.trim().is_empty() {
                return Err(Error::config(format!(
                    "Field override for '{field}' has an empty token"
                )));
            }
        }

        Ok(())
    }
}

/// Load a connector config from a YAML or JSON file
pub fn load_config(path: impl AsRef<Path>) -> Result<ConnectorConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    load_config_from_str(&content)
}

/// Load a connector config from a YAML or JSON string
pub fn load_config_from_str(content: &str) -> Result<ConnectorConfig> {
    let rendered = template::render_env(content)?;
    let config: ConnectorConfig = serde_yaml::from_str(&rendered)?;
    config.validate()?;
    Ok(config)
}
