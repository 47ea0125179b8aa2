//! RETS connector
//!
//! Defines the `PropertySource` trait consumers program against and the
//! `RetsConnector` that implements it over one RETS session.

use crate::auth::{login, AuthConfig};
use crate::config::{ConnectionCredentials, ConnectorConfig};
use crate::decode::{parse, reply_status, CanonicalProperty, NO_RECORDS_FOUND};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::metadata::{FieldTable, MetadataResolver};
use crate::query::{compile, SearchCriteria};
use crate::session::SessionState;
use crate::stats::{aggregate, comparable_sales_criteria, MarketStatistics};
use async_trait::async_trait;
use chrono::Local;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

// ============================================================================
// Property Source Trait
// ============================================================================

/// A source of canonical property records
#[async_trait]
pub trait PropertySource: Send {
    /// Run a search and return normalized records
    async fn search_properties(&mut self, criteria: &SearchCriteria)
        -> Result<Vec<CanonicalProperty>>;

    /// Summarize recent sold comparables in `area`
    ///
    /// No comparable sales is a valid outcome with zero counts.
    async fn market_statistics(
        &mut self,
        area: &str,
        property_type: Option<&str>,
        lookback_days: u32,
    ) -> Result<MarketStatistics> {
        let today = Local::now().date_naive();
        let criteria = comparable_sales_criteria(area, property_type, lookback_days, today);
        let properties = self.search_properties(&criteria).await?;
        Ok(aggregate(&properties, area, lookback_days))
    }
}

// ============================================================================
// RETS Connector
// ============================================================================

/// Connector bound to one RETS session
///
/// Session-mutating calls take `&mut self`; share an instance behind your
/// own lock or give each consumer its own connector.
#[derive(Debug)]
pub struct RetsConnector {
    config: ConnectorConfig,
    http: HttpClient,
    session: SessionState,
}

impl RetsConnector {
    /// Create a connector with default settings
    pub fn new(credentials: ConnectionCredentials) -> Result<Self> {
        Self::with_config(ConnectorConfig::new(credentials))
    }

    /// Create a connector from a full configuration
    pub fn with_config(config: ConnectorConfig) -> Result<Self> {
        config.validate()?;

        let mut http_config = HttpClientConfig::builder()
            .timeout(config.timeouts.login())
            .user_agent(config.credentials.user_agent.as_str());
        if let Some(rate_limit) = config.rate_limit {
            http_config = http_config.rate_limit(rate_limit);
        }
        let http = HttpClient::with_auth(
            http_config.build(),
            AuthConfig::from(&config.credentials),
        )?;

        Ok(Self {
            config,
            http,
            session: SessionState::new(),
        })
    }

    /// Connector configuration
    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Current session state
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Field table of the current session
    pub fn field_table(&self) -> &FieldTable {
        &self.session.field_table
    }

    /// Log in and resolve the session's field table
    ///
    /// Metadata problems never fail authentication; they install the
    /// default table instead.
    pub async fn authenticate(&mut self) -> Result<()> {
        let login_url = self
            .session
            .login_endpoint
            .clone()
            .unwrap_or_else(|| self.config.credentials.login_url.clone());

        let urls = login(&self.http, &login_url, self.config.timeouts.login()).await?;
        self.session.install_endpoints(urls, &login_url);
        self.session.is_authenticated = true;

        let resolved = MetadataResolver::new(
            &self.http,
            self.session.metadata_endpoint.as_deref(),
            &self.config.resource,
            &self.config.class_name,
            self.config.timeouts.login(),
        )
        .resolve()
        .await;
        self.session.install_metadata(resolved);
        self.session
            .field_table
            .apply_overrides(&self.config.field_overrides)?;

        info!(
            service = %self.config.credentials.service_id,
            table = ?self.session.field_table.source(),
            "RETS session established"
        );
        Ok(())
    }

    /// Authenticate unless a session is already established
    pub async fn ensure_authenticated(&mut self) -> Result<()> {
        if self.session.is_authenticated {
            return Ok(());
        }
        self.authenticate().await
    }

    /// Run a search and return the raw response body
    ///
    /// At most one transparent re-authentication happens per call: when no
    /// session exists yet, or when the server rejects the session with 401.
    /// Transport failures surface as `Error::Search` without a status.
    pub async fn search_raw(&mut self, criteria: &SearchCriteria) -> Result<String> {
        let mut reauthenticated = false;
        if !self.session.is_authenticated {
            self.authenticate().await?;
            reauthenticated = true;
        }

        loop {
            let endpoint = self
                .session
                .search_endpoint
                .clone()
                .ok_or_else(|| Error::search("session has no search endpoint"))?;
            let query = compile(criteria, &self.session.field_table)?;
            debug!(%query, limit = criteria.max_results, "Executing search");

            let response = self
                .http
                .get_with_config(
                    &endpoint,
                    RequestConfig::new()
                        .query("SearchType", self.config.resource.as_str())
                        .query("Class", self.config.class_name.as_str())
                        .query("QueryType", "DMQL2")
                        .query("Query", query)
                        .query("Format", "COMPACT-DECODED")
                        .query("Limit", criteria.max_results.to_string())
                        .query("StandardNames", "0")
                        .timeout(self.config.timeouts.search()),
                )
                .await
                .map_err(Error::into_search)?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED && !reauthenticated {
                warn!("Search rejected as unauthorized, re-authenticating");
                self.reset_session().await;
                self.authenticate().await?;
                reauthenticated = true;
                continue;
            }

            let body = response
                .text()
                .await
                .map_err(|e| Error::from(e).into_search())?;
            if status != StatusCode::OK {
                return Err(Error::search_status(status.as_u16(), &body));
            }
            if body.trim().is_empty() {
                return Err(Error::Search {
                    status: Some(status.as_u16()),
                    message: "empty response body".to_string(),
                });
            }
            if let Some((code, text)) = reply_status(&body) {
                if code != 0 && code != NO_RECORDS_FOUND {
                    return Err(Error::Search {
                        status: Some(status.as_u16()),
                        message: format!("server replied with ReplyCode {code}: {text}"),
                    });
                }
            }
            return Ok(body);
        }
    }

    /// End the session
    ///
    /// Best effort: the logout request's failures are logged and the local
    /// session is discarded regardless.
    pub async fn logout(&mut self) {
        if let Some(endpoint) = self.session.logout_endpoint.clone() {
            match self
                .http
                .get_with_config(
                    &endpoint,
                    RequestConfig::new().timeout(self.config.timeouts.login()),
                )
                .await
            {
                Ok(response) if response.status().is_success() => {
                    debug!("Logged out");
                }
                Ok(response) => {
                    warn!(status = response.status().as_u16(), "Logout rejected");
                }
                Err(e) => warn!(error = %e, "Logout request failed"),
            }
        }
        self.reset_session().await;
    }

    /// Retrieve listing media
    pub async fn get_object(
        &mut self,
        _resource: &str,
        _object_type: &str,
        _id: &str,
    ) -> Result<Vec<u8>> {
        Err(Error::unsupported("GetObject"))
    }

    async fn reset_session(&mut self) {
        self.session.clear();
        if let Some(auth) = self.http.authenticator() {
            auth.clear_cache().await;
        }
    }
}

#[async_trait]
impl PropertySource for RetsConnector {
    async fn search_properties(
        &mut self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<CanonicalProperty>> {
        let body = self.search_raw(criteria).await?;
        let properties = parse(&body, &self.session.field_table);
        info!(count = properties.len(), "Search returned properties");
        Ok(properties)
    }
}
