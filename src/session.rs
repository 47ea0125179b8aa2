//! Session state
//!
//! Everything a login establishes, owned by the connector and mutated only
//! by authentication and logout.

use crate::auth::CapabilityUrls;
use crate::metadata::{FieldTable, ResolvedMetadata};
use serde::Serialize;
use std::collections::BTreeSet;

/// Mutable state of one RETS session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    /// Whether a login has succeeded and not been discarded since
    pub is_authenticated: bool,
    pub search_endpoint: Option<String>,
    pub metadata_endpoint: Option<String>,
    /// Login URL for the next handshake; servers may rewrite it
    pub login_endpoint: Option<String>,
    pub logout_endpoint: Option<String>,
    pub get_object_endpoint: Option<String>,
    /// Canonical field → service token map for this session
    pub field_table: FieldTable,
    pub supported_property_types: BTreeSet<String>,
}

impl SessionState {
    /// Zero-valued state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the endpoints advertised by a login response
    pub fn install_endpoints(&mut self, urls: CapabilityUrls, login_url: &str) {
        self.search_endpoint = Some(urls.search);
        self.metadata_endpoint = urls.metadata;
        self.login_endpoint = Some(urls.login.unwrap_or_else(|| login_url.to_string()));
        self.logout_endpoint = urls.logout;
        self.get_object_endpoint = urls.get_object;
    }

    /// Install resolved metadata
    pub fn install_metadata(&mut self, metadata: ResolvedMetadata) {
        self.field_table = metadata.table;
        self.supported_property_types = metadata.property_types;
    }

    /// Discard everything; the next operation logs in again
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
