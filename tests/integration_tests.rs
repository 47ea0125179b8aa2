//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: login → metadata → DMQL search → canonical records

use pretty_assertions::assert_eq;
use rets_connector::metadata::TableSource;
use rets_connector::{
    CanonicalField, ConnectionCredentials, ConnectorConfig, Error, PropertySource,
    RetsConnector, SearchCriteria,
};
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials(server: &MockServer) -> ConnectionCredentials {
    ConnectionCredentials::new(format!("{}/rets/login", server.uri()), "agent", "secret")
        .with_user_agent("TestAgent/1.0")
        .with_service_id("test-mls")
}

fn plain_login_body(server: &MockServer) -> String {
    format!(
        "Search={uri}/rets/search\nGetMetadata={uri}/rets/getmetadata\nLogout={uri}/rets/logout\n",
        uri = server.uri()
    )
}

async fn mount_plain_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rets/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(plain_login_body(server)))
        .mount(server)
        .await;
}

async fn mount_metadata_failure(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rets/getmetadata"))
        .respond_with(ResponseTemplate::new(500).set_body_string("metadata offline"))
        .mount(server)
        .await;
}

fn search_query(request: &wiremock::Request) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == "Query")
        .map(|(_, v)| v.into_owned())
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_plain_text_login_with_metadata_failure_uses_defaults() {
    let server = MockServer::start().await;
    mount_plain_login(&server).await;
    mount_metadata_failure(&server).await;

    let mut connector = RetsConnector::new(credentials(&server)).unwrap();
    connector.authenticate().await.unwrap();

    let session = connector.session();
    assert!(session.is_authenticated);
    assert_eq!(
        session.search_endpoint,
        Some(format!("{}/rets/search", server.uri()))
    );
    assert_eq!(connector.field_table().source(), TableSource::Default);
    assert_eq!(
        connector.field_table().token(CanonicalField::ListPrice),
        Some("LP")
    );
    assert!(session.supported_property_types.contains("Residential"));
}

#[tokio::test]
async fn test_login_rejected_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rets/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let mut connector = RetsConnector::new(credentials(&server)).unwrap();
    let err = connector.authenticate().await.unwrap_err();

    assert!(matches!(err, Error::Auth { status: Some(401), .. }));
    assert!(!connector.session().is_authenticated);
}

#[tokio::test]
async fn test_invalid_credentials_rejected_before_network() {
    let err = RetsConnector::new(ConnectionCredentials::new("not a url", "agent", "x")).unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_flow_with_digest_and_metadata() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rets/login"))
        .and(header_exists("Authorization"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", "RETS-Session-ID=abc123; Path=/")
                .set_body_string(format!(
                    "<RETS ReplyCode=\"0\" ReplyText=\"Success\">\n<RETS-RESPONSE>\n{}</RETS-RESPONSE>\n</RETS>",
                    plain_login_body(&server)
                )),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rets/login"))
        .respond_with(ResponseTemplate::new(401).insert_header(
            "WWW-Authenticate",
            r#"Digest realm="rets", nonce="n-1", qop="auth""#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rets/getmetadata"))
        .and(query_param("Type", "METADATA-RESOURCE"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<RETS ReplyCode=\"0\"><METADATA-RESOURCE>\n<COLUMNS>\tResourceID\t</COLUMNS>\n\
<DATA>\tProperty\t</DATA>\n</METADATA-RESOURCE></RETS>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rets/getmetadata"))
        .and(query_param("Type", "METADATA-CLASS"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<RETS ReplyCode=\"0\"><METADATA-CLASS Resource=\"Property\">\n\
<COLUMNS>\tClassName\tStandardName\t</COLUMNS>\n<DATA>\tRES\tResidential\t</DATA>\n\
</METADATA-CLASS></RETS>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rets/getmetadata"))
        .and(query_param("Type", "METADATA-TABLE"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<RETS ReplyCode=\"0\"><METADATA-TABLE Resource=\"Property\" Class=\"Residential\">\n\
<COLUMNS>\tSystemName\tStandardName\t</COLUMNS>\n\
<DATA>\tL_ListingID\tListingID\t</DATA>\n\
<DATA>\tL_AskingPrice\tListPrice\t</DATA>\n\
<DATA>\tL_City\tCity\t</DATA>\n\
<DATA>\tLM_Beds\tBedrooms\t</DATA>\n\
<DATA>\tL_Status\tListingStatus\t</DATA>\n\
<DATA>\tLM_SqFt\tSqFt\t</DATA>\n\
</METADATA-TABLE></RETS>",
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rets/search"))
        .and(query_param("SearchType", "Property"))
        .and(query_param("Class", "Residential"))
        .and(query_param("QueryType", "DMQL2"))
        .and(query_param("Format", "COMPACT-DECODED"))
        .and(query_param("Limit", "10"))
        .and(query_param(
            "Query",
            "(L_City=Austin),(L_AskingPrice=400000-600000),(LM_Beds=3+),(L_Status=Active)",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<RETS ReplyCode=\"0\" ReplyText=\"Success\">\n<DELIMITER value=\"09\"/>\n\
<COLUMNS>\tL_ListingID\tL_AskingPrice\tL_City\tLM_Beds\tLM_SqFt\t</COLUMNS>\n\
<DATA>\tA100\t450000\tAustin\t3\t1800\t</DATA>\n\
<DATA>\tA101\t599,000\tAustin\t4\t\t</DATA>\n\
<DATA>\tbroken\t</DATA>\n\
</RETS>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut connector = RetsConnector::new(credentials(&server)).unwrap();
    let criteria = SearchCriteria::new()
        .city("Austin")
        .price(Some(400_000), Some(600_000))
        .min_bedrooms(3)
        .status("Active")
        .max_results(10);

    // Not yet authenticated: the search logs in first
    let properties = connector.search_properties(&criteria).await.unwrap();

    assert_eq!(connector.field_table().source(), TableSource::Metadata);
    assert!(connector.session().supported_property_types.contains("RES"));
    assert_eq!(properties.len(), 2);
    assert_eq!(properties[0].listing_id.as_deref(), Some("A100"));
    assert_eq!(properties[0].list_price, Some(450_000));
    assert_eq!(properties[0].price_per_sqft, Some(250.0));
    assert_eq!(properties[1].list_price, Some(599_000));
    assert_eq!(properties[1].square_feet, None);
    assert_eq!(properties[1].price_per_sqft, None);
}

#[tokio::test]
async fn test_search_reauthenticates_once_on_401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rets/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(plain_login_body(&server)))
        .expect(2)
        .mount(&server)
        .await;
    mount_metadata_failure(&server).await;

    Mock::given(method("GET"))
        .and(path("/rets/search"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rets/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("LP\tBR\tBTH\n450000\t3\t2.5\n"))
        .mount(&server)
        .await;

    let mut connector = RetsConnector::new(credentials(&server)).unwrap();
    connector.authenticate().await.unwrap();

    let properties = connector
        .search_properties(&SearchCriteria::new())
        .await
        .unwrap();
    assert_eq!(properties.len(), 1);
    assert_eq!(properties[0].bedrooms, Some(3));
    assert_eq!(properties[0].bathrooms, Some(2.5));
    assert!(properties[0].city.is_none());
}

#[tokio::test]
async fn test_search_does_not_reauthenticate_twice() {
    let server = MockServer::start().await;
    mount_plain_login(&server).await;
    mount_metadata_failure(&server).await;
    Mock::given(method("GET"))
        .and(path("/rets/search"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Session expired"))
        .expect(2)
        .mount(&server)
        .await;

    let mut connector = RetsConnector::new(credentials(&server)).unwrap();
    connector.authenticate().await.unwrap();
    let err = connector
        .search_raw(&SearchCriteria::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Search { status: Some(401), .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_search_server_error_is_retryable() {
    let server = MockServer::start().await;
    mount_plain_login(&server).await;
    mount_metadata_failure(&server).await;
    Mock::given(method("GET"))
        .and(path("/rets/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&server)
        .await;

    let mut connector = RetsConnector::new(credentials(&server)).unwrap();
    let err = connector
        .search_properties(&SearchCriteria::new())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_search_empty_body_is_error() {
    let server = MockServer::start().await;
    mount_plain_login(&server).await;
    mount_metadata_failure(&server).await;
    Mock::given(method("GET"))
        .and(path("/rets/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  \n"))
        .mount(&server)
        .await;

    let mut connector = RetsConnector::new(credentials(&server)).unwrap();
    let err = connector
        .search_raw(&SearchCriteria::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Search { .. }));
}

#[tokio::test]
async fn test_search_reply_code_error() {
    let server = MockServer::start().await;
    mount_plain_login(&server).await;
    mount_metadata_failure(&server).await;
    Mock::given(method("GET"))
        .and(path("/rets/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<RETS ReplyCode="20206" ReplyText="Invalid Query Syntax" />"#,
        ))
        .mount(&server)
        .await;

    let mut connector = RetsConnector::new(credentials(&server)).unwrap();
    let err = connector
        .search_raw(&SearchCriteria::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("20206"));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_search_unreachable_endpoint_is_search_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rets/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("Search=http://127.0.0.1:9/rets/search\n"),
        )
        .mount(&server)
        .await;

    let mut connector = RetsConnector::new(credentials(&server)).unwrap();
    let err = connector
        .search_properties(&SearchCriteria::new().city("Austin"))
        .await
        .unwrap_err();

    assert!(
        matches!(err, Error::Search { status: None, .. }),
        "unexpected error: {err:?}"
    );
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_login_unreachable_is_auth_error() {
    let credentials = ConnectionCredentials::new("http://127.0.0.1:9/rets/login", "agent", "x");
    let mut connector = RetsConnector::new(credentials).unwrap();
    let err = connector.authenticate().await.unwrap_err();

    assert!(
        matches!(err, Error::Auth { status: None, .. }),
        "unexpected error: {err:?}"
    );
    assert!(!connector.session().is_authenticated);
}

#[tokio::test]
async fn test_reserved_characters_fail_before_request() {
    let server = MockServer::start().await;
    mount_plain_login(&server).await;
    mount_metadata_failure(&server).await;
    Mock::given(method("GET"))
        .and(path("/rets/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("LP\n1\n"))
        .expect(0)
        .mount(&server)
        .await;

    let mut connector = RetsConnector::new(credentials(&server)).unwrap();
    let err = connector
        .search_properties(&SearchCriteria::new().city("Austin),(LP=0+"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidCriteria { .. }));
}

#[tokio::test]
async fn test_field_overrides_apply_to_queries() {
    let server = MockServer::start().await;
    mount_plain_login(&server).await;
    mount_metadata_failure(&server).await;
    Mock::given(method("GET"))
        .and(path("/rets/search"))
        .and(query_param("Query", "(PRICE=1+)"))
        .respond_with(ResponseTemplate::new(200).set_body_string("PRICE\n100\n"))
        .expect(1)
        .mount(&server)
        .await;

    let config = ConnectorConfig::new(credentials(&server)).with_field_override("list_price", "PRICE");
    let mut connector = RetsConnector::with_config(config).unwrap();
    let properties = connector
        .search_properties(&SearchCriteria::new())
        .await
        .unwrap();
    assert_eq!(properties[0].list_price, Some(100));
}

// ============================================================================
// Statistics
// ============================================================================

#[tokio::test]
async fn test_market_statistics_with_no_sales() {
    let server = MockServer::start().await;
    mount_plain_login(&server).await;
    mount_metadata_failure(&server).await;
    Mock::given(method("GET"))
        .and(path("/rets/search"))
        .and(query_param("Limit", "500"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<RETS ReplyCode="20201" ReplyText="No Records Found" />"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let mut connector = RetsConnector::new(credentials(&server)).unwrap();
    let stats = connector
        .market_statistics("Austin", None, 90)
        .await
        .unwrap();

    assert_eq!(stats.area, "Austin");
    assert_eq!(stats.total_sales, 0);
    assert_eq!(stats.median_price, 0.0);
    assert_eq!(stats.mean_price, 0.0);
    assert_eq!(stats.median_price_per_sqft, 0.0);
    assert_eq!(stats.mean_days_on_market, 0.0);

    let requests = server.received_requests().await.unwrap();
    let query = requests
        .iter()
        .filter(|r| r.url.path() == "/rets/search")
        .find_map(search_query)
        .unwrap();
    assert!(query.starts_with("(CITY=Austin),(ST=Sold),(CD="));
    assert!(query.ends_with("+)"));
}

#[tokio::test]
async fn test_market_statistics_with_sales() {
    let server = MockServer::start().await;
    mount_plain_login(&server).await;
    mount_metadata_failure(&server).await;
    Mock::given(method("GET"))
        .and(path("/rets/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "SP\tLP\tSQFT\tDOM\n300000\t310000\t1500\t10\n\t420000\t2100\t30\n500000\t\t2000\t\n",
        ))
        .mount(&server)
        .await;

    let mut connector = RetsConnector::new(credentials(&server)).unwrap();
    let stats = connector
        .market_statistics("78701", Some("Residential"), 30)
        .await
        .unwrap();

    assert_eq!(stats.total_sales, 3);
    assert_eq!(stats.median_price, 420_000.0);
    assert_eq!(stats.median_price_per_sqft, 200.0);
    assert_eq!(stats.mean_days_on_market, 20.0);
    assert_eq!(stats.min_price, 300_000);
    assert_eq!(stats.max_price, 500_000);
}

// ============================================================================
// Logout / unsupported operations
// ============================================================================

#[tokio::test]
async fn test_logout_clears_session() {
    let server = MockServer::start().await;
    mount_plain_login(&server).await;
    mount_metadata_failure(&server).await;
    Mock::given(method("GET"))
        .and(path("/rets/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut connector = RetsConnector::new(credentials(&server)).unwrap();
    connector.authenticate().await.unwrap();
    connector.logout().await;

    assert!(!connector.session().is_authenticated);
    assert!(connector.session().search_endpoint.is_none());
    assert!(connector.field_table().is_empty());
}

#[tokio::test]
async fn test_logout_failure_is_not_raised() {
    let server = MockServer::start().await;
    mount_plain_login(&server).await;
    mount_metadata_failure(&server).await;
    Mock::given(method("GET"))
        .and(path("/rets/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut connector = RetsConnector::new(credentials(&server)).unwrap();
    connector.authenticate().await.unwrap();
    connector.logout().await;
    assert!(!connector.session().is_authenticated);
}

#[tokio::test]
async fn test_get_object_is_unsupported() {
    let server = MockServer::start().await;
    let mut connector = RetsConnector::new(credentials(&server)).unwrap();
    let err = connector
        .get_object("Property", "Photo", "A100:1")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unsupported { .. }));
}
