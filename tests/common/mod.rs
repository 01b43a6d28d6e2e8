/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for vantage-client tests

use std::sync::Arc;

use serde_json::json;
use vantage_client::{
    AuthConfig, Client, ClientCredentials, Connector, ConnectorConfig, PersonalAccessToken,
};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Personal access token used by the pre-authorized fixtures
#[allow(dead_code)]
pub const TEST_TOKEN: &str = "PAT456";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Expected Authorization header value for the personal token fixtures
#[allow(dead_code)]
pub fn bearer() -> String {
    format!("Bearer {TEST_TOKEN}")
}

/// Connector backed by the personal-access-token strategy, pointed at the
/// mock server
#[allow(dead_code)]
pub fn pat_connector(server: &MockServer) -> Connector {
    let credentials = AuthConfig::from([("token".to_string(), TEST_TOKEN.to_string())]);
    let auth = Arc::new(
        PersonalAccessToken::with_base_url(credentials, &server.uri(), 2)
            .expect("personal token auth"),
    );
    Connector::with_base_url(ConnectorConfig::default(), &server.uri(), auth)
        .expect("connector init")
}

/// Convenience client over [`pat_connector`]
#[allow(dead_code)]
pub fn pat_client(server: &MockServer) -> Client {
    Client::from_connector(pat_connector(server))
}

/// Connector backed by the client-credentials strategy, pointed at the mock
/// server
#[allow(dead_code)]
pub fn client_credentials_connector(server: &MockServer) -> Connector {
    let credentials = AuthConfig::from([
        ("client_id".to_string(), "42".to_string()),
        ("client_secret".to_string(), "s3cret".to_string()),
    ]);
    let auth = Arc::new(
        ClientCredentials::with_base_url(credentials, &server.uri(), 2)
            .expect("client credentials auth"),
    );
    Connector::with_base_url(ConnectorConfig::default(), &server.uri(), auth)
        .expect("connector init")
}

/// Mount `POST /oauth/token` returning the given token, expecting `hits`
/// exchanges
#[allow(dead_code)]
pub async fn mount_token_endpoint(server: &MockServer, token: &str, expires_in: i64, hits: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "expires_in": expires_in,
        })))
        .expect(hits)
        .mount(server)
        .await;
}
