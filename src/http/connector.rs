/*
[INPUT]:  Environment configuration, endpoint names, and request bodies
[OUTPUT]: Decoded JSON payloads from the versioned Vantage API
[POS]:    HTTP layer - core request assembly and dispatch
[UPDATE]: When request assembly, hosts, or the auth handshake change
*/

use std::sync::Arc;
use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Url};
use serde_json::Value;
use tracing::debug;

use crate::auth::{AuthConfig, AuthProvider, PersonalAccessToken};
use crate::http::{Result, VantageError};

/// Base URLs for the Vantage API
pub const SANDBOX_HOST: &str = "https://sandbox.vantage.app";
pub const PRODUCTION_HOST: &str = "https://trade.vantage.app";

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub(crate) const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Target environment for a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    /// Resolve an environment from its configured name. Anything other than
    /// `production` falls back to sandbox, never an error.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Sandbox
        }
    }

    /// Host serving this environment
    pub fn host(&self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_HOST,
            Environment::Sandbox => SANDBOX_HOST,
        }
    }
}

/// Connector configuration
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    pub environment: Environment,
    /// API version, forms the `api/v{n}/` path prefix
    pub version: u32,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Sandbox,
            version: 2,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Builds and sends requests against the versioned Vantage API, injecting the
/// bearer header where a request requires authentication and renewing the
/// session transparently when the held token has expired.
#[derive(Debug)]
pub struct Connector {
    http: Client,
    host: Url,
    prefix: String,
    config: ConnectorConfig,
    auth: Arc<dyn AuthProvider>,
}

impl Connector {
    /// Create a connector with the default personal-access-token strategy,
    /// reading `token` and optional `expires_at` from `credentials`.
    pub fn new(config: ConnectorConfig, credentials: AuthConfig) -> Result<Self> {
        let auth = Arc::new(PersonalAccessToken::new(
            credentials,
            config.environment,
            config.version,
        )?);
        Self::with_auth(config, auth)
    }

    /// Create a connector with an explicit auth strategy.
    pub fn with_auth(config: ConnectorConfig, auth: Arc<dyn AuthProvider>) -> Result<Self> {
        let host = config.environment.host().to_string();
        Self::with_base_url(config, &host, auth)
    }

    /// Create a connector against an explicit base URL. Used by tests and
    /// self-hosted gateways; production code resolves the host from the
    /// environment.
    pub fn with_base_url(
        config: ConnectorConfig,
        base_url: &str,
        auth: Arc<dyn AuthProvider>,
    ) -> Result<Self> {
        let host = Url::parse(base_url)?;
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;
        let prefix = format!("api/v{}/", config.version);

        Ok(Self {
            http,
            host,
            prefix,
            config,
            auth,
        })
    }

    /// Endpoint GET. Non-empty `params` become URL query parameters.
    pub async fn get(&self, endpoint: &str, auth: bool, params: Value) -> Result<Value> {
        self.query(endpoint, params, Method::GET, auth).await
    }

    /// Endpoint POST, always authenticated. Non-empty `body` is sent as JSON.
    pub async fn post(&self, endpoint: &str, body: Value) -> Result<Value> {
        self.query(endpoint, body, Method::POST, true).await
    }

    /// Resolved host for this connector's environment
    pub fn host(&self) -> &Url {
        &self.host
    }

    /// Versioned path prefix, e.g. `api/v2/`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Connector configuration
    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// The auth strategy backing this connector
    pub fn auth_handler(&self) -> &Arc<dyn AuthProvider> {
        &self.auth
    }

    /// Shared request primitive behind `get`/`post`.
    ///
    /// Assembles headers, renews the session when required, places the body
    /// according to the method, and decodes the response as generic JSON.
    /// Endpoint strings pass through verbatim.
    async fn query(
        &self,
        endpoint: &str,
        body: Value,
        method: Method,
        auth: bool,
    ) -> Result<Value> {
        let path = format!("{}{}", self.prefix, endpoint.trim_start_matches('/'));
        let url = self.host.join(&path)?;

        let mut builder = self
            .http
            .request(method.clone(), url)
            .header(header::ACCEPT, "application/json");

        if auth {
            // Propagates authorization failures without issuing the call
            let token = self.auth.ensure_authorized().await?;
            builder = builder.bearer_auth(token);
        }

        if !body_is_empty(&body) {
            builder = if method == Method::GET {
                builder.query(&query_pairs(&body))
            } else {
                builder.json(&body)
            };
        }

        debug!(%method, endpoint, auth, "dispatching API request");
        self.send_json(builder).await
    }

    async fn send_json(&self, builder: RequestBuilder) -> Result<Value> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(VantageError::api_error(status, message));
        }

        Ok(response.json().await?)
    }
}

fn body_is_empty(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Flatten a JSON object into query pairs, stringifying scalar values.
fn query_pairs(body: &Value) -> Vec<(String, String)> {
    let Some(map) = body.as_object() else {
        return Vec::new();
    };

    map.iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}
