/*
[INPUT]:  Stored credential secret and the oauth token endpoint
[OUTPUT]: Short-lived bearer tokens with proactive rotation
[POS]:    Auth layer - interactive credential exchange strategy
[UPDATE]: When the token exchange wire format or rotation policy changes
*/

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::auth::provider::{AuthConfig, AuthProvider};
use crate::auth::session::{revoke_session, SessionState};
use crate::http::connector::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
use crate::http::{Environment, Result, VantageError};

/// Shape the token endpoint must return
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Exchanges a stored credential secret for a short-lived bearer token via
/// `POST oauth/token` (form-encoded, unauthenticated). Re-authorizing while a
/// token is still held revokes it first, so two live tokens never exist at
/// once. A failed revoke aborts the rotation and the error propagates.
#[derive(Debug)]
pub struct ClientCredentials {
    http: Client,
    host: Url,
    prefix: String,
    config: AuthConfig,
    session: SessionState,
}

impl ClientCredentials {
    /// Create the strategy against the host of `environment`.
    pub fn new(config: AuthConfig, environment: Environment, version: u32) -> Result<Self> {
        Self::with_base_url(config, environment.host(), version)
    }

    /// Create the strategy against an explicit base URL.
    pub fn with_base_url(config: AuthConfig, base_url: &str, version: u32) -> Result<Self> {
        let host = Url::parse(base_url)?;
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            host,
            prefix: format!("api/v{version}/"),
            config,
            session: SessionState::new(),
        })
    }

    /// Raw decoded body of the last successful token exchange
    pub fn raw_response(&self) -> Option<Value> {
        self.session.raw()
    }

    /// Rotation step. Caller holds the exchange lock.
    async fn authorize_locked(&self) -> Result<()> {
        if self.session.token().is_some() {
            // Never hold two live tokens. A failed revoke leaves the session
            // empty and aborts the re-authorization.
            revoke_session(&self.http, &self.host, &self.prefix, &self.session).await?;
        }
        self.exchange().await
    }

    /// Trade the stored credentials for a fresh token. On failure the session
    /// is left untouched.
    async fn exchange(&self) -> Result<()> {
        let mut form: Vec<(&str, &str)> = vec![("grant_type", "password"), ("scope", "")];
        form.extend(self.config.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let url = self.host.join("oauth/token")?;
        let response = self.http.post(url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(VantageError::api_error(status, message));
        }

        let raw: Value = response.json().await?;
        let parsed: TokenResponse = serde_json::from_value(raw.clone())
            .map_err(|e| VantageError::InvalidResponse(format!("token exchange response: {e}")))?;

        let expires_at = Utc::now() + Duration::seconds(parsed.expires_in);
        info!(%expires_at, "bearer token issued");
        self.session.install(parsed.access_token, expires_at, raw);

        Ok(())
    }
}

#[async_trait]
impl AuthProvider for ClientCredentials {
    async fn authorize(&self) -> Result<()> {
        let _guard = self.session.lock_exchange().await;
        self.authorize_locked().await
    }

    async fn revoke(&self) -> Result<()> {
        let _guard = self.session.lock_exchange().await;
        revoke_session(&self.http, &self.host, &self.prefix, &self.session).await
    }

    async fn ensure_authorized(&self) -> Result<String> {
        let _guard = self.session.lock_exchange().await;
        if self.session.is_expired() {
            self.authorize_locked().await?;
        }
        self.session
            .token()
            .ok_or_else(|| VantageError::Config("no bearer token held after authorization".to_string()))
    }

    fn is_expired(&self) -> bool {
        self.session.is_expired()
    }

    fn token(&self) -> Option<String> {
        self.session.token()
    }

    fn token_expiry(&self) -> Option<DateTime<Utc>> {
        self.session.expiry()
    }

    fn config(&self) -> &AuthConfig {
        &self.config
    }
}
