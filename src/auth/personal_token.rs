/*
[INPUT]:  Pre-issued long-lived token from the credential configuration
[OUTPUT]: Bearer token with a default one-year expiry window
[POS]:    Auth layer - personal access token strategy
[UPDATE]: When the default expiry window or config fields change
*/

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Url};
use serde_json::{Map, Value};
use tracing::debug;

use crate::auth::provider::{AuthConfig, AuthProvider};
use crate::auth::session::{revoke_session, SessionState};
use crate::http::connector::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT};
use crate::http::{Environment, Result, VantageError};

/// Expiry window applied when the configuration carries no `expires_at`
const DEFAULT_TTL_DAYS: i64 = 365;

/// Wraps a pre-issued long-lived token. `authorize` performs no network call:
/// it reads `token` from the configuration and computes the expiry from the
/// optional `expires_at` field (unix seconds), defaulting to one year ahead.
#[derive(Debug)]
pub struct PersonalAccessToken {
    http: Client,
    host: Url,
    prefix: String,
    config: AuthConfig,
    session: SessionState,
}

impl PersonalAccessToken {
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

    /// Caller holds the exchange lock.
    fn authorize_locked(&self) -> Result<()> {
        let token = self
            .config
            .get("token")
            .cloned()
            .ok_or_else(|| {
                VantageError::Config("personal access token config is missing `token`".to_string())
            })?;

        let expires_at = match self.config.get("expires_at") {
            Some(raw) => {
                let seconds: i64 = raw.parse().map_err(|_| {
                    VantageError::Config(format!("invalid `expires_at` timestamp: {raw}"))
                })?;
                DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
                    VantageError::Config(format!("`expires_at` out of range: {raw}"))
                })?
            }
            None => Utc::now() + Duration::days(DEFAULT_TTL_DAYS),
        };

        debug!(%expires_at, "personal access token activated");
        self.session
            .install(token, expires_at, Value::Object(Map::new()));

        Ok(())
    }
}

#[async_trait]
impl AuthProvider for PersonalAccessToken {
    async fn authorize(&self) -> Result<()> {
        let _guard = self.session.lock_exchange().await;
        self.authorize_locked()
    }

    async fn revoke(&self) -> Result<()> {
        let _guard = self.session.lock_exchange().await;
        revoke_session(&self.http, &self.host, &self.prefix, &self.session).await
    }

    async fn ensure_authorized(&self) -> Result<String> {
        let _guard = self.session.lock_exchange().await;
        if self.session.is_expired() {
            self.authorize_locked()?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_config() -> AuthConfig {
        AuthConfig::from([("token".to_string(), "PAT456".to_string())])
    }

    #[tokio::test]
    async fn test_authorize_defaults_to_one_year() {
        let auth =
            PersonalAccessToken::new(token_config(), Environment::Sandbox, 2).unwrap();
        assert!(auth.is_expired());

        auth.authorize().await.unwrap();

        assert_eq!(auth.token(), Some("PAT456".to_string()));
        assert!(!auth.is_expired());

        let expiry = auth.token_expiry().unwrap();
        let lower = Utc::now() + Duration::days(DEFAULT_TTL_DAYS - 1);
        let upper = Utc::now() + Duration::days(DEFAULT_TTL_DAYS + 1);
        assert!(expiry > lower && expiry < upper);
    }

    #[tokio::test]
    async fn test_explicit_expires_at_is_honored() {
        let expires_at = (Utc::now() + Duration::hours(2)).timestamp();
        let config = AuthConfig::from([
            ("token".to_string(), "PAT456".to_string()),
            ("expires_at".to_string(), expires_at.to_string()),
        ]);

        let auth = PersonalAccessToken::new(config, Environment::Sandbox, 2).unwrap();
        auth.authorize().await.unwrap();

        assert_eq!(auth.token_expiry().unwrap().timestamp(), expires_at);
        assert!(!auth.is_expired());
    }

    #[tokio::test]
    async fn test_past_expires_at_is_expired() {
        let config = AuthConfig::from([
            ("token".to_string(), "PAT456".to_string()),
            ("expires_at".to_string(), "1000000".to_string()),
        ]);

        let auth = PersonalAccessToken::new(config, Environment::Sandbox, 2).unwrap();
        auth.authorize().await.unwrap();
        assert!(auth.is_expired());
    }

    #[tokio::test]
    async fn test_missing_token_field() {
        let auth =
            PersonalAccessToken::new(AuthConfig::new(), Environment::Sandbox, 2).unwrap();
        let err = auth.authorize().await.unwrap_err();

        match err {
            VantageError::Config(message) => assert!(message.contains("token")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(auth.token().is_none());
    }

    #[tokio::test]
    async fn test_invalid_expires_at_value() {
        let config = AuthConfig::from([
            ("token".to_string(), "PAT456".to_string()),
            ("expires_at".to_string(), "next tuesday".to_string()),
        ]);

        let auth = PersonalAccessToken::new(config, Environment::Sandbox, 2).unwrap();
        assert!(auth.authorize().await.is_err());
    }

    #[tokio::test]
    async fn test_revoke_clears_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/auth/revoke"))
            .and(header("authorization", "Bearer PAT456"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let auth =
            PersonalAccessToken::with_base_url(token_config(), &server.uri(), 2).unwrap();
        auth.authorize().await.unwrap();
        auth.revoke().await.unwrap();

        assert!(auth.token().is_none());
        assert!(auth.token_expiry().is_none());
        assert!(auth.is_expired());
    }

    #[tokio::test]
    async fn test_config_accessor() {
        let auth =
            PersonalAccessToken::new(token_config(), Environment::Sandbox, 2).unwrap();
        assert_eq!(auth.config().get("token"), Some(&"PAT456".to_string()));
    }
}
