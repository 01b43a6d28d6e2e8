/*
[INPUT]:  Bearer tokens and expiration timestamps
[OUTPUT]: Token retrieval, expiration status, and session teardown
[POS]:    Auth layer - session lifecycle management
[UPDATE]: When token storage or the revoke wire call changes
*/

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;
use url::Url;

use crate::http::{Result, VantageError};

/// One authorization session. Invariant: `token` and `expires_at` are either
/// both set (live session) or both absent (never authorized, or revoked).
#[derive(Debug, Clone, Default)]
pub(crate) struct Session {
    pub token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub raw: Option<Value>,
}

/// Shared session state for one authenticator.
///
/// Reads (`token`, `is_expired`) go through a cheap `RwLock`. Token exchanges
/// serialize on a separate async mutex so at most one authorize/revoke
/// round-trip is in flight per authenticator.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    data: RwLock<Session>,
    exchange: Mutex<()>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the exchange lock. Held across the full authorize/revoke
    /// round-trip by the owning authenticator.
    pub async fn lock_exchange(&self) -> MutexGuard<'_, ()> {
        self.exchange.lock().await
    }

    pub fn token(&self) -> Option<String> {
        let guard = self.data.read().unwrap();
        guard.token.clone()
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        let guard = self.data.read().unwrap();
        guard.expires_at
    }

    pub fn raw(&self) -> Option<Value> {
        let guard = self.data.read().unwrap();
        guard.raw.clone()
    }

    /// True when no token is held, or wall-clock time is at or past the
    /// expiry instant. Evaluated fresh on every call.
    pub fn is_expired(&self) -> bool {
        let guard = self.data.read().unwrap();
        match (&guard.token, &guard.expires_at) {
            (Some(_), Some(expires_at)) => Utc::now() >= *expires_at,
            _ => true,
        }
    }

    /// Replace the session with a freshly issued token.
    pub fn install(&self, token: String, expires_at: DateTime<Utc>, raw: Value) {
        let mut guard = self.data.write().unwrap();
        *guard = Session {
            token: Some(token),
            expires_at: Some(expires_at),
            raw: Some(raw),
        };
    }

    /// Drop the session back to its unauthorized state.
    pub fn clear(&self) {
        let mut guard = self.data.write().unwrap();
        *guard = Session::default();
    }
}

/// Revoke the held token against `{prefix}auth/revoke`, then clear local
/// state. Clearing is unconditional: a failed wire call still empties the
/// session before the error propagates. No-op when no token is held.
///
/// Callers must hold the exchange lock.
pub(crate) async fn revoke_session(
    http: &Client,
    host: &Url,
    prefix: &str,
    session: &SessionState,
) -> Result<()> {
    let Some(token) = session.token() else {
        return Ok(());
    };

    debug!("revoking bearer token");
    let url = host.join(&format!("{prefix}auth/revoke"))?;
    let outcome = http.post(url).bearer_auth(token).send().await;

    session.clear();

    let response = outcome?;
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(VantageError::api_error(status, message));
    }

    Ok(())
}
