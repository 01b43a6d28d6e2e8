/*
[INPUT]:  Credential configuration supplied at construction
[OUTPUT]: Authorization contract shared by all auth strategies
[POS]:    Auth layer - strategy abstraction
[UPDATE]: When the authenticator capability set changes
*/

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::http::Result;

/// Opaque credential configuration, key to value. Field semantics depend on
/// the auth strategy: a client secret and account fields for
/// [`ClientCredentials`](crate::auth::ClientCredentials), or `token` plus an
/// optional `expires_at` for
/// [`PersonalAccessToken`](crate::auth::PersonalAccessToken).
pub type AuthConfig = BTreeMap<String, String>;

/// Contract shared by the two auth strategies.
///
/// Both strategies are chosen at configuration time and sit behind
/// `Arc<dyn AuthProvider>` in the connector. The trait is async to cover the
/// strategies that exchange credentials over the wire.
#[async_trait]
pub trait AuthProvider: Send + Sync + std::fmt::Debug {
    /// Acquire a fresh bearer token, replacing any token currently held.
    /// On failure the session is left as the strategy's rotation rules
    /// dictate and the error propagates.
    async fn authorize(&self) -> Result<()>;

    /// Revoke the held token remotely and clear local session state.
    /// Safe to call when no token is held.
    async fn revoke(&self) -> Result<()>;

    /// Return a usable bearer token, authorizing first if the session is
    /// absent or expired. Concurrent callers serialize on the session's
    /// exchange lock and observe the single resulting token.
    async fn ensure_authorized(&self) -> Result<String>;

    /// True when no token is held or the expiry instant has passed.
    fn is_expired(&self) -> bool;

    /// The held bearer token, if any.
    fn token(&self) -> Option<String>;

    /// Expiry instant of the held token, if any.
    fn token_expiry(&self) -> Option<DateTime<Utc>>;

    /// Credential configuration supplied at construction.
    fn config(&self) -> &AuthConfig;
}
