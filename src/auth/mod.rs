/*
[INPUT]:  Credential configuration and token endpoints
[OUTPUT]: Bearer tokens with tracked expiry
[POS]:    Auth layer - handles Vantage API authentication
[UPDATE]: When auth strategies or the session lifecycle change
*/

pub mod client_credentials;
pub mod personal_token;
pub mod provider;
pub(crate) mod session;

pub use client_credentials::ClientCredentials;
pub use personal_token::PersonalAccessToken;
pub use provider::{AuthConfig, AuthProvider};
