/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Vantage client crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod client;
pub mod http;

// Re-export commonly used types from auth
pub use auth::{
    AuthConfig,
    AuthProvider,
    ClientCredentials,
    PersonalAccessToken,
};

// Re-export commonly used types from http
pub use http::{
    Connector,
    ConnectorConfig,
    Environment,
    Result,
    VantageError,
    PRODUCTION_HOST,
    SANDBOX_HOST,
};

// Re-export the convenience layer
pub use client::{Client, OrderFilter, ORDER_STATUSES, SUPPORTED_CURRENCIES};
