/*
[INPUT]:  HTTP client configuration and generic request dispatch
[OUTPUT]: HTTP responses decoded as generic JSON payloads
[POS]:    HTTP layer - REST API communication
[UPDATE]: When request assembly or client behavior changes
*/

pub mod connector;
pub mod error;

pub use connector::{Connector, ConnectorConfig, Environment, PRODUCTION_HOST, SANDBOX_HOST};
pub use error::{Result, VantageError};
