/*
[INPUT]:  Verbose trading operations (prices, quotes, orders, withdrawals)
[OUTPUT]: Validated pass-through calls over the generic get/post contract
[POS]:    Convenience layer - endpoint wrappers around the connector
[UPDATE]: When adding endpoint wrappers or changing parameter validation
*/

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::auth::AuthConfig;
use crate::http::{Connector, ConnectorConfig, Result, VantageError};

/// Currencies the API accepts as the counter side of a pair
pub const SUPPORTED_CURRENCIES: [&str; 2] = ["cad", "usd"];

/// Statuses a limit order listing can filter on
pub const ORDER_STATUSES: [&str; 3] = ["open", "cancelled", "delivered"];

/// Filters for the limit order listing
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub before: Option<DateTime<Utc>>,
    pub after: Option<DateTime<Utc>>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
}

/// Wrapper around the API connector for verbose method names and response
/// formatting. Every method is a thin pass-through over `get`/`post`; shape
/// checking beyond what is reformatted here is left to the caller.
#[derive(Debug)]
pub struct Client {
    api: Connector,
}

impl Client {
    /// Create a client with the default personal-access-token strategy.
    pub fn new(config: ConnectorConfig, credentials: AuthConfig) -> Result<Self> {
        Ok(Self {
            api: Connector::new(config, credentials)?,
        })
    }

    /// Wrap an existing connector, e.g. one with a client-credentials
    /// strategy or a test base URL.
    pub fn from_connector(api: Connector) -> Self {
        Self { api }
    }

    /// The underlying connector
    pub fn connector(&self) -> &Connector {
        &self.api
    }

    /// Fetch the price for all tradeable pairs
    ///
    /// GET api/v2/prices
    pub async fn prices(&self) -> Result<Value> {
        self.api.get("prices", true, Value::Null).await
    }

    /// Fetch the price entry for a single pair, keyed `ASSET:CURRENCY`
    pub async fn price(&self, asset: &str, currency: &str) -> Result<Value> {
        let prices = self.prices().await?;
        let key = format!(
            "{}:{}",
            asset.to_uppercase(),
            currency.to_uppercase()
        );

        prices
            .get(&key)
            .cloned()
            .ok_or_else(|| VantageError::AssetNotAvailable(format!("no price for pair '{key}'")))
    }

    /// Fetch the list of tradeable assets
    ///
    /// GET api/v2/assets
    pub async fn assets(&self) -> Result<Value> {
        self.api.get("assets", true, Value::Null).await
    }

    /// Fetch a quote for a given asset and value. With `use_fiat` the value
    /// is a fiat amount, otherwise an asset quantity.
    ///
    /// POST api/v2/quote
    pub async fn quote(
        &self,
        value: Decimal,
        side: &str,
        asset: &str,
        currency: &str,
        use_fiat: bool,
    ) -> Result<Value> {
        let currency = validate_currency(currency)?;

        let mut body = json!({
            "side": side,
            "asset": asset.to_lowercase(),
            "counter_asset": currency,
        });
        let field = if use_fiat { "amount" } else { "quantity" };
        body[field] = serde_json::to_value(value)?;

        self.api.post("quote", body).await
    }

    /// Execute a previously fetched quote
    ///
    /// POST api/v2/execute
    pub async fn execute(&self, quote_id: &str) -> Result<Value> {
        self.api.post("execute", json!({ "quote_id": quote_id })).await
    }

    /// Create a withdraw request for a given asset quantity
    ///
    /// POST api/v2/withdraw
    pub async fn withdraw(
        &self,
        asset: &str,
        quantity: Decimal,
        wallet: &str,
        memo: Option<&str>,
    ) -> Result<Value> {
        self.api
            .post(
                "withdraw",
                json!({
                    "asset": asset.to_lowercase(),
                    "quantity": quantity,
                    "address": wallet,
                    "memo": memo,
                }),
            )
            .await
    }

    /// Open a buy limit order
    ///
    /// POST api/v2/order
    pub async fn limit_buy(
        &self,
        price: Decimal,
        amount: Decimal,
        asset: &str,
        currency: &str,
    ) -> Result<Value> {
        let currency = validate_currency(currency)?;

        self.api
            .post(
                "order",
                json!({
                    "price": price,
                    "amount": amount,
                    "side": "buy",
                    "asset": asset,
                    "counter_asset": currency,
                }),
            )
            .await
    }

    /// Open a sell limit order
    ///
    /// POST api/v2/order
    pub async fn limit_sell(
        &self,
        price: Decimal,
        quantity: Decimal,
        asset: &str,
        currency: &str,
    ) -> Result<Value> {
        let currency = validate_currency(currency)?;

        self.api
            .post(
                "order",
                json!({
                    "price": price,
                    "quantity": quantity,
                    "side": "sell",
                    "asset": asset,
                    "counter_asset": currency,
                }),
            )
            .await
    }

    /// Cancel a limit order
    ///
    /// POST api/v2/order/cancel
    pub async fn limit_cancel(&self, order_id: &str) -> Result<Value> {
        self.api
            .post("order/cancel", json!({ "order_id": order_id }))
            .await
    }

    /// Fetch limit orders matching the given filters
    ///
    /// GET api/v2/orders
    pub async fn orders(&self, filter: OrderFilter) -> Result<Value> {
        let mut params = serde_json::Map::new();

        if let Some(before) = filter.before {
            params.insert(
                "before".to_string(),
                json!(before.format("%Y-%m-%d %H:%M:%S").to_string()),
            );
        }
        if let Some(after) = filter.after {
            params.insert(
                "after".to_string(),
                json!(after.format("%Y-%m-%d %H:%M:%S").to_string()),
            );
        }
        if let Some(status) = &filter.status {
            let status = status.to_lowercase();
            if !ORDER_STATUSES.contains(&status.as_str()) {
                return Err(VantageError::InvalidAttribute(format!(
                    "status '{status}' is not a valid limit order status, use one of: {}",
                    ORDER_STATUSES.join(", ")
                )));
            }
            params.insert("status".to_string(), json!(status));
        }
        if let Some(offset) = filter.offset {
            params.insert("offset".to_string(), json!(offset));
        }
        if let Some(limit) = filter.limit {
            params.insert("limit".to_string(), json!(limit));
        }

        self.api.get("orders", true, Value::Object(params)).await
    }

    /// Fetch account details for the authorized user
    ///
    /// GET api/v2/account
    pub async fn account(&self) -> Result<Value> {
        self.api.get("account", true, Value::Null).await
    }

    /// Fetch account balances, optionally narrowed to one asset
    ///
    /// GET api/v2/balances
    pub async fn balances(&self, asset: Option<&str>) -> Result<Value> {
        let balances = self.api.get("balances", true, Value::Null).await?;

        if let Some(asset) = asset {
            let asset = asset.to_uppercase();
            if let Some(value) = balances.get(&asset) {
                let mut narrowed = serde_json::Map::new();
                narrowed.insert(asset, value.clone());
                return Ok(Value::Object(narrowed));
            }
        }

        Ok(balances)
    }

    /// Fetch the balance of a single asset, zero when the asset is absent
    pub async fn balance(&self, asset: &str) -> Result<Decimal> {
        let balances = self.api.get("balances", true, Value::Null).await?;
        let asset = asset.to_uppercase();

        match balances.get(&asset) {
            Some(value) => decimal_from(value).ok_or_else(|| {
                VantageError::InvalidResponse(format!("balance for '{asset}' is not numeric"))
            }),
            None => Ok(Decimal::ZERO),
        }
    }

    /// Fetch the deposit address for a given asset
    ///
    /// GET api/v2/deposit/{ASSET}
    pub async fn deposit_address(&self, asset: &str) -> Result<Option<String>> {
        let endpoint = format!("deposit/{}", asset.to_uppercase());
        let response = self.api.get(&endpoint, true, Value::Null).await?;

        Ok(response
            .get("deposit_address")
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    /// Fetch the withdrawal fee for each asset
    ///
    /// GET api/v2/fees
    pub async fn fees(&self) -> Result<Value> {
        self.api.get("fees", true, Value::Null).await
    }

    /// Fetch the withdrawal fee for a single asset
    pub async fn fee(&self, asset: &str) -> Result<Decimal> {
        let fees = self.fees().await?;
        let asset = asset.to_uppercase();

        let value = fees.get(&asset).ok_or_else(|| {
            VantageError::AssetNotAvailable(format!(
                "asset '{asset}' is unavailable or does not exist"
            ))
        })?;

        decimal_from(value).ok_or_else(|| {
            VantageError::InvalidResponse(format!("fee for '{asset}' is not numeric"))
        })
    }

    /// Fetch the buy/sell minimums and maximums for each asset
    ///
    /// GET api/v2/boundaries
    pub async fn boundaries(&self) -> Result<Value> {
        self.api.get("boundaries", true, Value::Null).await
    }

    /// Fetch the buy/sell minimums and maximums for a single asset
    pub async fn boundary(&self, asset: &str) -> Result<Value> {
        let boundaries = self.boundaries().await?;
        let asset = asset.to_uppercase();

        boundaries.get(&asset).cloned().ok_or_else(|| {
            VantageError::AssetNotAvailable(format!(
                "asset '{asset}' is unavailable or does not exist"
            ))
        })
    }
}

fn validate_currency(currency: &str) -> Result<String> {
    let currency = currency.to_lowercase();
    if SUPPORTED_CURRENCIES.contains(&currency.as_str()) {
        Ok(currency)
    } else {
        Err(VantageError::InvalidAttribute(format!(
            "tradeable pair not valid, you may only trade against: {}",
            SUPPORTED_CURRENCIES.join(", ")
        )))
    }
}

fn decimal_from(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}
