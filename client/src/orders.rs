//! Signed order placement and order history.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};

use crate::error::{HbdmError, Result};
use crate::reply::ExchangeReply;
use crate::rest::HbdmClient;

pub const CONTRACT_ORDER_PATH: &str = "/api/v1/contract_order";
pub const CONTRACT_HISORDERS_PATH: &str = "/api/v1/contract_hisorders";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Buy,
    Sell,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Offset {
    Open,
    Close,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, AsRefStr, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    ThisWeek,
    NextWeek,
    Quarter,
    NextQuarter,
}

/// Body of `POST /api/v1/contract_order`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Number of contracts.
    pub volume: i64,
    pub direction: Direction,
    pub offset: Offset,
    pub lever_rate: i64,
    pub symbol: String,
    /// e.g. `limit`, `opponent`, `post_only`.
    pub order_price_type: String,
    pub contract_type: ContractType,
    pub price: f64,
}

impl OrderRequest {
    /// Local sanity check. Nothing is sent for a request that fails it.
    pub fn validate(&self) -> Result<()> {
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(HbdmError::InvalidOrder("price must be > 0".to_string()));
        }
        if self.volume <= 0 {
            return Err(HbdmError::InvalidOrder("volume must be > 0".to_string()));
        }
        if self.lever_rate <= 0 {
            return Err(HbdmError::InvalidOrder("lever_rate must be > 0".to_string()));
        }
        if self.symbol.trim().is_empty() {
            return Err(HbdmError::InvalidOrder("symbol empty".to_string()));
        }
        Ok(())
    }
}

/// Body of `POST /api/v1/contract_hisorders`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderHistoryQuery {
    /// 1: all orders, 2: finished orders.
    #[serde(rename = "type")]
    pub kind: i64,
    /// 0: all trade types.
    pub trade_type: i64,
    /// Look-back window in days.
    pub create_date: i64,
    /// 0: all statuses.
    pub status: i64,
    pub symbol: String,
}

impl OrderHistoryQuery {
    pub fn all(symbol: impl Into<String>, days: i64) -> Self {
        Self {
            kind: 1,
            trade_type: 0,
            create_date: days,
            status: 0,
            symbol: symbol.into(),
        }
    }
}

/// One row of `data.orders` in the order-history reply.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "strict-serde", serde(deny_unknown_fields))]
pub struct OrderRecord {
    #[serde(default)]
    pub order_id: i64,
    #[serde(default)]
    pub order_id_str: Option<String>,
    pub symbol: String,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub contract_code: Option<String>,
    pub direction: String,
    pub offset: String,
    pub volume: f64,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub lever_rate: i64,
    #[serde(default)]
    pub order_price_type: Option<Value>,
    #[serde(default)]
    pub trade_volume: f64,
    #[serde(default)]
    pub trade_avg_price: Option<f64>,
    #[serde(default)]
    pub status: i64,
    /// Milliseconds since the epoch.
    #[serde(default)]
    pub create_date: i64,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct OrderHistoryData {
    #[serde(default)]
    orders: Vec<OrderRecord>,
}

/// The order side of the exchange, as the dashboard sees it.
#[async_trait]
pub trait OrderGateway {
    async fn place_order(&self, order: &OrderRequest) -> Result<ExchangeReply<Value>>;

    async fn order_history(
        &self,
        query: &OrderHistoryQuery,
    ) -> Result<ExchangeReply<Vec<OrderRecord>>>;
}

#[async_trait]
impl OrderGateway for HbdmClient {
    async fn place_order(&self, order: &OrderRequest) -> Result<ExchangeReply<Value>> {
        order.validate()?;

        let body = self.post_signed(&self.url(CONTRACT_ORDER_PATH), order).await?;
        let reply = ExchangeReply::classify(body);
        match &reply {
            ExchangeReply::Accepted(data) => {
                log::info!("order accepted: {} {} {}", order.direction, order.symbol, data);
            }
            ExchangeReply::Rejected { code, message } => {
                log::warn!("order rejected: {code:?} {message}");
            }
        }
        Ok(reply)
    }

    async fn order_history(
        &self,
        query: &OrderHistoryQuery,
    ) -> Result<ExchangeReply<Vec<OrderRecord>>> {
        let body = self
            .post_signed(&self.url(CONTRACT_HISORDERS_PATH), query)
            .await?;
        let reply = ExchangeReply::classify(body).decode::<OrderHistoryData>()?;
        Ok(reply.map(|data| data.orders))
    }
}
