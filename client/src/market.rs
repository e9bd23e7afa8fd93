//! Unsigned market data: candlesticks from `/market/history/kline`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::Result;
use crate::reply::ExchangeReply;
use crate::rest::HbdmClient;

pub const KLINE_PATH: &str = "/market/history/kline";

/// The exchange accepts `size` in `1..=2000`.
pub const MAX_CANDLES: usize = 2000;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Display, AsRefStr, EnumString, EnumIter, Serialize, Deserialize,
)]
pub enum CandlestickInterval {
    #[strum(serialize = "1min")]
    #[serde(rename = "1min")]
    Min1,
    #[strum(serialize = "5min")]
    #[serde(rename = "5min")]
    Min5,
    #[strum(serialize = "15min")]
    #[serde(rename = "15min")]
    Min15,
    #[strum(serialize = "30min")]
    #[serde(rename = "30min")]
    Min30,
    #[strum(serialize = "60min")]
    #[serde(rename = "60min")]
    Min60,
    #[strum(serialize = "4hour")]
    #[serde(rename = "4hour")]
    Hour4,
    #[strum(serialize = "1day")]
    #[serde(rename = "1day")]
    Day1,
    #[strum(serialize = "1week")]
    #[serde(rename = "1week")]
    Week1,
    #[strum(serialize = "1mon")]
    #[serde(rename = "1mon")]
    Mon1,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[cfg_attr(feature = "strict-serde", serde(deny_unknown_fields))]
pub struct Candle {
    /// Bucket open, unix seconds.
    pub id: i64,
    pub open: f64,
    pub close: f64,
    pub low: f64,
    pub high: f64,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub vol: f64,
    #[serde(default)]
    pub count: f64,
    #[serde(default)]
    pub trade_turnover: Option<f64>,
    #[serde(default)]
    pub mrid: Option<i64>,
}

/// What the charts plot: a time and a closing price.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Unix seconds.
    pub ts: i64,
    pub close: f64,
}

impl From<&Candle> for PricePoint {
    fn from(c: &Candle) -> Self {
        Self { ts: c.id, close: c.close }
    }
}

/// Source of recent candles, most recent last.
#[async_trait]
pub trait MarketData {
    async fn fetch_recent_candles(
        &self,
        symbol: &str,
        interval: CandlestickInterval,
        count: usize,
    ) -> Result<Vec<PricePoint>>;
}

impl HbdmClient {
    /// Raw candles for `symbol` (e.g. `ETH_CQ`), oldest first.
    pub async fn get_candlesticks(
        &self,
        symbol: &str,
        interval: CandlestickInterval,
        count: usize,
    ) -> Result<ExchangeReply<Vec<Candle>>> {
        let size = count.clamp(1, MAX_CANDLES);
        let body: Value = self
            .get_public(
                KLINE_PATH,
                &[
                    ("symbol", symbol.to_string()),
                    ("period", interval.to_string()),
                    ("size", size.to_string()),
                ],
            )
            .await?;

        let reply = ExchangeReply::classify(body).decode::<Vec<Candle>>()?;
        Ok(reply.map(|mut candles| {
            candles.sort_by_key(|c| c.id);
            candles
        }))
    }
}

#[async_trait]
impl MarketData for HbdmClient {
    async fn fetch_recent_candles(
        &self,
        symbol: &str,
        interval: CandlestickInterval,
        count: usize,
    ) -> Result<Vec<PricePoint>> {
        match self.get_candlesticks(symbol, interval, count).await? {
            ExchangeReply::Accepted(candles) => Ok(candles.iter().map(PricePoint::from).collect()),
            ExchangeReply::Rejected { code, message } => {
                log::warn!("kline {symbol} {interval} rejected: {code:?} {message}");
                Ok(Vec::new())
            }
        }
    }
}
