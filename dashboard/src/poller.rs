//! Timer-driven market reads. Each call fetches fresh; nothing is queued,
//! deduplicated or gap-checked.

use crate::config::ChartSpec;
use hbdm::{CandlestickInterval, MarketData, PricePoint};

/// Latest 1-minute close, stamped with the caller's wall clock (`now_unix`)
/// rather than the candle's bucket time.
pub async fn live_point<M>(market: &M, symbol: &str, now_unix: i64) -> hbdm::Result<Option<PricePoint>>
where
    M: MarketData + ?Sized,
{
    let candles = market
        .fetch_recent_candles(symbol, CandlestickInterval::Min1, 1)
        .await?;
    Ok(candles.last().map(|c| PricePoint { ts: now_unix, close: c.close }))
}

/// A fresh window for one history chart, most recent last.
pub async fn history_window<M>(market: &M, symbol: &str, spec: &ChartSpec) -> hbdm::Result<Vec<PricePoint>>
where
    M: MarketData + ?Sized,
{
    market
        .fetch_recent_candles(symbol, spec.interval, spec.count)
        .await
}


#[cfg(test)]
mod tests {
    use super::testing::FakeMarket;
    use super::*;

    fn market() -> FakeMarket {
        FakeMarket {
            candles: vec![
                PricePoint { ts: 60, close: 10.0 },
                PricePoint { ts: 120, close: 11.0 },
                PricePoint { ts: 180, close: 12.5 },
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn live_point_uses_latest_close_and_wall_clock() {
        let m = market();
        let pt = live_point(&m, "ETH_CQ", 1_700_000_000).await.unwrap();
        assert_eq!(pt, Some(PricePoint { ts: 1_700_000_000, close: 12.5 }));
        assert_eq!(
            m.calls.lock().unwrap().as_slice(),
            &[("ETH_CQ".to_string(), CandlestickInterval::Min1, 1)]
        );
    }

    #[tokio::test]
    async fn live_point_on_empty_reply_is_none() {
        let m = FakeMarket::default();
        assert_eq!(live_point(&m, "ETH_CQ", 1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn history_window_passes_spec_through() {
        let m = market();
        let spec = ChartSpec { interval: CandlestickInterval::Min5, count: 2 };
        let pts = history_window(&m, "ETH_CQ", &spec).await.unwrap();
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[1].close, 12.5);
        assert_eq!(m.calls.lock().unwrap()[0].1, CandlestickInterval::Min5);
    }
}
