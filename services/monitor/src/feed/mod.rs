//! Market data sources
//!
//! Two arrival modes behind one trait: a one-shot historical fetch and a
//! lazy, infinite live subscription. The orchestrator only sees this seam,
//! so tests drive it with scripted in-memory feeds.

pub mod binance;

use async_trait::async_trait;

use crate::error::Result;
use pulse_types::{Candle, CandleUpdate, Interval};

pub use binance::BinanceFeed;

/// A provider of historical candles and live candle updates.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch up to `limit` most recent candles, oldest first.
    ///
    /// Fails with `Transport` on network/API errors and `Data` on an empty
    /// or malformed response. Never retried here.
    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>>;

    /// Open a live candle-update subscription.
    ///
    /// The returned stream is non-restartable; a consumer that wants to
    /// resume opens a new subscription.
    async fn subscribe(&self, symbol: &str, interval: Interval) -> Result<Box<dyn CandleStream>>;
}

/// A live sequence of candle updates.
#[async_trait]
pub trait CandleStream: Send {
    /// Await the next update; `Ok(None)` once the stream has ended.
    async fn next_update(&mut self) -> Result<Option<CandleUpdate>>;
}
