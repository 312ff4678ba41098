//! Candle records exchanged between feed adapters and the monitor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::Interval;

/// A price candle reduced to what the oscillator consumes.
///
/// History rows carry the kline open time, streamed closed candles the kline
/// close time; both advance monotonically across the warmup/stream boundary,
/// which is the only property the sliding window relies on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Candle timestamp (UTC).
    pub timestamp: DateTime<Utc>,
    /// Closing price.
    pub close: f64,
}

impl Candle {
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self { timestamp, close }
    }
}

/// A candle update emitted by a live subscription.
///
/// The feed re-emits the current candle on every tick; only updates with
/// `is_closed` set describe final values and may enter the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleUpdate {
    pub symbol: String,
    pub interval: Interval,
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub is_closed: bool,
}

impl CandleUpdate {
    /// The candle view of this update.
    pub fn to_candle(&self) -> Candle {
        Candle::new(self.timestamp, self.close)
    }
}
