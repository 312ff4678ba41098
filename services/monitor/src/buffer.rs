//! Bounded candle window feeding the RSI engine

use std::collections::VecDeque;

use tracing::warn;

use pulse_types::Candle;

/// Ordered, bounded sequence of closed candles.
///
/// Timestamps are strictly increasing; once the window is full, the oldest
/// candle is evicted first. Owned exclusively by the orchestrating task, so
/// no locking is needed around it.
#[derive(Debug, Clone)]
pub struct CandleBuffer {
    capacity: usize,
    candles: VecDeque<Candle>,
}

impl CandleBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 1, "buffer capacity must be at least 1");
        Self {
            capacity,
            candles: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a candle, evicting the oldest entry once over capacity.
    ///
    /// Candles at or before the last stored timestamp are dropped: the feed
    /// re-emits in-progress candles and may deliver out of order, and neither
    /// may enter the window. Returns whether the candle was stored.
    pub fn append(&mut self, candle: Candle) -> bool {
        if let Some(last) = self.candles.back() {
            if candle.timestamp <= last.timestamp {
                warn!(
                    "Dropping out-of-order candle: {} <= {}",
                    candle.timestamp, last.timestamp
                );
                return false;
            }
        }

        self.candles.push_back(candle);
        while self.candles.len() > self.capacity {
            self.candles.pop_front();
        }

        true
    }

    /// Owned copy of the current window, oldest first.
    ///
    /// The RSI engine works on this copy and never observes the window
    /// mid-mutation.
    pub fn snapshot(&self) -> Vec<Candle> {
        self.candles.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
