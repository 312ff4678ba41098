//! Threshold classification of the latest oscillator value

use chrono::{DateTime, Utc};

/// Market state relative to the configured RSI thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Overbought,
    Oversold,
    Neutral,
}

/// One evaluation outcome: the classification plus the RSI value and the
/// candle timestamp that produced it. Ephemeral: built, delivered, and
/// discarded within a single cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalEvent {
    pub kind: SignalKind,
    pub rsi: f64,
    pub timestamp: DateTime<Utc>,
}

/// Classify an RSI value against the thresholds.
///
/// Total over all finite inputs: exactly one of the three states comes back.
/// The overbought check runs first, so with misordered thresholds
/// (oversold >= overbought) contested values resolve to `Overbought`;
/// threshold ordering is the caller's responsibility.
pub fn classify(latest_rsi: f64, overbought: f64, oversold: f64) -> SignalKind {
    if latest_rsi > overbought {
        SignalKind::Overbought
    } else if latest_rsi < oversold {
        SignalKind::Oversold
    } else {
        SignalKind::Neutral
    }
}

impl SignalEvent {
    pub fn new(kind: SignalKind, rsi: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            rsi,
            timestamp,
        }
    }

    /// Human-readable alert line for this event.
    pub fn alert_message(&self, overbought: f64, oversold: f64) -> String {
        let time = self.timestamp.format("%Y-%m-%d %H:%M:%S");
        match self.kind {
            SignalKind::Overbought => format!(
                "Overbought signal! time: {}, RSI: {:.2} (> {})",
                time, self.rsi, overbought
            ),
            SignalKind::Oversold => format!(
                "Oversold signal! time: {}, RSI: {:.2} (< {})",
                time, self.rsi, oversold
            ),
            SignalKind::Neutral => {
                format!("time: {}, RSI: {:.2} (no signal)", time, self.rsi)
            }
        }
    }
}
