//! Wilder RSI over a candle window
//!
//! The series is recomputed in full from a window snapshot on every update.
//! The window is bounded, so the cost stays flat, and a stateless recompute
//! yields the same output whether the window was filled by one historical
//! fetch or candle by candle from a live stream.

use pulse_types::Candle;

/// Relative Strength Index over `period` candle-to-candle changes.
///
/// Output is aligned to the input: entry `i` holds the RSI at candle `i`,
/// `None` until `period` changes have accumulated. Inputs shorter than
/// `period + 1` candles yield an all-`None` series (insufficient data, not
/// an error).
pub fn rsi(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    assert!(period >= 1, "RSI period must be >= 1");

    let n = candles.len();
    let mut series = vec![None; n];
    if n < period + 1 {
        return series;
    }

    // Seed: arithmetic mean of gains and losses over the first `period`
    // changes.
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let delta = candles[i].close - candles[i - 1].close;
        if delta > 0.0 {
            avg_gain += delta;
        } else {
            avg_loss -= delta;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    series[period] = Some(rsi_value(avg_gain, avg_loss));

    // Wilder smoothing for subsequent values.
    for i in (period + 1)..n {
        let delta = candles[i].close - candles[i - 1].close;
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);

        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;

        series[i] = Some(rsi_value(avg_gain, avg_loss));
    }

    series
}

// A zero average loss pins the oscillator to 100 rather than dividing by
// zero.
fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Latest defined RSI value with the candle that produced it, if any.
pub fn latest(candles: &[Candle], series: &[Option<f64>]) -> Option<(Candle, f64)> {
    candles
        .iter()
        .zip(series)
        .rev()
        .find_map(|(candle, value)| value.map(|v| (*candle, v)))
}
