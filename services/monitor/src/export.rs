//! Batch-run series export

use std::path::Path;

use crate::error::Result;
use pulse_types::Candle;

/// Write the candle + RSI series as CSV with columns
/// `timestamp,close,rsi`. Undefined RSI entries leave the third column
/// empty.
pub fn write_series_csv(path: &Path, candles: &[Candle], series: &[Option<f64>]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["timestamp", "close", "rsi"])?;

    for (candle, rsi) in candles.iter().zip(series) {
        writer.write_record([
            candle.timestamp.to_rfc3339(),
            candle.close.to_string(),
            rsi.map(|v| v.to_string()).unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
