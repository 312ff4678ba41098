//! Run orchestration: batch and streaming evaluation loops
//!
//! Both modes share one evaluation pass over the candle window. Batch runs
//! it once and persists the series; streaming re-runs it on every closed
//! candle from the subscription. The window is recomputed from scratch each
//! pass, so the two modes produce identical series over the same candles.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::buffer::CandleBuffer;
use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::export;
use crate::feed::MarketDataSource;
use crate::indicators;
use crate::signals::{classify, SignalEvent, SignalKind};
use crate::sink::AlertSink;
use pulse_types::Candle;

/// Wires feed → window → RSI engine → evaluator → alert sink.
///
/// States: warmup fetch, one evaluation pass, then either done (batch) or
/// an indefinite closed-candle loop (streaming). The window is owned here
/// and touched by nothing else.
pub struct Monitor {
    config: MonitorConfig,
    feed: Box<dyn MarketDataSource>,
    sink: Box<dyn AlertSink>,
    buffer: CandleBuffer,
}

impl Monitor {
    pub fn new(
        config: MonitorConfig,
        feed: Box<dyn MarketDataSource>,
        sink: Box<dyn AlertSink>,
    ) -> Self {
        let buffer = CandleBuffer::new(config.buffer_limit);
        Self {
            config,
            feed,
            sink,
            buffer,
        }
    }

    /// One-shot run: fetch history, evaluate once, persist the series.
    ///
    /// Insufficient data is an error here: a batch run that cannot produce
    /// a single RSI value has nothing to report and must exit non-zero.
    pub async fn run_batch(&mut self, output: Option<PathBuf>) -> Result<()> {
        self.warm_up().await?;

        let candles = self.buffer.snapshot();
        let series = indicators::rsi(&candles, self.config.rsi_period);

        if self.evaluate(&candles, &series).await.is_none() {
            return Err(MonitorError::Data {
                message: format!(
                    "insufficient data: {} candles, RSI({}) needs {}",
                    candles.len(),
                    self.config.rsi_period,
                    self.config.rsi_period + 1
                ),
            });
        }

        let path = output
            .unwrap_or_else(|| PathBuf::from(format!("{}_rsi.csv", self.config.symbol)));
        export::write_series_csv(&path, &candles, &series)?;
        info!("RSI series saved to {}", path.display());

        Ok(())
    }

    /// Long-running mode: warm up from history, then follow the live
    /// subscription until it ends or fails.
    ///
    /// Only closed candles advance the window; in-progress updates are
    /// dropped without recomputation. The first fatal transport error
    /// terminates the run; reconnecting is a supervisor concern, not ours.
    pub async fn run_stream(&mut self) -> Result<()> {
        self.warm_up().await?;

        let candles = self.buffer.snapshot();
        let series = indicators::rsi(&candles, self.config.rsi_period);
        if self.evaluate(&candles, &series).await.is_none() {
            info!(
                "Insufficient history for RSI({}), waiting for live candles",
                self.config.rsi_period
            );
        }

        let mut stream = self
            .feed
            .subscribe(&self.config.symbol, self.config.interval)
            .await?;
        info!(
            "Monitoring {} RSI (interval: {}, period: {})",
            self.config.symbol, self.config.interval, self.config.rsi_period
        );

        while let Some(update) = stream.next_update().await? {
            if !update.is_closed {
                continue;
            }
            self.on_closed_candle(update.to_candle()).await;
        }

        info!("Candle subscription ended");
        Ok(())
    }

    /// Fetch `buffer_limit` historical candles into the window.
    async fn warm_up(&mut self) -> Result<()> {
        let candles = self
            .feed
            .fetch_klines(
                &self.config.symbol,
                self.config.interval,
                self.config.buffer_limit,
            )
            .await?;

        for candle in candles {
            self.buffer.append(candle);
        }
        info!(
            "Loaded {} historical candles for {}",
            self.buffer.len(),
            self.config.symbol
        );

        Ok(())
    }

    /// Append one closed candle and re-run the evaluation pass.
    async fn on_closed_candle(&mut self, candle: Candle) {
        if !self.buffer.append(candle) {
            return;
        }

        let candles = self.buffer.snapshot();
        let series = indicators::rsi(&candles, self.config.rsi_period);
        self.evaluate(&candles, &series).await;
    }

    /// Classify the latest RSI value and push the resulting alert.
    ///
    /// Returns `None` when the window has not accumulated enough candles,
    /// an expected condition that withholds evaluation for this cycle.
    /// Delivery failures are logged and swallowed; they never affect the
    /// loop.
    async fn evaluate(&self, candles: &[Candle], series: &[Option<f64>]) -> Option<SignalEvent> {
        let (candle, rsi) = indicators::latest(candles, series)?;

        let kind = classify(rsi, self.config.overbought, self.config.oversold);
        let event = SignalEvent::new(kind, rsi, candle.timestamp);
        let message = event.alert_message(self.config.overbought, self.config.oversold);
        info!("{message}");

        if event.kind != SignalKind::Neutral || self.config.notify_on_neutral {
            if let Err(e) = self.sink.send(&message).await {
                warn!("Alert delivery failed: {e}");
            }
        }

        Some(event)
    }
}
