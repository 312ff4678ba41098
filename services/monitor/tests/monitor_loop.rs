//! Orchestrator behavior against scripted in-memory feeds and sinks.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use pulse_monitor::config::MonitorConfig;
use pulse_monitor::error::{MonitorError, Result};
use pulse_monitor::feed::{CandleStream, MarketDataSource};
use pulse_monitor::monitor::Monitor;
use pulse_monitor::sink::AlertSink;
use pulse_types::{Candle, CandleUpdate, Interval};

fn candle(minute: i64, close: f64) -> Candle {
    Candle::new(Utc.timestamp_opt(minute * 60, 0).unwrap(), close)
}

fn update(minute: i64, close: f64, is_closed: bool) -> CandleUpdate {
    CandleUpdate {
        symbol: "BTCUSDT".to_string(),
        interval: Interval::OneMinute,
        timestamp: Utc.timestamp_opt(minute * 60, 0).unwrap(),
        close,
        is_closed,
    }
}

/// Feed that replays a fixed history and a fixed update script.
struct ScriptedFeed {
    history: Vec<Candle>,
    updates: Vec<CandleUpdate>,
}

#[async_trait]
impl MarketDataSource for ScriptedFeed {
    async fn fetch_klines(
        &self,
        _symbol: &str,
        _interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        Ok(self.history.iter().copied().take(limit).collect())
    }

    async fn subscribe(
        &self,
        _symbol: &str,
        _interval: Interval,
    ) -> Result<Box<dyn CandleStream>> {
        Ok(Box::new(ScriptedStream {
            updates: self.updates.clone().into(),
        }))
    }
}

struct ScriptedStream {
    updates: VecDeque<CandleUpdate>,
}

#[async_trait]
impl CandleStream for ScriptedStream {
    async fn next_update(&mut self) -> Result<Option<CandleUpdate>> {
        Ok(self.updates.pop_front())
    }
}

#[derive(Clone, Default)]
struct RecordingSink {
    messages: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn send(&self, message: &str) -> Result<()> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

/// Sink whose every delivery fails.
struct FailingSink;

#[async_trait]
impl AlertSink for FailingSink {
    async fn send(&self, _message: &str) -> Result<()> {
        Err(MonitorError::Notification {
            message: "push API returned 500".to_string(),
        })
    }
}

fn test_config(rsi_period: usize, buffer_limit: usize) -> MonitorConfig {
    MonitorConfig {
        symbol: "BTCUSDT".to_string(),
        interval: Interval::OneMinute,
        rsi_period,
        overbought: 90.0,
        oversold: 10.0,
        buffer_limit,
        notify_on_neutral: true,
    }
}

#[tokio::test]
async fn test_open_candles_trigger_no_evaluation() {
    let feed = ScriptedFeed {
        history: vec![
            candle(0, 10.0),
            candle(1, 10.5),
            candle(2, 10.2),
            candle(3, 10.4),
        ],
        updates: vec![
            update(4, 10.6, false),
            update(4, 10.7, true),
            update(5, 10.8, false),
        ],
    };
    let sink = RecordingSink::default();
    let messages = sink.messages.clone();

    let mut monitor = Monitor::new(test_config(3, 100), Box::new(feed), Box::new(sink));
    monitor.run_stream().await.unwrap();

    // One evaluation for the warmup pass, one for the single closed candle.
    assert_eq!(messages.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_streaming_and_batch_report_identical_rsi() {
    let closes = [
        44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
    ];
    let all: Vec<Candle> = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| candle(i as i64, c))
        .collect();

    // Streaming: half the candles arrive as history, the rest as closed
    // updates.
    let feed = ScriptedFeed {
        history: all[..6].to_vec(),
        updates: closes[6..]
            .iter()
            .enumerate()
            .map(|(i, &c)| update(6 + i as i64, c, true))
            .collect(),
    };
    let sink = RecordingSink::default();
    let streamed = sink.messages.clone();
    let mut monitor = Monitor::new(test_config(3, 100), Box::new(feed), Box::new(sink));
    monitor.run_stream().await.unwrap();

    // Batch: the full sequence in one fetch.
    let feed = ScriptedFeed {
        history: all.clone(),
        updates: vec![],
    };
    let sink = RecordingSink::default();
    let batched = sink.messages.clone();
    let mut monitor = Monitor::new(test_config(3, 100), Box::new(feed), Box::new(sink));
    let dir = tempfile::tempdir().unwrap();
    monitor
        .run_batch(Some(dir.path().join("out.csv")))
        .await
        .unwrap();

    let streamed = streamed.lock().unwrap();
    let batched = batched.lock().unwrap();
    assert_eq!(streamed.last(), batched.last());
}

#[tokio::test]
async fn test_batch_with_insufficient_data_fails() {
    let feed = ScriptedFeed {
        history: vec![candle(0, 10.0), candle(1, 10.5), candle(2, 10.2)],
        updates: vec![],
    };
    let sink = RecordingSink::default();
    let messages = sink.messages.clone();

    let mut monitor = Monitor::new(test_config(14, 200), Box::new(feed), Box::new(sink));
    let dir = tempfile::tempdir().unwrap();
    let result = monitor.run_batch(Some(dir.path().join("out.csv"))).await;

    assert!(matches!(result, Err(MonitorError::Data { .. })));
    assert!(messages.lock().unwrap().is_empty());
    assert!(!dir.path().join("out.csv").exists());
}

#[tokio::test]
async fn test_delivery_failures_do_not_stop_the_loop() {
    let feed = ScriptedFeed {
        history: vec![
            candle(0, 10.0),
            candle(1, 10.5),
            candle(2, 10.2),
            candle(3, 10.4),
        ],
        updates: vec![update(4, 10.6, true), update(5, 10.8, true)],
    };

    let mut monitor = Monitor::new(test_config(3, 100), Box::new(feed), Box::new(FailingSink));
    assert!(monitor.run_stream().await.is_ok());
}

#[tokio::test]
async fn test_neutral_alerts_can_be_suppressed() {
    let history = vec![
        candle(0, 10.0),
        candle(1, 10.5),
        candle(2, 10.2),
        candle(3, 10.4),
    ];

    let feed = ScriptedFeed {
        history: history.clone(),
        updates: vec![update(4, 10.3, true)],
    };
    let sink = RecordingSink::default();
    let messages = sink.messages.clone();

    let mut config = test_config(3, 100);
    config.notify_on_neutral = false;
    let mut monitor = Monitor::new(config, Box::new(feed), Box::new(sink));
    monitor.run_stream().await.unwrap();

    // Mixed closes with 90/10 thresholds classify Neutral every pass.
    assert!(messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_threshold_crossings_alert_even_when_neutral_is_suppressed() {
    let history: Vec<Candle> = (0..5).map(|i| candle(i, 100.0 + i as f64)).collect();
    let feed = ScriptedFeed {
        history,
        updates: vec![update(5, 106.0, true)],
    };
    let sink = RecordingSink::default();
    let messages = sink.messages.clone();

    let mut config = test_config(3, 100);
    config.notify_on_neutral = false;
    let mut monitor = Monitor::new(config, Box::new(feed), Box::new(sink));
    monitor.run_stream().await.unwrap();

    // A monotonic rise pins RSI at 100, over the 90 threshold on both
    // passes.
    let messages = messages.lock().unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.starts_with("Overbought signal!")));
}

#[tokio::test]
async fn test_stale_stream_candles_are_ignored() {
    let feed = ScriptedFeed {
        history: vec![
            candle(0, 10.0),
            candle(1, 10.5),
            candle(2, 10.2),
            candle(3, 10.4),
        ],
        // Re-delivery of the newest history candle, then a genuinely new one.
        updates: vec![update(3, 99.0, true), update(4, 10.6, true)],
    };
    let sink = RecordingSink::default();
    let messages = sink.messages.clone();

    let mut monitor = Monitor::new(test_config(3, 100), Box::new(feed), Box::new(sink));
    monitor.run_stream().await.unwrap();

    // Warmup pass + the one accepted candle; the stale candle changes
    // nothing.
    assert_eq!(messages.lock().unwrap().len(), 2);
}
