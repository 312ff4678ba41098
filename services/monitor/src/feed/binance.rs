//! Binance market data adapter
//!
//! Historical klines over REST (`/api/v3/klines`), live candles over the
//! kline WebSocket stream (`<symbol>@kline_<interval>`). Both surfaces
//! reduce Binance's kline records to the `Candle` view the monitor
//! consumes: history rows keep their open time, streamed closed candles
//! their close time.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{MonitorError, Result};
use crate::feed::{CandleStream, MarketDataSource};
use pulse_types::{Candle, CandleUpdate, Interval};

pub const DEFAULT_REST_URL: &str = "https://api.binance.com";
pub const DEFAULT_WS_URL: &str = "wss://stream.binance.com:9443";

/// Binance REST + WebSocket feed.
#[derive(Debug, Clone)]
pub struct BinanceFeed {
    rest_url: String,
    ws_url: String,
    client: reqwest::Client,
}

impl BinanceFeed {
    pub fn new() -> Self {
        Self::with_endpoints(DEFAULT_REST_URL, DEFAULT_WS_URL)
    }

    /// Feed against explicit endpoints (regional mirrors, test servers).
    pub fn with_endpoints(rest_url: &str, ws_url: &str) -> Self {
        Self {
            rest_url: rest_url.trim_end_matches('/').to_string(),
            ws_url: ws_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for BinanceFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataSource for BinanceFeed {
    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let url = format!("{}/api/v3/klines", self.rest_url);
        debug!("Fetching {limit} klines for {symbol} ({interval})");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.to_uppercase().as_str()),
                ("interval", interval.as_str()),
                ("limit", limit.to_string().as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let rows: Vec<Value> = response.json().await?;
        if rows.is_empty() {
            return Err(MonitorError::Data {
                message: format!("empty kline response for {symbol}"),
            });
        }

        rows.iter().map(parse_kline_row).collect()
    }

    async fn subscribe(&self, symbol: &str, interval: Interval) -> Result<Box<dyn CandleStream>> {
        let raw = format!(
            "{}/ws/{}@kline_{}",
            self.ws_url,
            symbol.to_lowercase(),
            interval
        );
        let url = Url::parse(&raw).map_err(|e| MonitorError::Transport {
            message: format!("invalid stream url {raw}: {e}"),
        })?;

        let (ws, _) = connect_async(url.as_str()).await?;
        info!("Connected to kline stream: {raw}");

        Ok(Box::new(BinanceKlineStream { ws }))
    }
}

/// Live kline subscription over a single-stream WebSocket.
pub struct BinanceKlineStream {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl CandleStream for BinanceKlineStream {
    async fn next_update(&mut self) -> Result<Option<CandleUpdate>> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => match parse_kline_event(&text) {
                    Ok(Some(update)) => return Ok(Some(update)),
                    Ok(None) => continue,
                    Err(e) => {
                        // Malformed frames are "nothing to report", not a
                        // reason to tear the subscription down.
                        warn!("Skipping malformed stream message: {e}");
                        continue;
                    }
                },
                Some(Ok(Message::Ping(payload))) => {
                    self.ws.send(Message::Pong(payload)).await?;
                }
                Some(Ok(Message::Close(_))) => {
                    info!("Kline stream closed by server");
                    return Ok(None);
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(None),
            }
        }
    }
}

/// Kline event as delivered on the WebSocket.
#[derive(Debug, Clone, Deserialize)]
struct KlineEvent {
    #[serde(rename = "s")]
    symbol: String,
    #[serde(rename = "k")]
    kline: KlinePayload,
}

#[derive(Debug, Clone, Deserialize)]
struct KlinePayload {
    #[serde(rename = "T")]
    close_time: i64,
    #[serde(rename = "i")]
    interval: String,
    #[serde(rename = "c")]
    close: String,
    #[serde(rename = "x")]
    is_closed: bool,
}

/// Parse one WebSocket frame into a candle update.
///
/// `Ok(None)` for frames that are well-formed but not kline events
/// (subscription acks, other stream types on a combined connection).
fn parse_kline_event(text: &str) -> Result<Option<CandleUpdate>> {
    let value: Value = serde_json::from_str(text)?;

    // Combined-stream frames wrap the event in a "data" field.
    let event = match value.get("data") {
        Some(data) => data.clone(),
        None => value,
    };

    if event.get("e").and_then(Value::as_str) != Some("kline") {
        return Ok(None);
    }

    let event: KlineEvent = serde_json::from_value(event)?;
    let close = event
        .kline
        .close
        .parse::<f64>()
        .map_err(|e| MonitorError::Data {
            message: format!("invalid close price {:?}: {e}", event.kline.close),
        })?;
    let interval: Interval = event.kline.interval.parse()?;

    Ok(Some(CandleUpdate {
        symbol: event.symbol,
        interval,
        timestamp: timestamp_from_millis(event.kline.close_time)?,
        close,
        is_closed: event.kline.is_closed,
    }))
}

/// One row of the klines REST response: a 12-element array mixing numbers
/// and strings. Only open time (index 0) and close price (index 4) are
/// consumed.
fn parse_kline_row(row: &Value) -> Result<Candle> {
    let fields = row.as_array().ok_or_else(|| MonitorError::Data {
        message: format!("kline row is not an array: {row}"),
    })?;

    let open_time = fields
        .first()
        .and_then(Value::as_i64)
        .ok_or_else(|| MonitorError::Data {
            message: "kline row missing open time".to_string(),
        })?;

    let close = fields
        .get(4)
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| MonitorError::Data {
            message: "kline row missing close price".to_string(),
        })?;

    Ok(Candle::new(timestamp_from_millis(open_time)?, close))
}

fn timestamp_from_millis(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| MonitorError::Data {
            message: format!("timestamp out of range: {millis}"),
        })
}
