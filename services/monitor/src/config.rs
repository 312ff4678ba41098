//! Monitor configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

use pulse_types::Interval;

/// Run parameters, immutable for the lifetime of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Trading pair (e.g. BTCUSDT)
    pub symbol: String,

    /// Candle interval
    pub interval: Interval,

    /// RSI lookback period
    pub rsi_period: usize,

    /// RSI level above which the market counts as overbought
    pub overbought: f64,

    /// RSI level below which the market counts as oversold
    pub oversold: f64,

    /// Sliding-window capacity, also the historical fetch size
    pub buffer_limit: usize,

    /// Whether Neutral evaluations are pushed to the alert sink.
    ///
    /// Enabled, every evaluation notifies and the channel doubles as a
    /// liveness signal; disabled, only threshold crossings alert.
    pub notify_on_neutral: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            interval: Interval::OneHour,
            rsi_period: 14,
            overbought: 90.0,
            oversold: 10.0,
            buffer_limit: 200,
            notify_on_neutral: true,
        }
    }
}

impl MonitorConfig {
    /// Validate configuration.
    ///
    /// Threshold ordering is deliberately not checked here: the evaluator
    /// documents its overbought-first tie-break for misordered thresholds.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.is_empty() {
            anyhow::bail!("No symbol configured");
        }

        if self.rsi_period < 1 {
            anyhow::bail!("RSI period must be at least 1");
        }

        if self.buffer_limit < self.rsi_period + 1 {
            anyhow::bail!(
                "Buffer limit {} can never hold the {} candles RSI({}) needs",
                self.buffer_limit,
                self.rsi_period + 1,
                self.rsi_period
            );
        }

        Ok(())
    }
}

/// Push notifier settings, loaded from a TOML file with environment
/// variable overrides. Credentials live here, never in code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Push endpoint (e.g. https://api.line.me/v2/bot/message/push)
    pub push_url: String,

    /// Bearer token for the push API
    pub access_token: String,

    /// User or group id receiving the alerts
    pub recipient_id: String,
}

impl NotifierConfig {
    /// Load configuration from TOML file with environment variable overrides
    pub fn from_toml_with_env_overrides(path: &str) -> Result<Self> {
        let config_str =
            fs::read_to_string(path).context(format!("Failed to read config file: {}", path))?;

        let mut config: NotifierConfig =
            toml::from_str(&config_str).context("Failed to parse TOML configuration")?;

        if let Ok(url) = std::env::var("PUSH_URL") {
            config.push_url = url;
        }

        if let Ok(token) = std::env::var("PUSH_ACCESS_TOKEN") {
            config.access_token = token;
        }

        if let Ok(recipient) = std::env::var("PUSH_RECIPIENT_ID") {
            config.recipient_id = recipient;
        }

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.push_url.starts_with("https://") && !self.push_url.starts_with("http://") {
            anyhow::bail!("Invalid push URL scheme: {}", self.push_url);
        }

        if self.access_token.is_empty() {
            anyhow::bail!("Empty push access token");
        }

        if self.recipient_id.is_empty() {
            anyhow::bail!("Empty push recipient id");
        }

        Ok(())
    }
}
