//! RSI threshold monitor service
//!
//! Polls an exchange candle feed, maintains a bounded sliding window,
//! recomputes Wilder's RSI over it on every update, and pushes
//! threshold-crossing alerts. Runs either as a one-shot batch evaluation
//! with CSV export or as a long-running follower of the live kline stream.

pub mod buffer;
pub mod config;
pub mod error;
pub mod export;
pub mod feed;
pub mod indicators;
pub mod monitor;
pub mod signals;
pub mod sink;

pub use config::{MonitorConfig, NotifierConfig};
pub use error::{MonitorError, Result};
pub use monitor::Monitor;
