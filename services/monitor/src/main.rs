//! RSI threshold monitor entry point
//!
//! Usage:
//!   rsi_monitor --symbol BTCUSDT --interval 1h
//!   rsi_monitor --symbol ETHUSDT --realtime --config notifier.toml

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use pulse_monitor::config::{MonitorConfig, NotifierConfig};
use pulse_monitor::feed::BinanceFeed;
use pulse_monitor::monitor::Monitor;
use pulse_monitor::sink::{AlertSink, LogSink, PushSink};
use pulse_types::Interval;

#[derive(Parser, Debug)]
#[command(name = "rsi_monitor")]
#[command(about = "Monitor a trading pair's RSI and push threshold alerts")]
#[command(version)]
struct Args {
    /// Trading pair (e.g. BTCUSDT, ETHUSDT)
    #[arg(long, default_value = "BTCUSDT")]
    symbol: String,

    /// Candle interval (1m, 5m, 15m, 1h, 4h, 1d)
    #[arg(long, default_value = "1h")]
    interval: Interval,

    /// RSI lookback period
    #[arg(long, default_value_t = 14)]
    rsi_period: usize,

    /// Overbought threshold
    #[arg(long, default_value_t = 90.0)]
    overbought: f64,

    /// Oversold threshold
    #[arg(long, default_value_t = 10.0)]
    oversold: f64,

    /// Historical candle count and sliding-window capacity
    #[arg(long, default_value_t = 200)]
    limit: usize,

    /// Follow the live candle stream instead of a one-shot evaluation
    #[arg(long)]
    realtime: bool,

    /// Push Neutral evaluations too (the channel doubles as liveness)
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    notify_on_neutral: bool,

    /// CSV output path for batch runs (default: <SYMBOL>_rsi.csv)
    #[arg(long)]
    output: Option<std::path::PathBuf>,

    /// Path to the notifier TOML (push_url, access_token, recipient_id)
    #[arg(long)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args);

    let config = MonitorConfig {
        symbol: args.symbol.to_uppercase(),
        interval: args.interval,
        rsi_period: args.rsi_period,
        overbought: args.overbought,
        oversold: args.oversold,
        buffer_limit: args.limit,
        notify_on_neutral: args.notify_on_neutral,
    };
    config.validate().context("Invalid monitor configuration")?;

    let sink: Box<dyn AlertSink> = match &args.config {
        Some(path) => {
            let notifier = NotifierConfig::from_toml_with_env_overrides(path)
                .context("Failed to load notifier configuration")?;
            info!("Push notifier configured: {}", notifier.push_url);
            Box::new(PushSink::new(notifier))
        }
        None => {
            info!("No notifier configured, alerts go to the log only");
            Box::new(LogSink)
        }
    };

    let feed = Box::new(BinanceFeed::new());
    let mut monitor = Monitor::new(config, feed, sink);

    if args.realtime {
        tokio::select! {
            result = monitor.run_stream() => {
                if let Err(e) = result {
                    error!("Monitor terminated: {e}");
                    std::process::exit(1);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
            }
        }
    } else if let Err(e) = monitor.run_batch(args.output).await {
        error!("Batch run failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(args: &Args) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
