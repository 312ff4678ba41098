//! Error types for the monitor service
//!
//! Three kinds matter to the run loops: `Transport` aborts the run,
//! `Data` means "nothing to report this cycle", `Notification` is logged
//! and swallowed without touching loop state.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Data error: {message}")]
    Data { message: String },

    #[error("Notification error: {message}")]
    Notification { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        MonitorError::Transport {
            message: err.to_string(),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for MonitorError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        MonitorError::Transport {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        MonitorError::Data {
            message: err.to_string(),
        }
    }
}

impl From<pulse_types::ParseIntervalError> for MonitorError {
    fn from(err: pulse_types::ParseIntervalError) -> Self {
        MonitorError::Data {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for MonitorError {
    fn from(err: csv::Error) -> Self {
        MonitorError::Io(std::io::Error::new(std::io::ErrorKind::Other, err))
    }
}
