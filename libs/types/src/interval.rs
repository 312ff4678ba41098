//! Candle intervals supported by the monitor

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Candle interval, restricted to the set the feed accepts.
///
/// Serializes to the exchange's short form ("1m", "1h", ...), which is also
/// the spelling used on the CLI and in stream subscription paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
}

#[derive(Debug, Clone, Error)]
#[error("unknown interval '{input}' (expected one of 1m, 5m, 15m, 1h, 4h, 1d)")]
pub struct ParseIntervalError {
    pub input: String,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::OneHour => "1h",
            Interval::FourHours => "4h",
            Interval::OneDay => "1d",
        }
    }

}

impl Default for Interval {
    fn default() -> Self {
        Interval::OneHour
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ParseIntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Interval::OneMinute),
            "5m" => Ok(Interval::FiveMinutes),
            "15m" => Ok(Interval::FifteenMinutes),
            "1h" => Ok(Interval::OneHour),
            "4h" => Ok(Interval::FourHours),
            "1d" => Ok(Interval::OneDay),
            _ => Err(ParseIntervalError {
                input: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for s in ["1m", "5m", "15m", "1h", "4h", "1d"] {
            let interval: Interval = s.parse().unwrap();
            assert_eq!(interval.as_str(), s);
        }
    }

    #[test]
    fn test_unknown_interval_rejected() {
        assert!("2h".parse::<Interval>().is_err());
        assert!("".parse::<Interval>().is_err());
        assert!("1H".parse::<Interval>().is_err());
    }

    #[test]
    fn test_serde_uses_short_form() {
        let json = serde_json::to_string(&Interval::FourHours).unwrap();
        assert_eq!(json, "\"4h\"");
        let interval: Interval = serde_json::from_str("\"15m\"").unwrap();
        assert_eq!(interval, Interval::FifteenMinutes);
    }
}
