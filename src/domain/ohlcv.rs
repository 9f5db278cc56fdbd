//! OHLCV bar representation and the raw row shape accepted at ingestion.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::error::LagtraderError;

/// One canonical bar. Timestamps are UTC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// Calendar day of the bar (UTC).
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// A row as the market-data provider dumps it.
///
/// The provider prefixes rows with the instrument identifier and appends
/// columns (`trade_count`, `vwap`) the engine never reads; both are dropped
/// during normalisation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawBar {
    #[serde(default)]
    pub symbol: Option<String>,
    pub timestamp: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%dT%H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
];

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a provider timestamp into naive UTC.
///
/// Offset-qualified inputs are converted to UTC; naive inputs are taken as UTC.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, LagtraderError> {
    let value = value.trim();
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Ok(dt.naive_utc());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(dt);
        }
    }
    Err(LagtraderError::Data {
        reason: format!("invalid timestamp: {value}"),
    })
}

impl RawBar {
    /// Convert to a canonical bar, rejecting rows the engine cannot price.
    pub fn to_bar(&self) -> Result<OhlcvBar, LagtraderError> {
        let timestamp = parse_timestamp(&self.timestamp)?;
        if !self.close.is_finite() || self.close <= 0.0 {
            return Err(LagtraderError::Data {
                reason: format!("invalid close {} at {}", self.close, self.timestamp),
            });
        }
        Ok(OhlcvBar {
            timestamp,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        })
    }
}
