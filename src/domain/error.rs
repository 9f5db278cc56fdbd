//! Domain error types.

use chrono::NaiveDateTime;

/// An indicator value was requested before its lookback window filled.
///
/// Strategies treat this as "no signal" for the bar, never as zero.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{indicator} undefined at bar {index}")]
pub struct UndefinedIndicator {
    pub indicator: String,
    pub index: usize,
}

/// A required timestamp had no matching bar in the target series.
///
/// Collected per run and reported; the candidate signal is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingLookup {
    pub series: String,
    pub timestamp: NaiveDateTime,
}

/// Top-level error type for lagtrader.
#[derive(Debug, thiserror::Error)]
pub enum LagtraderError {
    #[error("no data for {symbol}")]
    EmptyInput { symbol: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LagtraderError {
    pub fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        LagtraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub fn missing(section: &str, key: &str) -> Self {
        LagtraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }
    }

    /// True for the "no data" outcome, which callers report rather than fail on.
    pub fn is_no_data(&self) -> bool {
        matches!(self, LagtraderError::EmptyInput { .. })
    }
}

impl From<&LagtraderError> for std::process::ExitCode {
    fn from(err: &LagtraderError) -> Self {
        let code: u8 = match err {
            LagtraderError::Io(_) => 1,
            LagtraderError::ConfigParse { .. }
            | LagtraderError::ConfigMissing { .. }
            | LagtraderError::ConfigInvalid { .. } => 2,
            LagtraderError::Data { .. } | LagtraderError::Report { .. } => 3,
            LagtraderError::EmptyInput { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
