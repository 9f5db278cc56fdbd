//! Percent-change scan.
//!
//! Unlike the strategies this keeps no position: every window of `time_span`
//! bars whose close-to-close gain meets the threshold is reported, overlapping
//! windows included. Spike end timestamps can then be replayed against a
//! second series to see how it moved over the following minutes.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::error::{LagtraderError, MissingLookup};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::position::return_pct;
use crate::domain::series::Series;

const SECTION: &str = "scan";

#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub expected_percent_change: f64,
    /// Window length in bars.
    pub time_span: usize,
    /// Second series and its look-ahead in minutes.
    pub response: Option<ResponseConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseConfig {
    pub symbol: String,
    pub time_span_minutes: i64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            expected_percent_change: 5.0,
            time_span: 1,
            response: None,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), LagtraderError> {
        if !self.expected_percent_change.is_finite() {
            return Err(LagtraderError::invalid(
                SECTION,
                "expected_percent_change",
                "expected_percent_change must be a finite number",
            ));
        }
        if self.time_span == 0 {
            return Err(LagtraderError::invalid(
                SECTION,
                "time_span",
                "time_span must be positive",
            ));
        }
        if let Some(response) = &self.response {
            if response.symbol.trim().is_empty() {
                return Err(LagtraderError::missing(SECTION, "response_symbol"));
            }
            if response.time_span_minutes <= 0 {
                return Err(LagtraderError::invalid(
                    SECTION,
                    "response_time_span",
                    "response_time_span must be positive",
                ));
            }
        }
        Ok(())
    }
}

/// One qualifying window `[start_index, end_index]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spike {
    pub start_index: usize,
    pub end_index: usize,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub start_price: f64,
    pub end_price: f64,
    pub percent_change: f64,
}

impl Spike {
    /// Every bar of the window, both ends included.
    pub fn window<'a>(&self, series: &'a Series) -> &'a [OhlcvBar] {
        &series.bars()[self.start_index..=self.end_index]
    }
}

pub fn scan_spikes(series: &Series, time_span: usize, expected_percent_change: f64) -> Vec<Spike> {
    let bars = series.bars();
    let mut spikes = Vec::new();
    for i in 0..bars.len().saturating_sub(time_span) {
        let start = &bars[i];
        let end = &bars[i + time_span];
        let percent_change = return_pct(start.close, end.close);
        if percent_change >= expected_percent_change {
            spikes.push(Spike {
                start_index: i,
                end_index: i + time_span,
                start_time: start.timestamp,
                end_time: end.timestamp,
                start_price: start.close,
                end_price: end.close,
                percent_change,
            });
        }
    }
    debug!(
        symbol = series.symbol(),
        time_span,
        spikes = spikes.len(),
        "scan complete"
    );
    spikes
}

/// How the second series moved after a spike.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub timestamp: NaiveDateTime,
    pub price_start: f64,
    pub price_end: f64,
    pub change: f64,
    pub percent_change: f64,
}

/// Output of one scan: the spikes, the bars of every spike window in order,
/// and the second-series responses if one was requested.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub symbol: String,
    pub spikes: Vec<Spike>,
    pub window_bars: Vec<OhlcvBar>,
    pub response: Option<ResponseReport>,
}

#[derive(Debug, Clone, Default)]
pub struct ResponseReport {
    pub responses: Vec<Response>,
    pub missing: Vec<MissingLookup>,
}

/// Look up `series_b` at exactly `t` and `t + span_minutes` for each spike time.
///
/// Timestamps without an exact bar on either side are skipped and reported.
pub fn evaluate_response(
    spike_times: &[NaiveDateTime],
    series_b: &Series,
    span_minutes: i64,
) -> ResponseReport {
    let span = Duration::minutes(span_minutes);
    let mut report = ResponseReport::default();

    for &t in spike_times {
        let later = t + span;
        let lookup = series_b
            .index_of(t)
            .ok_or(t)
            .and_then(|start| series_b.index_of(later).map(|end| (start, end)).ok_or(later));

        match lookup {
            Ok((start, end)) => {
                let price_start = series_b.bar(start).close;
                let price_end = series_b.bar(end).close;
                report.responses.push(Response {
                    timestamp: t,
                    price_start,
                    price_end,
                    change: price_end - price_start,
                    percent_change: return_pct(price_start, price_end),
                });
            }
            Err(timestamp) => {
                debug!(series = series_b.symbol(), %timestamp, "no bar for response");
                report.missing.push(MissingLookup {
                    series: series_b.symbol().to_string(),
                    timestamp,
                });
            }
        }
    }

    if !report.missing.is_empty() {
        warn!(
            series = series_b.symbol(),
            missing = report.missing.len(),
            "spike timestamps skipped for missing bars"
        );
    }
    report
}
