//! Per-run indicator frame.
//!
//! Computed once from a [`Series`] before a strategy walks it and read-only
//! afterwards, so concurrent runs may share one frame freely.

use std::collections::HashMap;

use crate::domain::error::UndefinedIndicator;
use crate::domain::indicator::bollinger::calculate_bollinger;
use crate::domain::indicator::rolling_high::calculate_rolling_high;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::stddev::calculate_stddev;
use crate::domain::indicator::{Bands, IndicatorSeries, IndicatorType};
use crate::domain::series::Series;

#[derive(Debug, Clone, Default)]
pub struct IndicatorFrame {
    indicators: HashMap<IndicatorType, IndicatorSeries>,
}

pub fn compute_indicator(series: &Series, indicator: IndicatorType) -> IndicatorSeries {
    let bars = series.bars();
    match indicator {
        IndicatorType::Sma {
            period,
            min_periods,
        } => calculate_sma(bars, period, min_periods),
        IndicatorType::Stddev(period) => calculate_stddev(bars, period),
        IndicatorType::Rsi(period) => calculate_rsi(bars, period),
        IndicatorType::RollingHigh(lookback) => calculate_rolling_high(bars, lookback),
        IndicatorType::Bollinger {
            period,
            num_std_bits,
        } => calculate_bollinger(bars, period, f64::from_bits(num_std_bits)),
    }
}

impl IndicatorFrame {
    pub fn compute(series: &Series, indicators: &[IndicatorType]) -> Self {
        let indicators = indicators
            .iter()
            .map(|&t| (t, compute_indicator(series, t)))
            .collect();
        Self { indicators }
    }

    pub fn get(&self, indicator: &IndicatorType) -> Option<&IndicatorSeries> {
        self.indicators.get(indicator)
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    /// Scalar value at `index`; an indicator absent from the frame is undefined everywhere.
    pub fn value(&self, indicator: &IndicatorType, index: usize) -> Result<f64, UndefinedIndicator> {
        match self.indicators.get(indicator) {
            Some(series) => series.simple(index),
            None => Err(UndefinedIndicator {
                indicator: indicator.to_string(),
                index,
            }),
        }
    }

    pub fn bands(&self, indicator: &IndicatorType, index: usize) -> Result<Bands, UndefinedIndicator> {
        match self.indicators.get(indicator) {
            Some(series) => series.bands(index),
            None => Err(UndefinedIndicator {
                indicator: indicator.to_string(),
                index,
            }),
        }
    }
}
