//! Simple Moving Average.
//!
//! SMA(n)[i] = mean of the last min(n, i+1) closes, defined once at least
//! `min_periods` closes are in the window. With `min_periods == n` this is the
//! classic full-window average; with `min_periods == 1` the first bars use a
//! partial (expanding) window.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize, min_periods: usize) -> IndicatorSeries {
    let min_periods = min_periods.clamp(1, period.max(1));
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let count = period.min(i + 1);
        let value = if period > 0 && count >= min_periods {
            let window = &bars[i + 1 - count..=i];
            let mean = window.iter().map(|b| b.close).sum::<f64>() / count as f64;
            Some(IndicatorValue::Simple(mean))
        } else {
            None
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma {
            period,
            min_periods,
        },
        values,
    }
}
