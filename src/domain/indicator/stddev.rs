//! Rolling standard deviation.
//!
//! Sample standard deviation (divides by n-1) over n closing prices, matching
//! the usual dataframe rolling default.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n-1) / (n-1))
//! Warmup: first (n-1) bars are undefined; n < 2 is never defined.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

/// Mean and sample standard deviation of `window`'s closes.
pub(crate) fn mean_and_stddev(window: &[OhlcvBar]) -> (f64, f64) {
    let n = window.len() as f64;
    let mean = window.iter().map(|b| b.close).sum::<f64>() / n;
    let variance = window
        .iter()
        .map(|b| {
            let diff = b.close - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1.0);
    (mean, variance.sqrt())
}

pub fn calculate_stddev(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let value = if period >= 2 && i + 1 >= period {
            let window = &bars[i + 1 - period..=i];
            let (_, stddev) = mean_and_stddev(window);
            Some(IndicatorValue::Simple(stddev))
        } else {
            None
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Stddev(period),
        values,
    }
}
