//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the sample standard deviation shared with [`super::stddev`].
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use crate::domain::indicator::stddev::mean_and_stddev;
use crate::domain::indicator::{
    Bands, IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_bollinger(
    bars: &[OhlcvBar],
    period: usize,
    num_std: f64,
) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        let value = if period >= 2 && i + 1 >= period {
            let window = &bars[i + 1 - period..=i];
            let (middle, stddev) = mean_and_stddev(window);
            Some(IndicatorValue::Bollinger(Bands {
                upper: middle + num_std * stddev,
                middle,
                lower: middle - num_std * stddev,
            }))
        } else {
            None
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::bollinger(period, num_std),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(13, 30, 0)
            .unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                timestamp: start + chrono::Duration::minutes(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn bollinger_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_bollinger(&bars, 3, 2.0);

        assert!(series.bands(0).is_err());
        assert!(series.bands(1).is_err());
        assert!(series.bands(2).is_ok());
        assert!(series.bands(4).is_ok());
    }

    #[test]
    fn bollinger_constant_values() {
        let bars = make_bars(&[100.0, 100.0, 100.0, 100.0, 100.0]);
        let series = calculate_bollinger(&bars, 3, 2.0);

        let b = series.bands(2).unwrap();
        assert!((b.middle - 100.0).abs() < 1e-10);
        assert!((b.upper - 100.0).abs() < 1e-10);
        assert!((b.lower - 100.0).abs() < 1e-10);
    }

    #[test]
    fn bollinger_basic_calculation() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 3, 2.0);

        let b = series.bands(2).unwrap();
        // sample stddev of 10,20,30 is 10
        assert!((b.middle - 20.0).abs() < 1e-10);
        assert!((b.upper - 40.0).abs() < 1e-10);
        assert!((b.lower - 0.0).abs() < 1e-10);
    }

    #[test]
    fn bollinger_multiplier_variations() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 3, 1.5);

        let b = series.bands(2).unwrap();
        assert!((b.upper - 35.0).abs() < 1e-10);
        assert!((b.lower - 5.0).abs() < 1e-10);
    }

    #[test]
    fn multiplier_is_not_rounded() {
        // mean 9.8, sample sd sqrt(0.2)
        let bars = make_bars(&[10.0, 10.0, 10.0, 10.0, 9.0]);
        let sd = 0.2_f64.sqrt();
        for k in [0.004, 1.006] {
            let b = calculate_bollinger(&bars, 5, k).bands(4).unwrap();
            assert!((b.lower - (9.8 - k * sd)).abs() < 1e-10, "k={k} lower={}", b.lower);
        }
    }

    #[test]
    fn bollinger_symmetry() {
        let bars = make_bars(&[10.0, 13.0, 11.0, 17.0]);
        let series = calculate_bollinger(&bars, 4, 2.0);

        let b = series.bands(3).unwrap();
        assert!(((b.upper - b.middle) - (b.middle - b.lower)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_indicator_type() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 20, 2.0);

        assert_eq!(series.indicator_type, IndicatorType::bollinger(20, 2.0));
        assert_eq!(series.first_defined(), None);
    }
}
