//! RSI (Relative Strength Index).
//!
//! Average gain and loss are plain rolling means of the last n close-to-close
//! changes (no Wilder smoothing):
//!
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//!
//! If avg_loss == 0 the ratio is undefined and RSI is reported as the neutral
//! 50, so flat stretches never read as overbought or oversold.
//!
//! Warmup: the first n bars are undefined (n changes need n + 1 closes).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const NEUTRAL_RSI: f64 = 50.0;

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();

    for (i, bar) in bars.iter().enumerate() {
        let value = if period > 0 && i >= period {
            // changes[k] is the move into bar k + 1
            let window = &changes[i - period..i];
            let avg_gain = window.iter().filter(|c| **c > 0.0).sum::<f64>() / period as f64;
            let avg_loss = window
                .iter()
                .filter(|c| **c < 0.0)
                .map(|c| -c)
                .sum::<f64>()
                / period as f64;

            let rsi = if avg_loss == 0.0 {
                NEUTRAL_RSI
            } else {
                100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
            };
            Some(IndicatorValue::Simple(rsi))
        } else {
            None
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}
