//! Breakout level: highest close over the preceding `lookback` bars.
//!
//! HIGH(n)[i] = max(C[i-n], ..., C[i-1]). The current bar is excluded so a
//! close can never be its own breakout trigger. Undefined for i < n.
//!
//! Maintained with a monotonic deque of candidate indices, O(n) overall.

use std::collections::VecDeque;

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_rolling_high(bars: &[OhlcvBar], lookback: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    // indices into bars, closes strictly decreasing front to back
    let mut window: VecDeque<usize> = VecDeque::with_capacity(lookback + 1);

    for (i, bar) in bars.iter().enumerate() {
        let value = if lookback > 0 && i >= lookback {
            while window.front().is_some_and(|&j| j + lookback < i) {
                window.pop_front();
            }
            window
                .front()
                .map(|&j| IndicatorValue::Simple(bars[j].close))
        } else {
            None
        };

        values.push(IndicatorPoint {
            timestamp: bar.timestamp,
            value,
        });

        // bar i joins the window only after its own value is emitted
        while window.back().is_some_and(|&j| bars[j].close <= bar.close) {
            window.pop_back();
        }
        window.push_back(i);
    }

    IndicatorSeries {
        indicator_type: IndicatorType::RollingHigh(lookback),
        values,
    }
}
