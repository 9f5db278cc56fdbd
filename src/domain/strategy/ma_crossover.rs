//! Moving-average crossover.
//!
//! Long on a cross-up (short SMA goes from <= long SMA to > long SMA), flat on
//! the following cross-down. Both averages use `min_periods = 1`, so partial
//! windows are averaged from the first bar.

use crate::domain::error::LagtraderError;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::frame::IndicatorFrame;
use crate::domain::series::Series;
use crate::domain::strategy::{BarStrategy, SECTION, require_positive};

#[derive(Debug, Clone, PartialEq)]
pub struct MaCrossoverConfig {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for MaCrossoverConfig {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
        }
    }
}

impl MaCrossoverConfig {
    pub fn validate(&self) -> Result<(), LagtraderError> {
        require_positive("short_window", self.short_window)?;
        require_positive("long_window", self.long_window)?;
        if self.short_window >= self.long_window {
            return Err(LagtraderError::invalid(
                SECTION,
                "short_window",
                "short_window must be less than long_window",
            ));
        }
        Ok(())
    }

    fn short(&self) -> IndicatorType {
        IndicatorType::Sma {
            period: self.short_window,
            min_periods: 1,
        }
    }

    fn long(&self) -> IndicatorType {
        IndicatorType::Sma {
            period: self.long_window,
            min_periods: 1,
        }
    }

    /// short - long at bar `i`, if both are defined.
    fn spread(&self, frame: &IndicatorFrame, i: usize) -> Option<f64> {
        let short = frame.value(&self.short(), i).ok()?;
        let long = frame.value(&self.long(), i).ok()?;
        Some(short - long)
    }
}

impl BarStrategy for MaCrossoverConfig {
    fn indicators(&self) -> Vec<IndicatorType> {
        vec![self.short(), self.long()]
    }

    /// The SMAs use min_periods 1 and are defined from bar 0, so this gate in
    /// [`walk`](super::walk) is what holds trading back until a full long window exists.
    fn warmup_bars(&self) -> usize {
        self.long_window
    }

    fn entry_signal(&self, frame: &IndicatorFrame, _series: &Series, i: usize) -> bool {
        if i == 0 {
            return false;
        }
        match (self.spread(frame, i - 1), self.spread(frame, i)) {
            (Some(prev), Some(curr)) => prev <= 0.0 && curr > 0.0,
            _ => false,
        }
    }

    fn exit_signal(&self, frame: &IndicatorFrame, _series: &Series, i: usize) -> bool {
        if i == 0 {
            return false;
        }
        match (self.spread(frame, i - 1), self.spread(frame, i)) {
            (Some(prev), Some(curr)) => prev > 0.0 && curr <= 0.0,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::ExitReason;
    use crate::domain::strategy::test_support::*;
    use crate::domain::strategy::walk;

    fn config(short_window: usize, long_window: usize) -> MaCrossoverConfig {
        MaCrossoverConfig {
            short_window,
            long_window,
        }
    }

    #[test]
    fn five_bar_scenario() {
        // short(2): 10, 10, 11, 10.5, 9   long(3): 10, 10, 10.67, 10.33, 10
        // cross-up on bar 2 → fill bar 3; cross-down on bar 4 → no bar 5, close at last
        let series = minute_series(&[10.0, 10.0, 12.0, 9.0, 9.0]);
        let ledger = walk(&config(2, 3), &series);

        assert_eq!(ledger.len(), 1);
        let t = &ledger.trades()[0];
        assert_eq!(t.entry_time, minute(3));
        assert_eq!(t.entry_price, 9.0);
        assert_eq!(t.exit_time, minute(4));
        assert_eq!(t.exit_price, 9.0);
        assert_eq!(t.return_pct, (9.0 - 9.0) / 9.0 * 100.0);
        assert_eq!(t.exit_reason, ExitReason::EndOfData);
    }

    #[test]
    fn cross_down_exits_on_next_bar() {
        let series = minute_series(&[10.0, 10.0, 12.0, 13.0, 8.0, 7.0, 6.0]);
        let ledger = walk(&config(2, 3), &series);

        assert_eq!(ledger.len(), 1);
        let t = &ledger.trades()[0];
        // cross-up on bar 2 → entry bar 3 at 13; cross-down on bar 4 → exit bar 5 at 7
        assert_eq!(t.entry_time, minute(3));
        assert_eq!(t.entry_price, 13.0);
        assert_eq!(t.exit_time, minute(5));
        assert_eq!(t.exit_price, 7.0);
        assert_eq!(t.exit_reason, ExitReason::Signal);
        assert!((t.return_pct - (7.0 - 13.0) / 13.0 * 100.0).abs() < 1e-10);
    }

    #[test]
    fn flat_series_never_crosses() {
        let series = minute_series(&[5.0; 30]);
        assert!(walk(&config(3, 7), &series).is_empty());
    }

    #[test]
    fn long_window_beyond_series_yields_nothing() {
        let series = minute_series(&[10.0, 10.0, 12.0, 9.0, 9.0]);
        assert!(walk(&config(2, 6), &series).is_empty());
    }

    #[test]
    fn validate_rejects_bad_windows() {
        assert!(config(0, 5).validate().is_err());
        assert!(config(5, 5).validate().is_err());
        assert!(config(6, 5).validate().is_err());
        assert!(config(2, 5).validate().is_ok());
    }
}
