//! Bollinger mean reversion.
//!
//! Long when a close falls below the lower band; flat once a later close is
//! back at or above the middle band, or after `hold_minutes`.

use crate::domain::error::LagtraderError;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::frame::IndicatorFrame;
use crate::domain::series::Series;
use crate::domain::strategy::{BarStrategy, SECTION, require_positive_minutes};

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerConfig {
    pub period: usize,
    pub num_std: f64,
    pub hold_minutes: i64,
}

impl Default for BollingerConfig {
    fn default() -> Self {
        Self {
            period: 20,
            num_std: 2.0,
            hold_minutes: 60,
        }
    }
}

impl BollingerConfig {
    pub fn validate(&self) -> Result<(), LagtraderError> {
        if self.period < 2 {
            return Err(LagtraderError::invalid(
                SECTION,
                "period",
                "period must be at least 2",
            ));
        }
        if !self.num_std.is_finite() || self.num_std <= 0.0 {
            return Err(LagtraderError::invalid(
                SECTION,
                "num_std",
                "num_std must be positive",
            ));
        }
        require_positive_minutes("hold_minutes", self.hold_minutes)
    }

    fn bands(&self) -> IndicatorType {
        IndicatorType::bollinger(self.period, self.num_std)
    }
}

impl BarStrategy for BollingerConfig {
    fn indicators(&self) -> Vec<IndicatorType> {
        vec![self.bands()]
    }

    fn warmup_bars(&self) -> usize {
        self.period
    }

    fn entry_signal(&self, frame: &IndicatorFrame, series: &Series, i: usize) -> bool {
        frame
            .bands(&self.bands(), i)
            .is_ok_and(|b| series.bar(i).close < b.lower)
    }

    fn exit_signal(&self, frame: &IndicatorFrame, series: &Series, i: usize) -> bool {
        frame
            .bands(&self.bands(), i)
            .is_ok_and(|b| series.bar(i).close >= b.middle)
    }

    fn hold_minutes(&self) -> Option<i64> {
        Some(self.hold_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::ExitReason;
    use crate::domain::strategy::test_support::*;
    use crate::domain::strategy::walk;

    fn config(period: usize, num_std: f64, hold_minutes: i64) -> BollingerConfig {
        BollingerConfig {
            period,
            num_std,
            hold_minutes,
        }
    }

    #[test]
    fn dip_below_lower_band_then_revert_to_middle() {
        // bar 4: window 10,10,10,10,5 → mean 9, sd √5 ≈ 2.236, lower (k=1) ≈ 6.76 → 5 is below
        // bar 5: entry at 6; bar 6: window 10,10,5,6,12 → mean 8.6 → 12 ≥ mid → exit bar 7
        let closes = [10.0, 10.0, 10.0, 10.0, 5.0, 6.0, 12.0, 11.0, 11.0];
        let series = minute_series(&closes);
        let ledger = walk(&config(5, 1.0, 600), &series);

        assert_eq!(ledger.len(), 1);
        let t = &ledger.trades()[0];
        assert_eq!(t.entry_time, minute(5));
        assert_eq!(t.entry_price, 6.0);
        assert_eq!(t.exit_time, minute(7));
        assert_eq!(t.exit_price, 11.0);
        assert_eq!(t.exit_reason, ExitReason::Signal);
    }

    #[test]
    fn hold_time_caps_position() {
        let closes = [10.0, 10.0, 10.0, 10.0, 5.0, 4.0, 3.0, 2.5, 2.0, 1.5];
        let series = minute_series(&closes);
        let ledger = walk(&config(5, 1.0, 2), &series);

        let t = &ledger.trades()[0];
        assert_eq!(t.entry_time, minute(5));
        assert_eq!(t.exit_time, minute(7));
        assert_eq!(t.exit_reason, ExitReason::HoldElapsed);
    }

    #[test]
    fn flat_series_returns_are_zero() {
        let series = minute_series(&[0.1; 50]);
        let ledger = walk(&config(5, 2.0, 3), &series);
        assert!(ledger.trades().iter().all(|t| t.return_pct == 0.0));
    }

    #[test]
    fn configured_multiplier_is_used_exactly() {
        let series = minute_series(&[10.0, 10.0, 10.0, 10.0, 9.0]);
        let cfg = config(5, 0.004, 5);
        let frame = IndicatorFrame::compute(&series, &cfg.indicators());
        let b = frame.bands(&cfg.bands(), 4).unwrap();
        assert!((b.lower - (9.8 - 0.004 * 0.2_f64.sqrt())).abs() < 1e-10);
        assert!(b.lower < b.middle);
    }

    #[test]
    fn period_beyond_series_yields_nothing() {
        let series = minute_series(&[10.0, 10.0, 5.0, 1.0]);
        assert!(walk(&config(5, 1.0, 5), &series).is_empty());
    }

    #[test]
    fn validate_parameters() {
        assert!(BollingerConfig::default().validate().is_ok());
        assert!(config(1, 2.0, 5).validate().is_err());
        assert!(config(20, 0.0, 5).validate().is_err());
        assert!(config(20, f64::NAN, 5).validate().is_err());
        assert!(config(20, 2.0, 0).validate().is_err());
    }
}
