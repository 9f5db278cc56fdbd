//! RSI mean reversion.
//!
//! Long when RSI drops below `oversold`; flat when RSI rises above
//! `overbought` or after `hold_minutes`, whichever comes first. On a bar where
//! both hold, the overbought exit takes precedence.

use crate::domain::error::LagtraderError;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::frame::IndicatorFrame;
use crate::domain::series::Series;
use crate::domain::strategy::{BarStrategy, SECTION, require_positive, require_positive_minutes};

#[derive(Debug, Clone, PartialEq)]
pub struct RsiConfig {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub hold_minutes: i64,
}

impl Default for RsiConfig {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
            hold_minutes: 60,
        }
    }
}

impl RsiConfig {
    pub fn validate(&self) -> Result<(), LagtraderError> {
        require_positive("period", self.period)?;
        require_positive_minutes("hold_minutes", self.hold_minutes)?;
        for (key, value) in [("oversold", self.oversold), ("overbought", self.overbought)] {
            if !(0.0..=100.0).contains(&value) {
                return Err(LagtraderError::invalid(
                    SECTION,
                    key,
                    format!("{key} must be between 0 and 100"),
                ));
            }
        }
        if self.oversold >= self.overbought {
            return Err(LagtraderError::invalid(
                SECTION,
                "oversold",
                "oversold must be less than overbought",
            ));
        }
        Ok(())
    }

    fn rsi(&self) -> IndicatorType {
        IndicatorType::Rsi(self.period)
    }
}

impl BarStrategy for RsiConfig {
    fn indicators(&self) -> Vec<IndicatorType> {
        vec![self.rsi()]
    }

    fn warmup_bars(&self) -> usize {
        self.period + 1
    }

    fn entry_signal(&self, frame: &IndicatorFrame, _series: &Series, i: usize) -> bool {
        frame
            .value(&self.rsi(), i)
            .is_ok_and(|rsi| rsi < self.oversold)
    }

    fn exit_signal(&self, frame: &IndicatorFrame, _series: &Series, i: usize) -> bool {
        frame
            .value(&self.rsi(), i)
            .is_ok_and(|rsi| rsi > self.overbought)
    }

    fn hold_minutes(&self) -> Option<i64> {
        Some(self.hold_minutes)
    }
}
