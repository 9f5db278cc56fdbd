//! Breakout: long when a close clears the highest close of the preceding
//! `lookback` bars, flat after a fixed holding time. There is no early exit.

use crate::domain::error::LagtraderError;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::frame::IndicatorFrame;
use crate::domain::series::Series;
use crate::domain::strategy::{BarStrategy, require_positive, require_positive_minutes};

#[derive(Debug, Clone, PartialEq)]
pub struct BreakoutConfig {
    pub lookback: usize,
    pub hold_minutes: i64,
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self {
            lookback: 20,
            hold_minutes: 30,
        }
    }
}

impl BreakoutConfig {
    pub fn validate(&self) -> Result<(), LagtraderError> {
        require_positive("lookback", self.lookback)?;
        require_positive_minutes("hold_minutes", self.hold_minutes)
    }

    fn level(&self) -> IndicatorType {
        IndicatorType::RollingHigh(self.lookback)
    }
}

impl BarStrategy for BreakoutConfig {
    fn indicators(&self) -> Vec<IndicatorType> {
        vec![self.level()]
    }

    fn warmup_bars(&self) -> usize {
        self.lookback + 1
    }

    fn entry_signal(&self, frame: &IndicatorFrame, series: &Series, i: usize) -> bool {
        frame
            .value(&self.level(), i)
            .is_ok_and(|high| series.bar(i).close > high)
    }

    fn hold_minutes(&self) -> Option<i64> {
        Some(self.hold_minutes)
    }
}
