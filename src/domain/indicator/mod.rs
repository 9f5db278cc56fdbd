//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: A time series of indicator values
//!
//! A point whose lookback window is not yet satisfied carries `None`. There is
//! no numeric placeholder; accessors surface it as [`UndefinedIndicator`].

pub mod bollinger;
pub mod frame;
pub mod rolling_high;
pub mod rsi;
pub mod sma;
pub mod stddev;

use chrono::NaiveDateTime;
use std::fmt;

use crate::domain::error::UndefinedIndicator;

#[derive(Debug, Clone)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub value: Option<IndicatorValue>,
}

impl IndicatorPoint {
    pub fn is_defined(&self) -> bool {
        self.value.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Bollinger(Bands),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma { period: usize, min_periods: usize },
    Stddev(usize),
    Rsi(usize),
    RollingHigh(usize),
    /// `num_std_bits` is `f64::to_bits` of the multiplier, so the key stays
    /// hashable while the band uses the exact configured k.
    Bollinger { period: usize, num_std_bits: u64 },
}

impl IndicatorType {
    /// Full-window simple moving average.
    pub fn sma(period: usize) -> Self {
        IndicatorType::Sma {
            period,
            min_periods: period,
        }
    }

    pub fn bollinger(period: usize, num_std: f64) -> Self {
        IndicatorType::Bollinger {
            period,
            num_std_bits: num_std.to_bits(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    fn undefined(&self, index: usize) -> UndefinedIndicator {
        UndefinedIndicator {
            indicator: self.indicator_type.to_string(),
            index,
        }
    }

    pub fn simple(&self, index: usize) -> Result<f64, UndefinedIndicator> {
        match self.values.get(index).and_then(|p| p.value) {
            Some(IndicatorValue::Simple(v)) => Ok(v),
            _ => Err(self.undefined(index)),
        }
    }

    pub fn bands(&self, index: usize) -> Result<Bands, UndefinedIndicator> {
        match self.values.get(index).and_then(|p| p.value) {
            Some(IndicatorValue::Bollinger(b)) => Ok(b),
            _ => Err(self.undefined(index)),
        }
    }

    /// Index of the first defined point, if any.
    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(IndicatorPoint::is_defined)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma {
                period,
                min_periods,
            } if period == min_periods => write!(f, "SMA({})", period),
            IndicatorType::Sma {
                period,
                min_periods,
            } => write!(f, "SMA({},min={})", period, min_periods),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::RollingHigh(lookback) => write!(f, "HIGH({})", lookback),
            IndicatorType::Bollinger {
                period,
                num_std_bits,
            } => write!(f, "BOLLINGER({},{})", period, f64::from_bits(*num_std_bits)),
        }
    }
}
