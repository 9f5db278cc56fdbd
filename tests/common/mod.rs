#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use lagtrader::domain::backtest::{BacktestConfig, RunReport};
use lagtrader::domain::error::LagtraderError;
pub use lagtrader::domain::ohlcv::RawBar;
use lagtrader::domain::scan::ScanReport;
use lagtrader::domain::series::Series;
use lagtrader::domain::strategy::StrategyConfig;
use lagtrader::ports::data_port::DataPort;
use lagtrader::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<RawBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<RawBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        _start_date: NaiveDate,
        _end_date: NaiveDate,
    ) -> Result<Vec<RawBar>, LagtraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(LagtraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, LagtraderError> {
        let mut symbols: Vec<_> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Records what would have been written instead of touching disk.
#[derive(Default)]
pub struct RecordingReportPort {
    pub ledgers: RefCell<Vec<String>>,
    pub scans: RefCell<Vec<usize>>,
}

impl ReportPort for RecordingReportPort {
    fn write_ledger(&self, run: &RunReport, _output_dir: &Path) -> Result<(), LagtraderError> {
        self.ledgers.borrow_mut().push(run.strategy.clone());
        Ok(())
    }

    fn write_scan(&self, report: &ScanReport, _output_dir: &Path) -> Result<(), LagtraderError> {
        self.scans.borrow_mut().push(report.spikes.len());
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 2024-07-01 13:30 UTC plus `i` minutes.
pub fn minute(i: usize) -> NaiveDateTime {
    date(2024, 7, 1).and_hms_opt(13, 30, 0).unwrap() + Duration::minutes(i as i64)
}

pub fn make_bar(symbol: &str, timestamp: NaiveDateTime, close: f64) -> RawBar {
    RawBar {
        symbol: Some(symbol.to_string()),
        timestamp: format!("{}+00:00", timestamp.format("%Y-%m-%d %H:%M:%S")),
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume: 1000.0,
    }
}

/// One bar per minute from [`minute`]`(0)`.
pub fn minute_bars(symbol: &str, closes: &[f64]) -> Vec<RawBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(symbol, minute(i), close))
        .collect()
}

pub fn minute_series(symbol: &str, closes: &[f64]) -> Series {
    Series::from_rows(symbol, &minute_bars(symbol, closes)).unwrap()
}

pub fn sample_config(strategies: Vec<StrategyConfig>) -> BacktestConfig {
    BacktestConfig {
        symbol: "NVDA".into(),
        lead_symbol: None,
        start_date: date(2024, 7, 1),
        end_date: date(2024, 7, 2),
        strategies,
    }
}

/// Every single-series strategy with parameters small enough for short fixtures.
pub fn small_strategies() -> Vec<StrategyConfig> {
    use lagtrader::domain::strategy::{BollingerConfig, BreakoutConfig, MaCrossoverConfig, RsiConfig};
    vec![
        StrategyConfig::MaCrossover(MaCrossoverConfig {
            short_window: 2,
            long_window: 4,
        }),
        StrategyConfig::Rsi(RsiConfig {
            period: 3,
            hold_minutes: 5,
            ..RsiConfig::default()
        }),
        StrategyConfig::Breakout(BreakoutConfig {
            lookback: 3,
            hold_minutes: 4,
        }),
        StrategyConfig::Bollinger(BollingerConfig {
            period: 4,
            num_std: 1.0,
            hold_minutes: 6,
        }),
    ]
}
