//! Core domain types and logic.

pub mod backtest;
pub mod benchmark;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod ledger;
pub mod metrics;
pub mod ohlcv;
pub mod position;
pub mod scan;
pub mod series;
pub mod strategy;
