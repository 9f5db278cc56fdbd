//! Configuration building and validation.
//!
//! Every section is read into a typed config and validated before any data
//! is touched. Errors name the first offending `[section] key`.

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::backtest::{BacktestConfig, ScanRequest, validate_range};
use crate::domain::error::LagtraderError;
use crate::domain::scan::{ResponseConfig, ScanConfig};
use crate::domain::strategy::{
    BollingerConfig, BreakoutConfig, LeadLagConfig, MaCrossoverConfig, RsiConfig, StrategyConfig,
    StrategyKind,
};
use crate::ports::config_port::ConfigPort;

const DATA: &str = "data";
const BACKTEST: &str = "backtest";
const STRATEGY: &str = "strategy";
const SCAN: &str = "scan";
const OUTPUT: &str = "output";

pub const DEFAULT_OUTPUT_DIR: &str = "results";

#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub dir: PathBuf,
    pub file_pattern: Option<String>,
}

pub fn build_data_settings(config: &dyn ConfigPort) -> Result<DataSettings, LagtraderError> {
    let dir = config
        .get_string(DATA, "dir")
        .ok_or_else(|| LagtraderError::missing(DATA, "dir"))?;
    let file_pattern = config.get_string(DATA, "file_pattern");
    if let Some(pattern) = &file_pattern {
        if !pattern.contains("{symbol}") {
            return Err(LagtraderError::invalid(
                DATA,
                "file_pattern",
                "file_pattern must contain {symbol}",
            ));
        }
    }
    Ok(DataSettings {
        dir: PathBuf::from(dir),
        file_pattern,
    })
}

pub fn output_dir(config: &dyn ConfigPort) -> PathBuf {
    PathBuf::from(
        config
            .get_string(OUTPUT, "dir")
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
    )
}

fn parse_date(config: &dyn ConfigPort, section: &str, key: &str) -> Result<NaiveDate, LagtraderError> {
    let value = config
        .get_string(section, key)
        .ok_or_else(|| LagtraderError::missing(section, key))?;
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| {
        LagtraderError::invalid(
            section,
            key,
            format!("invalid {key} format, expected YYYY-MM-DD"),
        )
    })
}

/// A date from `section`, falling back to `[backtest]`.
fn date_with_fallback(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<NaiveDate, LagtraderError> {
    if config.get_string(section, key).is_some() {
        parse_date(config, section, key)
    } else {
        parse_date(config, BACKTEST, key)
    }
}

fn get_count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, LagtraderError> {
    let value = config.get_int(section, key, default as i64)?;
    usize::try_from(value)
        .map_err(|_| LagtraderError::invalid(section, key, format!("{key} must be positive")))
}

/// `[backtest] start_date` / `end_date`, checked for order.
pub fn build_date_range(config: &dyn ConfigPort) -> Result<(NaiveDate, NaiveDate), LagtraderError> {
    let start_date = parse_date(config, BACKTEST, "start_date")?;
    let end_date = parse_date(config, BACKTEST, "end_date")?;
    validate_range(start_date, end_date)?;
    Ok((start_date, end_date))
}

/// Read one strategy's parameters from `[strategy]`, defaults filled in.
pub fn build_strategy_config(
    config: &dyn ConfigPort,
    kind: StrategyKind,
) -> Result<StrategyConfig, LagtraderError> {
    let strategy = match kind {
        StrategyKind::LeadLag => {
            let d = LeadLagConfig::default();
            StrategyConfig::LeadLag(LeadLagConfig {
                lead_pct_increase: config.get_double(
                    STRATEGY,
                    "lead_pct_increase",
                    d.lead_pct_increase,
                )?,
                lead_window: get_count(config, STRATEGY, "lead_window", d.lead_window)?,
                lag_hold_minutes: config.get_int(
                    STRATEGY,
                    "lag_hold_minutes",
                    d.lag_hold_minutes,
                )?,
            })
        }
        StrategyKind::MaCrossover => {
            let d = MaCrossoverConfig::default();
            StrategyConfig::MaCrossover(MaCrossoverConfig {
                short_window: get_count(config, STRATEGY, "short_window", d.short_window)?,
                long_window: get_count(config, STRATEGY, "long_window", d.long_window)?,
            })
        }
        StrategyKind::Rsi => {
            let d = RsiConfig::default();
            StrategyConfig::Rsi(RsiConfig {
                period: get_count(config, STRATEGY, "period", d.period)?,
                oversold: config.get_double(STRATEGY, "oversold", d.oversold)?,
                overbought: config.get_double(STRATEGY, "overbought", d.overbought)?,
                hold_minutes: config.get_int(STRATEGY, "hold_minutes", d.hold_minutes)?,
            })
        }
        StrategyKind::Breakout => {
            let d = BreakoutConfig::default();
            StrategyConfig::Breakout(BreakoutConfig {
                lookback: get_count(config, STRATEGY, "lookback", d.lookback)?,
                hold_minutes: config.get_int(STRATEGY, "hold_minutes", d.hold_minutes)?,
            })
        }
        StrategyKind::Bollinger => {
            let d = BollingerConfig::default();
            StrategyConfig::Bollinger(BollingerConfig {
                period: get_count(config, STRATEGY, "period", d.period)?,
                num_std: config.get_double(STRATEGY, "num_std", d.num_std)?,
                hold_minutes: config.get_int(STRATEGY, "hold_minutes", d.hold_minutes)?,
            })
        }
    };
    strategy.validate()?;
    Ok(strategy)
}

/// Parse a comma-separated list of strategy kinds (`all` expands to every kind).
pub fn parse_kinds(value: &str) -> Result<Vec<StrategyKind>, LagtraderError> {
    let mut kinds = Vec::new();
    for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if name.eq_ignore_ascii_case("all") {
            return Ok(StrategyKind::ALL.to_vec());
        }
        let kind = StrategyKind::parse(name).ok_or_else(|| {
            LagtraderError::invalid(STRATEGY, "kind", format!("unknown strategy '{name}'"))
        })?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    if kinds.is_empty() {
        return Err(LagtraderError::missing(STRATEGY, "kind"));
    }
    Ok(kinds)
}

pub fn build_backtest_config(
    config: &dyn ConfigPort,
    symbol_override: Option<&str>,
    kind_override: Option<&str>,
) -> Result<BacktestConfig, LagtraderError> {
    let kinds = match kind_override {
        Some(kinds) => parse_kinds(kinds)?,
        None => parse_kinds(
            &config
                .get_string(STRATEGY, "kind")
                .ok_or_else(|| LagtraderError::missing(STRATEGY, "kind"))?,
        )?,
    };
    let needs_lead = kinds.contains(&StrategyKind::LeadLag);

    // lead-lag trades the lag side; `lag` wins over `symbol` when both are set
    let symbol = match symbol_override {
        Some(s) => s.to_string(),
        None => {
            let lag = needs_lead.then(|| config.get_string(BACKTEST, "lag")).flatten();
            lag.or_else(|| config.get_string(BACKTEST, "symbol"))
                .ok_or_else(|| LagtraderError::missing(BACKTEST, "symbol"))?
        }
    };

    let (start_date, end_date) = build_date_range(config)?;

    let strategies = kinds
        .into_iter()
        .map(|kind| build_strategy_config(config, kind))
        .collect::<Result<Vec<_>, _>>()?;

    let backtest = BacktestConfig {
        symbol,
        lead_symbol: config.get_string(BACKTEST, "lead"),
        start_date,
        end_date,
        strategies,
    };
    backtest.validate()?;
    Ok(backtest)
}

pub fn build_scan_request(config: &dyn ConfigPort) -> Result<ScanRequest, LagtraderError> {
    let symbol = config
        .get_string(SCAN, "symbol")
        .ok_or_else(|| LagtraderError::missing(SCAN, "symbol"))?;
    let start_date = date_with_fallback(config, SCAN, "start_date")?;
    let end_date = date_with_fallback(config, SCAN, "end_date")?;
    validate_range(start_date, end_date)?;

    let d = ScanConfig::default();
    let response = match config.get_string(SCAN, "response_symbol") {
        Some(symbol) => Some(ResponseConfig {
            symbol,
            time_span_minutes: config.get_int(SCAN, "response_time_span", 10)?,
        }),
        None => None,
    };
    let scan = ScanConfig {
        expected_percent_change: config.get_double(
            SCAN,
            "expected_percent_change",
            d.expected_percent_change,
        )?,
        time_span: get_count(config, SCAN, "time_span", d.time_span)?,
        response,
    };
    scan.validate()?;

    Ok(ScanRequest {
        symbol,
        start_date,
        end_date,
        config: scan,
    })
}

/// What a config file sets up, once validated.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub data: DataSettings,
    pub backtest: Option<BacktestConfig>,
    pub scan: Option<ScanRequest>,
}

/// Validate every section present. `[data]` is required, plus at least one
/// of a backtest (`[strategy] kind`) or a scan (`[scan] symbol`).
pub fn validate_config(config: &dyn ConfigPort) -> Result<ValidatedConfig, LagtraderError> {
    let data = build_data_settings(config)?;
    let backtest = match config.get_string(STRATEGY, "kind") {
        Some(_) => Some(build_backtest_config(config, None, None)?),
        None => None,
    };
    let scan = match config.get_string(SCAN, "symbol") {
        Some(_) => Some(build_scan_request(config)?),
        None => None,
    };
    if backtest.is_none() && scan.is_none() {
        return Err(LagtraderError::missing(STRATEGY, "kind"));
    }
    Ok(ValidatedConfig {
        data,
        backtest,
        scan,
    })
}
