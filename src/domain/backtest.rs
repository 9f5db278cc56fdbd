//! Backtest and scan entry points.
//!
//! Data is fetched and normalised before any run starts; the runs themselves
//! are pure functions of their series and config, so several strategies over
//! the same series run in parallel without synchronisation.

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::benchmark::holding_return;
use crate::domain::error::{LagtraderError, MissingLookup};
use crate::domain::ledger::Ledger;
use crate::domain::metrics::RunSummary;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::scan::{ScanConfig, ScanReport, evaluate_response, scan_spikes};
use crate::domain::series::Series;
use crate::domain::strategy::lead_lag::run_lead_lag;
use crate::domain::strategy::{StrategyConfig, StrategyKind, walk};
use crate::ports::data_port::DataPort;

const SECTION: &str = "backtest";

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    /// Traded instrument; the lag side for lead-lag.
    pub symbol: String,
    /// Signal instrument for lead-lag.
    pub lead_symbol: Option<String>,
    pub start_date: NaiveDate,
    /// Exclusive.
    pub end_date: NaiveDate,
    pub strategies: Vec<StrategyConfig>,
}

impl BacktestConfig {
    pub fn validate(&self) -> Result<(), LagtraderError> {
        if self.symbol.trim().is_empty() {
            return Err(LagtraderError::missing(SECTION, "symbol"));
        }
        validate_range(self.start_date, self.end_date)?;
        if self.strategies.is_empty() {
            return Err(LagtraderError::missing("strategy", "kind"));
        }
        for strategy in &self.strategies {
            strategy.validate()?;
        }
        let needs_lead = self
            .strategies
            .iter()
            .any(|s| s.kind() == StrategyKind::LeadLag);
        if needs_lead && self.lead_symbol.as_deref().is_none_or(|s| s.trim().is_empty()) {
            return Err(LagtraderError::missing(SECTION, "lead"));
        }
        Ok(())
    }
}

pub(crate) fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), LagtraderError> {
    if start >= end {
        return Err(LagtraderError::invalid(
            SECTION,
            "start_date",
            "start_date must be before end_date",
        ));
    }
    Ok(())
}

/// Everything one strategy run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub strategy: String,
    pub symbol: String,
    pub ledger: Ledger,
    pub summary: RunSummary,
    /// Buy-and-hold return of the traded series over the same range.
    pub benchmark_pct: Option<f64>,
    /// Lead-lag signals dropped for want of a lag bar.
    pub dropped_signals: Vec<MissingLookup>,
}

impl RunReport {
    fn new(strategy: StrategyKind, series: &Series, ledger: Ledger) -> Self {
        Self {
            strategy: strategy.to_string(),
            symbol: series.symbol().to_string(),
            summary: RunSummary::compute(&ledger),
            ledger,
            benchmark_pct: Some(holding_return(series)),
            dropped_signals: Vec::new(),
        }
    }
}

/// Run one strategy over an already loaded series.
///
/// `lead` is only read by lead-lag, which fails without it.
pub fn run_strategy(
    strategy: &StrategyConfig,
    series: &Series,
    lead: Option<&Series>,
) -> Result<RunReport, LagtraderError> {
    let report = match strategy {
        StrategyConfig::LeadLag(config) => {
            let lead = lead.ok_or_else(|| LagtraderError::missing(SECTION, "lead"))?;
            let run = run_lead_lag(config, lead, series);
            let mut report = RunReport::new(strategy.kind(), series, run.ledger);
            report.dropped_signals = run.dropped;
            report
        }
        other => {
            let rules = other
                .as_bar_strategy()
                .ok_or_else(|| LagtraderError::invalid("strategy", "kind", "no single-series rules"))?;
            RunReport::new(other.kind(), series, walk(rules, series))
        }
    };

    debug!(
        strategy = %report.strategy,
        symbol = %report.symbol,
        trades = report.summary.trade_count,
        "strategy run complete"
    );
    Ok(report)
}

/// Run several strategies over the same series in parallel. Order is kept.
pub fn run_strategies(
    strategies: &[StrategyConfig],
    series: &Series,
    lead: Option<&Series>,
) -> Result<Vec<RunReport>, LagtraderError> {
    strategies
        .par_iter()
        .map(|strategy| run_strategy(strategy, series, lead))
        .collect()
}

/// Fetch and normalise one symbol. Zero rows is [`LagtraderError::EmptyInput`].
pub fn load_series(
    data: &dyn DataPort,
    symbol: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Series, LagtraderError> {
    let rows = data.fetch_bars(symbol, start_date, end_date)?;
    let series = Series::from_rows(symbol, &rows)?;
    info!(symbol, bars = series.len(), "loaded series");
    Ok(series)
}

pub fn run_backtest(
    data: &dyn DataPort,
    config: &BacktestConfig,
) -> Result<Vec<RunReport>, LagtraderError> {
    config.validate()?;

    let series = load_series(data, &config.symbol, config.start_date, config.end_date)?;
    let needs_lead = config
        .strategies
        .iter()
        .any(|s| s.kind() == StrategyKind::LeadLag);
    let lead = match (&config.lead_symbol, needs_lead) {
        (Some(symbol), true) => Some(load_series(
            data,
            symbol,
            config.start_date,
            config.end_date,
        )?),
        _ => None,
    };

    run_strategies(&config.strategies, &series, lead.as_ref())
}

#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub config: ScanConfig,
}

pub fn run_scan(data: &dyn DataPort, request: &ScanRequest) -> Result<ScanReport, LagtraderError> {
    if request.symbol.trim().is_empty() {
        return Err(LagtraderError::missing("scan", "symbol"));
    }
    validate_range(request.start_date, request.end_date)?;
    request.config.validate()?;

    let series = load_series(data, &request.symbol, request.start_date, request.end_date)?;
    let spikes = scan_spikes(
        &series,
        request.config.time_span,
        request.config.expected_percent_change,
    );
    let window_bars: Vec<OhlcvBar> = spikes
        .iter()
        .flat_map(|s| s.window(&series).iter().cloned())
        .collect();

    let response = match &request.config.response {
        Some(response) => {
            let series_b =
                load_series(data, &response.symbol, request.start_date, request.end_date)?;
            let times: Vec<_> = spikes.iter().map(|s| s.end_time).collect();
            Some(evaluate_response(&times, &series_b, response.time_span_minutes))
        }
        None => None,
    };

    Ok(ScanReport {
        symbol: request.symbol.clone(),
        spikes,
        window_bars,
        response,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::strategy::test_support::*;
    use crate::domain::strategy::{LeadLagConfig, MaCrossoverConfig, RsiConfig};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config(strategies: Vec<StrategyConfig>) -> BacktestConfig {
        BacktestConfig {
            symbol: "NVDA".into(),
            lead_symbol: None,
            start_date: date(2024, 7, 1),
            end_date: date(2024, 7, 2),
            strategies,
        }
    }

    #[test]
    fn report_carries_summary_and_benchmark() {
        let series = minute_series(&[10.0, 10.0, 12.0, 13.0, 8.0, 7.0, 6.0]);
        let strategy = StrategyConfig::MaCrossover(MaCrossoverConfig {
            short_window: 2,
            long_window: 3,
        });
        let report = run_strategy(&strategy, &series, None).unwrap();

        assert_eq!(report.strategy, "ma_crossover");
        assert_eq!(report.summary.trade_count, 1);
        assert_eq!(report.summary.trade_count, report.ledger.len());
        let hold = report.benchmark_pct.unwrap();
        assert!((hold - (6.0 - 10.0) / 10.0 * 100.0).abs() < 1e-10);
    }

    #[test]
    fn lead_lag_without_lead_series_fails() {
        let series = minute_series(&[10.0; 5]);
        let strategy = StrategyConfig::LeadLag(LeadLagConfig::default());
        let err = run_strategy(&strategy, &series, None).unwrap_err();
        assert!(matches!(err, LagtraderError::ConfigMissing { .. }));
    }

    #[test]
    fn parallel_runs_keep_order() {
        let series = minute_series(&[100.0; 30]);
        let strategies = vec![
            StrategyConfig::Rsi(RsiConfig::default()),
            StrategyConfig::MaCrossover(MaCrossoverConfig::default()),
        ];
        let reports = run_strategies(&strategies, &series, None).unwrap();
        assert_eq!(reports[0].strategy, "rsi");
        assert_eq!(reports[1].strategy, "ma_crossover");
    }

    #[test]
    fn validate_requires_lead_for_lead_lag() {
        let cfg = config(vec![StrategyConfig::LeadLag(LeadLagConfig::default())]);
        assert!(cfg.validate().is_err());
        let with_lead = BacktestConfig {
            lead_symbol: Some("TSM".into()),
            ..cfg
        };
        assert!(with_lead.validate().is_ok());
    }

    #[test]
    fn validate_date_order() {
        let cfg = BacktestConfig {
            end_date: date(2024, 7, 1),
            ..config(vec![StrategyConfig::Rsi(RsiConfig::default())])
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_strategy_before_running() {
        let cfg = config(vec![StrategyConfig::MaCrossover(MaCrossoverConfig {
            short_window: 5,
            long_window: 5,
        })]);
        assert!(matches!(
            cfg.validate(),
            Err(LagtraderError::ConfigInvalid { .. })
        ));
    }
}
