//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as engine, BacktestConfig, RunReport, ScanRequest};
use crate::domain::benchmark::holding_return_from_rows;
use crate::domain::config_validation::{
    build_backtest_config, build_data_settings, build_date_range, build_scan_request, output_dir,
    validate_config,
};
use crate::domain::error::LagtraderError;
use crate::domain::scan::ScanReport;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "lagtrader", about = "Intraday strategy backtester")]
pub struct Cli {
    /// Log filter when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one or more strategies and compare against holding
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Traded symbol, overriding the config
        #[arg(long)]
        symbol: Option<String>,
        /// Strategy kind(s), comma-separated, or "all"
        #[arg(short, long)]
        strategy: Option<String>,
    },
    /// Report every window whose gain meets the threshold
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Buy-and-hold return over the configured range
    Hold {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// List symbols with bar files in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest {
            config,
            output,
            symbol,
            strategy,
        } => run_backtest(&config, output, symbol.as_deref(), strategy.as_deref()),
        Command::Scan { config, output } => run_scan(&config, output),
        Command::Validate { config } => run_validate(&config),
        Command::Hold { config, symbol } => run_hold(&config, symbol.as_deref()),
        Command::ListSymbols { config } => run_list_symbols(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_failure(&e),
    }
}

fn report_failure(err: &LagtraderError) -> ExitCode {
    if err.is_no_data() {
        println!("{err}");
    } else {
        eprintln!("error: {err}");
    }
    err.into()
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, LagtraderError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

pub fn build_data_port(config: &dyn ConfigPort) -> Result<CsvAdapter, LagtraderError> {
    let settings = build_data_settings(config)?;
    Ok(match settings.file_pattern {
        Some(pattern) => CsvAdapter::with_pattern(settings.dir, &pattern),
        None => CsvAdapter::new(settings.dir),
    })
}

fn run_backtest(
    config_path: &Path,
    output: Option<PathBuf>,
    symbol: Option<&str>,
    strategy: Option<&str>,
) -> Result<(), LagtraderError> {
    // Stage 1: Load config
    let config = load_config(config_path)?;

    // Stage 2: Build and validate everything before touching data
    let bt_config = build_backtest_config(&config, symbol, strategy)?;
    let data_port = build_data_port(&config)?;
    let output = output.unwrap_or_else(|| output_dir(&config));

    // Stages 3-5: Fetch, run, report
    run_backtest_pipeline(&data_port, &CsvReportAdapter, &bt_config, &output).map(|_| ())
}

/// Fetch data, run every configured strategy, print and persist the results.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    bt_config: &BacktestConfig,
    output: &Path,
) -> Result<Vec<RunReport>, LagtraderError> {
    info!(
        symbol = %bt_config.symbol,
        strategies = bt_config.strategies.len(),
        start = %bt_config.start_date,
        end = %bt_config.end_date,
        "running backtest"
    );
    let reports = engine::run_backtest(data_port, bt_config)?;

    for report in &reports {
        print_run(report);
        report_port.write_ledger(report, output)?;
    }
    Ok(reports)
}

fn print_run(report: &RunReport) {
    let s = &report.summary;
    println!("\n=== {} on {} ===", report.strategy, report.symbol);
    println!(
        "Trades:           {} ({} wins, {} losses)",
        s.trade_count, s.win_count, s.loss_count
    );
    println!("Win Rate:         {:.1}%", s.win_rate() * 100.0);
    println!("Total Return:     {:.2}%", s.total_return_pct);
    println!("Average Return:   {:.2}%", s.average_return_pct);
    if s.trade_count > 0 {
        println!(
            "Best / Worst:     {:.2}% / {:.2}%",
            s.best_return_pct, s.worst_return_pct
        );
    }
    if !report.dropped_signals.is_empty() {
        println!("Dropped signals:  {}", report.dropped_signals.len());
    }
    if let Some(hold) = report.benchmark_pct {
        println!(
            "Returns for strategy: {:.2}% vs holding: {:.2}%",
            s.total_return_pct, hold
        );
    }
}

fn run_scan(config_path: &Path, output: Option<PathBuf>) -> Result<(), LagtraderError> {
    let config = load_config(config_path)?;
    let request = build_scan_request(&config)?;
    let data_port = build_data_port(&config)?;
    let output = output.unwrap_or_else(|| output_dir(&config));

    run_scan_pipeline(&data_port, &CsvReportAdapter, &request, &output).map(|_| ())
}

pub fn run_scan_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    request: &ScanRequest,
    output: &Path,
) -> Result<ScanReport, LagtraderError> {
    info!(
        symbol = %request.symbol,
        time_span = request.config.time_span,
        threshold = request.config.expected_percent_change,
        "scanning"
    );
    let report = engine::run_scan(data_port, request)?;

    if report.spikes.is_empty() {
        println!(
            "No {}% price increases over {} bars found in {}.",
            request.config.expected_percent_change, request.config.time_span, report.symbol
        );
    } else {
        println!(
            "Found {} windows in {} with a gain of at least {}% over {} bars.",
            report.spikes.len(),
            report.symbol,
            request.config.expected_percent_change,
            request.config.time_span
        );
    }

    if let (Some(response), Some(settings)) = (&report.response, &request.config.response) {
        let n = response.responses.len();
        let mean = if n > 0 {
            response.responses.iter().map(|r| r.percent_change).sum::<f64>() / n as f64
        } else {
            0.0
        };
        println!(
            "{} response over {} minutes: {} evaluated, {} skipped, mean {:.2}%",
            settings.symbol,
            settings.time_span_minutes,
            n,
            response.missing.len(),
            mean
        );
    }

    report_port.write_scan(&report, output)?;
    Ok(report)
}

fn run_validate(config_path: &Path) -> Result<(), LagtraderError> {
    let config = load_config(config_path)?;
    let validated = validate_config(&config)?;

    println!("Data directory: {}", validated.data.dir.display());
    let mut symbols: Vec<&str> = Vec::new();
    if let Some(bt) = &validated.backtest {
        let kinds: Vec<String> = bt.strategies.iter().map(|s| s.kind().to_string()).collect();
        println!(
            "Backtest: {} on {} from {} to {}",
            kinds.join(", "),
            bt.symbol,
            bt.start_date,
            bt.end_date
        );
        symbols.push(&bt.symbol);
        if let Some(lead) = &bt.lead_symbol {
            symbols.push(lead);
        }
    }
    if let Some(scan) = &validated.scan {
        println!(
            "Scan: {} for {}% over {} bars",
            scan.symbol, scan.config.expected_percent_change, scan.config.time_span
        );
        symbols.push(&scan.symbol);
        if let Some(response) = &scan.config.response {
            symbols.push(&response.symbol);
        }
    }

    // missing bar files are reported, not fatal: the data may arrive later
    let available = build_data_port(&config)?.list_symbols().unwrap_or_default();
    for symbol in symbols {
        if !available.iter().any(|s| s == symbol) {
            warn!(symbol, "no bar file found");
        }
    }

    println!("Configuration is valid.");
    Ok(())
}

fn run_hold(config_path: &Path, symbol: Option<&str>) -> Result<(), LagtraderError> {
    let config = load_config(config_path)?;
    let symbol = match symbol {
        Some(s) => s.to_string(),
        None => config
            .get_string("backtest", "symbol")
            .or_else(|| config.get_string("backtest", "lag"))
            .ok_or_else(|| LagtraderError::missing("backtest", "symbol"))?,
    };
    let (start_date, end_date) = build_date_range(&config)?;
    let data_port = build_data_port(&config)?;

    let rows = data_port.fetch_bars(&symbol, start_date, end_date)?;
    let hold = holding_return_from_rows(&symbol, &rows)?;
    println!(
        "Holding return for {} from {} to {}: {:.2}%",
        symbol, start_date, end_date, hold
    );
    Ok(())
}

fn run_list_symbols(config_path: &Path) -> Result<(), LagtraderError> {
    let config = load_config(config_path)?;
    let symbols = build_data_port(&config)?.list_symbols()?;
    if symbols.is_empty() {
        println!("No bar files found.");
    }
    for symbol in symbols {
        println!("{symbol}");
    }
    Ok(())
}
