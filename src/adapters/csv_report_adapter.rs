//! CSV result sink.
//!
//! Backtests write `trades_<strategy>.csv` and `summary_<strategy>.csv`;
//! scans write `price_spikes.csv` (every bar of every qualifying window) and,
//! when a second series was evaluated, `responses.csv`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::domain::backtest::RunReport;
use crate::domain::error::LagtraderError;
use crate::domain::scan::ScanReport;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    strategy: &'a str,
    symbol: &'a str,
    total_return_pct: f64,
    average_return_pct: f64,
    trade_count: usize,
    win_count: usize,
    loss_count: usize,
    best_return_pct: f64,
    worst_return_pct: f64,
    holding_return_pct: Option<f64>,
    dropped_signals: usize,
}

impl<'a> From<&'a RunReport> for SummaryRow<'a> {
    fn from(run: &'a RunReport) -> Self {
        let s = &run.summary;
        Self {
            strategy: &run.strategy,
            symbol: &run.symbol,
            total_return_pct: s.total_return_pct,
            average_return_pct: s.average_return_pct,
            trade_count: s.trade_count,
            win_count: s.win_count,
            loss_count: s.loss_count,
            best_return_pct: s.best_return_pct,
            worst_return_pct: s.worst_return_pct,
            holding_return_pct: run.benchmark_pct,
            dropped_signals: run.dropped_signals.len(),
        }
    }
}

fn report_err(path: &Path, e: impl std::fmt::Display) -> LagtraderError {
    LagtraderError::Report {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

/// Serialize `rows` to `path` with a header line, even when there are no rows.
fn write_rows<T: Serialize>(
    path: &Path,
    header: &[&str],
    rows: impl IntoIterator<Item = T>,
) -> Result<(), LagtraderError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| report_err(path, e))?;
    wtr.write_record(header).map_err(|e| report_err(path, e))?;
    for row in rows {
        wtr.serialize(row).map_err(|e| report_err(path, e))?;
    }
    wtr.flush().map_err(|e| report_err(path, e))?;
    Ok(())
}

fn prepare(output_dir: &Path, file: &str) -> Result<PathBuf, LagtraderError> {
    fs::create_dir_all(output_dir).map_err(|e| report_err(output_dir, e))?;
    Ok(output_dir.join(file))
}

const TRADE_HEADER: [&str; 6] = [
    "entry_time",
    "entry_price",
    "exit_time",
    "exit_price",
    "return_pct",
    "exit_reason",
];

const SUMMARY_HEADER: [&str; 11] = [
    "strategy",
    "symbol",
    "total_return_pct",
    "average_return_pct",
    "trade_count",
    "win_count",
    "loss_count",
    "best_return_pct",
    "worst_return_pct",
    "holding_return_pct",
    "dropped_signals",
];

const BAR_HEADER: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];

const RESPONSE_HEADER: [&str; 5] = [
    "timestamp",
    "price_start",
    "price_end",
    "change",
    "percent_change",
];

impl ReportPort for CsvReportAdapter {
    fn write_ledger(&self, run: &RunReport, output_dir: &Path) -> Result<(), LagtraderError> {
        let trades_path = prepare(output_dir, &format!("trades_{}.csv", run.strategy))?;
        write_rows(&trades_path, &TRADE_HEADER, run.ledger.trades())?;

        let summary_path = prepare(output_dir, &format!("summary_{}.csv", run.strategy))?;
        write_rows(&summary_path, &SUMMARY_HEADER, [SummaryRow::from(run)])?;

        info!(
            strategy = %run.strategy,
            trades = %trades_path.display(),
            summary = %summary_path.display(),
            "wrote ledger"
        );
        Ok(())
    }

    fn write_scan(&self, report: &ScanReport, output_dir: &Path) -> Result<(), LagtraderError> {
        let spikes_path = prepare(output_dir, "price_spikes.csv")?;
        write_rows(&spikes_path, &BAR_HEADER, &report.window_bars)?;
        info!(
            symbol = %report.symbol,
            windows = report.spikes.len(),
            path = %spikes_path.display(),
            "wrote spike windows"
        );

        if let Some(response) = &report.response {
            let responses_path = prepare(output_dir, "responses.csv")?;
            write_rows(&responses_path, &RESPONSE_HEADER, &response.responses)?;
            info!(
                responses = response.responses.len(),
                path = %responses_path.display(),
                "wrote responses"
            );
        }
        Ok(())
    }
}
