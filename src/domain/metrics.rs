//! Per-run aggregate statistics.

use serde::{Deserialize, Serialize};

use super::ledger::Ledger;

/// Summary of one strategy run.
///
/// An empty ledger is a valid outcome and summarises to all zeros; "no data"
/// never reaches this point (it fails at series construction).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_return_pct: f64,
    pub average_return_pct: f64,
    pub trade_count: usize,
    pub win_count: usize,
    pub loss_count: usize,
    pub best_return_pct: f64,
    pub worst_return_pct: f64,
}

impl RunSummary {
    pub fn compute(ledger: &Ledger) -> Self {
        let trades = ledger.trades();
        if trades.is_empty() {
            return RunSummary::default();
        }

        let mut total = 0.0_f64;
        let mut win_count = 0usize;
        let mut loss_count = 0usize;
        let mut best = f64::NEG_INFINITY;
        let mut worst = f64::INFINITY;

        for trade in trades {
            let r = trade.return_pct;
            total += r;
            if r > 0.0 {
                win_count += 1;
            } else if r < 0.0 {
                loss_count += 1;
            }
            best = best.max(r);
            worst = worst.min(r);
        }

        RunSummary {
            total_return_pct: total,
            average_return_pct: total / trades.len() as f64,
            trade_count: trades.len(),
            win_count,
            loss_count,
            best_return_pct: best,
            worst_return_pct: worst,
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.trade_count > 0 {
            self.win_count as f64 / self.trade_count as f64
        } else {
            0.0
        }
    }
}
