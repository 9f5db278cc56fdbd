//! Lead-lag cross-asset strategy.
//!
//! A spike in the lead instrument (close-to-close gain of at least
//! `lead_pct_increase` percent over `lead_window` bars, both bars on the same
//! calendar day) triggers a long position in the lag instrument:
//!
//! - entry at the first lag bar strictly after the spike's closing timestamp,
//!   since that close is what raised the signal;
//! - exit at the first lag bar at or after `entry_time + lag_hold_minutes`.
//!
//! The two series are clocked independently, so both lookups are timestamp
//! searches. Spike timestamps only move forward, which lets two [`Cursor`]s
//! resolve every lookup in one pass over the lag series. A spike whose entry
//! or exit bar does not exist is dropped and reported, not treated as an error.
//!
//! [`Cursor`]: crate::domain::series::Cursor

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, warn};

use crate::domain::error::{LagtraderError, MissingLookup};
use crate::domain::ledger::Ledger;
use crate::domain::position::{ExitReason, Trade, return_pct};
use crate::domain::series::Series;
use crate::domain::strategy::{SECTION, require_positive, require_positive_minutes};

#[derive(Debug, Clone, PartialEq)]
pub struct LeadLagConfig {
    pub lead_pct_increase: f64,
    pub lead_window: usize,
    pub lag_hold_minutes: i64,
}

impl Default for LeadLagConfig {
    fn default() -> Self {
        Self {
            lead_pct_increase: 1.0,
            lead_window: 10,
            lag_hold_minutes: 10,
        }
    }
}

impl LeadLagConfig {
    pub fn validate(&self) -> Result<(), LagtraderError> {
        if !self.lead_pct_increase.is_finite() || self.lead_pct_increase <= 0.0 {
            return Err(LagtraderError::invalid(
                SECTION,
                "lead_pct_increase",
                "lead_pct_increase must be positive",
            ));
        }
        require_positive("lead_window", self.lead_window)?;
        require_positive_minutes("lag_hold_minutes", self.lag_hold_minutes)
    }
}

/// Ledger of a lead-lag run plus the spikes that could not be traded.
#[derive(Debug, Clone, Default)]
pub struct LeadLagRun {
    pub ledger: Ledger,
    pub dropped: Vec<MissingLookup>,
}

pub fn run_lead_lag(config: &LeadLagConfig, lead: &Series, lag: &Series) -> LeadLagRun {
    let mut run = LeadLagRun::default();
    let window = config.lead_window;
    let hold = Duration::minutes(config.lag_hold_minutes);

    let mut entries = lag.cursor();
    let mut exits = lag.cursor();
    let mut flat_from: Option<NaiveDateTime> = None;

    let lead_bars = lead.bars();
    for i in 0..lead_bars.len().saturating_sub(window) {
        let start = &lead_bars[i];
        let end = &lead_bars[i + window];

        if start.date() != end.date() {
            continue;
        }
        if return_pct(start.close, end.close) < config.lead_pct_increase {
            continue;
        }

        // a spike on the previous exit's bar may fire; its entry lands on a later bar
        let spike_time = end.timestamp;
        if flat_from.is_some_and(|t| spike_time < t) {
            continue;
        }

        let Some(entry_idx) = entries.seek_after(spike_time) else {
            debug!(lag = lag.symbol(), %spike_time, "no lag bar for entry");
            run.dropped.push(MissingLookup {
                series: lag.symbol().to_string(),
                timestamp: spike_time,
            });
            continue;
        };
        let entry = lag.bar(entry_idx);

        let deadline = entry.timestamp + hold;
        let Some(exit_idx) = exits.seek(deadline) else {
            debug!(lag = lag.symbol(), %deadline, "no lag bar for exit");
            run.dropped.push(MissingLookup {
                series: lag.symbol().to_string(),
                timestamp: deadline,
            });
            continue;
        };
        let exit = lag.bar(exit_idx);

        run.ledger.record(Trade::new(
            entry.timestamp,
            entry.close,
            exit.timestamp,
            exit.close,
            ExitReason::HoldElapsed,
        ));
        flat_from = Some(exit.timestamp);
    }

    if !run.dropped.is_empty() {
        warn!(
            lead = lead.symbol(),
            lag = lag.symbol(),
            dropped = run.dropped.len(),
            "lead spikes dropped for missing lag bars"
        );
    }

    run
}
