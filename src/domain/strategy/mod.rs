//! Strategy configuration and the shared single-series walker.
//!
//! Every single-series strategy is a [`BarStrategy`]: it names the indicators
//! it needs and answers "entry signal at bar i?" / "exit signal at bar i?".
//! [`walk`] owns the state machine and the execution timing:
//!
//! - a price signal observed on bar i's close is executed at bar i+1's close;
//! - a holding-time exit executes at the first bar whose timestamp is at least
//!   `entry_time + hold_minutes` (it does not depend on that bar's price);
//! - on a bar where both fire, the price exit is checked first and wins;
//! - a position still open when the series ends is closed at the last close.
//!
//! Lead-lag runs over two series and has its own walker in [`lead_lag`].

pub mod bollinger;
pub mod breakout;
pub mod lead_lag;
pub mod ma_crossover;
pub mod rsi;

use std::fmt;

use tracing::debug;

use crate::domain::error::LagtraderError;
use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::frame::IndicatorFrame;
use crate::domain::ledger::Ledger;
use crate::domain::position::{ExitReason, PositionState};
use crate::domain::series::Series;

pub use bollinger::BollingerConfig;
pub use breakout::BreakoutConfig;
pub use lead_lag::{LeadLagConfig, LeadLagRun};
pub use ma_crossover::MaCrossoverConfig;
pub use rsi::RsiConfig;

pub(crate) const SECTION: &str = "strategy";

/// Rules of a single-series, single-position strategy.
pub trait BarStrategy {
    fn indicators(&self) -> Vec<IndicatorType>;

    /// Bars required before any signal can be defined.
    fn warmup_bars(&self) -> usize;

    /// Entry condition evaluated on bar `i`'s close.
    fn entry_signal(&self, frame: &IndicatorFrame, series: &Series, i: usize) -> bool;

    /// Price-derived exit condition evaluated on bar `i`'s close.
    fn exit_signal(&self, _frame: &IndicatorFrame, _series: &Series, _i: usize) -> bool {
        false
    }

    /// Maximum holding time, if the strategy has one.
    fn hold_minutes(&self) -> Option<i64> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Enter,
    Exit,
}

/// Walk `series` once under `strategy`'s rules.
pub fn walk<S: BarStrategy + ?Sized>(strategy: &S, series: &Series) -> Ledger {
    let mut ledger = Ledger::new();

    if series.len() < strategy.warmup_bars() {
        debug!(
            symbol = series.symbol(),
            bars = series.len(),
            warmup = strategy.warmup_bars(),
            "series shorter than warmup, no signals possible"
        );
        return ledger;
    }

    let frame = IndicatorFrame::compute(series, &strategy.indicators());
    let mut state = PositionState::Flat;
    let mut pending: Option<Pending> = None;

    for (i, bar) in series.bars().iter().enumerate() {
        match pending.take() {
            Some(Pending::Enter) => {
                state.enter(i, bar);
            }
            Some(Pending::Exit) => {
                if let Some(trade) = state.exit(bar, ExitReason::Signal) {
                    ledger.record(trade);
                }
            }
            None => {}
        }

        if !state.is_flat() {
            if strategy.exit_signal(&frame, series, i) {
                pending = Some(Pending::Exit);
            } else if strategy
                .hold_minutes()
                .is_some_and(|hold| state.held_minutes(bar.timestamp) >= hold)
            {
                if let Some(trade) = state.exit(bar, ExitReason::HoldElapsed) {
                    ledger.record(trade);
                }
            }
        }

        if state.is_flat() && strategy.entry_signal(&frame, series, i) {
            pending = Some(Pending::Enter);
        }
    }

    // an entry signalled on the last bar has no bar to execute on
    if let Some(trade) = state.exit(series.last(), ExitReason::EndOfData) {
        ledger.record(trade);
    }

    ledger
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    LeadLag,
    MaCrossover,
    Rsi,
    Breakout,
    Bollinger,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::LeadLag,
        StrategyKind::MaCrossover,
        StrategyKind::Rsi,
        StrategyKind::Breakout,
        StrategyKind::Bollinger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::LeadLag => "lead_lag",
            StrategyKind::MaCrossover => "ma_crossover",
            StrategyKind::Rsi => "rsi",
            StrategyKind::Breakout => "breakout",
            StrategyKind::Bollinger => "bollinger",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|k| k.as_str() == value)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable, validated parameter bundle for one strategy run.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyConfig {
    LeadLag(LeadLagConfig),
    MaCrossover(MaCrossoverConfig),
    Rsi(RsiConfig),
    Breakout(BreakoutConfig),
    Bollinger(BollingerConfig),
}

impl StrategyConfig {
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyConfig::LeadLag(_) => StrategyKind::LeadLag,
            StrategyConfig::MaCrossover(_) => StrategyKind::MaCrossover,
            StrategyConfig::Rsi(_) => StrategyKind::Rsi,
            StrategyConfig::Breakout(_) => StrategyKind::Breakout,
            StrategyConfig::Bollinger(_) => StrategyKind::Bollinger,
        }
    }

    pub fn validate(&self) -> Result<(), LagtraderError> {
        match self {
            StrategyConfig::LeadLag(c) => c.validate(),
            StrategyConfig::MaCrossover(c) => c.validate(),
            StrategyConfig::Rsi(c) => c.validate(),
            StrategyConfig::Breakout(c) => c.validate(),
            StrategyConfig::Bollinger(c) => c.validate(),
        }
    }

    /// The single-series rules, or `None` for lead-lag.
    pub fn as_bar_strategy(&self) -> Option<&dyn BarStrategy> {
        match self {
            StrategyConfig::LeadLag(_) => None,
            StrategyConfig::MaCrossover(c) => Some(c),
            StrategyConfig::Rsi(c) => Some(c),
            StrategyConfig::Breakout(c) => Some(c),
            StrategyConfig::Bollinger(c) => Some(c),
        }
    }
}

pub(crate) fn require_positive(key: &str, value: usize) -> Result<(), LagtraderError> {
    if value == 0 {
        return Err(LagtraderError::invalid(SECTION, key, format!("{key} must be positive")));
    }
    Ok(())
}

pub(crate) fn require_positive_minutes(key: &str, value: i64) -> Result<(), LagtraderError> {
    if value <= 0 {
        return Err(LagtraderError::invalid(SECTION, key, format!("{key} must be positive")));
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    /// Enters on closes above `level`, exits on closes below it.
    struct Threshold {
        level: f64,
        hold: Option<i64>,
    }

    impl BarStrategy for Threshold {
        fn indicators(&self) -> Vec<IndicatorType> {
            vec![]
        }
        fn warmup_bars(&self) -> usize {
            1
        }
        fn entry_signal(&self, _: &IndicatorFrame, series: &Series, i: usize) -> bool {
            series.bar(i).close > self.level
        }
        fn exit_signal(&self, _: &IndicatorFrame, series: &Series, i: usize) -> bool {
            series.bar(i).close < self.level
        }
        fn hold_minutes(&self) -> Option<i64> {
            self.hold
        }
    }

    #[test]
    fn signals_execute_on_next_bar() {
        let series = minute_series(&[90.0, 110.0, 120.0, 95.0, 80.0, 70.0]);
        let ledger = walk(&Threshold { level: 100.0, hold: None }, &series);

        assert_eq!(ledger.len(), 1);
        let t = &ledger.trades()[0];
        // signal on bar 1, filled at bar 2; exit signal on bar 3, filled at bar 4
        assert_eq!(t.entry_time, minute(2));
        assert_eq!(t.entry_price, 120.0);
        assert_eq!(t.exit_time, minute(4));
        assert_eq!(t.exit_price, 80.0);
        assert_eq!(t.exit_reason, ExitReason::Signal);
    }

    #[test]
    fn open_position_closed_at_last_bar() {
        let series = minute_series(&[110.0, 120.0, 130.0]);
        let ledger = walk(&Threshold { level: 100.0, hold: None }, &series);

        assert_eq!(ledger.len(), 1);
        let t = &ledger.trades()[0];
        assert_eq!(t.entry_time, minute(1));
        assert_eq!(t.exit_time, minute(2));
        assert_eq!(t.exit_reason, ExitReason::EndOfData);
    }

    #[test]
    fn entry_signal_on_last_bar_is_dropped() {
        let series = minute_series(&[90.0, 90.0, 110.0]);
        let ledger = walk(&Threshold { level: 100.0, hold: None }, &series);
        assert!(ledger.is_empty());
    }

    #[test]
    fn hold_exit_executes_at_reached_bar() {
        let series = minute_series(&[110.0, 111.0, 112.0, 113.0, 114.0, 115.0]);
        let ledger = walk(&Threshold { level: 100.0, hold: Some(2) }, &series);

        let t = &ledger.trades()[0];
        assert_eq!(t.entry_time, minute(1));
        assert_eq!(t.exit_time, minute(3));
        assert_eq!(t.exit_reason, ExitReason::HoldElapsed);
        // re-entry signalled on the exit bar fills on the following bar
        assert_eq!(ledger.trades()[1].entry_time, minute(4));
    }

    #[test]
    fn price_exit_wins_tie_with_hold() {
        // bar 3 is both past the hold time and below the level
        let series = minute_series(&[110.0, 111.0, 112.0, 90.0, 80.0]);
        let ledger = walk(&Threshold { level: 100.0, hold: Some(2) }, &series);

        let t = &ledger.trades()[0];
        assert_eq!(t.exit_reason, ExitReason::Signal);
        assert_eq!(t.exit_time, minute(4));
    }

    #[test]
    fn short_series_skips_walk() {
        struct Long;
        impl BarStrategy for Long {
            fn indicators(&self) -> Vec<IndicatorType> {
                vec![]
            }
            fn warmup_bars(&self) -> usize {
                10
            }
            fn entry_signal(&self, _: &IndicatorFrame, _: &Series, _: usize) -> bool {
                true
            }
        }
        let series = minute_series(&[1.0, 2.0, 3.0]);
        assert!(walk(&Long, &series).is_empty());
    }

    #[test]
    fn strategy_kind_round_trip() {
        for kind in StrategyKind::ALL {
            assert_eq!(StrategyKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(StrategyKind::parse(" MA_Crossover "), Some(StrategyKind::MaCrossover));
        assert_eq!(StrategyKind::parse("momentum"), None);
    }

    #[test]
    fn lead_lag_has_no_bar_strategy() {
        let config = StrategyConfig::LeadLag(LeadLagConfig::default());
        assert!(config.as_bar_strategy().is_none());
        assert_eq!(config.kind(), StrategyKind::LeadLag);
        let config = StrategyConfig::Rsi(RsiConfig::default());
        assert!(config.as_bar_strategy().is_some());
    }
}
