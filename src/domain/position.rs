//! Position state machine and completed trades.
//!
//! Every strategy is single-position: `Flat -> InPosition -> Flat`. Entering
//! and exiting are the only transitions, and exiting is the only way a
//! [`Trade`] comes into existence.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// A price-derived exit condition fired on the previous bar.
    Signal,
    /// The configured holding time elapsed.
    HoldElapsed,
    /// Series exhausted while in position; closed at the last bar.
    EndOfData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    pub return_pct: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn new(
        entry_time: NaiveDateTime,
        entry_price: f64,
        exit_time: NaiveDateTime,
        exit_price: f64,
        exit_reason: ExitReason,
    ) -> Self {
        Self {
            entry_time,
            entry_price,
            exit_time,
            exit_price,
            return_pct: return_pct(entry_price, exit_price),
            exit_reason,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.exit_time - self.entry_time).num_minutes()
    }
}

/// (exit - entry) / entry * 100
pub fn return_pct(entry_price: f64, exit_price: f64) -> f64 {
    (exit_price - entry_price) / entry_price * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    InPosition {
        entry_index: usize,
        entry_time: NaiveDateTime,
        entry_price: f64,
    },
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    /// Flat -> InPosition at `bar`'s close. Ignored when already in position.
    pub fn enter(&mut self, index: usize, bar: &OhlcvBar) -> bool {
        if !self.is_flat() {
            return false;
        }
        *self = PositionState::InPosition {
            entry_index: index,
            entry_time: bar.timestamp,
            entry_price: bar.close,
        };
        true
    }

    /// InPosition -> Flat at `bar`'s close, yielding the completed trade.
    pub fn exit(&mut self, bar: &OhlcvBar, reason: ExitReason) -> Option<Trade> {
        match std::mem::take(self) {
            PositionState::Flat => None,
            PositionState::InPosition {
                entry_time,
                entry_price,
                ..
            } => Some(Trade::new(
                entry_time,
                entry_price,
                bar.timestamp,
                bar.close,
                reason,
            )),
        }
    }

    /// Whole minutes held as of `now`; zero when flat.
    pub fn held_minutes(&self, now: NaiveDateTime) -> i64 {
        match self {
            PositionState::Flat => 0,
            PositionState::InPosition { entry_time, .. } => (now - *entry_time).num_minutes(),
        }
    }
}
