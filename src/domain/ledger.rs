//! Append-only trade ledger for one strategy run.

use crate::domain::position::Trade;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    trades: Vec<Trade>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed trade.
    ///
    /// Trades of a single-position run never overlap: each entry is at or
    /// after the previous exit.
    pub fn record(&mut self, trade: Trade) {
        debug_assert!(
            self.trades
                .last()
                .is_none_or(|prev| trade.entry_time >= prev.exit_time),
            "overlapping trade entered at {}",
            trade.entry_time
        );
        self.trades.push(trade);
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }
}
