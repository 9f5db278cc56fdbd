//! Canonical bar series for one instrument.
//!
//! A `Series` is the only shape the engine consumes: bars strictly increasing
//! by timestamp, no duplicates, never empty. Gaps are kept as gaps.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::domain::error::LagtraderError;
use crate::domain::ohlcv::{OhlcvBar, RawBar};

#[derive(Debug, Clone)]
pub struct Series {
    symbol: String,
    bars: Vec<OhlcvBar>,
}

impl Series {
    /// Normalise provider rows: drop the identifier column, parse timestamps,
    /// sort ascending, and keep the first row for any repeated timestamp.
    pub fn from_rows(symbol: &str, rows: &[RawBar]) -> Result<Self, LagtraderError> {
        if rows.is_empty() {
            return Err(LagtraderError::EmptyInput {
                symbol: symbol.to_string(),
            });
        }
        let bars = rows
            .iter()
            .map(RawBar::to_bar)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(symbol, bars)
    }

    pub fn new(symbol: &str, mut bars: Vec<OhlcvBar>) -> Result<Self, LagtraderError> {
        if bars.is_empty() {
            return Err(LagtraderError::EmptyInput {
                symbol: symbol.to_string(),
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        let before = bars.len();
        bars.dedup_by_key(|b| b.timestamp);
        if bars.len() != before {
            debug!(
                symbol,
                dropped = before - bars.len(),
                "dropped duplicate timestamps"
            );
        }

        Ok(Self {
            symbol: symbol.to_string(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false; construction rejects empty input.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bar(&self, index: usize) -> &OhlcvBar {
        &self.bars[index]
    }

    pub fn first(&self) -> &OhlcvBar {
        &self.bars[0]
    }

    pub fn last(&self) -> &OhlcvBar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Exact timestamp lookup.
    pub fn index_of(&self, timestamp: NaiveDateTime) -> Option<usize> {
        self.bars
            .binary_search_by_key(&timestamp, |b| b.timestamp)
            .ok()
    }

    /// Index of the first bar at or after `timestamp`.
    pub fn first_at_or_after(&self, timestamp: NaiveDateTime) -> Option<usize> {
        let idx = self.bars.partition_point(|b| b.timestamp < timestamp);
        (idx < self.bars.len()).then_some(idx)
    }

    pub fn cursor(&self) -> Cursor<'_> {
        Cursor {
            series: self,
            position: 0,
        }
    }
}

/// Forward-only at-or-after lookup for monotonically increasing targets.
///
/// Each call resumes where the previous one stopped, so a full pass over
/// the series costs O(n) in total.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    series: &'a Series,
    position: usize,
}

impl Cursor<'_> {
    pub fn seek(&mut self, timestamp: NaiveDateTime) -> Option<usize> {
        let bars = self.series.bars();
        while self.position < bars.len() && bars[self.position].timestamp < timestamp {
            self.position += 1;
        }
        (self.position < bars.len()).then_some(self.position)
    }

    /// First bar strictly after `timestamp`.
    pub fn seek_after(&mut self, timestamp: NaiveDateTime) -> Option<usize> {
        let bars = self.series.bars();
        while self.position < bars.len() && bars[self.position].timestamp <= timestamp {
            self.position += 1;
        }
        (self.position < bars.len()).then_some(self.position)
    }
}
