//! Market-data port.

use crate::domain::error::LagtraderError;
use crate::domain::ohlcv::RawBar;
use chrono::NaiveDate;

pub trait DataPort {
    /// Raw rows for `symbol` within `[start_date, end_date)`.
    ///
    /// An empty vector is a normal answer (no trading in range); the caller
    /// turns it into the "no data" outcome.
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<RawBar>, LagtraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, LagtraderError>;
}
