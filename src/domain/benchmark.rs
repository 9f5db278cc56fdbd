//! Holding-period benchmark: buy at the first close, sell at the last.

use crate::domain::error::LagtraderError;
use crate::domain::ohlcv::RawBar;
use crate::domain::position::return_pct;
use crate::domain::series::Series;

/// Buy-and-hold return over the whole series, in percent.
pub fn holding_return(series: &Series) -> f64 {
    return_pct(series.first().close, series.last().close)
}

/// Benchmark straight from provider rows. Zero rows is the "no data" outcome.
pub fn holding_return_from_rows(symbol: &str, rows: &[RawBar]) -> Result<f64, LagtraderError> {
    let series = Series::from_rows(symbol, rows)?;
    Ok(holding_return(&series))
}
