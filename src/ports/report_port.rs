//! Result sink port.

use std::path::Path;

use crate::domain::backtest::RunReport;
use crate::domain::error::LagtraderError;
use crate::domain::scan::ScanReport;

/// Port for persisting run results.
pub trait ReportPort {
    fn write_ledger(&self, run: &RunReport, output_dir: &Path) -> Result<(), LagtraderError>;

    fn write_scan(&self, report: &ScanReport, output_dir: &Path) -> Result<(), LagtraderError>;
}
