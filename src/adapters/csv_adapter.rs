//! CSV file data adapter.
//!
//! One file per symbol, named by a pattern such as `Info_{symbol}.csv`, in
//! the column layout the market-data provider dumps:
//! `symbol,timestamp,open,high,low,close,volume[,trade_count,vwap]`.

use crate::domain::error::LagtraderError;
use crate::domain::ohlcv::{RawBar, parse_timestamp};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub const DEFAULT_FILE_PATTERN: &str = "Info_{symbol}.csv";
const PLACEHOLDER: &str = "{symbol}";

pub struct CsvAdapter {
    base_path: PathBuf,
    file_pattern: String,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self::with_pattern(base_path, DEFAULT_FILE_PATTERN)
    }

    pub fn with_pattern(base_path: PathBuf, file_pattern: &str) -> Self {
        Self {
            base_path,
            file_pattern: file_pattern.to_string(),
        }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path
            .join(self.file_pattern.replace(PLACEHOLDER, symbol))
    }

    /// Literal text around `{symbol}` in the file pattern.
    fn pattern_affixes(&self) -> (&str, &str) {
        match self.file_pattern.split_once(PLACEHOLDER) {
            Some((prefix, suffix)) => (prefix, suffix),
            None => (self.file_pattern.as_str(), ""),
        }
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<RawBar>, LagtraderError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| LagtraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut rows = Vec::new();

        for (line, result) in rdr.deserialize::<RawBar>().enumerate() {
            let row = result.map_err(|e| LagtraderError::Data {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;

            let date = parse_timestamp(&row.timestamp)
                .map_err(|e| LagtraderError::Data {
                    reason: format!("{} row {}: {}", path.display(), line + 1, e),
                })?
                .date();
            if date < start_date || date >= end_date {
                continue;
            }
            rows.push(row);
        }

        debug!(symbol, rows = rows.len(), path = %path.display(), "read bar file");
        Ok(rows)
    }

    fn list_symbols(&self) -> Result<Vec<String>, LagtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| LagtraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let (prefix, suffix) = self.pattern_affixes();
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| LagtraderError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(suffix))
                .filter(|s| !s.is_empty())
            {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
