//! CSV price-table adapter.
//!
//! File layout: header `timestamp,<SYM>,...`, one row per tick, RFC 3339
//! timestamps, empty cells for symbols missing from a tick. Saves rewrite
//! the whole file through a temp-then-rename so an interrupted write never
//! leaves a half-written table behind.

use crate::domain::error::CoinwatchError;
use crate::domain::history::HistoryRow;
use crate::ports::history_port::HistoryPort;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

pub struct CsvHistoryAdapter {
    path: PathBuf,
}

impl CsvHistoryAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl HistoryPort for CsvHistoryAdapter {
    fn load(&self) -> Result<Vec<HistoryRow>, CoinwatchError> {
        let content = fs::read_to_string(&self.path).map_err(|e| CoinwatchError::Storage {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr
            .headers()
            .map_err(|e| CoinwatchError::Storage {
                reason: format!("CSV header error: {e}"),
            })?
            .clone();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| CoinwatchError::Storage {
                reason: format!("CSV parse error: {e}"),
            })?;

            let ts = record.get(0).ok_or_else(|| CoinwatchError::Storage {
                reason: "missing timestamp column".into(),
            })?;
            let at = DateTime::parse_from_rfc3339(ts)
                .map_err(|e| CoinwatchError::Storage {
                    reason: format!("invalid timestamp {ts:?}: {e}"),
                })?
                .with_timezone(&Utc);

            let mut cells = HashMap::new();
            for (i, symbol) in headers.iter().enumerate().skip(1) {
                let Some(cell) = record.get(i) else { continue };
                if cell.is_empty() {
                    continue;
                }
                let price: f64 = cell.parse().map_err(|e| CoinwatchError::Storage {
                    reason: format!("invalid price for {symbol} at {ts}: {e}"),
                })?;
                cells.insert(symbol.to_string(), price);
            }

            rows.push(HistoryRow { at, cells });
        }

        Ok(rows)
    }

    fn save(&self, symbols: &[String], rows: &[HistoryRow]) -> Result<(), CoinwatchError> {
        let mut wtr = csv::Writer::from_writer(Vec::new());

        let mut header = vec!["timestamp".to_string()];
        header.extend(symbols.iter().cloned());
        wtr.write_record(&header).map_err(|e| CoinwatchError::Storage {
            reason: format!("CSV write error: {e}"),
        })?;

        for row in rows {
            let mut record = vec![row.at.to_rfc3339()];
            for symbol in symbols {
                record.push(
                    row.cells
                        .get(symbol)
                        .map(|p| p.to_string())
                        .unwrap_or_default(),
                );
            }
            wtr.write_record(&record).map_err(|e| CoinwatchError::Storage {
                reason: format!("CSV write error: {e}"),
            })?;
        }

        let bytes = wtr.into_inner().map_err(|e| CoinwatchError::Storage {
            reason: format!("CSV flush error: {e}"),
        })?;

        let tmp = self.tmp_path();
        fs::write(&tmp, bytes).map_err(|e| CoinwatchError::Storage {
            reason: format!("failed to write {}: {}", tmp.display(), e),
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| CoinwatchError::Storage {
            reason: format!("failed to replace {}: {}", self.path.display(), e),
        })?;
        Ok(())
    }
}
