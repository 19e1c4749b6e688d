//! JSON alert-book adapter.
//!
//! The file is the serde shape of [`AlertBook`]: two top-level maps,
//! `price_alerts` and `percent_alerts`, symbol to ordered rule list. Saves
//! go through temp-then-rename like the price table.

use crate::domain::alert::AlertBook;
use crate::domain::error::CoinwatchError;
use crate::ports::alert_port::AlertPort;
use std::fs;
use std::path::PathBuf;

pub struct JsonAlertsAdapter {
    path: PathBuf,
}

impl JsonAlertsAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl AlertPort for JsonAlertsAdapter {
    fn load(&self) -> Result<AlertBook, CoinwatchError> {
        let content = fs::read_to_string(&self.path).map_err(|e| CoinwatchError::Storage {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        serde_json::from_str(&content).map_err(|e| CoinwatchError::Storage {
            reason: format!("invalid alerts file {}: {}", self.path.display(), e),
        })
    }

    fn save(&self, book: &AlertBook) -> Result<(), CoinwatchError> {
        let json = serde_json::to_string_pretty(book).map_err(|e| CoinwatchError::Storage {
            reason: format!("failed to encode alerts: {e}"),
        })?;

        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(|e| CoinwatchError::Storage {
            reason: format!("failed to write {}: {}", tmp.display(), e),
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| CoinwatchError::Storage {
            reason: format!("failed to replace {}: {}", self.path.display(), e),
        })?;
        Ok(())
    }
}
