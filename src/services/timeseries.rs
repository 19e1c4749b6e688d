//! The shared, durable price store.
//!
//! Wraps the in-memory table in a per-store mutex and pairs it with a
//! storage port. The scheduler writes through `append`; the web handlers
//! read through `latest`/`range` concurrently. Critical sections are short
//! and never do I/O beyond the synchronous full-table save.

use crate::domain::history::{PriceHistory, PricePoint, Window};
use crate::ports::history_port::HistoryPort;
use chrono::{DateTime, Utc};
use log::{error, warn};
use std::collections::HashMap;
use std::sync::Mutex;

pub struct TimeSeriesStore {
    inner: Mutex<PriceHistory>,
    storage: Box<dyn HistoryPort + Send + Sync>,
}

impl TimeSeriesStore {
    /// Load the persisted table, or start empty when the file is missing or
    /// unreadable. Either way the store is usable; the condition is logged.
    pub fn open(storage: Box<dyn HistoryPort + Send + Sync>, symbols: Vec<String>) -> Self {
        let rows = match storage.load() {
            Ok(rows) => rows,
            Err(e) => {
                warn!("starting with an empty price history: {e}");
                Vec::new()
            }
        };
        Self {
            inner: Mutex::new(PriceHistory::from_rows(symbols, rows)),
            storage,
        }
    }

    /// Append one tick and persist the full table. An empty mapping (a
    /// completely failed fetch) is a no-op so evaluation sees unchanged
    /// data. A save failure keeps the in-memory row; the next successful
    /// save recovers it.
    pub fn append(&self, prices: &HashMap<String, f64>, at: DateTime<Utc>) {
        if prices.is_empty() {
            return;
        }
        let mut history = self.inner.lock().unwrap();
        if !history.append(prices, at) {
            warn!("dropped out-of-order price row at {at}");
            return;
        }
        if let Err(e) = self.storage.save(history.symbols(), history.rows()) {
            error!("failed to persist price history: {e}");
        }
    }

    pub fn latest(&self) -> HashMap<String, f64> {
        self.inner.lock().unwrap().latest()
    }

    pub fn range(&self, symbol: &str, window: Window) -> Vec<PricePoint> {
        self.inner.lock().unwrap().range(symbol, window, Utc::now())
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().unwrap().last_updated()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().is_empty()
    }

    /// Run `f` against the table under the store lock. Used by the alert
    /// pass so one evaluation sees one consistent snapshot.
    pub fn with_history<R>(&self, f: impl FnOnce(&PriceHistory) -> R) -> R {
        let history = self.inner.lock().unwrap();
        f(&history)
    }
}
