//! The shared, durable alert store.
//!
//! Same shape as the price store: a mutex around the domain collection plus
//! a storage port, persisting after every mutation. Save failures are
//! logged and the in-memory book retained, so alert CRUD never fails the
//! caller once input validation has passed.

use crate::domain::alert::{AlertBook, AlertKind};
use crate::domain::engine::{self, TriggeredEvent};
use crate::domain::watchlist::Watchlist;
use crate::ports::alert_port::AlertPort;
use crate::services::timeseries::TimeSeriesStore;
use chrono::Utc;
use log::{error, warn};
use std::sync::Mutex;

pub struct AlertStore {
    inner: Mutex<AlertBook>,
    storage: Box<dyn AlertPort + Send + Sync>,
}

impl AlertStore {
    /// Load the persisted book, or start empty when the file is missing or
    /// corrupt. Never fatal.
    pub fn open(storage: Box<dyn AlertPort + Send + Sync>) -> Self {
        let book = match storage.load() {
            Ok(book) => book,
            Err(e) => {
                warn!("starting with an empty alert book: {e}");
                AlertBook::default()
            }
        };
        Self {
            inner: Mutex::new(book),
            storage,
        }
    }

    pub fn add_price_alert(&self, symbol: &str, value: f64) {
        let mut book = self.inner.lock().unwrap();
        book.add_price(symbol, value);
        self.persist(&book);
    }

    pub fn add_percent_alert(&self, symbol: &str, percent: f64) {
        let mut book = self.inner.lock().unwrap();
        book.add_percent(symbol, percent);
        self.persist(&book);
    }

    /// Bounds-checked removal; `false` leaves the book untouched.
    pub fn remove_alert(&self, kind: AlertKind, symbol: &str, index: usize) -> bool {
        let mut book = self.inner.lock().unwrap();
        let removed = book.remove(kind, symbol, index);
        if removed {
            self.persist(&book);
        }
        removed
    }

    pub fn snapshot(&self) -> AlertBook {
        self.inner.lock().unwrap().clone()
    }

    /// Run one evaluation pass against the price store and persist the book
    /// when any rule fired. Safe to call from both the scheduler and the
    /// polling handlers: rules are one-shot, so a pass over unchanged data
    /// produces nothing.
    pub fn evaluate(
        &self,
        prices: &TimeSeriesStore,
        watchlist: &Watchlist,
        currency: &str,
    ) -> Vec<TriggeredEvent> {
        let now = Utc::now();
        let mut book = self.inner.lock().unwrap();
        let events =
            prices.with_history(|history| engine::evaluate(history, &mut book, watchlist, currency, now));
        if !events.is_empty() {
            self.persist(&book);
        }
        events
    }

    fn persist(&self, book: &AlertBook) {
        if let Err(e) = self.storage.save(book) {
            error!("failed to persist alerts: {e}");
        }
    }
}
