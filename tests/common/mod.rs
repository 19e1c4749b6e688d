#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use coinwatch::adapters::csv_history_adapter::CsvHistoryAdapter;
use coinwatch::adapters::json_alerts_adapter::JsonAlertsAdapter;
use coinwatch::domain::watchlist::{Asset, Watchlist};
use coinwatch::ports::quote_port::QuotePort;
use coinwatch::services::alerts::AlertStore;
use coinwatch::services::timeseries::TimeSeriesStore;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Scripted quote source: each fetch pops the next canned response; an
/// exhausted script behaves like a failed fetch (empty map).
pub struct MockQuotePort {
    script: Mutex<VecDeque<HashMap<String, f64>>>,
}

impl MockQuotePort {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push(self, pairs: &[(&str, f64)]) -> Self {
        self.script.lock().unwrap().push_back(quotes(pairs));
        self
    }

    pub fn push_failure(self) -> Self {
        self.script.lock().unwrap().push_back(HashMap::new());
        self
    }
}

impl QuotePort for MockQuotePort {
    async fn fetch_quotes(&self, _assets: &[Asset]) -> HashMap<String, f64> {
        self.script.lock().unwrap().pop_front().unwrap_or_default()
    }
}

pub fn quotes(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
    pairs.iter().map(|(s, p)| (s.to_string(), *p)).collect()
}

pub fn watchlist() -> Watchlist {
    Watchlist::from_tickers(["BTC", "ETH"]).unwrap()
}

pub fn minutes_ago(minutes: i64) -> DateTime<Utc> {
    Utc::now() - Duration::minutes(minutes)
}

pub fn open_price_store(dir: &Path) -> Arc<TimeSeriesStore> {
    Arc::new(TimeSeriesStore::open(
        Box::new(CsvHistoryAdapter::new(dir.join("prices.csv"))),
        watchlist().tickers(),
    ))
}

pub fn open_alert_store(dir: &Path) -> Arc<AlertStore> {
    Arc::new(AlertStore::open(Box::new(JsonAlertsAdapter::new(
        dir.join("alerts.json"),
    ))))
}
