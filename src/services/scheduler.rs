//! The periodic fetch → append → evaluate loop.
//!
//! One long-lived task, strictly sequential iterations. Nothing inside an
//! iteration can end the loop: the quote adapter degrades to an empty map,
//! the stores log their own storage failures, and evaluation is pure.

use crate::domain::engine::TriggeredEvent;
use crate::domain::watchlist::Watchlist;
use crate::ports::quote_port::QuotePort;
use crate::services::alerts::AlertStore;
use crate::services::timeseries::TimeSeriesStore;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

pub struct Scheduler<Q: QuotePort> {
    quotes: Q,
    prices: Arc<TimeSeriesStore>,
    alerts: Arc<AlertStore>,
    watchlist: Arc<Watchlist>,
    currency: String,
    period: Duration,
}

impl<Q: QuotePort> Scheduler<Q> {
    pub fn new(
        quotes: Q,
        prices: Arc<TimeSeriesStore>,
        alerts: Arc<AlertStore>,
        watchlist: Arc<Watchlist>,
        currency: String,
        period: Duration,
    ) -> Self {
        Self {
            quotes,
            prices,
            alerts,
            watchlist,
            currency,
            period,
        }
    }

    /// One tick: fetch, append, evaluate. Returns the events that fired so
    /// callers (and tests) can observe the outcome.
    pub async fn tick(&self) -> Vec<TriggeredEvent> {
        let quotes = self.quotes.fetch_quotes(self.watchlist.assets()).await;
        if quotes.is_empty() {
            warn!("tick produced no quotes; keeping previous data");
        }
        self.prices.append(&quotes, Utc::now());

        let events = self
            .alerts
            .evaluate(&self.prices, &self.watchlist, &self.currency);
        for event in &events {
            info!("ALERT [{}] {}", event.symbol, event.message);
        }
        events
    }

    /// Run forever at the configured period. The first tick fires
    /// immediately, so the table has data before the first page load.
    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.period);
        loop {
            interval.tick().await;
            self.tick().await;
        }
    }
}
