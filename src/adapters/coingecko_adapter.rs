//! CoinGecko simple-price quote adapter.
//!
//! One GET per tick for the whole watchlist. Every failure path (transport,
//! non-success status, malformed body) logs and degrades to an empty map so
//! a flaky upstream can never take the scheduler down.

use crate::domain::watchlist::Asset;
use crate::ports::quote_port::QuotePort;
use log::{debug, warn};
use std::collections::HashMap;
use std::time::Duration;

pub const COINGECKO_API: &str = "https://api.coingecko.com/api/v3";

pub struct CoinGeckoAdapter {
    client: reqwest::Client,
    base_url: String,
    currency: String,
    timeout: Duration,
}

impl CoinGeckoAdapter {
    pub fn new(currency: &str, timeout: Duration) -> Self {
        Self::with_base_url(COINGECKO_API, currency, timeout)
    }

    pub fn with_base_url(base_url: &str, currency: &str, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            currency: currency.to_lowercase(),
            timeout,
        }
    }

    fn quote_url(&self, assets: &[Asset]) -> String {
        let ids = assets
            .iter()
            .map(|a| a.quote_id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.base_url, ids, self.currency
        )
    }
}

impl QuotePort for CoinGeckoAdapter {
    async fn fetch_quotes(&self, assets: &[Asset]) -> HashMap<String, f64> {
        if assets.is_empty() {
            return HashMap::new();
        }

        let url = self.quote_url(assets);
        let result = self.client.get(&url).timeout(self.timeout).send().await;

        match result {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(body) => {
                    let quotes = parse_quotes(assets, &self.currency, &body);
                    debug!("fetched {} of {} quotes", quotes.len(), assets.len());
                    quotes
                }
                Err(e) => {
                    warn!("failed to read quote response: {e}");
                    HashMap::new()
                }
            },
            Ok(resp) => {
                warn!("quote API returned status {}", resp.status());
                HashMap::new()
            }
            Err(e) => {
                warn!("quote fetch failed: {e}");
                HashMap::new()
            }
        }
    }
}

/// Decode a simple-price response, mapping upstream ids back to tickers.
/// Assets missing from the document are left out of the result.
fn parse_quotes(assets: &[Asset], currency: &str, body: &str) -> HashMap<String, f64> {
    let doc: serde_json::Value = match serde_json::from_str(body) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("malformed quote response: {e}");
            return HashMap::new();
        }
    };

    assets
        .iter()
        .filter_map(|asset| {
            doc.get(&asset.quote_id)
                .and_then(|entry| entry.get(currency))
                .and_then(|price| price.as_f64())
                .map(|price| (asset.ticker.clone(), price))
        })
        .collect()
}
