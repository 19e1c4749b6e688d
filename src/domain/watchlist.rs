//! Watched-asset catalog and watchlist resolution.
//!
//! Parses ticker lists from configuration and resolves each ticker against
//! the built-in catalog, which carries the display name and the upstream
//! quote-API identifier for every supported asset.

use crate::domain::error::CoinwatchError;
use std::collections::HashSet;

/// Tickers watched when the config names none.
pub const DEFAULT_TICKERS: &[&str] = &["BTC", "ETH", "USDD", "SOL"];

/// Supported assets: ticker, display name, CoinGecko id.
const CATALOG: &[(&str, &str, &str)] = &[
    ("BTC", "Bitcoin", "bitcoin"),
    ("ETH", "Ethereum", "ethereum"),
    ("USDD", "Digital Dollar", "usdd"),
    ("SOL", "Solana", "solana"),
    ("XRP", "XRP", "ripple"),
    ("ADA", "Cardano", "cardano"),
    ("DOGE", "Dogecoin", "dogecoin"),
    ("DOT", "Polkadot", "polkadot"),
    ("AVAX", "Avalanche", "avalanche-2"),
];

#[derive(Debug, Clone)]
pub struct Asset {
    pub ticker: String,
    pub name: String,
    pub quote_id: String,
}

#[derive(Debug, Clone)]
pub struct Watchlist {
    assets: Vec<Asset>,
}

impl Watchlist {
    /// Resolve a list of tickers against the catalog, preserving order.
    pub fn from_tickers<I, S>(tickers: I) -> Result<Self, CoinwatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut assets = Vec::new();
        for ticker in tickers {
            let ticker = ticker.as_ref().to_uppercase();
            let entry = CATALOG
                .iter()
                .find(|(t, _, _)| *t == ticker)
                .ok_or_else(|| CoinwatchError::UnknownSymbol {
                    symbol: ticker.clone(),
                })?;
            assets.push(Asset {
                ticker: entry.0.to_string(),
                name: entry.1.to_string(),
                quote_id: entry.2.to_string(),
            });
        }
        Ok(Self { assets })
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn tickers(&self) -> Vec<String> {
        self.assets.iter().map(|a| a.ticker.clone()).collect()
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.assets.iter().any(|a| a.ticker == ticker)
    }

    /// Display name for a ticker; falls back to the ticker itself.
    pub fn display_name<'a>(&'a self, ticker: &'a str) -> &'a str {
        self.assets
            .iter()
            .find(|a| a.ticker == ticker)
            .map(|a| a.name.as_str())
            .unwrap_or(ticker)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl Default for Watchlist {
    fn default() -> Self {
        // The catalog covers every default ticker.
        Self::from_tickers(DEFAULT_TICKERS.iter().copied())
            .unwrap_or(Self { assets: Vec::new() })
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TickerListError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateTicker(String),
}

/// Parse a comma-separated ticker list from configuration.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, TickerListError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(TickerListError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if seen.contains(&ticker) {
            return Err(TickerListError::DuplicateTicker(ticker));
        }
        seen.insert(ticker.clone());
        tickers.push(ticker);
    }

    Ok(tickers)
}
