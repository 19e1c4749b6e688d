//! The in-memory price table: an append-only, time-ordered sparse table
//! with one column per watched symbol.
//!
//! All lookups take an explicit `now` so the logic stays clock-free; the
//! service layer supplies the wall clock.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// One observed price for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub at: DateTime<Utc>,
    pub symbol: String,
    pub price: f64,
}

/// Trailing duration used to filter the series for charting and alert
/// baselines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Hour,
    Day,
    Week,
    Month,
}

impl Window {
    /// Parse a window token; anything unrecognised falls back to one day.
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "1h" => Window::Hour,
            "1d" => Window::Day,
            "1w" => Window::Week,
            "1m" | "1month" => Window::Month,
            _ => Window::Day,
        }
    }

    pub fn duration(self) -> Duration {
        match self {
            Window::Hour => Duration::hours(1),
            Window::Day => Duration::days(1),
            Window::Week => Duration::weeks(1),
            Window::Month => Duration::days(30),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Window::Hour => "1h",
            Window::Day => "1d",
            Window::Week => "1w",
            Window::Month => "1m",
        }
    }
}

/// One table row: a timestamp plus the cells observed at that instant.
/// Symbols missing from a tick simply have no cell.
#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub at: DateTime<Utc>,
    pub cells: HashMap<String, f64>,
}

/// Append-only price table for a fixed set of symbols.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    symbols: Vec<String>,
    rows: Vec<HistoryRow>,
}

impl PriceHistory {
    pub fn new(symbols: Vec<String>) -> Self {
        Self {
            symbols,
            rows: Vec::new(),
        }
    }

    /// Rebuild a table from persisted rows. Rows are re-sorted by timestamp
    /// so a hand-edited file cannot break the ordering invariant.
    pub fn from_rows(symbols: Vec<String>, mut rows: Vec<HistoryRow>) -> Self {
        rows.sort_by_key(|r| r.at);
        Self { symbols, rows }
    }

    /// Append one row. Cells are taken only for watched symbols; everything
    /// else in `prices` is ignored. Returns `false` without modifying the
    /// table when `at` precedes the last row.
    pub fn append(&mut self, prices: &HashMap<String, f64>, at: DateTime<Utc>) -> bool {
        if let Some(last) = self.rows.last() {
            if at < last.at {
                return false;
            }
        }
        let cells: HashMap<String, f64> = self
            .symbols
            .iter()
            .filter_map(|s| prices.get(s).map(|&p| (s.clone(), p)))
            .collect();
        self.rows.push(HistoryRow { at, cells });
        true
    }

    /// Values of the last row. An empty table yields a zero-filled map over
    /// every watched symbol; a sparse last row yields only its present cells.
    pub fn latest(&self) -> HashMap<String, f64> {
        match self.rows.last() {
            Some(row) => row.cells.clone(),
            None => self.symbols.iter().map(|s| (s.clone(), 0.0)).collect(),
        }
    }

    /// Points for `symbol` no older than `now - window`, in time order.
    pub fn range(&self, symbol: &str, window: Window, now: DateTime<Utc>) -> Vec<PricePoint> {
        let cutoff = now - window.duration();
        self.rows
            .iter()
            .filter(|row| row.at >= cutoff)
            .filter_map(|row| {
                row.cells.get(symbol).map(|&price| PricePoint {
                    at: row.at,
                    symbol: symbol.to_string(),
                    price,
                })
            })
            .collect()
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn rows(&self) -> &[HistoryRow] {
        &self.rows
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.rows.last().map(|r| r.at)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn time(minutes_ago: i64) -> DateTime<Utc> {
        base() - Duration::minutes(minutes_ago)
    }

    fn base() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn prices(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    fn watched() -> Vec<String> {
        vec!["BTC".to_string(), "ETH".to_string()]
    }

    #[test]
    fn latest_on_empty_table_is_zero_filled() {
        let history = PriceHistory::new(watched());
        let latest = history.latest();
        assert_eq!(latest.get("BTC"), Some(&0.0));
        assert_eq!(latest.get("ETH"), Some(&0.0));
    }

    #[test]
    fn latest_returns_last_row_cells() {
        let mut history = PriceHistory::new(watched());
        history.append(&prices(&[("BTC", 100.0), ("ETH", 10.0)]), time(2));
        history.append(&prices(&[("BTC", 110.0)]), time(1));
        let latest = history.latest();
        assert_eq!(latest.get("BTC"), Some(&110.0));
        // ETH missing from the last tick: no cell, not zero.
        assert_eq!(latest.get("ETH"), None);
    }

    #[test]
    fn append_ignores_unwatched_symbols() {
        let mut history = PriceHistory::new(watched());
        history.append(&prices(&[("BTC", 100.0), ("XYZ", 5.0)]), time(1));
        assert_eq!(history.rows()[0].cells.len(), 1);
    }

    #[test]
    fn append_rejects_out_of_order_row() {
        let mut history = PriceHistory::new(watched());
        assert!(history.append(&prices(&[("BTC", 100.0)]), time(1)));
        assert!(!history.append(&prices(&[("BTC", 90.0)]), time(10)));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn append_accepts_equal_timestamp() {
        let mut history = PriceHistory::new(watched());
        assert!(history.append(&prices(&[("BTC", 100.0)]), time(1)));
        assert!(history.append(&prices(&[("BTC", 101.0)]), time(1)));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn range_filters_by_window() {
        let mut history = PriceHistory::new(watched());
        history.append(&prices(&[("BTC", 90.0)]), time(90));
        history.append(&prices(&[("BTC", 100.0)]), time(30));
        history.append(&prices(&[("BTC", 110.0)]), time(5));

        let points = history.range("BTC", Window::Hour, base());
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].price, 100.0);
        assert_eq!(points[1].price, 110.0);
    }

    #[test]
    fn range_skips_rows_without_the_symbol() {
        let mut history = PriceHistory::new(watched());
        history.append(&prices(&[("BTC", 100.0), ("ETH", 10.0)]), time(30));
        history.append(&prices(&[("ETH", 11.0)]), time(10));

        let points = history.range("BTC", Window::Hour, base());
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].price, 100.0);
    }

    #[test]
    fn range_on_empty_table_is_empty() {
        let history = PriceHistory::new(watched());
        assert!(history.range("BTC", Window::Day, base()).is_empty());
    }

    #[test]
    fn range_unknown_symbol_is_empty() {
        let mut history = PriceHistory::new(watched());
        history.append(&prices(&[("BTC", 100.0)]), time(1));
        assert!(history.range("ZZZ", Window::Day, base()).is_empty());
    }

    #[test]
    fn from_rows_restores_time_order() {
        let rows = vec![
            HistoryRow {
                at: time(1),
                cells: prices(&[("BTC", 110.0)]),
            },
            HistoryRow {
                at: time(10),
                cells: prices(&[("BTC", 100.0)]),
            },
        ];
        let history = PriceHistory::from_rows(watched(), rows);
        assert_eq!(history.rows()[0].at, time(10));
        assert_eq!(history.latest().get("BTC"), Some(&110.0));
    }

    #[test]
    fn window_parse_tokens() {
        assert_eq!(Window::parse("1h"), Window::Hour);
        assert_eq!(Window::parse("1d"), Window::Day);
        assert_eq!(Window::parse("1w"), Window::Week);
        assert_eq!(Window::parse("1m"), Window::Month);
        assert_eq!(Window::parse("1month"), Window::Month);
        assert_eq!(Window::parse("fortnight"), Window::Day);
    }

    proptest! {
        /// Widening the window never drops points: every point in a smaller
        /// window's result is present in the larger window's result.
        #[test]
        fn wider_window_is_superset(offsets in proptest::collection::vec(0i64..50_000, 1..40)) {
            let mut sorted = offsets.clone();
            sorted.sort_by(|a, b| b.cmp(a));

            let mut history = PriceHistory::new(watched());
            for (i, minutes_ago) in sorted.iter().enumerate() {
                history.append(&prices(&[("BTC", 100.0 + i as f64)]), time(*minutes_ago));
            }

            let windows = [Window::Hour, Window::Day, Window::Week, Window::Month];
            for pair in windows.windows(2) {
                let narrow = history.range("BTC", pair[0], base());
                let wide = history.range("BTC", pair[1], base());
                for point in &narrow {
                    prop_assert!(wide.contains(point));
                }
            }
        }
    }
}
