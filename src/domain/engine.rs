//! Alert evaluation: threshold-crossing detection against the price table.
//!
//! One pass per tick. The pass is a pure function of the two collections it
//! is handed; the only side effect is flipping `triggered` on rules that
//! fire, which is what makes every rule one-shot until it is removed and
//! re-added.

use crate::domain::alert::{AlertBook, AlertKind};
use crate::domain::history::{PriceHistory, Window};
use crate::domain::money::format_amount;
use crate::domain::watchlist::Watchlist;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A rule that fired during one evaluation pass. Ephemeral: the durable
/// record is the rule's own `triggered` flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggeredEvent {
    pub symbol: String,
    pub kind: AlertKind,
    pub message: String,
}

/// Evaluate every armed rule against the current table state.
///
/// Price rules need a previous and a current price: current comes from the
/// last row, previous from the second-to-last point inside the trailing
/// hour. Percent rules measure against the first point of the trailing day.
/// A rule whose inputs are unavailable this tick (symbol missing from the
/// last row, fewer than two points in its window, zero baseline) is skipped,
/// not errored.
pub fn evaluate(
    history: &PriceHistory,
    book: &mut AlertBook,
    watchlist: &Watchlist,
    currency: &str,
    now: DateTime<Utc>,
) -> Vec<TriggeredEvent> {
    let mut events = Vec::new();
    let latest = history.latest();

    for (symbol, rules) in book.price_alerts.iter_mut() {
        let Some(&current) = latest.get(symbol) else {
            continue;
        };
        let points = history.range(symbol, Window::Hour, now);
        if points.len() < 2 {
            continue;
        }
        let previous = points[points.len() - 2].price;
        let name = watchlist.display_name(symbol);

        for rule in rules.iter_mut().filter(|r| !r.triggered) {
            let target = rule.value;
            if previous < target && target <= current {
                rule.triggered = true;
                events.push(TriggeredEvent {
                    symbol: symbol.clone(),
                    kind: AlertKind::Price,
                    message: format!(
                        "{name} reached {} (current price: {})",
                        format_amount(currency, target),
                        format_amount(currency, current),
                    ),
                });
            } else if previous > target && target >= current {
                rule.triggered = true;
                events.push(TriggeredEvent {
                    symbol: symbol.clone(),
                    kind: AlertKind::Price,
                    message: format!(
                        "{name} fell to {} (current price: {})",
                        format_amount(currency, target),
                        format_amount(currency, current),
                    ),
                });
            }
        }
    }

    for (symbol, rules) in book.percent_alerts.iter_mut() {
        let Some(&current) = latest.get(symbol) else {
            continue;
        };
        let points = history.range(symbol, Window::Day, now);
        if points.len() < 2 {
            continue;
        }
        let baseline = points[0].price;
        if baseline == 0.0 {
            continue;
        }
        let move_pct = (current - baseline) / baseline * 100.0;
        let name = watchlist.display_name(symbol);

        for rule in rules.iter_mut().filter(|r| !r.triggered) {
            let target = rule.percent;
            let fired = (target > 0.0 && move_pct >= target)
                || (target < 0.0 && move_pct <= target);
            if fired {
                rule.triggered = true;
                let direction = if target > 0.0 { "rose" } else { "fell" };
                events.push(TriggeredEvent {
                    symbol: symbol.clone(),
                    kind: AlertKind::Percent,
                    message: format!(
                        "{name} {direction} {:.2}% today (current move: {move_pct:+.2}%)",
                        target.abs(),
                    ),
                });
            }
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::HashMap;

    fn base() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn prices(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    fn watchlist() -> Watchlist {
        Watchlist::from_tickers(["BTC", "ETH"]).unwrap()
    }

    /// Table with BTC at `previous` then `current`, minutes apart.
    fn two_point_history(previous: f64, current: f64) -> PriceHistory {
        let mut history = PriceHistory::new(vec!["BTC".to_string(), "ETH".to_string()]);
        history.append(&prices(&[("BTC", previous)]), base() - Duration::minutes(2));
        history.append(&prices(&[("BTC", current)]), base() - Duration::minutes(1));
        history
    }

    #[test]
    fn price_alert_fires_on_upward_crossing() {
        let history = two_point_history(100.0, 110.0);
        let mut book = AlertBook::default();
        book.add_price("BTC", 105.0);

        let events = evaluate(&history, &mut book, &watchlist(), "usd", base());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, AlertKind::Price);
        assert_eq!(events[0].symbol, "BTC");
        assert!(events[0].message.contains("Bitcoin reached $105.00"));
        assert!(events[0].message.contains("current price: $110.00"));
        assert!(book.price_alerts["BTC"][0].triggered);
    }

    #[test]
    fn price_alert_fires_on_downward_crossing() {
        let history = two_point_history(110.0, 100.0);
        let mut book = AlertBook::default();
        book.add_price("BTC", 105.0);

        let events = evaluate(&history, &mut book, &watchlist(), "usd", base());
        assert_eq!(events.len(), 1);
        assert!(events[0].message.contains("Bitcoin fell to $105.00"));
    }

    #[test]
    fn price_alert_does_not_refire_on_unchanged_data() {
        let history = two_point_history(100.0, 110.0);
        let mut book = AlertBook::default();
        book.add_price("BTC", 105.0);

        let first = evaluate(&history, &mut book, &watchlist(), "usd", base());
        assert_eq!(first.len(), 1);
        let second = evaluate(&history, &mut book, &watchlist(), "usd", base());
        assert!(second.is_empty());
    }

    #[test]
    fn price_alert_target_equal_to_current_counts_as_reached() {
        let history = two_point_history(100.0, 105.0);
        let mut book = AlertBook::default();
        book.add_price("BTC", 105.0);

        let events = evaluate(&history, &mut book, &watchlist(), "usd", base());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn price_alert_needs_two_points_in_the_hour() {
        let mut history = PriceHistory::new(vec!["BTC".to_string()]);
        // One stale point outside the hour window plus the current row.
        history.append(&prices(&[("BTC", 100.0)]), base() - Duration::hours(3));
        history.append(&prices(&[("BTC", 110.0)]), base() - Duration::minutes(1));

        let mut book = AlertBook::default();
        book.add_price("BTC", 105.0);

        let events = evaluate(&history, &mut book, &watchlist(), "usd", base());
        assert!(events.is_empty());
        assert!(!book.price_alerts["BTC"][0].triggered);
    }

    #[test]
    fn price_alert_skipped_when_symbol_absent_from_last_row() {
        let mut history = PriceHistory::new(vec!["BTC".to_string(), "ETH".to_string()]);
        history.append(&prices(&[("BTC", 100.0)]), base() - Duration::minutes(2));
        history.append(&prices(&[("ETH", 10.0)]), base() - Duration::minutes(1));

        let mut book = AlertBook::default();
        book.add_price("BTC", 50.0);

        let events = evaluate(&history, &mut book, &watchlist(), "usd", base());
        assert!(events.is_empty());
    }

    #[test]
    fn price_alert_no_crossing_no_event() {
        let history = two_point_history(100.0, 102.0);
        let mut book = AlertBook::default();
        book.add_price("BTC", 105.0);

        let events = evaluate(&history, &mut book, &watchlist(), "usd", base());
        assert!(events.is_empty());
        assert!(!book.price_alerts["BTC"][0].triggered);
    }

    fn day_history(baseline: f64, latest: f64) -> PriceHistory {
        let mut history = PriceHistory::new(vec!["BTC".to_string()]);
        history.append(&prices(&[("BTC", baseline)]), base() - Duration::hours(20));
        history.append(&prices(&[("BTC", latest)]), base() - Duration::minutes(1));
        history
    }

    #[test]
    fn percent_alert_fires_at_exact_threshold() {
        let history = day_history(1000.0, 1050.0);
        let mut book = AlertBook::default();
        book.add_percent("BTC", 5.0);

        let events = evaluate(&history, &mut book, &watchlist(), "usd", base());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, AlertKind::Percent);
        assert!(events[0].message.contains("Bitcoin rose 5.00% today"));
        assert!(events[0].message.contains("+5.00%"));
    }

    #[test]
    fn percent_alert_below_threshold_does_not_fire() {
        let history = day_history(1000.0, 1050.0);
        let mut book = AlertBook::default();
        book.add_percent("BTC", 6.0);

        let events = evaluate(&history, &mut book, &watchlist(), "usd", base());
        assert!(events.is_empty());
    }

    #[test]
    fn negative_percent_alert_fires_on_drop() {
        let history = day_history(1000.0, 940.0);
        let mut book = AlertBook::default();
        book.add_percent("BTC", -5.0);

        let events = evaluate(&history, &mut book, &watchlist(), "usd", base());
        assert_eq!(events.len(), 1);
        assert!(events[0].message.contains("Bitcoin fell 5.00% today"));
        assert!(events[0].message.contains("-6.00%"));
    }

    #[test]
    fn negative_percent_alert_ignores_rise() {
        let history = day_history(1000.0, 1100.0);
        let mut book = AlertBook::default();
        book.add_percent("BTC", -5.0);

        let events = evaluate(&history, &mut book, &watchlist(), "usd", base());
        assert!(events.is_empty());
    }

    #[test]
    fn percent_alert_skipped_on_zero_baseline() {
        let history = day_history(0.0, 50.0);
        let mut book = AlertBook::default();
        book.add_percent("BTC", 5.0);

        let events = evaluate(&history, &mut book, &watchlist(), "usd", base());
        assert!(events.is_empty());
        assert!(!book.percent_alerts["BTC"][0].triggered);
    }

    #[test]
    fn percent_alert_needs_two_points_in_the_day() {
        let mut history = PriceHistory::new(vec!["BTC".to_string()]);
        history.append(&prices(&[("BTC", 1000.0)]), base() - Duration::minutes(1));

        let mut book = AlertBook::default();
        book.add_percent("BTC", 1.0);

        let events = evaluate(&history, &mut book, &watchlist(), "usd", base());
        assert!(events.is_empty());
    }

    #[test]
    fn one_pass_can_fire_multiple_rules() {
        let history = two_point_history(100.0, 120.0);
        let mut book = AlertBook::default();
        book.add_price("BTC", 105.0);
        book.add_price("BTC", 115.0);

        let events = evaluate(&history, &mut book, &watchlist(), "usd", base());
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn empty_table_fires_nothing() {
        let history = PriceHistory::new(vec!["BTC".to_string()]);
        let mut book = AlertBook::default();
        book.add_price("BTC", 105.0);
        book.add_percent("BTC", 5.0);

        let events = evaluate(&history, &mut book, &watchlist(), "usd", base());
        assert!(events.is_empty());
    }
}
