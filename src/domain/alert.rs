//! Alert rule variants and the per-symbol rule collection.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Two alerts for the same symbol closer than this are considered the same
/// rule; re-adding one re-arms it instead of duplicating it.
pub const DEDUP_TOLERANCE: f64 = 0.01;

/// Fire when the price crosses an absolute target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAlert {
    pub value: f64,
    #[serde(default)]
    pub triggered: bool,
}

/// Fire when the move over the trailing day reaches a signed percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentAlert {
    pub percent: f64,
    #[serde(default)]
    pub triggered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Price,
    Percent,
}

impl AlertKind {
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "price" => Some(AlertKind::Price),
            "percent" => Some(AlertKind::Percent),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AlertKind::Price => "price",
            AlertKind::Percent => "percent",
        }
    }
}

/// All configured rules, keyed by symbol. This is also the serialized shape
/// of the alerts file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertBook {
    #[serde(default)]
    pub price_alerts: BTreeMap<String, Vec<PriceAlert>>,
    #[serde(default)]
    pub percent_alerts: BTreeMap<String, Vec<PercentAlert>>,
}

impl AlertBook {
    /// Add a price-target rule. A rule within [`DEDUP_TOLERANCE`] of an
    /// existing one for the same symbol is re-armed in place.
    pub fn add_price(&mut self, symbol: &str, value: f64) {
        let rules = self.price_alerts.entry(symbol.to_string()).or_default();
        for rule in rules.iter_mut() {
            if (rule.value - value).abs() < DEDUP_TOLERANCE {
                rule.triggered = false;
                return;
            }
        }
        rules.push(PriceAlert {
            value,
            triggered: false,
        });
    }

    /// Add a percent-move rule, with the same dedup semantics.
    pub fn add_percent(&mut self, symbol: &str, percent: f64) {
        let rules = self.percent_alerts.entry(symbol.to_string()).or_default();
        for rule in rules.iter_mut() {
            if (rule.percent - percent).abs() < DEDUP_TOLERANCE {
                rule.triggered = false;
                return;
            }
        }
        rules.push(PercentAlert {
            percent,
            triggered: false,
        });
    }

    /// Remove the rule at `index` within the symbol's list. Returns `false`
    /// when the symbol is unknown or the index is out of range.
    pub fn remove(&mut self, kind: AlertKind, symbol: &str, index: usize) -> bool {
        match kind {
            AlertKind::Price => match self.price_alerts.get_mut(symbol) {
                Some(rules) if index < rules.len() => {
                    rules.remove(index);
                    true
                }
                _ => false,
            },
            AlertKind::Percent => match self.percent_alerts.get_mut(symbol) {
                Some(rules) if index < rules.len() => {
                    rules.remove(index);
                    true
                }
                _ => false,
            },
        }
    }

    pub fn rule_count(&self) -> usize {
        self.price_alerts.values().map(Vec::len).sum::<usize>()
            + self.percent_alerts.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }
}
