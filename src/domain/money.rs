//! Fiat amount formatting for alert messages and CLI output.

use num_format::{Locale, ToFormattedString};

/// Currency sign for the fiat codes the quote API is usually pointed at.
fn sign(code: &str) -> Option<&'static str> {
    match code.to_lowercase().as_str() {
        "usd" => Some("$"),
        "brl" => Some("R$ "),
        "eur" => Some("€"),
        "gbp" => Some("£"),
        "jpy" => Some("¥"),
        _ => None,
    }
}

/// Format an amount with thousands separators and two decimals, prefixed
/// with the fiat sign when one is known: `format_amount("usd", 1234.5)` is
/// `"$1,234.50"`; an unknown code is appended instead: `"1,234.50 CHF"`.
pub fn format_amount(code: &str, amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as i128;
    let whole = (cents / 100).to_formatted_string(&Locale::en);
    let frac = cents % 100;
    let magnitude = format!("{whole}.{frac:02}");
    let negative = if amount < 0.0 { "-" } else { "" };

    match sign(code) {
        Some(s) => format!("{negative}{s}{magnitude}"),
        None => format!("{negative}{magnitude} {}", code.to_uppercase()),
    }
}
