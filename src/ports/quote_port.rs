//! Spot-quote source port trait.

use crate::domain::watchlist::Asset;
use std::collections::HashMap;
use std::future::Future;

/// Best-effort quote lookup for a set of assets.
///
/// Returns ticker -> price. A symbol absent from the result means "no update
/// this cycle"; transport and decoding failures are the adapter's to log,
/// never the caller's to handle, so a total failure is just an empty map.
pub trait QuotePort {
    fn fetch_quotes(&self, assets: &[Asset]) -> impl Future<Output = HashMap<String, f64>> + Send;
}
