//! Durable price-table storage port trait.

use crate::domain::error::CoinwatchError;
use crate::domain::history::HistoryRow;

pub trait HistoryPort {
    /// Read every persisted row. Missing or unreadable storage is an error;
    /// the caller decides whether that is fatal or a fresh start.
    fn load(&self) -> Result<Vec<HistoryRow>, CoinwatchError>;

    /// Rewrite the full table. Column order follows `symbols`.
    fn save(&self, symbols: &[String], rows: &[HistoryRow]) -> Result<(), CoinwatchError>;
}
