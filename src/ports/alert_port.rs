//! Durable alert-book storage port trait.

use crate::domain::alert::AlertBook;
use crate::domain::error::CoinwatchError;

pub trait AlertPort {
    fn load(&self) -> Result<AlertBook, CoinwatchError>;

    fn save(&self, book: &AlertBook) -> Result<(), CoinwatchError>;
}
