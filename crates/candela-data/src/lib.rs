//! Candle data loading for candela.
//!
//! Provides the [`DataSource`] trait, a CSV implementation, and the
//! OHLC boundary validation applied before candles enter a store.

pub mod csv;
pub mod source;
pub mod validation;

pub use crate::csv::{load_candles_from_csv, CsvLoader};
pub use source::DataSource;
pub use validation::{check_candle, is_plausible_candle};
