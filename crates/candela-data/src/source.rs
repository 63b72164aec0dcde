//! Data source trait definition.

use candela_core::Candle;

/// A place candles come from: a CSV file, a fixture generator, or any
/// future feed. Implementations return the full candle set for one
/// symbol; ordering and validation are the loader's responsibility.
pub trait DataSource {
    fn load(&self) -> anyhow::Result<Vec<Candle>>;
}
