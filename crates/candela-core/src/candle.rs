//! Candle data structures for OHLCV data.

use serde::{Deserialize, Serialize};

/// One OHLCV candle for a symbol.
///
/// Timestamps are unix seconds. Candles are immutable once created and
/// ordered ascending by timestamp within a symbol; timestamps need not be
/// evenly spaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub symbol: String,
    pub timestamp: f64,
    pub open: f32,
    pub high: f32,
    pub low: f32,
    pub close: f32,
    pub volume: f32,
}

impl Candle {
    pub fn new(
        symbol: impl Into<String>,
        timestamp: f64,
        open: f32,
        high: f32,
        low: f32,
        close: f32,
        volume: f32,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// A candle is bullish only when it closed strictly above its open.
    ///
    /// The `close == open` tie is classified bearish so the two
    /// classifications partition every candle deterministically.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Bearish/neutral: the complement of [`is_bullish`](Self::is_bullish).
    #[must_use]
    pub fn is_bearish(&self) -> bool {
        !self.is_bullish()
    }
}
