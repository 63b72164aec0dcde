//! OHLC boundary validation.
//!
//! Two layers: [`check_candle`] is the strict store-boundary check that
//! rejects a write with a typed error, [`is_plausible_candle`] is the
//! lenient sanity filter used during bulk ingestion.

use candela_core::{Candle, Error};

/// Reject a candle whose OHLC relationship is inconsistent.
///
/// `high` must be >= open, close, and low; `low` must be <= open, close,
/// and high; volume must be non-negative; every field finite. A violation
/// is a rejected write, never a silent clamp.
pub fn check_candle(candle: &Candle) -> Result<(), Error> {
    if candle.symbol.is_empty() {
        return Err(Error::validation("symbol must not be empty"));
    }

    let fields = [
        candle.open,
        candle.high,
        candle.low,
        candle.close,
        candle.volume,
    ];
    if fields.iter().any(|v| !v.is_finite()) || !candle.timestamp.is_finite() {
        return Err(Error::validation(format!(
            "candle for {} at {} contains non-finite values",
            candle.symbol, candle.timestamp
        )));
    }

    if candle.high < candle.open || candle.high < candle.close || candle.high < candle.low {
        return Err(Error::validation(
            "high must be greater than or equal to open, close, and low",
        ));
    }
    if candle.low > candle.open || candle.low > candle.close || candle.low > candle.high {
        return Err(Error::validation(
            "low must be less than or equal to open, close, and high",
        ));
    }
    if candle.volume < 0.0 {
        return Err(Error::validation("volume must be non-negative"));
    }

    Ok(())
}

/// Lenient sanity check used when scanning bulk data: positive prices,
/// consistent OHLC, non-negative volume.
#[must_use]
pub fn is_plausible_candle(candle: &Candle) -> bool {
    check_candle(candle).is_ok() && candle.open > 0.0 && candle.close > 0.0 && candle.low > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(open: f32, high: f32, low: f32, close: f32, volume: f32) -> Candle {
        Candle::new("BTCUSDT", 1_000.0, open, high, low, close, volume)
    }

    #[test]
    fn test_valid_candle() {
        assert!(check_candle(&candle(100.0, 105.0, 95.0, 102.0, 1000.0)).is_ok());
    }

    #[test]
    fn test_high_below_close_rejected() {
        let err = check_candle(&candle(100.0, 101.0, 95.0, 102.0, 1000.0)).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_high_below_low_rejected() {
        assert!(check_candle(&candle(100.0, 90.0, 95.0, 89.0, 1000.0)).is_err());
    }

    #[test]
    fn test_low_above_open_rejected() {
        assert!(check_candle(&candle(100.0, 110.0, 101.0, 105.0, 1000.0)).is_err());
    }

    #[test]
    fn test_negative_volume_rejected() {
        assert!(check_candle(&candle(100.0, 105.0, 95.0, 102.0, -1.0)).is_err());
    }

    #[test]
    fn test_nan_rejected() {
        assert!(check_candle(&candle(f32::NAN, 105.0, 95.0, 102.0, 1000.0)).is_err());
    }

    #[test]
    fn test_empty_symbol_rejected() {
        let c = Candle::new("", 1_000.0, 100.0, 105.0, 95.0, 102.0, 1000.0);
        assert!(check_candle(&c).is_err());
    }

    #[test]
    fn test_plausibility_needs_positive_prices() {
        // Consistent OHLC but zero prices: fine for the strict check,
        // rejected by the plausibility filter.
        let c = candle(0.0, 0.0, 0.0, 0.0, 0.0);
        assert!(check_candle(&c).is_ok());
        assert!(!is_plausible_candle(&c));
    }
}
