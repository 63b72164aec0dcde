//! Centralized coordinate scaling for candela.
//!
//! This module is the single source of truth for conversions between the
//! two coordinate spaces the engine deals with:
//!
//! - **Data space**: `(timestamp, price)` as stored in candles and
//!   annotations
//! - **Screen space** ([`ScreenPos`]): pixels from the top-left of the
//!   viewport, x growing right, y growing down
//!
//! [`ChartScales`] bundles the per-axis scales and is rebuilt whenever the
//! candle set or the viewport changes - scales are pure values derived
//! from `(candles, viewport)` and are never cached across data changes.

use candela_core::Candle;
use serde::{Deserialize, Serialize};

/// A position in screen space, in pixels from the viewport's top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPos {
    pub x: f32,
    pub y: f32,
}

impl ScreenPos {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for ScreenPos {
    fn from(pos: (f32, f32)) -> Self {
        Self::new(pos.0, pos.1)
    }
}

/// The pixel extent the chart draws into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Create a viewport, clamping either extent to at least one pixel so
    /// downstream divisions stay finite.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    /// Clamp a position to the nearest point inside the viewport.
    #[must_use]
    pub fn clamp(&self, pos: ScreenPos) -> ScreenPos {
        ScreenPos {
            x: pos.x.clamp(0.0, self.width),
            y: pos.y.clamp(0.0, self.height),
        }
    }

    /// Check whether a position lies inside the viewport.
    #[must_use]
    pub fn contains(&self, pos: ScreenPos) -> bool {
        pos.x >= 0.0 && pos.x <= self.width && pos.y >= 0.0 && pos.y <= self.height
    }
}

/// Linear mapping from timestamps to x pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    domain_min: f64,
    domain_max: f64,
    pixel_width: f32,
}

impl TimeScale {
    /// Build from a candle slice. A single candle, identical timestamps,
    /// or an empty slice all collapse the domain; the effective width is
    /// then one unit, so the forward mapping never divides by zero.
    #[must_use]
    pub fn from_candles(candles: &[Candle], viewport: Viewport) -> Self {
        let (domain_min, domain_max) = candles.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(min, max), c| (min.min(c.timestamp), max.max(c.timestamp)),
        );
        let (domain_min, domain_max) = if domain_min.is_finite() {
            (domain_min, domain_max)
        } else {
            (0.0, 0.0)
        };

        Self {
            domain_min,
            domain_max,
            pixel_width: viewport.width,
        }
    }

    /// Domain bounds `(min, max)` over the candle set.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    fn domain_width(&self) -> f64 {
        let width = self.domain_max - self.domain_min;
        if width == 0.0 {
            1.0
        } else {
            width
        }
    }

    /// Map a timestamp to an x pixel.
    #[must_use]
    pub fn forward(&self, timestamp: f64) -> f32 {
        ((timestamp - self.domain_min) / self.domain_width() * self.pixel_width as f64) as f32
    }

    /// `n + 1` evenly spaced domain values for axis labeling.
    #[must_use]
    pub fn ticks(&self, n: usize) -> Vec<f64> {
        let n = n.max(1);
        (0..=n)
            .map(|i| self.domain_min + (self.domain_max - self.domain_min) * i as f64 / n as f64)
            .collect()
    }
}

/// Inverted linear mapping from prices to y pixels.
///
/// Chart convention: higher price, smaller y. The domain covers the
/// candle set's low/high extent expanded by a symmetric 10% padding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceScale {
    domain_min: f32,
    domain_max: f32,
    pixel_height: f32,
}

/// Fraction of the raw price range added as padding on each end.
const PRICE_PADDING_RATIO: f32 = 0.1;

impl PriceScale {
    /// Build from a candle slice. A flat price range (or an empty slice)
    /// is treated as a range of one unit before padding so the domain
    /// never collapses.
    #[must_use]
    pub fn from_candles(candles: &[Candle], viewport: Viewport) -> Self {
        let (min, max) = candles
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), c| {
                (min.min(c.low.min(c.high)), max.max(c.high.max(c.low)))
            });
        let (min, max) = if min.is_finite() { (min, max) } else { (0.0, 0.0) };

        let range = if max - min == 0.0 { 1.0 } else { max - min };
        let padding = range * PRICE_PADDING_RATIO;

        Self {
            domain_min: min - padding,
            domain_max: max + padding,
            pixel_height: viewport.height,
        }
    }

    /// Padded domain bounds `(min, max)`.
    #[must_use]
    pub fn domain(&self) -> (f32, f32) {
        (self.domain_min, self.domain_max)
    }

    fn range(&self) -> f32 {
        self.domain_max - self.domain_min
    }

    /// Map a price to a y pixel (inverted axis).
    #[must_use]
    pub fn forward(&self, price: f32) -> f32 {
        self.pixel_height - (price - self.domain_min) / self.range() * self.pixel_height
    }

    /// Map a y pixel back to a price: the exact algebraic inverse of
    /// [`forward`](Self::forward).
    #[must_use]
    pub fn inverse(&self, y: f32) -> f32 {
        self.domain_min + (self.pixel_height - y) / self.pixel_height * self.range()
    }

    /// `n + 1` evenly spaced domain prices for axis labeling.
    #[must_use]
    pub fn ticks(&self, n: usize) -> Vec<f32> {
        let n = n.max(1);
        (0..=n)
            .map(|i| self.domain_min + self.range() * i as f32 / n as f32)
            .collect()
    }
}

/// The per-axis scales plus the viewport they were derived for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartScales {
    pub time: TimeScale,
    pub price: PriceScale,
    pub viewport: Viewport,
}

impl ChartScales {
    /// Derive both scales from the candle set and viewport. Pure; call
    /// again whenever either input changes.
    #[must_use]
    pub fn from_candles(candles: &[Candle], viewport: Viewport) -> Self {
        Self {
            time: TimeScale::from_candles(candles, viewport),
            price: PriceScale::from_candles(candles, viewport),
            viewport,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(timestamp: f64, low: f32, high: f32) -> Candle {
        Candle::new("TEST", timestamp, low, high, low, high, 0.0)
    }

    fn scales(candles: &[Candle]) -> ChartScales {
        ChartScales::from_candles(candles, Viewport::new(800.0, 400.0))
    }

    #[test]
    fn test_time_scale_spans_viewport() {
        let s = scales(&[candle(1000.0, 10.0, 20.0), candle(2000.0, 10.0, 20.0)]);
        assert_eq!(s.time.forward(1000.0), 0.0);
        assert_eq!(s.time.forward(2000.0), 800.0);
        assert!((s.time.forward(1500.0) - 400.0).abs() < 1e-3);
    }

    #[test]
    fn test_time_scale_single_candle_is_finite() {
        let s = scales(&[candle(1000.0, 10.0, 20.0)]);
        let x = s.time.forward(1000.0);
        assert!(x.is_finite());
        assert_eq!(x, 0.0);
    }

    #[test]
    fn test_time_scale_identical_timestamps_no_division_by_zero() {
        let s = scales(&[candle(1000.0, 10.0, 20.0), candle(1000.0, 12.0, 18.0)]);
        assert!(s.time.forward(1000.0).is_finite());
    }

    #[test]
    fn test_time_scale_empty_is_finite() {
        let s = scales(&[]);
        assert!(s.time.forward(0.0).is_finite());
        assert!(s.price.forward(0.0).is_finite());
    }

    #[test]
    fn test_price_padding_is_ten_percent() {
        let s = scales(&[candle(1000.0, 100.0, 200.0)]);
        let (min, max) = s.price.domain();
        assert!((min - 90.0).abs() < 1e-3);
        assert!((max - 210.0).abs() < 1e-3);
    }

    #[test]
    fn test_price_flat_range_treated_as_unit() {
        // All prices identical: range treated as 1 before padding
        let s = scales(&[candle(1000.0, 100.0, 100.0)]);
        let (min, max) = s.price.domain();
        assert!((min - 99.9).abs() < 1e-3);
        assert!((max - 100.1).abs() < 1e-3);
    }

    #[test]
    fn test_price_axis_is_inverted() {
        let s = scales(&[candle(1000.0, 100.0, 200.0)]);
        assert!(s.price.forward(200.0) < s.price.forward(100.0));
    }

    #[test]
    fn test_price_roundtrip() {
        let s = scales(&[candle(1000.0, 95.0, 110.0), candle(2000.0, 90.0, 120.0)]);
        let (min, max) = s.price.domain();
        for i in 0..=20 {
            let p = min + (max - min) * i as f32 / 20.0;
            let back = s.price.inverse(s.price.forward(p));
            assert!(
                (back - p).abs() < 1e-3,
                "round-trip drifted: {p} -> {back}"
            );
        }
    }

    #[test]
    fn test_pixel_roundtrip() {
        let s = scales(&[candle(1000.0, 95.0, 110.0)]);
        for y in [0.0_f32, 50.0, 137.5, 400.0] {
            let back = s.price.forward(s.price.inverse(y));
            assert!((back - y).abs() < 1e-3);
        }
    }

    #[test]
    fn test_viewport_clamp() {
        let vp = Viewport::new(800.0, 400.0);
        let clamped = vp.clamp(ScreenPos::new(-10.0, 1000.0));
        assert_eq!(clamped, ScreenPos::new(0.0, 400.0));
        assert!(vp.contains(clamped));
    }

    #[test]
    fn test_zero_size_viewport_protection() {
        let vp = Viewport::new(0.0, -5.0);
        assert!(vp.width >= 1.0);
        assert!(vp.height >= 1.0);
        let s = ChartScales::from_candles(&[candle(1000.0, 1.0, 2.0)], vp);
        assert!(s.price.forward(1.5).is_finite());
    }

    #[test]
    fn test_ticks_cover_domain() {
        let s = scales(&[candle(1000.0, 100.0, 200.0), candle(2000.0, 100.0, 200.0)]);
        let ticks = s.time.ticks(5);
        assert_eq!(ticks.len(), 6);
        assert_eq!(ticks[0], 1000.0);
        assert_eq!(ticks[5], 2000.0);

        let price_ticks = s.price.ticks(5);
        assert_eq!(price_ticks.len(), 6);
        let (min, max) = s.price.domain();
        assert!((price_ticks[0] - min).abs() < 1e-3);
        assert!((price_ticks[5] - max).abs() < 1e-3);
    }
}
