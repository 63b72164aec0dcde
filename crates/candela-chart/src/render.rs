//! Candle rendering: projects candles through the scales into draw
//! primitives.

use candela_core::Candle;

use crate::primitives::{LinePrimitive, Primitive, RectPrimitive, Stroke};
use crate::scale::ChartScales;

/// Body/wick color for candles that closed above their open.
pub const BULLISH_COLOR: &str = "#22c55e";
/// Body/wick color for bearish (and doji) candles.
pub const BEARISH_COLOR: &str = "#ef4444";
/// Fill color for volume bars.
pub const VOLUME_COLOR: &str = "#94a3b8";
/// Axis label color.
pub const AXIS_COLOR: &str = "#6b7280";

/// Smallest candle body width in pixels, so sparse data stays visible.
pub const MIN_CANDLE_WIDTH: f32 = 2.0;
/// Fraction of a candle's horizontal slot occupied by its body.
pub const CANDLE_WIDTH_RATIO: f32 = 0.7;

// Volume bars scale by a fixed constant (1M volume units -> 20px) that is
// unrelated to the price and time scales. This is NOT a principled volume
// axis: bars taller than the viewport are possible for extreme volumes,
// and the constant must not change without revisiting every chart that
// depends on the current proportions.
pub const VOLUME_UNIT: f32 = 1_000_000.0;
pub const VOLUME_UNIT_HEIGHT: f32 = 20.0;

/// Bullish/bearish classification of a rendered candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Bullish,
    Bearish,
}

/// The primitive set derived from one candle: wick, body, volume bar.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleShape {
    pub direction: Direction,
    pub wick: LinePrimitive,
    pub body: RectPrimitive,
    pub volume_bar: RectPrimitive,
}

impl CandleShape {
    /// Flatten into draw order: wick behind body, volume bar last.
    #[must_use]
    pub fn into_primitives(self) -> [Primitive; 3] {
        [
            Primitive::Line(self.wick),
            Primitive::Rect(self.body),
            Primitive::Rect(self.volume_bar),
        ]
    }
}

/// Body width for a chart of `count` candles in the given viewport.
#[must_use]
pub fn candle_width(viewport_width: f32, count: usize) -> f32 {
    (viewport_width / count.max(1) as f32 * CANDLE_WIDTH_RATIO).max(MIN_CANDLE_WIDTH)
}

/// Project each candle into its primitive set, order preserving.
#[must_use]
pub fn render_candles(candles: &[Candle], scales: &ChartScales) -> Vec<CandleShape> {
    let width = candle_width(scales.viewport.width, candles.len());
    candles
        .iter()
        .map(|candle| render_candle(candle, scales, width))
        .collect()
}

fn render_candle(candle: &Candle, scales: &ChartScales, width: f32) -> CandleShape {
    let x = scales.time.forward(candle.timestamp);
    let y_high = scales.price.forward(candle.high);
    let y_low = scales.price.forward(candle.low);
    let y_open = scales.price.forward(candle.open);
    let y_close = scales.price.forward(candle.close);

    let direction = if candle.is_bullish() {
        Direction::Bullish
    } else {
        Direction::Bearish
    };
    let color = match direction {
        Direction::Bullish => BULLISH_COLOR,
        Direction::Bearish => BEARISH_COLOR,
    };

    let wick = LinePrimitive {
        x1: x,
        y1: y_high,
        x2: x,
        y2: y_low,
        stroke: Stroke::solid(color, 1.0),
    };

    // Bullish bodies are filled solid; bearish bodies render hollow.
    let body = RectPrimitive {
        x: x - width / 2.0,
        y: y_open.min(y_close),
        width,
        height: (y_close - y_open).abs(),
        stroke: Some(Stroke::solid(color, 1.0)),
        fill: match direction {
            Direction::Bullish => Some(color.to_string()),
            Direction::Bearish => None,
        },
        opacity: 1.0,
    };

    let volume_height = candle.volume / VOLUME_UNIT * VOLUME_UNIT_HEIGHT;
    let volume_bar = RectPrimitive {
        x: x - width / 2.0,
        y: scales.viewport.height - volume_height,
        width,
        height: volume_height,
        stroke: None,
        fill: Some(VOLUME_COLOR.to_string()),
        opacity: 0.3,
    };

    CandleShape {
        direction,
        wick,
        body,
        volume_bar,
    }
}

/// Axis tick labels: six per axis, placed in the margin band around the
/// viewport. Empty candle sets produce no labels.
#[must_use]
pub fn axis_labels(candles: &[Candle], scales: &ChartScales) -> Vec<Primitive> {
    if candles.is_empty() {
        return Vec::new();
    }

    let mut labels = Vec::new();
    for t in scales.time.ticks(5) {
        labels.push(Primitive::label(
            scales.time.forward(t),
            scales.viewport.height + 15.0,
            format_month_day(t),
            AXIS_COLOR,
            12.0,
        ));
    }
    for price in scales.price.ticks(5) {
        labels.push(Primitive::label(
            -10.0,
            scales.price.forward(price),
            format_price(price),
            AXIS_COLOR,
            12.0,
        ));
    }
    labels
}

/// Price label text, e.g. `$105.25`.
#[must_use]
pub fn format_price(price: f32) -> String {
    format!("${price:.2}")
}

/// `MM/DD` for a unix-seconds timestamp, ignoring leap seconds.
#[must_use]
pub fn format_month_day(timestamp: f64) -> String {
    let days_since_epoch = (timestamp / 86_400.0).floor() as i64;

    let mut year = 1970i32;
    let mut remaining = days_since_epoch;
    loop {
        let year_days = if is_leap_year(year) { 366 } else { 365 };
        if remaining < year_days {
            break;
        }
        remaining -= year_days;
        year += 1;
    }

    let month_days = [
        31,
        if is_leap_year(year) { 29 } else { 28 },
        31,
        30,
        31,
        30,
        31,
        31,
        30,
        31,
        30,
        31,
    ];
    let mut month = 1usize;
    for len in month_days {
        if remaining < len {
            break;
        }
        remaining -= len;
        month += 1;
    }

    format!("{:02}/{:02}", month, remaining + 1)
}

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}
