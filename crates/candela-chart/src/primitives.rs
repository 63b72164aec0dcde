//! Draw primitives emitted by the engine.
//!
//! The engine is headless: every render pass reduces candles and
//! annotations to a flat list of these primitives, all in screen-space
//! pixels. What rasterizes them (SVG, canvas, GPU quads) is a consumer
//! concern.

use serde::{Deserialize, Serialize};

/// Stroke line style.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed {
        dash: f32,
        gap: f32,
    },
}

/// Stroke attributes shared by lines and rectangle outlines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// CSS color string, e.g. `"#2563eb"`.
    pub color: String,
    pub width: f32,
    pub style: LineStyle,
    pub opacity: f32,
}

impl Stroke {
    pub fn solid(color: impl Into<String>, width: f32) -> Self {
        Self {
            color: color.into(),
            width,
            style: LineStyle::Solid,
            opacity: 1.0,
        }
    }

    pub fn dashed(color: impl Into<String>, width: f32, dash: f32, gap: f32) -> Self {
        Self {
            color: color.into(),
            width,
            style: LineStyle::Dashed { dash, gap },
            opacity: 1.0,
        }
    }

    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

/// A line segment in screen space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePrimitive {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub stroke: Stroke,
}

/// An axis-aligned rectangle in screen space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectPrimitive {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Outline stroke; `None` for fill-only bars.
    pub stroke: Option<Stroke>,
    /// Fill color; `None` renders hollow.
    pub fill: Option<String>,
    pub opacity: f32,
}

/// A text label anchored in screen space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPrimitive {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub color: String,
    pub font_size: f32,
}

/// One drawable element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Primitive {
    Line(LinePrimitive),
    Rect(RectPrimitive),
    Label(LabelPrimitive),
}

impl Primitive {
    pub fn line(x1: f32, y1: f32, x2: f32, y2: f32, stroke: Stroke) -> Self {
        Primitive::Line(LinePrimitive { x1, y1, x2, y2, stroke })
    }

    pub fn label(x: f32, y: f32, text: impl Into<String>, color: impl Into<String>, font_size: f32) -> Self {
        Primitive::Label(LabelPrimitive {
            x,
            y,
            text: text.into(),
            color: color.into(),
            font_size,
        })
    }

    /// Every coordinate finite - degenerate inputs must never leak NaN
    /// into the draw list.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        match self {
            Primitive::Line(l) => {
                [l.x1, l.y1, l.x2, l.y2].iter().all(|v| v.is_finite())
            }
            Primitive::Rect(r) => {
                [r.x, r.y, r.width, r.height].iter().all(|v| v.is_finite())
            }
            Primitive::Label(l) => l.x.is_finite() && l.y.is_finite(),
        }
    }
}
