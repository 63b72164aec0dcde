//! Persisted annotation types for technical-analysis overlays.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default stroke color for newly drawn annotations.
pub const DEFAULT_COLOR: &str = "#2563eb";
/// Default stroke width for newly drawn annotations.
pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;

/// The closed set of annotation tools.
///
/// Wire names are snake_case. Parsing any other name is a
/// [`Error::Validation`] - unknown tools are rejected at this boundary,
/// never silently dropped downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolType {
    TrendLine,
    SupportResistance,
    Rectangle,
    Fibonacci,
}

impl ToolType {
    /// All tools in declaration order.
    pub fn all() -> &'static [ToolType] {
        &[
            ToolType::TrendLine,
            ToolType::SupportResistance,
            ToolType::Rectangle,
            ToolType::Fibonacci,
        ]
    }

    /// The snake_case wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::TrendLine => "trend_line",
            ToolType::SupportResistance => "support_resistance",
            ToolType::Rectangle => "rectangle",
            ToolType::Fibonacci => "fibonacci",
        }
    }

    /// Whether a completed annotation of this kind needs an end point.
    ///
    /// Lines degrade gracefully to a zero-length segment when the end is
    /// missing; boxes and retracement ladders have no such degenerate
    /// reading.
    #[must_use]
    pub fn requires_end(&self) -> bool {
        matches!(self, ToolType::Rectangle | ToolType::Fibonacci)
    }
}

impl FromStr for ToolType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trend_line" => Ok(ToolType::TrendLine),
            "support_resistance" => Ok(ToolType::SupportResistance),
            "rectangle" => Ok(ToolType::Rectangle),
            "fibonacci" => Ok(ToolType::Fibonacci),
            other => Err(Error::validation(format!("unknown tool type: {other:?}"))),
        }
    }
}

impl fmt::Display for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An anchor point in data coordinates.
///
/// `x` is a raw numeric domain coordinate, stored exactly as captured;
/// `y` is always a price in data units, never a pixel value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f32,
}

impl DataPoint {
    #[must_use]
    pub const fn new(x: f64, y: f32) -> Self {
        Self { x, y }
    }
}

/// A persisted chart annotation.
///
/// Created by committing a completed gesture, mutated via
/// [`AnnotationPatch`], destroyed by explicit deletion. No cascading
/// relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: u64,
    pub symbol: String,
    pub tool_type: ToolType,
    pub start: DataPoint,
    pub end: Option<DataPoint>,
    pub color: String,
    pub stroke_width: f32,
    pub label: Option<String>,
    /// Unix seconds at creation, assigned by the store.
    pub created_at: f64,
}

/// Input for creating an annotation; the store assigns `id` and
/// `created_at` on commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDraft {
    pub symbol: String,
    pub tool_type: ToolType,
    pub start: DataPoint,
    pub end: Option<DataPoint>,
    pub color: String,
    pub stroke_width: f32,
    pub label: Option<String>,
}

impl AnnotationDraft {
    /// A draft with default styling, as produced by a completed gesture.
    pub fn new(
        symbol: impl Into<String>,
        tool_type: ToolType,
        start: DataPoint,
        end: Option<DataPoint>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            tool_type,
            start,
            end,
            color: DEFAULT_COLOR.to_string(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            label: None,
        }
    }

    /// Validate the draft before any persistence side effect.
    pub fn validate(&self) -> Result<(), Error> {
        if self.symbol.is_empty() {
            return Err(Error::validation("symbol must not be empty"));
        }
        if !(self.stroke_width > 0.0) {
            return Err(Error::validation(format!(
                "stroke_width must be positive, got {}",
                self.stroke_width
            )));
        }
        if self.tool_type.requires_end() && self.end.is_none() {
            return Err(Error::validation(format!(
                "{} requires an end point",
                self.tool_type
            )));
        }
        Ok(())
    }
}

/// Partial update for an annotation.
///
/// `None` leaves a field unchanged. For the nullable fields (`end`,
/// `label`) the outer option distinguishes "unchanged" from an explicit
/// clear: `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default)]
pub struct AnnotationPatch {
    pub start: Option<DataPoint>,
    pub end: Option<Option<DataPoint>>,
    pub color: Option<String>,
    pub stroke_width: Option<f32>,
    pub label: Option<Option<String>>,
}

impl AnnotationPatch {
    /// Apply the patch to an annotation, validating the result.
    pub fn apply_to(&self, annotation: &mut Annotation) -> Result<(), Error> {
        if let Some(w) = self.stroke_width {
            if !(w > 0.0) {
                return Err(Error::validation(format!(
                    "stroke_width must be positive, got {w}"
                )));
            }
        }

        if let Some(start) = self.start {
            annotation.start = start;
        }
        if let Some(end) = &self.end {
            annotation.end = *end;
        }
        if let Some(color) = &self.color {
            annotation.color = color.clone();
        }
        if let Some(w) = self.stroke_width {
            annotation.stroke_width = w;
        }
        if let Some(label) = &self.label {
            annotation.label = label.clone();
        }
        Ok(())
    }
}
