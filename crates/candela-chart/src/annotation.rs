//! Annotation geometry: derives draw primitives from persisted
//! annotations.
//!
//! One derivation function per tool variant, dispatched by an exhaustive
//! `match` - adding a tool type is a compile-checked, localized change.
//! Unknown tool types cannot reach this module: they are rejected when a
//! [`ToolType`] is parsed or deserialized, never dropped here.
//!
//! Projection rule: an annotation's `x` coordinates are raw domain values
//! carried into screen space unchanged, while `y` coordinates are prices
//! pushed through the price scale. A missing `end` collapses to the start
//! point, so lines degrade to zero length instead of failing.

use candela_core::{Annotation, ToolType};

use crate::primitives::{Primitive, RectPrimitive, Stroke};
use crate::scale::{ChartScales, ScreenPos};

/// The fixed Fibonacci retracement ladder, ascending. Never configurable
/// per annotation.
pub const FIB_LEVELS: [f32; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Dash pattern distinguishing support/resistance from trend lines.
const SR_DASH: (f32, f32) = (5.0, 5.0);
/// Dash pattern for Fibonacci guide lines.
const FIB_DASH: (f32, f32) = (2.0, 2.0);

/// Opacity applied to in-progress gesture previews.
const PREVIEW_OPACITY: f32 = 0.7;

/// Project an annotation's anchors into screen space.
fn project(annotation: &Annotation, scales: &ChartScales) -> (ScreenPos, ScreenPos) {
    let start = ScreenPos::new(
        annotation.start.x as f32,
        scales.price.forward(annotation.start.y),
    );
    let end = match annotation.end {
        Some(end) => ScreenPos::new(end.x as f32, scales.price.forward(end.y)),
        None => start,
    };
    (start, end)
}

/// Derive the draw primitives for one annotation.
#[must_use]
pub fn annotation_primitives(annotation: &Annotation, scales: &ChartScales) -> Vec<Primitive> {
    let (start, end) = project(annotation, scales);

    let mut primitives = match annotation.tool_type {
        ToolType::TrendLine => trend_line_primitives(annotation, start, end),
        ToolType::SupportResistance => support_resistance_primitives(annotation, start, end),
        ToolType::Rectangle => rectangle_primitives(annotation, start, end),
        ToolType::Fibonacci => fibonacci_primitives(annotation, start, end),
    };

    if let Some(label) = &annotation.label {
        primitives.push(Primitive::label(
            start.x,
            start.y - 5.0,
            label.clone(),
            annotation.color.clone(),
            12.0,
        ));
    }

    primitives
}

fn trend_line_primitives(
    annotation: &Annotation,
    start: ScreenPos,
    end: ScreenPos,
) -> Vec<Primitive> {
    vec![Primitive::line(
        start.x,
        start.y,
        end.x,
        end.y,
        Stroke::solid(annotation.color.clone(), annotation.stroke_width),
    )]
}

fn support_resistance_primitives(
    annotation: &Annotation,
    start: ScreenPos,
    end: ScreenPos,
) -> Vec<Primitive> {
    // Same geometry as a trend line; the dashed stroke is the only
    // distinction.
    vec![Primitive::line(
        start.x,
        start.y,
        end.x,
        end.y,
        Stroke::dashed(
            annotation.color.clone(),
            annotation.stroke_width,
            SR_DASH.0,
            SR_DASH.1,
        ),
    )]
}

fn rectangle_primitives(
    annotation: &Annotation,
    start: ScreenPos,
    end: ScreenPos,
) -> Vec<Primitive> {
    vec![Primitive::Rect(normalized_rect(
        start,
        end,
        Stroke::solid(annotation.color.clone(), annotation.stroke_width),
    ))]
}

fn fibonacci_primitives(
    annotation: &Annotation,
    start: ScreenPos,
    end: ScreenPos,
) -> Vec<Primitive> {
    let x_min = start.x.min(end.x);
    let x_max = start.x.max(end.x);
    let y_min = start.y.min(end.y);
    let height = (end.y - start.y).abs();

    let mut primitives = Vec::with_capacity(FIB_LEVELS.len() * 2);
    for level in FIB_LEVELS {
        let y = y_min + height * level;
        primitives.push(Primitive::line(
            x_min,
            y,
            x_max,
            y,
            Stroke::dashed(annotation.color.clone(), 1.0, FIB_DASH.0, FIB_DASH.1)
                .with_opacity(0.7),
        ));
        primitives.push(Primitive::label(
            x_max + 5.0,
            y,
            format!("{:.1}%", level * 100.0),
            annotation.color.clone(),
            10.0,
        ));
    }
    primitives
}

/// Box normalized over both corners: invariant to drag direction.
fn normalized_rect(a: ScreenPos, b: ScreenPos, stroke: Stroke) -> RectPrimitive {
    RectPrimitive {
        x: a.x.min(b.x),
        y: a.y.min(b.y),
        width: (b.x - a.x).abs(),
        height: (b.y - a.y).abs(),
        stroke: Some(stroke),
        fill: None,
        opacity: 1.0,
    }
}

/// Advisory preview for an in-progress gesture, drawn directly in pixel
/// space with default styling. Purely visual - nothing here persists.
#[must_use]
pub fn preview_primitives(tool: ToolType, start: ScreenPos, current: ScreenPos) -> Vec<Primitive> {
    use candela_core::annotation::{DEFAULT_COLOR, DEFAULT_STROKE_WIDTH};

    match tool {
        ToolType::TrendLine => vec![Primitive::line(
            start.x,
            start.y,
            current.x,
            current.y,
            Stroke::solid(DEFAULT_COLOR, DEFAULT_STROKE_WIDTH).with_opacity(PREVIEW_OPACITY),
        )],
        ToolType::SupportResistance => vec![Primitive::line(
            start.x,
            start.y,
            current.x,
            current.y,
            Stroke::dashed(DEFAULT_COLOR, DEFAULT_STROKE_WIDTH, SR_DASH.0, SR_DASH.1)
                .with_opacity(PREVIEW_OPACITY),
        )],
        ToolType::Rectangle => {
            let mut rect = normalized_rect(
                start,
                current,
                Stroke::solid(DEFAULT_COLOR, DEFAULT_STROKE_WIDTH),
            );
            rect.opacity = PREVIEW_OPACITY;
            vec![Primitive::Rect(rect)]
        }
        ToolType::Fibonacci => {
            let x_min = start.x.min(current.x);
            let x_max = start.x.max(current.x);
            let y_min = start.y.min(current.y);
            let height = (current.y - start.y).abs();
            FIB_LEVELS
                .iter()
                .map(|level| {
                    let y = y_min + height * level;
                    Primitive::line(
                        x_min,
                        y,
                        x_max,
                        y,
                        Stroke::dashed(DEFAULT_COLOR, 1.0, FIB_DASH.0, FIB_DASH.1)
                            .with_opacity(PREVIEW_OPACITY),
                    )
                })
                .collect()
        }
    }
}
