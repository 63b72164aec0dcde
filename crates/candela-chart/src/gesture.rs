//! Gesture capture: pointer events in, annotation drafts out.
//!
//! The drag state is an explicit serializable value rather than hidden
//! component state, so the machine is fully testable without a rendering
//! surface. Two states, both transient:
//!
//! ```text
//! Idle --pointer_down (tool armed)--> Dragging --pointer_up--> Idle
//! ```
//!
//! Nothing is persisted by this module; a completed gesture yields an
//! [`AnnotationDraft`] and the caller decides what to do with it.

use candela_core::{AnnotationDraft, DataPoint, ToolType};
use serde::{Deserialize, Serialize};

use crate::annotation::preview_primitives;
use crate::primitives::Primitive;
use crate::scale::{ChartScales, ScreenPos};

/// The drag phase. `Dragging` carries the captured start and the live
/// preview point, both clamped to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum GestureState {
    #[default]
    Idle,
    Dragging {
        start: ScreenPos,
        current: ScreenPos,
    },
}

impl GestureState {
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, GestureState::Dragging { .. })
    }
}

/// Tracks the armed tool and the in-flight gesture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GestureController {
    armed: Option<ToolType>,
    state: GestureState,
}

impl GestureController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently armed tool, if any.
    #[must_use]
    pub fn armed(&self) -> Option<ToolType> {
        self.armed
    }

    #[must_use]
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Arm a tool. Re-arming the already-armed tool while idle toggles it
    /// off (deselect); arming always discards any in-flight gesture.
    pub fn arm(&mut self, tool: ToolType) {
        let toggling_off = self.armed == Some(tool) && !self.state.is_dragging();
        self.state = GestureState::Idle;
        self.armed = if toggling_off { None } else { Some(tool) };
    }

    /// Disarm and discard any in-flight gesture.
    pub fn disarm(&mut self) {
        self.armed = None;
        self.state = GestureState::Idle;
    }

    /// Abort the in-flight gesture, keeping the armed tool.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Begin a drag. A no-op without an armed tool. Out-of-viewport
    /// positions are clamped to the nearest boundary, never rejected.
    pub fn pointer_down(&mut self, pos: ScreenPos, scales: &ChartScales) -> bool {
        if self.armed.is_none() {
            return false;
        }
        let pos = scales.viewport.clamp(pos);
        self.state = GestureState::Dragging {
            start: pos,
            current: pos,
        };
        true
    }

    /// Update the live preview point. Advisory only; persists nothing.
    pub fn pointer_move(&mut self, pos: ScreenPos, scales: &ChartScales) -> bool {
        match self.state {
            GestureState::Dragging { start, .. } => {
                self.state = GestureState::Dragging {
                    start,
                    current: scales.viewport.clamp(pos),
                };
                true
            }
            GestureState::Idle => false,
        }
    }

    /// Finish the drag, converting both endpoints to data coordinates:
    /// `x` is kept raw, `y` goes through the price-scale inverse. Returns
    /// `None` - with the machine reset to idle and nothing committed -
    /// when no drag was in flight or the tool was disarmed mid-drag.
    pub fn pointer_up(
        &mut self,
        pos: ScreenPos,
        scales: &ChartScales,
        symbol: &str,
    ) -> Option<AnnotationDraft> {
        let state = std::mem::take(&mut self.state);
        let GestureState::Dragging { start, .. } = state else {
            return None;
        };
        let tool = self.armed?;

        let end = scales.viewport.clamp(pos);
        let start = DataPoint::new(start.x as f64, scales.price.inverse(start.y));
        let end = DataPoint::new(end.x as f64, scales.price.inverse(end.y));

        Some(AnnotationDraft::new(symbol, tool, start, Some(end)))
    }

    /// Preview primitives for the in-flight gesture, if any.
    #[must_use]
    pub fn preview(&self) -> Option<Vec<Primitive>> {
        match (self.armed, self.state) {
            (Some(tool), GestureState::Dragging { start, current }) => {
                Some(preview_primitives(tool, start, current))
            }
            _ => None,
        }
    }
}
