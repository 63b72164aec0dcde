//! candela-chart - coordinate transform and annotation geometry engine
//! for OHLCV charts.
//!
//! The engine is headless: candles and annotations go in, screen-space
//! draw primitives come out. The pieces:
//!
//! - [`scale`] - bidirectional mappings between data space (timestamp,
//!   price) and a pixel viewport
//! - [`render`] - candle bodies, wicks, volume bars, axis labels
//! - [`annotation`] - geometry derivation per annotation tool
//! - [`gesture`] - the pointer-capture state machine producing
//!   annotation drafts
//! - [`store`] - persistence collaborator contracts and the in-memory
//!   reference store
//! - [`session`] - the orchestrator owning data, scales, and the
//!   optimistic commit flow

pub mod annotation;
pub mod gesture;
pub mod primitives;
pub mod render;
pub mod scale;
pub mod session;
pub mod store;

pub use annotation::{annotation_primitives, preview_primitives, FIB_LEVELS};
pub use gesture::{GestureController, GestureState};
pub use primitives::{LabelPrimitive, LinePrimitive, LineStyle, Primitive, RectPrimitive, Stroke};
pub use render::{axis_labels, candle_width, render_candles, CandleShape, Direction};
pub use scale::{ChartScales, PriceScale, ScreenPos, TimeScale, Viewport};
pub use session::{ChartSession, CommitOutcome, Reconcile};
pub use store::{AnnotationStore, CandleStore, MemoryStore, TimeRange};
