//! Chart session: owns the data, scales, gesture machine, and the
//! optimistic commit/delete flow against the annotation store.
//!
//! Single-threaded by design: all gesture and render operations run on
//! one interactive event loop. The only suspension points are the store
//! round-trips, and those are optimistic - the session applies the local
//! effect and the caller-selected [`Reconcile`] strategy decides what a
//! store failure means.

use std::sync::Arc;

use candela_core::{Annotation, AnnotationDraft, AnnotationPatch, Candle, Error, Result, ToolType};

use crate::annotation::annotation_primitives;
use crate::gesture::{GestureController, GestureState};
use crate::primitives::Primitive;
use crate::render::{axis_labels, render_candles};
use crate::scale::{ChartScales, ScreenPos, Viewport};
use crate::store::AnnotationStore;

/// What a failed store commit means for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reconcile {
    /// Surface transport failures to the caller; nothing is kept locally.
    Propagate,
    /// Keep a local-only record and surface the failure alongside it -
    /// the optimistic state stays the visible truth.
    #[default]
    LocalFallback,
}

/// Result of a commit: either the store accepted the draft, or the
/// session fell back to a local-only record and the failure rides along.
/// Either way the rejection stays observable.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    Persisted(Annotation),
    LocalOnly { annotation: Annotation, error: Error },
}

impl CommitOutcome {
    #[must_use]
    pub fn annotation(&self) -> &Annotation {
        match self {
            CommitOutcome::Persisted(a) => a,
            CommitOutcome::LocalOnly { annotation, .. } => annotation,
        }
    }
}

/// Local-only ids occupy the top half of the id space so they can never
/// collide with store-assigned ids.
const LOCAL_ID_BASE: u64 = 1 << 63;

/// One chart for one symbol: candles, annotations, derived scales, and
/// the gesture machine.
pub struct ChartSession {
    symbol: String,
    candles: Vec<Candle>,
    annotations: Vec<Annotation>,
    scales: ChartScales,
    gesture: GestureController,
    store: Arc<dyn AnnotationStore>,
    reconcile: Reconcile,
    local_id_counter: u64,
}

impl ChartSession {
    pub fn new(
        symbol: impl Into<String>,
        viewport: Viewport,
        store: Arc<dyn AnnotationStore>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            candles: Vec::new(),
            annotations: Vec::new(),
            scales: ChartScales::from_candles(&[], viewport),
            gesture: GestureController::new(),
            store,
            reconcile: Reconcile::default(),
            local_id_counter: 0,
        }
    }

    #[must_use]
    pub fn with_reconcile(mut self, reconcile: Reconcile) -> Self {
        self.reconcile = reconcile;
        self
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    #[must_use]
    pub fn scales(&self) -> &ChartScales {
        &self.scales
    }

    #[must_use]
    pub fn gesture_state(&self) -> GestureState {
        self.gesture.state()
    }

    #[must_use]
    pub fn armed_tool(&self) -> Option<ToolType> {
        self.gesture.armed()
    }

    /// Replace the candle set and rederive the scales - scales are never
    /// cached across data changes.
    pub fn set_candles(&mut self, candles: Vec<Candle>) {
        self.candles = candles;
        self.scales = ChartScales::from_candles(&self.candles, self.scales.viewport);
    }

    /// Change the viewport and rederive the scales.
    pub fn resize(&mut self, viewport: Viewport) {
        self.scales = ChartScales::from_candles(&self.candles, viewport);
    }

    /// Replace the annotation set from the store (bulk reload). Last
    /// writer wins; concurrent edits are not reconciled.
    pub async fn reload_annotations(&mut self) -> Result<()> {
        self.annotations = self.store.load_annotations(&self.symbol).await?;
        Ok(())
    }

    /// Arm (or toggle off) a drawing tool.
    pub fn arm_tool(&mut self, tool: ToolType) {
        self.gesture.arm(tool);
    }

    /// Abort any in-flight gesture without committing.
    pub fn cancel_gesture(&mut self) {
        self.gesture.cancel();
    }

    pub fn pointer_down(&mut self, pos: ScreenPos) -> bool {
        self.gesture.pointer_down(pos, &self.scales)
    }

    pub fn pointer_move(&mut self, pos: ScreenPos) -> bool {
        self.gesture.pointer_move(pos, &self.scales)
    }

    /// Finish the gesture and, if it completed, run the commit flow.
    /// `Ok(None)` means no gesture was in flight (aborted or no armed
    /// tool); nothing was persisted.
    pub async fn pointer_up(&mut self, pos: ScreenPos) -> Result<Option<CommitOutcome>> {
        match self.gesture.pointer_up(pos, &self.scales, &self.symbol) {
            Some(draft) => self.commit_draft(draft).await.map(Some),
            None => Ok(None),
        }
    }

    /// Commit a draft through the store, applying the reconciliation
    /// strategy on transport failure. Validation failures always
    /// propagate - a local fallback must not mask bad input.
    pub async fn commit_draft(&mut self, draft: AnnotationDraft) -> Result<CommitOutcome> {
        match self.store.commit(draft.clone()).await {
            Ok(annotation) => {
                self.annotations.push(annotation.clone());
                Ok(CommitOutcome::Persisted(annotation))
            }
            Err(error @ Error::Transport(_)) if self.reconcile == Reconcile::LocalFallback => {
                log::warn!(
                    "annotation commit failed ({error}); keeping local-only record for {}",
                    self.symbol
                );
                let annotation = self.synthesize_local(draft);
                self.annotations.push(annotation.clone());
                Ok(CommitOutcome::LocalOnly { annotation, error })
            }
            Err(error) => Err(error),
        }
    }

    fn synthesize_local(&mut self, draft: AnnotationDraft) -> Annotation {
        self.local_id_counter += 1;
        Annotation {
            id: LOCAL_ID_BASE + self.local_id_counter,
            symbol: draft.symbol,
            tool_type: draft.tool_type,
            start: draft.start,
            end: draft.end,
            color: draft.color,
            stroke_width: draft.stroke_width,
            label: draft.label,
            created_at: 0.0,
        }
    }

    /// Delete an annotation. The local copy is removed optimistically
    /// either way; a store failure is returned, not swallowed.
    pub async fn delete_annotation(&mut self, id: u64) -> Result<bool> {
        let existed_locally = self.annotations.iter().any(|a| a.id == id);
        self.annotations.retain(|a| a.id != id);

        if id >= LOCAL_ID_BASE {
            // local-only records never reached the store
            return Ok(existed_locally);
        }

        match self.store.delete(id).await {
            Ok(existed) => Ok(existed),
            Err(error) => {
                log::warn!("annotation delete failed ({error}); local removal stands");
                Err(error)
            }
        }
    }

    /// Patch an annotation through the store and mirror the result
    /// locally.
    pub async fn update_annotation(
        &mut self,
        id: u64,
        patch: AnnotationPatch,
    ) -> Result<Annotation> {
        let updated = self.store.update(id, patch).await?;
        if let Some(slot) = self.annotations.iter_mut().find(|a| a.id == id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Derive the full frame: candle shapes, axis labels, committed
    /// annotations, then the live gesture preview on top.
    #[must_use]
    pub fn render(&self) -> Vec<Primitive> {
        let mut frame: Vec<Primitive> = render_candles(&self.candles, &self.scales)
            .into_iter()
            .flat_map(|shape| shape.into_primitives())
            .collect();
        frame.extend(axis_labels(&self.candles, &self.scales));
        for annotation in &self.annotations {
            frame.extend(annotation_primitives(annotation, &self.scales));
        }
        if let Some(preview) = self.gesture.preview() {
            frame.extend(preview);
        }
        frame
    }
}
