//! Gesture orchestration.
//!
//! [`DragEngine`] wires the input layer, snap resolver, transform resolver,
//! history and frame scheduler together for one gesture at a time:
//!
//! ```text
//! Idle --start_drag--> Dragging --pointer_up--> Idle   (commit)
//!                              \--cancel-----> Idle   (discard)
//! ```
//!
//! The engine never mutates the slide. It reads the caller's
//! [`ElementData`] and hands back proposed geometry.

use crate::config::EngineConfig;
use crate::element::{ElementData, ElementId, TransformData};
use crate::error::{ConfigResult, GestureError};
use crate::history::{HistoryEntry, HistoryStack};
use crate::input::{DragState, GestureKind, InputLayer, PointerEvent};
use crate::scheduler::{FrameOutcome, FrameScheduler, LoopHandle};
use crate::snap::{SnapPoint, SnapResolver};
use crate::suppress::{InputSuppression, NoopSuppression};
use crate::transform::TransformResolver;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use uuid::Uuid;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Identifies one gesture in logs and commit reports.
pub type GestureId = Uuid;

/// Engine state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GesturePhase {
    #[default]
    Idle,
    Dragging,
}

/// Result of a completed gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitOutcome {
    pub gesture: GestureId,
    pub element_id: ElementId,
    /// Committed geometry of the dragged element.
    pub transform: TransformData,
    /// The slide with the committed geometry applied.
    pub slide: Vec<ElementData>,
}

/// Bookkeeping for the gesture in progress.
#[derive(Debug, Clone)]
struct ActiveDrag {
    id: GestureId,
    /// Dragged element as it was at pointer-down.
    element: ElementData,
    /// Slide captured at pointer-down.
    slide: Vec<ElementData>,
    provisional: TransformData,
}

/// Direct-manipulation engine for one slide canvas.
pub struct DragEngine {
    config: EngineConfig,
    input: InputLayer,
    snaps: SnapResolver,
    resolver: TransformResolver,
    history: HistoryStack,
    scheduler: FrameScheduler,
    active: Option<ActiveDrag>,
}

impl Default for DragEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default(), Rc::new(NoopSuppression))
    }
}

impl DragEngine {
    /// Create an engine with no host-side input suppression.
    pub fn new(config: EngineConfig) -> ConfigResult<Self> {
        Self::with_suppression(config, Rc::new(NoopSuppression))
    }

    /// Create an engine that toggles `suppression` while a gesture runs.
    pub fn with_suppression(
        config: EngineConfig,
        suppression: Rc<dyn InputSuppression>,
    ) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::build(config, suppression))
    }

    fn build(config: EngineConfig, suppression: Rc<dyn InputSuppression>) -> Self {
        Self {
            input: InputLayer::with_suppression(config.canvas_size, suppression),
            snaps: SnapResolver::new(config.grid_size, config.canvas_size),
            resolver: TransformResolver::new(config.snap_threshold, config.min_size),
            history: HistoryStack::new(config.history_capacity),
            scheduler: FrameScheduler::with_interval(config.frame_interval()),
            active: None,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Begin a gesture on `element_id`.
    ///
    /// `slide` is the current geometry of every element on the slide and
    /// `container` the screen rect of the canvas container. On error the
    /// engine stays idle and nothing else changes.
    pub fn start_drag(
        &mut self,
        event: &PointerEvent,
        element_id: &str,
        kind: GestureKind,
        slide: &[ElementData],
        container: Option<Rect>,
    ) -> Result<TransformData, GestureError> {
        let result = self.try_start(event, element_id, kind, slide, container);
        if let Err(err) = &result {
            log::warn!("Gesture on {} not started: {}", element_id, err);
        }
        result
    }

    fn try_start(
        &mut self,
        event: &PointerEvent,
        element_id: &str,
        kind: GestureKind,
        slide: &[ElementData],
        container: Option<Rect>,
    ) -> Result<TransformData, GestureError> {
        if let Some(active) = &self.active {
            return Err(GestureError::AlreadyDragging(active.element.id.clone()));
        }
        let element = slide
            .iter()
            .find(|element| element.id == element_id)
            .ok_or_else(|| GestureError::UnknownElement(element_id.to_string()))?;

        let drag_state = self.input.on_pointer_down(event, element, kind, container)?;

        // Baseline so the first gesture can be undone.
        if self.history.is_empty() {
            self.history.push(HistoryEntry::from_slide(slide));
        }

        self.snaps.load(element_id, slide);
        let provisional = self.resolver.begin(element, &drag_state);
        let id = Uuid::new_v4();
        log::debug!(
            "Gesture {} started on {} ({:?}, {:?})",
            id,
            element_id,
            kind,
            drag_state.constraint
        );

        self.active = Some(ActiveDrag {
            id,
            element: element.clone(),
            slide: slide.to_vec(),
            provisional,
        });
        Ok(provisional)
    }

    /// Track pointer movement and return the new provisional transform.
    /// Returns `None` while idle.
    pub fn pointer_move(&mut self, event: &PointerEvent) -> Option<TransformData> {
        let active = self.active.as_mut()?;
        let drag_state = self.input.on_pointer_move(event)?;

        let points = match drag_state.kind {
            GestureKind::Move => self.snaps.compute(&active.element, &drag_state),
            GestureKind::Resize(_) | GestureKind::Rotate => Vec::new(),
        };
        let provisional = self.resolver.update(&active.element, &drag_state, &points);
        self.input.record_snap_points(points);
        active.provisional = provisional;

        log::trace!(
            "Gesture {} at ({:.1}, {:.1}) {}x{} {}deg",
            active.id,
            provisional.x,
            provisional.y,
            provisional.width,
            provisional.height,
            provisional.rotation
        );
        Some(provisional)
    }

    /// Finish the gesture and record it in history.
    ///
    /// The host paints the committed slide right away, so the commit counts
    /// as a render for the frame gate. Returns `None` while idle.
    pub fn pointer_up(&mut self) -> Option<CommitOutcome> {
        let active = self.active.take()?;
        self.input.on_pointer_up();
        let transform = self.resolver.commit().unwrap_or(active.provisional);
        self.snaps.clear();

        let slide: Vec<ElementData> = active
            .slide
            .iter()
            .map(|element| {
                if element.id == active.element.id {
                    element.with_transform(&transform)
                } else {
                    element.clone()
                }
            })
            .collect();
        self.history.push(HistoryEntry::from_slide(&slide));
        self.scheduler.mark_rendered(Instant::now());

        log::debug!(
            "Gesture {} committed on {} at ({:.1}, {:.1})",
            active.id,
            active.element.id,
            transform.x,
            transform.y
        );
        Some(CommitOutcome {
            gesture: active.id,
            element_id: active.element.id,
            transform,
            slide,
        })
    }

    /// Abort the gesture, leaving the slide at its last committed state.
    /// Returns `true` if a gesture was active.
    pub fn cancel(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        self.input.cancel();
        self.resolver.cancel();
        self.snaps.clear();
        log::debug!("Gesture {} cancelled on {}", active.id, active.element.id);
        true
    }

    /// Geometry to paint for `element_id`: the provisional transform if it
    /// is being dragged, otherwise `fallback`.
    pub fn element_transform(&self, element_id: &str, fallback: TransformData) -> TransformData {
        match &self.active {
            Some(active) if active.element.id == element_id => active.provisional,
            _ => fallback,
        }
    }

    /// Provisional transform of the dragged element.
    pub fn provisional(&self) -> Option<&TransformData> {
        self.active.as_ref().map(|active| &active.provisional)
    }

    /// Snap candidates that captured the latest update, for guide drawing.
    pub fn active_snaps(&self) -> &[SnapPoint] {
        self.resolver.active_snaps()
    }

    pub fn drag_state(&self) -> Option<&DragState> {
        self.input.state()
    }

    pub fn dragging_element(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.element.id.as_str())
    }

    pub fn phase(&self) -> GesturePhase {
        if self.active.is_some() {
            GesturePhase::Dragging
        } else {
            GesturePhase::Idle
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Step history back and return the snapshot to apply.
    /// Ignored while a gesture is running.
    pub fn undo(&mut self) -> Option<HistoryEntry> {
        if self.is_dragging() {
            log::debug!("Undo ignored during a gesture");
            return None;
        }
        self.history.undo().cloned()
    }

    /// Step history forward and return the snapshot to apply.
    /// Ignored while a gesture is running.
    pub fn redo(&mut self) -> Option<HistoryEntry> {
        if self.is_dragging() {
            log::debug!("Redo ignored during a gesture");
            return None;
        }
        self.history.redo().cloned()
    }

    pub fn can_undo(&self) -> bool {
        !self.is_dragging() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.is_dragging() && self.history.can_redo()
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Start the render loop, superseding any previous one.
    pub fn start_render_loop(&mut self) -> LoopHandle {
        self.scheduler.start()
    }

    /// Stop the render loop. Hosts call this on teardown.
    pub fn stop_render_loop(&mut self) -> bool {
        self.scheduler.stop()
    }

    /// Gate an animation frame at `now`. The host paints on
    /// [`FrameOutcome::Rendered`].
    pub fn poll_frame(&mut self, handle: LoopHandle, now: Instant) -> FrameOutcome {
        self.scheduler.poll(handle, now)
    }

    pub fn is_render_loop_running(&self) -> bool {
        self.scheduler.is_running()
    }
}
