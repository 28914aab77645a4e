//! Pointer capture and constraint classification.
//!
//! The input layer turns screen-space pointer events into a [`DragState`]:
//! canvas-local pointer positions and the delta since pointer-down, with the
//! axis constraint chosen at gesture start already applied.

use crate::element::{ElementData, ElementId};
use crate::error::GestureError;
use crate::snap::SnapPoint;
use crate::suppress::{InputSuppression, NoopSuppression, SuppressionGuard};
use crate::transform::ResizeHandle;
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self { shift: true, ..Self::NONE }
    }

    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::NONE }
    }

    pub fn alt() -> Self {
        Self { alt: true, ..Self::NONE }
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A pointer sample in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub position: Point,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Axis restriction selected by the modifiers held at pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintType {
    #[default]
    None,
    /// Shift: movement along x only.
    Horizontal,
    /// Ctrl/Cmd: movement along y only.
    Vertical,
    /// Alt: symmetric drag around the element center.
    Center,
}

impl ConstraintType {
    /// Classify the constraint for a gesture starting with `modifiers` held.
    pub fn from_modifiers(modifiers: Modifiers) -> Self {
        if modifiers.shift {
            ConstraintType::Horizontal
        } else if modifiers.command() {
            ConstraintType::Vertical
        } else if modifiers.alt {
            ConstraintType::Center
        } else {
            ConstraintType::None
        }
    }

    /// Apply the constraint to a raw pointer delta.
    pub fn apply(self, delta: Vec2) -> Vec2 {
        match self {
            ConstraintType::None => delta,
            ConstraintType::Horizontal => Vec2::new(delta.x, 0.0),
            ConstraintType::Vertical => Vec2::new(0.0, delta.y),
            // Doubled: the element moves symmetrically around the pointer.
            ConstraintType::Center => delta * 2.0,
        }
    }

    /// Whether the x axis is frozen by this constraint.
    pub fn locks_x(self) -> bool {
        self == ConstraintType::Vertical
    }

    /// Whether the y axis is frozen by this constraint.
    pub fn locks_y(self) -> bool {
        self == ConstraintType::Horizontal
    }
}

/// What a gesture manipulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureKind {
    /// Translate the element.
    #[default]
    Move,
    /// Resize from the given handle.
    Resize(ResizeHandle),
    /// Rotate around the element center.
    Rotate,
}

/// Placement of the fixed-size canvas inside its variable-size container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasViewport {
    /// Container bounding rect in screen coordinates.
    pub container: Rect,
    /// Size of the virtual canvas.
    pub canvas_size: Size,
}

impl CanvasViewport {
    /// Build a viewport from a container measurement.
    /// Returns `None` for a missing or collapsed measurement (detached node).
    pub fn measure(container: Option<Rect>, canvas_size: Size) -> Option<Self> {
        let container = container?;
        let finite = [container.x0, container.y0, container.x1, container.y1]
            .iter()
            .all(|v| v.is_finite());
        if !finite || container.width() <= 0.0 || container.height() <= 0.0 {
            return None;
        }
        Some(Self {
            container,
            canvas_size,
        })
    }

    /// Offset of the canvas inside the container.
    pub fn centering_offset(&self) -> Vec2 {
        Vec2::new(
            (self.container.width() - self.canvas_size.width) / 2.0,
            (self.container.height() - self.canvas_size.height) / 2.0,
        )
    }

    /// Convert a screen point to canvas-local coordinates.
    pub fn to_canvas(&self, screen: Point) -> Point {
        screen - self.container.origin().to_vec2() - self.centering_offset()
    }
}

/// Ephemeral state of the active gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragState {
    /// Target element.
    pub id: ElementId,
    /// Pointer position at pointer-down, canvas-local.
    pub start: Point,
    /// Latest pointer position, canvas-local.
    pub current: Point,
    /// Element top-left at pointer-down.
    pub start_element: Point,
    /// `current - start` after the constraint is applied.
    pub delta: Vec2,
    /// `current - start` as the pointer actually moved.
    pub raw_delta: Vec2,
    pub is_active: bool,
    /// Fixed for the lifetime of the gesture.
    pub constraint: ConstraintType,
    /// Modifiers of the latest pointer event.
    pub modifiers: Modifiers,
    pub kind: GestureKind,
    /// Snap candidates computed for the latest frame.
    pub snap_points: Vec<SnapPoint>,
}

#[derive(Debug)]
struct ActiveGesture {
    state: DragState,
    viewport: CanvasViewport,
    _suppression: SuppressionGuard,
}

/// Tracks the single active gesture.
pub struct InputLayer {
    active: Option<ActiveGesture>,
    suppression: Rc<dyn InputSuppression>,
    canvas_size: Size,
}

impl InputLayer {
    /// Create an input layer for a canvas of the given size.
    pub fn new(canvas_size: Size) -> Self {
        Self::with_suppression(canvas_size, Rc::new(NoopSuppression))
    }

    /// Create an input layer that toggles `suppression` around gestures.
    pub fn with_suppression(canvas_size: Size, suppression: Rc<dyn InputSuppression>) -> Self {
        Self {
            active: None,
            suppression,
            canvas_size,
        }
    }

    /// Begin a gesture on `element`.
    ///
    /// Fails without side effects when a gesture is already running or the
    /// container could not be measured.
    pub fn on_pointer_down(
        &mut self,
        event: &PointerEvent,
        element: &ElementData,
        kind: GestureKind,
        container: Option<Rect>,
    ) -> Result<DragState, GestureError> {
        if let Some(active) = &self.active {
            return Err(GestureError::AlreadyDragging(active.state.id.clone()));
        }
        let viewport = CanvasViewport::measure(container, self.canvas_size)
            .ok_or(GestureError::MissingContainer)?;

        let origin = viewport.to_canvas(event.position);
        let state = DragState {
            id: element.id.clone(),
            start: origin,
            current: origin,
            start_element: element.origin(),
            delta: Vec2::ZERO,
            raw_delta: Vec2::ZERO,
            is_active: true,
            constraint: ConstraintType::from_modifiers(event.modifiers),
            modifiers: event.modifiers,
            kind,
            snap_points: Vec::new(),
        };

        self.active = Some(ActiveGesture {
            state: state.clone(),
            viewport,
            _suppression: SuppressionGuard::acquire(self.suppression.clone()),
        });
        Ok(state)
    }

    /// Track pointer movement. No-op while idle.
    pub fn on_pointer_move(&mut self, event: &PointerEvent) -> Option<DragState> {
        let active = self.active.as_mut()?;
        let current = active.viewport.to_canvas(event.position);
        let state = &mut active.state;
        state.current = current;
        state.raw_delta = current - state.start;
        state.delta = state.constraint.apply(state.raw_delta);
        state.modifiers = event.modifiers;
        Some(state.clone())
    }

    /// Finish the gesture and return its last state.
    pub fn on_pointer_up(&mut self) -> Option<DragState> {
        let ActiveGesture { mut state, .. } = self.active.take()?;
        state.is_active = false;
        Some(state)
    }

    /// Drop the active gesture without reporting it.
    /// Returns `true` if a gesture was active.
    pub fn cancel(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Store the snap candidates computed for the current frame.
    pub fn record_snap_points(&mut self, points: Vec<SnapPoint>) {
        if let Some(active) = self.active.as_mut() {
            active.state.snap_points = points;
        }
    }

    /// The active gesture, if any.
    pub fn state(&self) -> Option<&DragState> {
        self.active.as_ref().map(|active| &active.state)
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }
}
