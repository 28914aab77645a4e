//! SlideCraft Core Library
//!
//! Platform-agnostic direct-manipulation engine for the SlideCraft slide
//! editor: pointer capture, snapping, transform resolution, frame gating
//! and undo history.

pub mod config;
pub mod element;
pub mod engine;
pub mod error;
pub mod history;
pub mod input;
pub mod scheduler;
pub mod snap;
pub mod suppress;
pub mod transform;

pub use config::{CANVAS_HEIGHT, CANVAS_WIDTH, EngineConfig};
pub use element::{ElementData, ElementId, TransformData};
pub use engine::{CommitOutcome, DragEngine, GestureId, GesturePhase};
pub use error::{ConfigError, ConfigResult, GestureError};
pub use history::{HistoryEntry, HistoryStack, SnapshotItem};
pub use input::{
    CanvasViewport, ConstraintType, DragState, GestureKind, InputLayer, Modifiers, PointerEvent,
};
pub use scheduler::{FrameOutcome, FrameScheduler, LoopHandle};
pub use snap::{
    GRID_SIZE, SNAP_THRESHOLD, SnapAxis, SnapKind, SnapPoint, SnapResolver, compute_snap_points,
    snap_angle,
};
pub use suppress::{InputSuppression, NoopSuppression, SuppressionCounter, SuppressionGuard};
pub use transform::{ResizeHandle, TransformResolver};
