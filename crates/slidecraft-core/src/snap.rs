//! Snap candidate generation for dragged elements.
//!
//! Candidates come in four families, always generated in the same order:
//! grid lines, canvas edges, sibling edges, canvas center. The transform
//! resolver walks them in that order, so later families win ties.

use crate::element::ElementData;
use crate::input::DragState;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Grid size for snapping (matches the visual grid).
pub const GRID_SIZE: f64 = 20.0;

/// Base snap distance in canvas pixels, scaled by each candidate's strength.
pub const SNAP_THRESHOLD: f64 = 8.0;

/// Strength of grid line candidates.
pub const GRID_STRENGTH: f64 = 0.8;
/// Strength of canvas edge candidates.
pub const EDGE_STRENGTH: f64 = 1.0;
/// Strength of sibling alignment candidates.
pub const OBJECT_STRENGTH: f64 = 0.9;
/// Strength of canvas center candidates.
pub const CENTER_STRENGTH: f64 = 1.0;

/// Angle snap increment in degrees.
pub const ANGLE_SNAP_INCREMENT: f64 = 15.0;

/// Family a snap candidate belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapKind {
    Grid,
    Edge,
    Object,
    Center,
}

/// Axis a snap candidate acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapAxis {
    X,
    Y,
    /// Point target: both coordinates must be in range.
    Both,
}

impl SnapAxis {
    pub fn affects_x(self) -> bool {
        matches!(self, SnapAxis::X | SnapAxis::Both)
    }

    pub fn affects_y(self) -> bool {
        matches!(self, SnapAxis::Y | SnapAxis::Both)
    }
}

/// A candidate alignment target for the dragged element's top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapPoint {
    pub id: String,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type")]
    pub kind: SnapKind,
    /// How strongly the candidate pulls, in `[0, 1]`.
    pub strength: f64,
    pub axis: SnapAxis,
}

impl SnapPoint {
    /// Candidate acting on x only. `y` carries the raw target for reference.
    fn on_x(id: impl Into<String>, x: f64, y: f64, kind: SnapKind, strength: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            kind,
            strength,
            axis: SnapAxis::X,
        }
    }

    /// Candidate acting on y only. `x` carries the raw target for reference.
    fn on_y(id: impl Into<String>, x: f64, y: f64, kind: SnapKind, strength: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            kind,
            strength,
            axis: SnapAxis::Y,
        }
    }

    /// Effective capture distance for a base threshold.
    pub fn reach(&self, threshold: f64) -> f64 {
        threshold * self.strength
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Nearest grid line to `value`.
pub fn nearest_grid_line(value: f64, grid_size: f64) -> f64 {
    (value / grid_size).round() * grid_size
}

/// Compute snap candidates for `dragged` at its provisional position.
///
/// The provisional position is the element origin plus the constrained
/// delta of `drag_state`. `siblings` may contain the dragged element itself;
/// it is skipped by id. Output order is grid, edge, object, center.
pub fn compute_snap_points(
    dragged: &ElementData,
    drag_state: &DragState,
    siblings: &[ElementData],
    grid_size: f64,
    canvas_size: Size,
) -> Vec<SnapPoint> {
    let new_x = dragged.x + drag_state.delta.x;
    let new_y = dragged.y + drag_state.delta.y;
    let (w, h) = (dragged.width, dragged.height);

    let mut points = Vec::with_capacity(10 + siblings.len() * 4);
    let on_x = |id: String, x: f64, kind, strength| SnapPoint::on_x(id, x, new_y, kind, strength);
    let on_y = |id: String, y: f64, kind, strength| SnapPoint::on_y(id, new_x, y, kind, strength);

    // Grid
    let grid_x = nearest_grid_line(new_x, grid_size);
    let grid_y = nearest_grid_line(new_y, grid_size);
    points.push(on_x("grid-x".into(), grid_x, SnapKind::Grid, GRID_STRENGTH));
    points.push(on_y("grid-y".into(), grid_y, SnapKind::Grid, GRID_STRENGTH));

    // Canvas edges
    points.push(on_x("edge-left".into(), 0.0, SnapKind::Edge, EDGE_STRENGTH));
    points.push(on_x("edge-right".into(), canvas_size.width - w, SnapKind::Edge, EDGE_STRENGTH));
    points.push(on_y("edge-top".into(), 0.0, SnapKind::Edge, EDGE_STRENGTH));
    points.push(on_y("edge-bottom".into(), canvas_size.height - h, SnapKind::Edge, EDGE_STRENGTH));

    // Sibling edges: place the dragged element flush against each side.
    for other in siblings.iter().filter(|other| other.id != dragged.id) {
        let id = &other.id;
        let (kind, strength) = (SnapKind::Object, OBJECT_STRENGTH);
        points.push(on_x(format!("object-{id}-left-of"), other.x - w, kind, strength));
        points.push(on_x(format!("object-{id}-right-of"), other.x + other.width, kind, strength));
        points.push(on_y(format!("object-{id}-above"), other.y - h, kind, strength));
        points.push(on_y(format!("object-{id}-below"), other.y + other.height, kind, strength));
    }

    // Canvas center
    let (kind, strength) = (SnapKind::Center, CENTER_STRENGTH);
    points.push(on_x("center-x".into(), (canvas_size.width - w) / 2.0, kind, strength));
    points.push(on_y("center-y".into(), (canvas_size.height - h) / 2.0, kind, strength));

    points
}

/// Snap an angle to the nearest increment.
/// Returns the snapped angle in degrees (0-360).
pub fn snap_angle(angle_degrees: f64, increment: f64) -> f64 {
    let snapped = ((angle_degrees / increment).round() * increment).rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if snapped >= 360.0 { 0.0 } else { snapped }
}

/// Sibling working set captured at gesture start.
#[derive(Debug, Clone)]
pub struct SnapResolver {
    grid_size: f64,
    canvas_size: Size,
    siblings: Vec<ElementData>,
}

impl SnapResolver {
    pub fn new(grid_size: f64, canvas_size: Size) -> Self {
        Self {
            grid_size,
            canvas_size,
            siblings: Vec::new(),
        }
    }

    /// Capture the geometry of every element except `dragged_id`.
    pub fn load(&mut self, dragged_id: &str, slide: &[ElementData]) {
        self.siblings = slide
            .iter()
            .filter(|element| element.id != dragged_id)
            .cloned()
            .collect();
    }

    /// Forget the working set.
    pub fn clear(&mut self) {
        self.siblings.clear();
    }

    pub fn siblings(&self) -> &[ElementData] {
        &self.siblings
    }

    /// Candidates for `dragged` against the captured working set.
    pub fn compute(&self, dragged: &ElementData, drag_state: &DragState) -> Vec<SnapPoint> {
        compute_snap_points(dragged, drag_state, &self.siblings, self.grid_size, self.canvas_size)
    }
}
