//! Provisional transform resolution.
//!
//! Merges the constrained pointer delta with snap candidates into a
//! [`TransformData`] for the dragged element. The working transform lives
//! here until the gesture is committed or cancelled.

use crate::element::{ElementData, TransformData};
use crate::input::{ConstraintType, DragState, GestureKind};
use crate::snap::{ANGLE_SNAP_INCREMENT, SNAP_THRESHOLD, SnapAxis, SnapPoint, snap_angle};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest width/height a resize may produce.
pub const MIN_ELEMENT_SIZE: f64 = 1.0;

/// Resize handle positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResizeHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ResizeHandle {
    /// Whether dragging this handle moves the left edge.
    pub fn moves_left(self) -> bool {
        matches!(self, ResizeHandle::TopLeft | ResizeHandle::Left | ResizeHandle::BottomLeft)
    }

    /// Whether dragging this handle moves the right edge.
    pub fn moves_right(self) -> bool {
        matches!(self, ResizeHandle::TopRight | ResizeHandle::Right | ResizeHandle::BottomRight)
    }

    /// Whether dragging this handle moves the top edge.
    pub fn moves_top(self) -> bool {
        matches!(self, ResizeHandle::TopLeft | ResizeHandle::Top | ResizeHandle::TopRight)
    }

    /// Whether dragging this handle moves the bottom edge.
    pub fn moves_bottom(self) -> bool {
        matches!(self, ResizeHandle::BottomLeft | ResizeHandle::Bottom | ResizeHandle::BottomRight)
    }

    /// Change in (width, height) produced by a pointer delta on this handle.
    fn size_delta(self, delta: Vec2) -> Vec2 {
        let dw = if self.moves_right() {
            delta.x
        } else if self.moves_left() {
            -delta.x
        } else {
            0.0
        };
        let dh = if self.moves_bottom() {
            delta.y
        } else if self.moves_top() {
            -delta.y
        } else {
            0.0
        };
        Vec2::new(dw, dh)
    }
}

/// Working state of the gesture being resolved.
#[derive(Debug, Clone)]
struct WorkingTransform {
    kind: GestureKind,
    /// Element geometry at gesture start.
    origin: TransformData,
    /// `width / height` at gesture start.
    aspect_ratio: f64,
    provisional: TransformData,
    /// Snap candidates that captured the latest update.
    active_snaps: Vec<SnapPoint>,
}

/// Turns drag state into provisional transforms.
#[derive(Debug, Clone)]
pub struct TransformResolver {
    threshold: f64,
    min_size: f64,
    working: Option<WorkingTransform>,
}

impl Default for TransformResolver {
    fn default() -> Self {
        Self::new(SNAP_THRESHOLD, MIN_ELEMENT_SIZE)
    }
}

impl TransformResolver {
    pub fn new(threshold: f64, min_size: f64) -> Self {
        Self {
            threshold,
            min_size,
            working: None,
        }
    }

    /// Start resolving a gesture on `element`.
    pub fn begin(&mut self, element: &ElementData, drag_state: &DragState) -> TransformData {
        let origin = element.transform();
        let aspect_ratio = if origin.height > 0.0 {
            origin.width / origin.height
        } else {
            1.0
        };
        let mut working = WorkingTransform {
            kind: drag_state.kind,
            origin,
            aspect_ratio,
            provisional: origin,
            active_snaps: Vec::new(),
        };
        working.provisional = self.resolve(&mut working, element, drag_state, &[]);
        let provisional = working.provisional;
        self.working = Some(working);
        provisional
    }

    /// Recompute the provisional transform for the latest drag state.
    ///
    /// Returns the element's own geometry when no gesture is in progress.
    pub fn update(
        &mut self,
        element: &ElementData,
        drag_state: &DragState,
        snap_points: &[SnapPoint],
    ) -> TransformData {
        let Some(mut working) = self.working.take() else {
            return element.transform();
        };
        working.provisional = self.resolve(&mut working, element, drag_state, snap_points);
        let provisional = working.provisional;
        self.working = Some(working);
        provisional
    }

    /// Finish the gesture, returning its final transform.
    pub fn commit(&mut self) -> Option<TransformData> {
        self.working.take().map(|working| working.provisional)
    }

    /// Discard the gesture.
    pub fn cancel(&mut self) {
        self.working = None;
    }

    pub fn is_in_progress(&self) -> bool {
        self.working.is_some()
    }

    /// Current provisional transform.
    pub fn provisional(&self) -> Option<&TransformData> {
        self.working.as_ref().map(|working| &working.provisional)
    }

    /// Snap candidates that captured the latest update.
    pub fn active_snaps(&self) -> &[SnapPoint] {
        self.working
            .as_ref()
            .map(|working| working.active_snaps.as_slice())
            .unwrap_or(&[])
    }

    fn resolve(
        &self,
        working: &mut WorkingTransform,
        element: &ElementData,
        drag_state: &DragState,
        snap_points: &[SnapPoint],
    ) -> TransformData {
        match working.kind {
            GestureKind::Move => {
                let target = element.origin() + drag_state.delta;
                let (snapped, winners) =
                    apply_snaps(target, snap_points, self.threshold, drag_state.constraint);
                working.active_snaps = winners;
                TransformData {
                    x: snapped.x,
                    y: snapped.y,
                    ..element.transform()
                }
            }
            GestureKind::Resize(handle) => resize(
                &working.origin,
                handle,
                drag_state.raw_delta,
                ResizeOptions {
                    keep_aspect_ratio: drag_state.modifiers.shift,
                    aspect_ratio: working.aspect_ratio,
                    symmetric: drag_state.constraint == ConstraintType::Center,
                    min_size: self.min_size,
                },
            ),
            GestureKind::Rotate => {
                let rotation = rotate(
                    &working.origin,
                    drag_state.start,
                    drag_state.current,
                    drag_state.modifiers.shift,
                );
                TransformData {
                    rotation,
                    ..working.origin
                }
            }
        }
    }
}

/// Snap `target` against `points` in order.
///
/// Each candidate is measured against the raw target; when several qualify
/// on the same axis the last one wins. Axes frozen by `constraint` are
/// never snapped. Returns the snapped position and the winning candidates.
pub fn apply_snaps(
    target: Point,
    points: &[SnapPoint],
    threshold: f64,
    constraint: ConstraintType,
) -> (Point, Vec<SnapPoint>) {
    let mut snapped = target;
    let mut winner_x: Option<&SnapPoint> = None;
    let mut winner_y: Option<&SnapPoint> = None;
    let mut winner_both: Option<&SnapPoint> = None;

    for point in points {
        let reach = point.reach(threshold);
        let in_x = (target.x - point.x).abs() <= reach && !constraint.locks_x();
        let in_y = (target.y - point.y).abs() <= reach && !constraint.locks_y();
        match point.axis {
            SnapAxis::X if in_x => {
                snapped.x = point.x;
                winner_x = Some(point);
            }
            SnapAxis::Y if in_y => {
                snapped.y = point.y;
                winner_y = Some(point);
            }
            SnapAxis::Both if in_x && in_y => {
                snapped = point.point();
                winner_x = None;
                winner_y = None;
                winner_both = Some(point);
            }
            _ => {}
        }
    }

    let winners = [winner_both, winner_x, winner_y]
        .into_iter()
        .flatten()
        .cloned()
        .collect();
    (snapped, winners)
}

/// Options for [`resize`].
#[derive(Debug, Clone, Copy)]
pub struct ResizeOptions {
    /// Keep `aspect_ratio`, driven by the dominant axis.
    pub keep_aspect_ratio: bool,
    /// Ratio captured at gesture start.
    pub aspect_ratio: f64,
    /// Grow both sides around the center.
    pub symmetric: bool,
    pub min_size: f64,
}

/// Resize `origin` by dragging `handle` by `delta`.
///
/// The edge opposite the handle stays anchored (or the center, when
/// symmetric). Width and height are clamped to `min_size`, never inverted.
pub fn resize(
    origin: &TransformData,
    handle: ResizeHandle,
    delta: Vec2,
    options: ResizeOptions,
) -> TransformData {
    let mut size_delta = handle.size_delta(delta);
    if options.symmetric {
        size_delta *= 2.0;
    }

    let mut width = origin.width + size_delta.x;
    let mut height = origin.height + size_delta.y;

    if options.keep_aspect_ratio && options.aspect_ratio > 0.0 {
        if size_delta.x.abs() >= size_delta.y.abs() {
            height = width / options.aspect_ratio;
        } else {
            width = height * options.aspect_ratio;
        }
    }

    let width = width.max(options.min_size);
    let height = height.max(options.min_size);

    let (x, y) = if options.symmetric {
        let center = origin.center();
        (center.x - width / 2.0, center.y - height / 2.0)
    } else {
        let x = if handle.moves_left() {
            origin.x + origin.width - width
        } else {
            origin.x
        };
        let y = if handle.moves_top() {
            origin.y + origin.height - height
        } else {
            origin.y
        };
        (x, y)
    };

    TransformData {
        x,
        y,
        width,
        height,
        rotation: origin.rotation,
    }
}

/// Rotation in degrees after the pointer moved from `start` to `current`
/// around the center of `origin`.
pub fn rotate(origin: &TransformData, start: Point, current: Point, snap: bool) -> f64 {
    let center = origin.center();
    let start_angle = (start - center).atan2().to_degrees();
    let current_angle = (current - center).atan2().to_degrees();
    let rotation = origin.rotation + (current_angle - start_angle);
    if snap {
        snap_angle(rotation, ANGLE_SNAP_INCREMENT)
    } else {
        rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::snap::{GRID_SIZE, SnapKind, compute_snap_points};
    use kurbo::Size;

    fn drag(
        element: &ElementData,
        kind: GestureKind,
        delta: Vec2,
        constraint: ConstraintType,
    ) -> DragState {
        DragState {
            id: element.id.clone(),
            start: Point::ZERO,
            current: Point::new(delta.x, delta.y),
            start_element: element.origin(),
            delta: constraint.apply(delta),
            raw_delta: delta,
            is_active: true,
            constraint,
            modifiers: Modifiers::NONE,
            kind,
            snap_points: Vec::new(),
        }
    }

    fn snap_free(target: Point, points: &[SnapPoint]) -> (Point, Vec<SnapPoint>) {
        apply_snaps(target, points, 8.0, ConstraintType::None)
    }

    fn grid_x(x: f64) -> SnapPoint {
        SnapPoint {
            id: "grid-x".to_string(),
            x,
            y: 0.0,
            kind: SnapKind::Grid,
            strength: 1.0,
            axis: SnapAxis::X,
        }
    }

    fn options() -> ResizeOptions {
        ResizeOptions {
            keep_aspect_ratio: false,
            aspect_ratio: 1.0,
            symmetric: false,
            min_size: MIN_ELEMENT_SIZE,
        }
    }

    #[test]
    fn test_round_trip_without_movement() {
        let element = ElementData::new("a", 101.0, 57.0, 50.0, 30.0).with_rotation(12.0);
        let state = drag(&element, GestureKind::Move, Vec2::ZERO, ConstraintType::None);
        let mut resolver = TransformResolver::default();

        resolver.begin(&element, &state);
        resolver.update(&element, &state, &[]);
        let committed = resolver.commit().unwrap();

        assert_eq!(committed, element.transform());
        assert!(!resolver.is_in_progress());
    }

    #[test]
    fn test_commit_without_gesture() {
        let mut resolver = TransformResolver::default();
        assert!(resolver.commit().is_none());
    }

    #[test]
    fn test_cancel_discards() {
        let element = ElementData::new("a", 0.0, 0.0, 10.0, 10.0);
        let state = drag(&element, GestureKind::Move, Vec2::new(5.0, 5.0), ConstraintType::None);
        let mut resolver = TransformResolver::default();
        resolver.begin(&element, &state);
        resolver.cancel();
        assert!(resolver.commit().is_none());
        assert!(resolver.provisional().is_none());
    }

    #[test]
    fn test_update_without_begin_is_noop() {
        let element = ElementData::new("a", 3.0, 4.0, 10.0, 10.0);
        let state = drag(&element, GestureKind::Move, Vec2::new(50.0, 50.0), ConstraintType::None);
        let mut resolver = TransformResolver::default();
        assert_eq!(resolver.update(&element, &state, &[]), element.transform());
        assert!(!resolver.is_in_progress());
    }

    #[test]
    fn test_threshold_boundary_full_strength() {
        // reach = 8 * 1.0
        let (near, _) = snap_free(Point::new(107.9, 0.0), &[grid_x(100.0)]);
        assert!((near.x - 100.0).abs() < f64::EPSILON);

        let (far, winners) = snap_free(Point::new(108.1, 0.0), &[grid_x(100.0)]);
        assert!((far.x - 108.1).abs() < f64::EPSILON);
        assert!(winners.is_empty());
    }

    #[test]
    fn test_grid_threshold_scaled_by_strength() {
        let element = ElementData::new("a", 0.0, 3.0, 10.0, 10.0);
        let canvas = Size::new(960.0, 540.0);
        let mut resolver = TransformResolver::default();

        // Grid reach is 8 * 0.8 = 6.4: 6.3 px from x = 100 snaps, 6.5 px does not.
        for (dx, expected) in [(106.3, 100.0), (93.7, 100.0), (106.5, 106.5)] {
            let state = drag(&element, GestureKind::Move, Vec2::new(dx, 0.0), ConstraintType::None);
            let points = compute_snap_points(&element, &state, &[], GRID_SIZE, canvas);
            resolver.begin(&element, &state);
            let result = resolver.update(&element, &state, &points);
            assert!((result.x - expected).abs() < 1e-9, "dx {dx}: got {}", result.x);
            resolver.cancel();
        }
    }

    #[test]
    fn test_seven_px_snaps_only_at_full_strength() {
        let element = ElementData::new("a", 0.0, 3.0, 10.0, 10.0);
        let canvas = Size::new(960.0, 540.0);
        let mut resolver = TransformResolver::default();

        // x = 107: 7px from grid 100 (reach 6.4). x = 7: 7px from the left edge (reach 8).
        // 9px misses both.
        for (dx, expected) in [(107.0, 107.0), (109.0, 109.0), (7.0, 0.0), (9.0, 9.0)] {
            let state = drag(&element, GestureKind::Move, Vec2::new(dx, 0.0), ConstraintType::None);
            let points = compute_snap_points(&element, &state, &[], GRID_SIZE, canvas);
            resolver.begin(&element, &state);
            let result = resolver.update(&element, &state, &points);
            assert!((result.x - expected).abs() < 1e-9, "dx {dx}: got {}", result.x);
            resolver.cancel();
        }
    }

    #[test]
    fn test_later_family_wins() {
        let points = vec![
            grid_x(140.0),
            SnapPoint {
                id: "object-b-left-of".to_string(),
                x: 150.0,
                y: 0.0,
                kind: SnapKind::Object,
                strength: 0.9,
                axis: SnapAxis::X,
            },
        ];
        let (snapped, winners) = snap_free(Point::new(146.0, 0.0), &points);
        assert!((snapped.x - 150.0).abs() < f64::EPSILON);
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].kind, SnapKind::Object);
    }

    #[test]
    fn test_point_snap_requires_both_axes() {
        let point = SnapPoint {
            id: "corner".to_string(),
            x: 10.0,
            y: 10.0,
            kind: SnapKind::Object,
            strength: 1.0,
            axis: SnapAxis::Both,
        };
        let (snapped, _) = snap_free(Point::new(12.0, 30.0), std::slice::from_ref(&point));
        assert_eq!(snapped, Point::new(12.0, 30.0));

        let (snapped, winners) = snap_free(Point::new(12.0, 14.0), &[point]);
        assert_eq!(snapped, Point::new(10.0, 10.0));
        assert_eq!(winners.len(), 1);
    }

    #[test]
    fn test_horizontal_lock_ignores_y_snaps() {
        // Start y of 103 is within grid reach of 100, but y is locked.
        let element = ElementData::new("a", 0.0, 103.0, 10.0, 10.0);
        let delta = Vec2::new(37.0, 55.0);
        let state = drag(&element, GestureKind::Move, delta, ConstraintType::Horizontal);
        let points = compute_snap_points(&element, &state, &[], GRID_SIZE, Size::new(960.0, 540.0));
        let mut resolver = TransformResolver::default();
        resolver.begin(&element, &state);
        let result = resolver.update(&element, &state, &points);

        assert!((result.y - 103.0).abs() < f64::EPSILON);
        assert!((result.x - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_bottom_right() {
        let origin = TransformData::new(0.0, 0.0, 100.0, 100.0, 0.0);
        let result = resize(&origin, ResizeHandle::BottomRight, Vec2::new(50.0, 20.0), options());
        assert_eq!(result, TransformData::new(0.0, 0.0, 150.0, 120.0, 0.0));
    }

    #[test]
    fn test_resize_top_left_anchors_bottom_right() {
        let origin = TransformData::new(10.0, 10.0, 100.0, 100.0, 30.0);
        let result = resize(&origin, ResizeHandle::TopLeft, Vec2::new(20.0, -10.0), options());
        assert_eq!(result, TransformData::new(30.0, 0.0, 80.0, 110.0, 30.0));
    }

    #[test]
    fn test_edge_handle_changes_one_dimension() {
        let origin = TransformData::new(0.0, 0.0, 100.0, 50.0, 0.0);
        let result = resize(&origin, ResizeHandle::Right, Vec2::new(10.0, 99.0), options());
        assert!((result.width - 110.0).abs() < f64::EPSILON);
        assert!((result.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_floor() {
        let origin = TransformData::new(0.0, 0.0, 50.0, 50.0, 0.0);
        let result = resize(&origin, ResizeHandle::BottomRight, Vec2::new(-60.0, -60.0), options());
        assert!((result.width - 1.0).abs() < f64::EPSILON);
        assert!((result.height - 1.0).abs() < f64::EPSILON);
        assert!((result.x).abs() < f64::EPSILON);

        // Dragging the left handle past the right edge keeps the right edge fixed.
        let result = resize(&origin, ResizeHandle::Left, Vec2::new(60.0, 0.0), options());
        assert!((result.width - 1.0).abs() < f64::EPSILON);
        assert!((result.x - 49.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_floor_through_resolver() {
        let element = ElementData::new("a", 0.0, 0.0, 50.0, 50.0);
        let state = drag(
            &element,
            GestureKind::Resize(ResizeHandle::Right),
            Vec2::new(-60.0, 0.0),
            ConstraintType::None,
        );
        let mut resolver = TransformResolver::default();
        resolver.begin(&element, &state);
        resolver.update(&element, &state, &[]);
        let committed = resolver.commit().unwrap();
        assert!((committed.width - MIN_ELEMENT_SIZE).abs() < f64::EPSILON);
        assert!(committed.width > 0.0);
    }

    #[test]
    fn test_aspect_ratio_resize() {
        let origin = TransformData::new(0.0, 0.0, 100.0, 50.0, 0.0);
        let opts = ResizeOptions {
            keep_aspect_ratio: true,
            aspect_ratio: 2.0,
            ..options()
        };

        // Width dominates.
        let result = resize(&origin, ResizeHandle::BottomRight, Vec2::new(100.0, 10.0), opts);
        assert!((result.width - 200.0).abs() < f64::EPSILON);
        assert!((result.height - 100.0).abs() < f64::EPSILON);

        // Height dominates.
        let result = resize(&origin, ResizeHandle::BottomRight, Vec2::new(5.0, 50.0), opts);
        assert!((result.height - 100.0).abs() < f64::EPSILON);
        assert!((result.width - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_aspect_ratio_captured_at_begin() {
        let element = ElementData::new("a", 0.0, 0.0, 100.0, 50.0);
        let mut resolver = TransformResolver::default();
        let mut state = drag(
            &element,
            GestureKind::Resize(ResizeHandle::BottomRight),
            Vec2::ZERO,
            ConstraintType::None,
        );
        state.modifiers = Modifiers::shift();
        resolver.begin(&element, &state);

        // Several frames in a row must not drift the ratio.
        for step in 1..=5 {
            state.raw_delta = Vec2::new(f64::from(step) * 13.0, f64::from(step) * 3.0);
            let result = resolver.update(&element, &state, &[]);
            assert!((result.width / result.height - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_symmetric_resize_keeps_center() {
        let origin = TransformData::new(100.0, 100.0, 50.0, 50.0, 0.0);
        let opts = ResizeOptions {
            symmetric: true,
            ..options()
        };
        let result = resize(&origin, ResizeHandle::BottomRight, Vec2::new(10.0, 10.0), opts);
        assert!((result.width - 70.0).abs() < f64::EPSILON);
        assert_eq!(result.center(), origin.center());
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let origin = TransformData::new(0.0, 0.0, 100.0, 100.0, 0.0);
        // From right of center to below center: +90 degrees.
        let rotation = rotate(&origin, Point::new(100.0, 50.0), Point::new(50.0, 100.0), false);
        assert!((rotation - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_snaps_to_increment() {
        let origin = TransformData::new(0.0, 0.0, 100.0, 100.0, 10.0);
        let start = Point::new(100.0, 50.0);
        let current = Point::new(50.0 + 50.0 * 0.3_f64.cos(), 50.0 + 50.0 * 0.3_f64.sin());
        let free = rotate(&origin, start, current, false);
        let snapped = rotate(&origin, start, current, true);
        assert!((free - (10.0 + 0.3_f64.to_degrees())).abs() < 1e-9);
        assert!((snapped - 30.0).abs() < 1e-9);
    }
}
