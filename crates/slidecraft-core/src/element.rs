//! Slide element geometry as seen by the manipulation engine.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Stable identifier of a slide element.
pub type ElementId = String;

/// Geometric identity of a slide object.
///
/// Owned by the document model; the engine only reads it and proposes
/// [`TransformData`] updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementData {
    pub id: ElementId,
    /// Left edge in canvas pixels.
    pub x: f64,
    /// Top edge in canvas pixels.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Rotation in degrees around the element center.
    #[serde(default)]
    pub rotation: f64,
    /// Content tag (text, shape, chart...). Not interpreted by the engine.
    #[serde(rename = "type", default)]
    pub kind: String,
}

impl ElementData {
    /// Create an unrotated element with an empty content tag.
    pub fn new(id: impl Into<ElementId>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width,
            height,
            rotation: 0.0,
            kind: String::new(),
        }
    }

    /// Set the content tag.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Set the rotation in degrees.
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Axis-aligned bounds, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin(), self.size())
    }

    /// Current geometry as a transform.
    pub fn transform(&self) -> TransformData {
        TransformData {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            rotation: self.rotation,
        }
    }

    /// Copy of this element with the given geometry applied.
    pub fn with_transform(&self, transform: &TransformData) -> Self {
        Self {
            x: transform.x,
            y: transform.y,
            width: transform.width,
            height: transform.height,
            rotation: transform.rotation,
            ..self.clone()
        }
    }
}

/// Proposed geometry for one element at one instant.
///
/// Provisional while a gesture runs, committed once it ends.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransformData {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees.
    pub rotation: f64,
}

impl TransformData {
    pub fn new(x: f64, y: f64, width: f64, height: f64, rotation: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Axis-aligned bounds, ignoring rotation.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin(), Size::new(self.width, self.height))
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Raise width and height to at least `min_size`.
    /// The top-left corner is left where it is.
    pub fn clamped(mut self, min_size: f64) -> Self {
        self.width = self.width.max(min_size);
        self.height = self.height.max(min_size);
        self
    }
}

impl From<&ElementData> for TransformData {
    fn from(element: &ElementData) -> Self {
        element.transform()
    }
}
