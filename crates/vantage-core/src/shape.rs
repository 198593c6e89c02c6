//! Shape data model for the canvas.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes. Minted by [`Shape::new`], owned by the
/// shape-management collaborator.
pub type ShapeId = String;

/// The closed set of shape kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Square,
    Circle,
    Triangle,
    Text,
}

/// A shape on the logical plane.
///
/// `(x, y)` is the top-left of the bounding box for every kind; `width` and
/// `height` define that box even for `Circle` (inscribed) and `Triangle`
/// (apex at top-center, base corners at bottom-left/right). The creating
/// collaborator keeps `width > 0 && height > 0`; the hit-test predicates
/// guard degenerate values rather than assume the invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// CSS-style hex color, parsed by the render layer.
    pub color: String,
    /// Text content, `None` for non-text kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Shape {
    /// Default bounding-box size for newly created shapes.
    pub const DEFAULT_SIZE: f64 = 100.0;
    /// Default bounding box for new text shapes.
    pub const DEFAULT_TEXT_SIZE: (f64, f64) = (160.0, 40.0);

    /// Create a shape of the given kind at a logical position, with a fresh
    /// id and the default size for its kind.
    pub fn new(kind: ShapeKind, x: f64, y: f64) -> Self {
        let (width, height) = match kind {
            ShapeKind::Text => Self::DEFAULT_TEXT_SIZE,
            _ => (Self::DEFAULT_SIZE, Self::DEFAULT_SIZE),
        };
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            x,
            y,
            width,
            height,
            color: "#1e1e1e".to_string(),
            content: match kind {
                ShapeKind::Text => Some(String::new()),
                _ => None,
            },
        }
    }

    /// Set the color, builder style.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Set the bounding-box size, builder style.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// The bounding box in logical coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// The center of the bounding box.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Radius of the inscribed circle.
    pub fn radius(&self) -> f64 {
        self.width.min(self.height) / 2.0
    }

    /// Triangle vertices: apex, base-left, base-right.
    pub fn triangle_vertices(&self) -> [Point; 3] {
        [
            Point::new(self.x + self.width / 2.0, self.y),
            Point::new(self.x, self.y + self.height),
            Point::new(self.x + self.width, self.y + self.height),
        ]
    }

    /// Move the top-left corner to an absolute logical position.
    pub fn translate_to(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }
}
