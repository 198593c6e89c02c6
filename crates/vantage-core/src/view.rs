//! View transform between screen space and the unbounded logical plane.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum allowed zoom level.
pub const MIN_ZOOM: f64 = 0.1;
/// Maximum allowed zoom level.
pub const MAX_ZOOM: f64 = 5.0;

/// The affine map from logical coordinates to screen coordinates.
///
/// `screen = logical * zoom + offset`. The view state is owned by the
/// interaction layer and mutated only through the pan/zoom/fit operations
/// below; collaborators read snapshots and persist them on change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Current translation offset (pan), in screen units.
    pub offset: Vec2,
    /// Current zoom level. Always within `[MIN_ZOOM, MAX_ZOOM]`.
    pub zoom: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewState {
    /// Create a view state at the identity transform.
    pub fn new() -> Self {
        Self::default()
    }

    /// The transform for rendering, logical to screen.
    ///
    /// Hit testing and drawing must both consume this exact value; the
    /// inverse below is derived from the same components so the two can
    /// never disagree.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// The inverse transform for input handling, screen to logical.
    pub fn inverse_affine(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to logical coordinates.
    pub fn to_logical(&self, screen: Point) -> Point {
        self.inverse_affine() * screen
    }

    /// Convert a logical point to screen coordinates.
    pub fn to_screen(&self, logical: Point) -> Point {
        self.affine() * logical
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom by `factor`, keeping the given screen point fixed.
    ///
    /// The logical point under the pivot is captured from the pre-update
    /// state; repeated rapid zoom events therefore cannot drift.
    pub fn zoom_at(&mut self, pivot: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let logical_at_pivot = self.to_logical(pivot);
        self.zoom = new_zoom;

        let new_screen = self.to_screen(logical_at_pivot);
        self.offset += Vec2::new(pivot.x - new_screen.x, pivot.y - new_screen.y);
    }

    /// The view that places the logical origin at the viewport center at
    /// zoom 1. Fallback for empty content and malformed restore input.
    pub fn centered_on_origin(viewport: Size) -> Self {
        Self {
            offset: Vec2::new(viewport.width / 2.0, viewport.height / 2.0),
            zoom: 1.0,
        }
    }

    /// Fit the given logical bounds into the viewport.
    ///
    /// The bounds are inflated by `padding` on all sides, zoom is
    /// `min(vw/bw, vh/bh, max_zoom)` clamped to the allowed range, and the
    /// box is centered. `None` or zero-area bounds degenerate to
    /// [`ViewState::centered_on_origin`].
    pub fn fit_to_bounds(
        bounds: Option<Rect>,
        viewport: Size,
        padding: f64,
        max_zoom: f64,
    ) -> Self {
        let bounds = match bounds {
            Some(b) if !b.is_zero_area() => b.inflate(padding, padding),
            _ => return Self::centered_on_origin(viewport),
        };

        let zoom = (viewport.width / bounds.width())
            .min(viewport.height / bounds.height())
            .min(max_zoom)
            .clamp(MIN_ZOOM, MAX_ZOOM);

        let bounds_center = bounds.center();
        let viewport_center = Point::new(viewport.width / 2.0, viewport.height / 2.0);

        Self {
            offset: Vec2::new(
                viewport_center.x - bounds_center.x * zoom,
                viewport_center.y - bounds_center.y * zoom,
            ),
            zoom,
        }
    }

    /// Restore a persisted view state, falling back to the centered default
    /// when the input is missing, malformed, or carries a non-positive zoom.
    pub fn restore(json: Option<&str>, viewport: Size) -> Self {
        let Some(json) = json else {
            return Self::centered_on_origin(viewport);
        };
        match serde_json::from_str::<ViewState>(json) {
            Ok(mut view) if view.zoom > 0.0 && view.zoom.is_finite() => {
                view.zoom = view.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
                view
            }
            Ok(_) => {
                log::warn!("restored view state has invalid zoom, using default");
                Self::centered_on_origin(viewport)
            }
            Err(err) => {
                log::warn!("failed to parse persisted view state: {err}");
                Self::centered_on_origin(viewport)
            }
        }
    }

    /// The logical point currently at the viewport center.
    pub fn viewport_center_logical(&self, viewport: Size) -> Point {
        self.to_logical(Point::new(viewport.width / 2.0, viewport.height / 2.0))
    }
}
