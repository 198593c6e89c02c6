//! Point-in-shape and rectangle-intersects-shape predicates.
//!
//! All predicates take logical coordinates. Degenerate geometry (zero-area
//! triangles, zero-radius circles) reports "no hit" instead of dividing by
//! zero.

use crate::shape::{Shape, ShapeId, ShapeKind};
use kurbo::{Point, Rect};

/// Inclusive axis-aligned containment.
fn rect_contains(rect: Rect, p: Point) -> bool {
    p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
}

/// Inclusive AABB overlap.
fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && a.x1 >= b.x0 && a.y0 <= b.y1 && a.y1 >= b.y0
}

/// Barycentric point-in-triangle test. A zero-area triangle hits nothing.
fn point_in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let v0 = c - a;
    let v1 = b - a;
    let v2 = p - a;

    let dot00 = v0.dot(v0);
    let dot01 = v0.dot(v1);
    let dot02 = v0.dot(v2);
    let dot11 = v1.dot(v1);
    let dot12 = v1.dot(v2);

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom.abs() < f64::EPSILON {
        return false;
    }
    let inv = 1.0 / denom;
    let u = (dot11 * dot02 - dot01 * dot12) * inv;
    let v = (dot00 * dot12 - dot01 * dot02) * inv;

    u >= 0.0 && v >= 0.0 && u + v <= 1.0
}

/// Distance from a point to the closest point on a rectangle (zero inside).
fn distance_to_rect(rect: Rect, p: Point) -> f64 {
    let dx = p.x - p.x.clamp(rect.x0, rect.x1);
    let dy = p.y - p.y.clamp(rect.y0, rect.y1);
    (dx * dx + dy * dy).sqrt()
}

/// Check whether a logical point hits the shape.
pub fn point_in_shape(p: Point, shape: &Shape) -> bool {
    match shape.kind {
        ShapeKind::Square | ShapeKind::Text => rect_contains(shape.bounds(), p),
        ShapeKind::Circle => {
            let radius = shape.radius();
            if radius <= 0.0 {
                return false;
            }
            let center = shape.center();
            (p - center).hypot() <= radius
        }
        ShapeKind::Triangle => {
            let [apex, left, right] = shape.triangle_vertices();
            point_in_triangle(p, apex, left, right)
        }
    }
}

/// Check whether a rectangle (already normalized to min/max corners)
/// intersects the shape.
pub fn rect_intersects(rect: Rect, shape: &Shape) -> bool {
    match shape.kind {
        ShapeKind::Square | ShapeKind::Text => rects_overlap(rect, shape.bounds()),
        ShapeKind::Circle => {
            let radius = shape.radius();
            radius > 0.0 && distance_to_rect(rect, shape.center()) <= radius
        }
        ShapeKind::Triangle => {
            let verts = shape.triangle_vertices();
            if verts.iter().any(|&v| rect_contains(rect, v)) {
                return true;
            }
            let [apex, left, right] = verts;
            if point_in_triangle(rect.center(), apex, left, right) {
                return true;
            }
            // Conservative fallback: bounding-box overlap. Thin triangles
            // with a large box can report false positives.
            rects_overlap(rect, shape.bounds())
        }
    }
}

/// The topmost shape under a logical point.
///
/// Later list entries paint on top, so iteration runs in reverse and the
/// first match wins.
pub fn top_hit<'a>(shapes: &'a [Shape], p: Point) -> Option<&'a Shape> {
    shapes.iter().rev().find(|shape| point_in_shape(p, shape))
}

/// Ids of all shapes intersecting the rectangle, in list order.
pub fn shapes_in_rect(shapes: &[Shape], rect: Rect) -> Vec<ShapeId> {
    shapes
        .iter()
        .filter(|shape| rect_intersects(rect, shape))
        .map(|shape| shape.id.clone())
        .collect()
}
