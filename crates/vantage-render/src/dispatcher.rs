//! Frame dispatch: viewport snapshot in, draw commands out.

use crate::background::{self, BackgroundKind};
use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape as KurboShape, Size};
use peniko::Color;
use vantage_core::shape::{Shape, ShapeId, ShapeKind};
use vantage_core::view::ViewState;

/// Selection highlight color.
const SELECTION_COLOR: Color = Color::from_rgba8(59, 130, 246, 255);
/// Rubber-band interior.
const RUBBER_BAND_FILL: Color = Color::from_rgba8(59, 130, 246, 40);
/// Highlight stroke width in screen pixels.
const SELECTION_STROKE_WIDTH: f64 = 1.5;
/// Gap between a selected shape and its highlight, in screen pixels.
const SELECTION_PADDING: f64 = 4.0;
/// Font size for text shapes, in logical units.
const TEXT_FONT_SIZE: f64 = 16.0;
/// Curve flattening tolerance for generated paths.
const PATH_TOLERANCE: f64 = 0.1;

/// Everything a frame needs, borrowed from the owning collaborators.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub view: &'a ViewState,
    pub viewport: Size,
    pub background: BackgroundKind,
    /// Shapes in insertion order; later entries paint on top.
    pub shapes: &'a [Shape],
    pub selection: &'a [ShapeId],
    /// Active rubber-band rectangle in logical coordinates, if any.
    pub rubber_band: Option<Rect>,
}

/// One draw call. Geometry is logical-space; the surface applies the frame
/// transform.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fill { path: BezPath, color: Color },
    Stroke { path: BezPath, width: f64, color: Color },
    Text { origin: Point, size: f64, content: String, color: Color },
}

/// An ordered command list plus the single logical-to-screen transform it
/// was built for, the same `ViewState::affine()` the hit tester uses.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameCommands {
    pub transform: Affine,
    pub commands: Vec<DrawCommand>,
}

/// Build the draw commands for one frame. Pure: no state survives the call.
pub fn render_frame(frame: &Frame) -> FrameCommands {
    let mut commands = background::background_commands(frame.background, frame.view, frame.viewport);

    for shape in frame.shapes {
        push_shape(&mut commands, shape);
    }

    let zoom = frame.view.zoom;
    for id in frame.selection {
        if let Some(shape) = frame.shapes.iter().find(|s| &s.id == id) {
            let pad = SELECTION_PADDING / zoom;
            commands.push(DrawCommand::Stroke {
                path: shape.bounds().inflate(pad, pad).to_path(PATH_TOLERANCE),
                width: SELECTION_STROKE_WIDTH / zoom,
                color: SELECTION_COLOR,
            });
        }
    }

    if let Some(rect) = frame.rubber_band {
        let path = rect.to_path(PATH_TOLERANCE);
        commands.push(DrawCommand::Fill {
            path: path.clone(),
            color: RUBBER_BAND_FILL,
        });
        commands.push(DrawCommand::Stroke {
            path,
            width: SELECTION_STROKE_WIDTH / zoom,
            color: SELECTION_COLOR,
        });
    }

    FrameCommands {
        transform: frame.view.affine(),
        commands,
    }
}

fn push_shape(commands: &mut Vec<DrawCommand>, shape: &Shape) {
    let color = parse_color(&shape.color);
    match shape.kind {
        ShapeKind::Square => commands.push(DrawCommand::Fill {
            path: shape.bounds().to_path(PATH_TOLERANCE),
            color,
        }),
        ShapeKind::Circle => {
            let radius = shape.radius();
            if radius > 0.0 {
                commands.push(DrawCommand::Fill {
                    path: Circle::new(shape.center(), radius).to_path(PATH_TOLERANCE),
                    color,
                });
            }
        }
        ShapeKind::Triangle => {
            let [apex, left, right] = shape.triangle_vertices();
            let mut path = BezPath::new();
            path.move_to(apex);
            path.line_to(left);
            path.line_to(right);
            path.close_path();
            commands.push(DrawCommand::Fill { path, color });
        }
        ShapeKind::Text => commands.push(DrawCommand::Text {
            origin: Point::new(shape.x, shape.y),
            size: TEXT_FONT_SIZE,
            content: shape.content.clone().unwrap_or_default(),
            color,
        }),
    }
}

/// Parse a CSS-style hex color (`#rgb`, `#rrggbb`, `#rrggbbaa`), defaulting
/// to black for anything unparseable.
pub fn parse_color(color: &str) -> Color {
    if color == "transparent" {
        return Color::from_rgba8(0, 0, 0, 0);
    }

    if let Some(hex) = color.strip_prefix('#') {
        let hex = hex.trim();
        if !hex.is_ascii() {
            return Color::from_rgba8(0, 0, 0, 255);
        }
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).unwrap_or(0) * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).unwrap_or(0) * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).unwrap_or(0) * 17;
                return Color::from_rgba8(r, g, b, 255);
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                return Color::from_rgba8(r, g, b, 255);
            }
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                let a = u8::from_str_radix(&hex[6..8], 16).unwrap_or(255);
                return Color::from_rgba8(r, g, b, a);
            }
            _ => {}
        }
    }

    Color::from_rgba8(0, 0, 0, 255)
}
