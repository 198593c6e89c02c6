//! Background tiling styles.
//!
//! Each style is a pure function of the visible logical extent: the
//! viewport is pulled through the inverse view transform, tile positions
//! snap to the origin-aligned period, and stroke widths divide by zoom so
//! lines keep a constant screen weight.

use crate::dispatcher::DrawCommand;
use kurbo::{BezPath, Circle, Point, Rect, Shape as KurboShape, Size};
use peniko::Color;
use vantage_core::view::ViewState;

/// Tiling period in logical units.
pub const TILE_SIZE: f64 = 40.0;
/// Ring spacing for the radar style.
const RADAR_RING_SPACING: f64 = TILE_SIZE * 2.0;
/// Radar spoke step in degrees.
const RADAR_SPOKE_STEP_DEG: f64 = 30.0;
/// Base stroke width in screen pixels.
const LINE_WIDTH: f64 = 1.0;
/// Dot radius in screen pixels.
const DOT_RADIUS: f64 = 1.5;
/// Isometric slope, 30 degrees from horizontal.
const ISO_SLOPE: f64 = 0.577_350_269_189_625_8;

const LINE_COLOR: Color = Color::from_rgba8(200, 200, 200, 100);
const DOT_COLOR: Color = Color::from_rgba8(180, 180, 180, 160);

/// Background pattern drawn behind the shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackgroundKind {
    #[default]
    Grid,
    Dotted,
    Ruled,
    Diagonal,
    Isometric,
    Radar,
}

impl BackgroundKind {
    /// Cycle to the next background style.
    pub fn next(self) -> Self {
        match self {
            BackgroundKind::Grid => BackgroundKind::Dotted,
            BackgroundKind::Dotted => BackgroundKind::Ruled,
            BackgroundKind::Ruled => BackgroundKind::Diagonal,
            BackgroundKind::Diagonal => BackgroundKind::Isometric,
            BackgroundKind::Isometric => BackgroundKind::Radar,
            BackgroundKind::Radar => BackgroundKind::Grid,
        }
    }

    /// Display name for this background style.
    pub fn name(self) -> &'static str {
        match self {
            BackgroundKind::Grid => "Grid",
            BackgroundKind::Dotted => "Dotted",
            BackgroundKind::Ruled => "Ruled",
            BackgroundKind::Diagonal => "Diagonal",
            BackgroundKind::Isometric => "Isometric",
            BackgroundKind::Radar => "Radar",
        }
    }
}

/// The logical rectangle currently visible in the viewport.
fn visible_rect(view: &ViewState, viewport: Size) -> Rect {
    let tl = view.to_logical(Point::ZERO);
    let br = view.to_logical(Point::new(viewport.width, viewport.height));
    Rect::new(tl.x, tl.y, br.x, br.y)
}

/// Snap an extent outward to origin-aligned multiples of `period`.
fn tile_bounds(visible: Rect, period: f64) -> (f64, f64, f64, f64) {
    (
        (visible.x0 / period).floor() * period,
        (visible.y0 / period).floor() * period,
        (visible.x1 / period).ceil() * period,
        (visible.y1 / period).ceil() * period,
    )
}

fn line(p0: Point, p1: Point) -> BezPath {
    let mut path = BezPath::new();
    path.move_to(p0);
    path.line_to(p1);
    path
}

fn stroke(path: BezPath, zoom: f64) -> DrawCommand {
    DrawCommand::Stroke {
        path,
        width: LINE_WIDTH / zoom,
        color: LINE_COLOR,
    }
}

/// Emit the tiling commands for a background style.
pub fn background_commands(
    kind: BackgroundKind,
    view: &ViewState,
    viewport: Size,
) -> Vec<DrawCommand> {
    let visible = visible_rect(view, viewport);
    let zoom = view.zoom;
    match kind {
        BackgroundKind::Grid => grid(visible, zoom),
        BackgroundKind::Dotted => dotted(visible, zoom),
        BackgroundKind::Ruled => ruled(visible, zoom),
        BackgroundKind::Diagonal => diagonal(visible, zoom),
        BackgroundKind::Isometric => isometric(visible, zoom),
        BackgroundKind::Radar => radar(visible, zoom),
    }
}

fn grid(visible: Rect, zoom: f64) -> Vec<DrawCommand> {
    let (start_x, start_y, end_x, end_y) = tile_bounds(visible, TILE_SIZE);
    let mut commands = Vec::new();

    let mut x = start_x;
    while x <= end_x {
        commands.push(stroke(line(Point::new(x, start_y), Point::new(x, end_y)), zoom));
        x += TILE_SIZE;
    }
    let mut y = start_y;
    while y <= end_y {
        commands.push(stroke(line(Point::new(start_x, y), Point::new(end_x, y)), zoom));
        y += TILE_SIZE;
    }
    commands
}

fn dotted(visible: Rect, zoom: f64) -> Vec<DrawCommand> {
    let (start_x, start_y, end_x, end_y) = tile_bounds(visible, TILE_SIZE);
    let mut commands = Vec::new();

    let mut x = start_x;
    while x <= end_x {
        let mut y = start_y;
        while y <= end_y {
            commands.push(DrawCommand::Fill {
                path: Circle::new(Point::new(x, y), DOT_RADIUS / zoom).to_path(0.1),
                color: DOT_COLOR,
            });
            y += TILE_SIZE;
        }
        x += TILE_SIZE;
    }
    commands
}

fn ruled(visible: Rect, zoom: f64) -> Vec<DrawCommand> {
    let (start_x, start_y, end_x, end_y) = tile_bounds(visible, TILE_SIZE);
    let mut commands = Vec::new();

    let mut y = start_y;
    while y <= end_y {
        commands.push(stroke(line(Point::new(start_x, y), Point::new(end_x, y)), zoom));
        y += TILE_SIZE;
    }
    commands
}

fn diagonal(visible: Rect, zoom: f64) -> Vec<DrawCommand> {
    // Lines y = x + c; the intercept range covering the extent, snapped to
    // origin-aligned multiples so the c = 0 line passes through the origin.
    let c_min = ((visible.y0 - visible.x1) / TILE_SIZE).floor() * TILE_SIZE;
    let c_max = ((visible.y1 - visible.x0) / TILE_SIZE).ceil() * TILE_SIZE;
    let mut commands = Vec::new();

    let mut c = c_min;
    while c <= c_max {
        commands.push(stroke(
            line(
                Point::new(visible.x0, visible.x0 + c),
                Point::new(visible.x1, visible.x1 + c),
            ),
            zoom,
        ));
        c += TILE_SIZE;
    }
    commands
}

fn isometric(visible: Rect, zoom: f64) -> Vec<DrawCommand> {
    let (start_x, _, end_x, _) = tile_bounds(visible, TILE_SIZE);
    let mut commands = Vec::new();

    // Vertical family.
    let mut x = start_x;
    while x <= end_x {
        commands.push(stroke(line(Point::new(x, visible.y0), Point::new(x, visible.y1)), zoom));
        x += TILE_SIZE;
    }

    // Two slanted families at +/-30 degrees: y = +/-m*x + c.
    for slope in [ISO_SLOPE, -ISO_SLOPE] {
        let at = |x: f64, c: f64| Point::new(x, slope * x + c);
        let c_candidates = [
            visible.y0 - slope * visible.x0,
            visible.y0 - slope * visible.x1,
            visible.y1 - slope * visible.x0,
            visible.y1 - slope * visible.x1,
        ];
        let c_min = (c_candidates.iter().cloned().fold(f64::INFINITY, f64::min) / TILE_SIZE)
            .floor()
            * TILE_SIZE;
        let c_max = (c_candidates.iter().cloned().fold(f64::NEG_INFINITY, f64::max) / TILE_SIZE)
            .ceil()
            * TILE_SIZE;

        let mut c = c_min;
        while c <= c_max {
            commands.push(stroke(line(at(visible.x0, c), at(visible.x1, c)), zoom));
            c += TILE_SIZE;
        }
    }
    commands
}

fn radar(visible: Rect, zoom: f64) -> Vec<DrawCommand> {
    // Rings and spokes about the logical origin, covering the visible
    // extent even when the origin itself is off screen.
    let corners = [
        Point::new(visible.x0, visible.y0),
        Point::new(visible.x1, visible.y0),
        Point::new(visible.x0, visible.y1),
        Point::new(visible.x1, visible.y1),
    ];
    let max_dist = corners
        .iter()
        .map(|p| p.to_vec2().hypot())
        .fold(0.0, f64::max);
    let closest = Point::new(
        0.0_f64.clamp(visible.x0, visible.x1),
        0.0_f64.clamp(visible.y0, visible.y1),
    );
    let min_dist = closest.to_vec2().hypot();

    let mut commands = Vec::new();
    let first_ring = ((min_dist / RADAR_RING_SPACING).floor() * RADAR_RING_SPACING)
        .max(RADAR_RING_SPACING);
    let mut r = first_ring;
    while r <= max_dist {
        commands.push(stroke(Circle::new(Point::ZERO, r).to_path(0.1), zoom));
        r += RADAR_RING_SPACING;
    }

    let mut deg: f64 = 0.0;
    while deg < 360.0 {
        let theta = deg.to_radians();
        commands.push(stroke(
            line(
                Point::ZERO,
                Point::new(max_dist * theta.cos(), max_dist * theta.sin()),
            ),
            zoom,
        ));
        deg += RADAR_SPOKE_STEP_DEG;
    }
    commands
}
