//! Interaction state machine: pan, select, drag, and rubber-band gestures.
//!
//! All interaction state lives in one tagged [`InteractionState`] value that
//! is read, transitioned, and written atomically per event. Shape mutations
//! are never applied here; they are reported as [`CanvasEvent`]s and the
//! shape-owning collaborator applies them before the next cycle.

use crate::hit;
use crate::input::{GestureIntent, Modifiers};
use crate::notify::ViewChangeDebouncer;
use crate::shape::{Shape, ShapeId, ShapeKind};
use crate::view::{MAX_ZOOM, MIN_ZOOM, ViewState};
use kurbo::{Point, Rect, Size, Vec2};
use std::collections::HashMap;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Padding around content when fitting the view, in logical units.
const FIT_PADDING: f64 = 50.0;
/// Fitting never magnifies content past 100%.
const FIT_MAX_ZOOM: f64 = 1.0;

/// Persistent interaction mode, toggled by the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ToolMode {
    #[default]
    Pan,
    Select,
}

/// The active gesture. One state value per viewport, transitioned per event.
#[derive(Debug, Clone, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Screen-space panning; `last` is the previous pointer position.
    Panning { last: Point },
    /// Dragging one shape; `grab_offset` is pointer-to-origin at press time.
    DraggingSingle { id: ShapeId, grab_offset: Vec2 },
    /// Dragging the whole selection. `baseline` snapshots each shape's
    /// origin at drag start; every update is `baseline + total delta`, so
    /// intermediate move events cannot accumulate error.
    DraggingMultiple {
        anchor: Point,
        baseline: HashMap<ShapeId, Point>,
    },
    /// Live rubber-band selection in logical coordinates. `extend_base`
    /// holds the selection to extend when the modifier was held at press.
    RubberBand {
        anchor: Point,
        cursor: Point,
        extend_base: Vec<ShapeId>,
    },
}

impl InteractionState {
    fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Panning { .. } => "panning",
            InteractionState::DraggingSingle { .. } => "dragging-single",
            InteractionState::DraggingMultiple { .. } => "dragging-multiple",
            InteractionState::RubberBand { .. } => "rubber-band",
        }
    }
}

/// Mutation and notification events, drained by the host each cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// Single-shape absolute position update.
    ShapeMoved { id: ShapeId, x: f64, y: f64 },
    /// Batch update for a multi-drag. `moves` carries each shape's absolute
    /// target (drag baseline + total pointer delta); `delta` is that total
    /// delta for consumers tracking the relative form.
    ShapesMoved {
        delta: Vec2,
        moves: Vec<(ShapeId, Point)>,
    },
    /// Debounced view-state change, for persistence.
    ViewChanged(ViewState),
    /// The selection set changed.
    SelectionChanged(Vec<ShapeId>),
    /// Secondary-action site for an external creation menu.
    ContextRequested { logical: Point, screen: Point },
    /// Double-press on a text shape; the host opens its editor.
    TextEditRequested { id: ShapeId },
    /// The host's editor committed new content.
    TextEdited { id: ShapeId, content: String },
}

/// The viewport: owns the view transform, the selection set, and the
/// interaction state. External collaborators read snapshots; all mutation
/// flows through [`Viewport::apply`] and the host commands.
#[derive(Debug, Clone)]
pub struct Viewport {
    view: ViewState,
    viewport_size: Size,
    mode: ToolMode,
    temporary_select: bool,
    state: InteractionState,
    selection: Vec<ShapeId>,
    debouncer: ViewChangeDebouncer,
    events: Vec<CanvasEvent>,
}

impl Viewport {
    /// Create a viewport at the identity view.
    pub fn new(viewport_size: Size) -> Self {
        Self::with_view(ViewState::default(), viewport_size)
    }

    /// Create a viewport with a restored view state.
    pub fn with_view(view: ViewState, viewport_size: Size) -> Self {
        Self {
            view,
            viewport_size,
            mode: ToolMode::default(),
            temporary_select: false,
            state: InteractionState::Idle,
            selection: Vec::new(),
            debouncer: ViewChangeDebouncer::new(),
            events: Vec::new(),
        }
    }

    /// Current view state snapshot.
    pub fn view_state(&self) -> ViewState {
        self.view
    }

    /// Replace the view state (host command). Zoom is clamped, never
    /// rejected.
    pub fn set_view_state(&mut self, mut view: ViewState) {
        view.zoom = view.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.view = view;
        self.debouncer.note(self.view);
    }

    /// Current selection, in selection order.
    pub fn selection(&self) -> &[ShapeId] {
        &self.selection
    }

    /// Current interaction state.
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Persistent tool mode.
    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ToolMode) {
        self.mode = mode;
    }

    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport_size = size;
    }

    /// The mode gestures resolve against: the persistent toggle, forced to
    /// `Select` while the temporary modifier is held.
    pub fn effective_mode(&self) -> ToolMode {
        if self.temporary_select {
            ToolMode::Select
        } else {
            self.mode
        }
    }

    /// The logical point at the viewport center.
    pub fn viewport_center_logical(&self) -> Point {
        self.view.viewport_center_logical(self.viewport_size)
    }

    /// Center the logical origin at zoom 1 (host command).
    pub fn center_on_origin(&mut self) {
        self.view = ViewState::centered_on_origin(self.viewport_size);
        self.debouncer.note(self.view);
    }

    /// Fit the view to the supplied shape list. Idempotent for an unchanged
    /// list; an empty list centers the origin at zoom 1.
    pub fn fit_to_content(&mut self, shapes: &[Shape]) {
        let bounds = shapes
            .iter()
            .map(Shape::bounds)
            .reduce(|acc, b| acc.union(b));
        self.view =
            ViewState::fit_to_bounds(bounds, self.viewport_size, FIT_PADDING, FIT_MAX_ZOOM);
        self.debouncer.note(self.view);
    }

    /// Drop selected ids that no longer resolve against the shape list.
    /// Called by the shape-owning collaborator after deletions.
    pub fn prune_selection(&mut self, shapes: &[Shape]) {
        let before = self.selection.len();
        self.selection
            .retain(|id| shapes.iter().any(|s| &s.id == id));
        if self.selection.len() != before {
            self.events
                .push(CanvasEvent::SelectionChanged(self.selection.clone()));
        }
    }

    /// Report a committed text edit from the host's editor.
    pub fn apply_text_edit(&mut self, id: &str, content: String, shapes: &[Shape]) {
        let is_text = shapes
            .iter()
            .any(|s| s.id == id && s.kind == ShapeKind::Text);
        if is_text {
            self.events.push(CanvasEvent::TextEdited {
                id: id.to_string(),
                content,
            });
        } else {
            log::warn!("text edit for missing or non-text shape {id}, skipping");
        }
    }

    /// Take all pending events, oldest first.
    pub fn drain_events(&mut self) -> Vec<CanvasEvent> {
        std::mem::take(&mut self.events)
    }

    /// Flush the view-change debouncer; call periodically (per frame or on
    /// a timer). A `ViewChanged` event fires at most once per quiet period.
    pub fn poll(&mut self) {
        self.poll_at(Instant::now());
    }

    /// [`Viewport::poll`] with an explicit clock.
    pub fn poll_at(&mut self, now: Instant) {
        if let Some(view) = self.debouncer.poll_at(now) {
            self.events.push(CanvasEvent::ViewChanged(view));
        }
    }

    /// Process one gesture intent against the current shape list.
    ///
    /// The list is supplied fresh per event (insertion order = paint and
    /// hit-test order); ids referencing shapes that disappeared since the
    /// gesture started are skipped for the frame.
    pub fn apply(&mut self, intent: GestureIntent, shapes: &[Shape]) {
        match intent {
            GestureIntent::Press {
                position,
                modifiers,
            } => self.press(position, modifiers, shapes),
            GestureIntent::Move { position } => self.pointer_move(position, shapes),
            GestureIntent::Release { .. } | GestureIntent::Cancel => self.finish_gesture(),
            GestureIntent::Zoom { pivot, factor } => {
                self.view.zoom_at(pivot, factor);
                self.debouncer.note(self.view);
            }
            GestureIntent::Scroll { delta } => {
                self.view.pan_by(delta);
                self.debouncer.note(self.view);
            }
            GestureIntent::Context { position } => {
                self.events.push(CanvasEvent::ContextRequested {
                    logical: self.view.to_logical(position),
                    screen: position,
                });
            }
            GestureIntent::SetTemporarySelect(on) => {
                // Takes effect at the next press; never retargets a gesture
                // already in progress.
                self.temporary_select = on;
            }
            GestureIntent::EditText { position } => {
                let logical = self.view.to_logical(position);
                if let Some(shape) = hit::top_hit(shapes, logical) {
                    if shape.kind == ShapeKind::Text {
                        self.events.push(CanvasEvent::TextEditRequested {
                            id: shape.id.clone(),
                        });
                    }
                }
            }
        }
    }

    /// Primary-button press: resolve the next state in priority order.
    fn press(&mut self, position: Point, modifiers: Modifiers, shapes: &[Shape]) {
        let logical = self.view.to_logical(position);
        let hit = hit::top_hit(shapes, logical).cloned();

        let next = if let Some(shape) = hit {
            if self.selection.len() > 1 && self.selection.contains(&shape.id) {
                InteractionState::DraggingMultiple {
                    anchor: logical,
                    baseline: self.capture_baseline(shapes),
                }
            } else if self.selection.contains(&shape.id) {
                InteractionState::DraggingSingle {
                    grab_offset: logical - Point::new(shape.x, shape.y),
                    id: shape.id,
                }
            } else if self.effective_mode() == ToolMode::Pan {
                self.select_exclusive(shape.id.clone());
                InteractionState::DraggingSingle {
                    grab_offset: logical - Point::new(shape.x, shape.y),
                    id: shape.id,
                }
            } else {
                self.begin_rubber_band(logical, modifiers)
            }
        } else if self.effective_mode() == ToolMode::Select {
            self.begin_rubber_band(logical, modifiers)
        } else {
            self.clear_selection();
            InteractionState::Panning { last: position }
        };

        log::debug!("press -> {}", next.name());
        self.state = next;
    }

    fn pointer_move(&mut self, position: Point, shapes: &[Shape]) {
        match &mut self.state {
            InteractionState::Idle => {}
            InteractionState::Panning { last } => {
                let delta = position - *last;
                *last = position;
                self.view.pan_by(delta);
                self.debouncer.note(self.view);
            }
            InteractionState::DraggingSingle { id, grab_offset } => {
                let target = self.view.to_logical(position) - *grab_offset;
                if shapes.iter().any(|s| &s.id == id) {
                    self.events.push(CanvasEvent::ShapeMoved {
                        id: id.clone(),
                        x: target.x,
                        y: target.y,
                    });
                } else {
                    log::warn!("dragged shape {id} no longer present, skipping");
                }
            }
            InteractionState::DraggingMultiple { anchor, baseline } => {
                let delta = self.view.to_logical(position) - *anchor;
                let moves: Vec<(ShapeId, Point)> = shapes
                    .iter()
                    .filter_map(|s| baseline.get(&s.id).map(|&origin| (s.id.clone(), origin + delta)))
                    .collect();
                if moves.len() < baseline.len() {
                    log::warn!(
                        "{} dragged shape(s) no longer present, skipping",
                        baseline.len() - moves.len()
                    );
                }
                if !moves.is_empty() {
                    self.events.push(CanvasEvent::ShapesMoved { delta, moves });
                }
            }
            InteractionState::RubberBand {
                anchor,
                cursor,
                extend_base,
            } => {
                *cursor = self.view.to_logical(position);
                let rect = Rect::new(
                    anchor.x.min(cursor.x),
                    anchor.y.min(cursor.y),
                    anchor.x.max(cursor.x),
                    anchor.y.max(cursor.y),
                );
                let mut next = extend_base.clone();
                for id in hit::shapes_in_rect(shapes, rect) {
                    if !next.contains(&id) {
                        next.push(id);
                    }
                }
                if next != self.selection {
                    self.selection = next;
                    self.events
                        .push(CanvasEvent::SelectionChanged(self.selection.clone()));
                }
            }
        }
    }

    /// Pointer release or cancellation, from any state. The drag baseline
    /// and selection rectangle are discarded unconditionally so a gesture
    /// can never get stuck; only the selection and view survive.
    fn finish_gesture(&mut self) {
        if !matches!(self.state, InteractionState::Idle) {
            log::debug!("{} -> idle", self.state.name());
        }
        self.state = InteractionState::Idle;
    }

    /// The rubber-band rectangle while one is active, normalized to
    /// min/max corners, in logical coordinates. For rendering.
    pub fn rubber_band_rect(&self) -> Option<Rect> {
        match &self.state {
            InteractionState::RubberBand { anchor, cursor, .. } => Some(Rect::new(
                anchor.x.min(cursor.x),
                anchor.y.min(cursor.y),
                anchor.x.max(cursor.x),
                anchor.y.max(cursor.y),
            )),
            _ => None,
        }
    }

    fn begin_rubber_band(&mut self, anchor: Point, modifiers: Modifiers) -> InteractionState {
        let extend_base = if modifiers.extend() {
            self.selection.clone()
        } else {
            self.clear_selection();
            Vec::new()
        };
        InteractionState::RubberBand {
            anchor,
            cursor: anchor,
            extend_base,
        }
    }

    /// Snapshot the origin of every selected shape. Ids that no longer
    /// resolve are skipped.
    fn capture_baseline(&self, shapes: &[Shape]) -> HashMap<ShapeId, Point> {
        let mut baseline = HashMap::with_capacity(self.selection.len());
        for id in &self.selection {
            match shapes.iter().find(|s| &s.id == id) {
                Some(s) => {
                    baseline.insert(id.clone(), Point::new(s.x, s.y));
                }
                None => log::warn!("selected shape {id} missing from shape list, skipping"),
            }
        }
        baseline
    }

    fn select_exclusive(&mut self, id: ShapeId) {
        if self.selection.len() != 1 || self.selection[0] != id {
            self.selection = vec![id];
            self.events
                .push(CanvasEvent::SelectionChanged(self.selection.clone()));
        }
    }

    fn clear_selection(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.events.push(CanvasEvent::SelectionChanged(Vec::new()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use std::time::Duration;

    const VIEWPORT: Size = Size::new(800.0, 600.0);

    fn viewport() -> Viewport {
        Viewport::new(VIEWPORT)
    }

    fn square(x: f64, y: f64, size: f64) -> Shape {
        Shape::new(ShapeKind::Square, x, y).with_size(size, size)
    }

    fn press(vp: &mut Viewport, shapes: &[Shape], x: f64, y: f64) {
        vp.apply(
            GestureIntent::Press {
                position: Point::new(x, y),
                modifiers: Modifiers::default(),
            },
            shapes,
        );
    }

    fn press_with(vp: &mut Viewport, shapes: &[Shape], x: f64, y: f64, modifiers: Modifiers) {
        vp.apply(
            GestureIntent::Press {
                position: Point::new(x, y),
                modifiers,
            },
            shapes,
        );
    }

    fn drag_to(vp: &mut Viewport, shapes: &[Shape], x: f64, y: f64) {
        vp.apply(
            GestureIntent::Move {
                position: Point::new(x, y),
            },
            shapes,
        );
    }

    fn release(vp: &mut Viewport, shapes: &[Shape]) {
        vp.apply(
            GestureIntent::Release {
                position: Point::ZERO,
            },
            shapes,
        );
    }

    /// Click-select two shapes through a rubber band.
    fn select_both(vp: &mut Viewport, shapes: &[Shape]) {
        vp.set_mode(ToolMode::Select);
        press(vp, shapes, 0.0, 0.0);
        drag_to(vp, shapes, 400.0, 400.0);
        release(vp, shapes);
        vp.set_mode(ToolMode::Pan);
        vp.drain_events();
    }

    #[test]
    fn test_click_on_shape_selects_and_drags() {
        let shapes = vec![square(100.0, 100.0, 50.0)];
        let mut vp = viewport();

        press(&mut vp, &shapes, 125.0, 130.0);
        assert!(matches!(vp.state(), InteractionState::DraggingSingle { .. }));
        assert_eq!(vp.selection(), [shapes[0].id.clone()]);

        drag_to(&mut vp, &shapes, 225.0, 230.0);
        let events = vp.drain_events();
        assert!(events.contains(&CanvasEvent::SelectionChanged(vec![shapes[0].id.clone()])));
        assert!(events.contains(&CanvasEvent::ShapeMoved {
            id: shapes[0].id.clone(),
            x: 200.0,
            y: 200.0,
        }));

        release(&mut vp, &shapes);
        assert!(matches!(vp.state(), InteractionState::Idle));
    }

    #[test]
    fn test_press_on_selected_shape_keeps_selection() {
        let shapes = vec![square(100.0, 100.0, 50.0)];
        let mut vp = viewport();

        press(&mut vp, &shapes, 125.0, 125.0);
        release(&mut vp, &shapes);
        vp.drain_events();

        press(&mut vp, &shapes, 110.0, 110.0);
        assert!(matches!(vp.state(), InteractionState::DraggingSingle { .. }));
        // No selection churn on re-press.
        assert!(vp.drain_events().is_empty());
    }

    #[test]
    fn test_press_on_multi_selection_starts_multi_drag() {
        let shapes = vec![square(0.0, 0.0, 100.0), square(200.0, 0.0, 100.0)];
        let mut vp = viewport();
        select_both(&mut vp, &shapes);
        assert_eq!(vp.selection().len(), 2);

        press(&mut vp, &shapes, 50.0, 50.0);
        match vp.state() {
            InteractionState::DraggingMultiple { baseline, .. } => {
                assert_eq!(baseline.len(), 2);
                assert_eq!(baseline[&shapes[1].id], Point::new(200.0, 0.0));
            }
            other => panic!("expected multi drag, got {other:?}"),
        }

        drag_to(&mut vp, &shapes, 60.0, 75.0);
        let events = vp.drain_events();
        match &events[0] {
            CanvasEvent::ShapesMoved { delta, moves } => {
                assert_eq!(*delta, Vec2::new(10.0, 25.0));
                assert_eq!(moves.len(), 2);
                assert!(moves.contains(&(shapes[0].id.clone(), Point::new(10.0, 25.0))));
                assert!(moves.contains(&(shapes[1].id.clone(), Point::new(210.0, 25.0))));
            }
            other => panic!("expected batch move, got {other:?}"),
        }
    }

    #[test]
    fn test_multi_drag_is_drift_free() {
        let shapes = vec![square(0.0, 0.0, 100.0), square(200.0, 0.0, 100.0)];

        // Many intermediate moves...
        let mut vp = viewport();
        select_both(&mut vp, &shapes);
        press(&mut vp, &shapes, 50.0, 50.0);
        for i in 1..100 {
            drag_to(&mut vp, &shapes, 50.0 + i as f64 * 3.7, 50.0 + i as f64 * 1.3);
        }
        drag_to(&mut vp, &shapes, 421.0, 187.0);
        let stepped = vp.drain_events();
        let last_stepped = stepped
            .iter()
            .rev()
            .find_map(|e| match e {
                CanvasEvent::ShapesMoved { moves, .. } => Some(moves.clone()),
                _ => None,
            })
            .unwrap();

        // ...must land exactly where a single jump lands.
        let mut vp = viewport();
        select_both(&mut vp, &shapes);
        press(&mut vp, &shapes, 50.0, 50.0);
        drag_to(&mut vp, &shapes, 421.0, 187.0);
        let jumped = vp.drain_events();
        let last_jumped = jumped
            .iter()
            .find_map(|e| match e {
                CanvasEvent::ShapesMoved { moves, .. } => Some(moves.clone()),
                _ => None,
            })
            .unwrap();

        assert_eq!(last_stepped, last_jumped);
    }

    #[test]
    fn test_rubber_band_live_selection_and_commit() {
        let inside = square(10.0, 10.0, 50.0);
        let partial = Shape::new(ShapeKind::Circle, 170.0, 170.0).with_size(40.0, 40.0);
        let outside = square(300.0, 300.0, 50.0);
        let shapes = vec![inside.clone(), partial.clone(), outside];

        let mut vp = viewport();
        vp.set_mode(ToolMode::Select);
        press(&mut vp, &shapes, 0.0, 0.0);
        assert!(matches!(vp.state(), InteractionState::RubberBand { .. }));

        drag_to(&mut vp, &shapes, 200.0, 200.0);
        assert_eq!(vp.selection(), [inside.id.clone(), partial.id.clone()]);
        assert_eq!(
            vp.rubber_band_rect(),
            Some(Rect::new(0.0, 0.0, 200.0, 200.0))
        );

        // Shrinking the band deselects live.
        drag_to(&mut vp, &shapes, 100.0, 100.0);
        assert_eq!(vp.selection(), [inside.id.clone()]);

        release(&mut vp, &shapes);
        assert!(matches!(vp.state(), InteractionState::Idle));
        assert_eq!(vp.selection(), [inside.id]);
        assert!(vp.rubber_band_rect().is_none());
    }

    #[test]
    fn test_rubber_band_extend_keeps_existing_selection() {
        let a = square(0.0, 0.0, 50.0);
        let far = square(500.0, 500.0, 50.0);
        let shapes = vec![a.clone(), far.clone()];

        let mut vp = viewport();
        press(&mut vp, &shapes, 525.0, 525.0); // click-select `far` in pan mode
        release(&mut vp, &shapes);

        vp.set_mode(ToolMode::Select);
        press_with(
            &mut vp,
            &shapes,
            0.0,
            0.0,
            Modifiers {
                ctrl: true,
                ..Modifiers::default()
            },
        );
        drag_to(&mut vp, &shapes, 60.0, 60.0);
        assert_eq!(vp.selection(), [far.id, a.id]);
    }

    #[test]
    fn test_press_on_empty_in_pan_mode_pans_and_clears() {
        let shapes = vec![square(500.0, 500.0, 50.0)];
        let mut vp = viewport();
        press(&mut vp, &shapes, 525.0, 525.0);
        release(&mut vp, &shapes);
        assert_eq!(vp.selection().len(), 1);

        press(&mut vp, &shapes, 10.0, 10.0);
        assert!(matches!(vp.state(), InteractionState::Panning { .. }));
        assert!(vp.selection().is_empty());

        drag_to(&mut vp, &shapes, 30.0, 25.0);
        drag_to(&mut vp, &shapes, 40.0, 45.0);
        let view = vp.view_state();
        assert_eq!(view.offset, Vec2::new(30.0, 35.0));
    }

    #[test]
    fn test_unselected_shape_in_select_mode_starts_rubber_band() {
        let shapes = vec![square(100.0, 100.0, 50.0)];
        let mut vp = viewport();
        vp.set_mode(ToolMode::Select);

        press(&mut vp, &shapes, 125.0, 125.0);
        assert!(matches!(vp.state(), InteractionState::RubberBand { .. }));
        // The zero-area band over the shape already selects it.
        drag_to(&mut vp, &shapes, 125.0, 125.0);
        assert_eq!(vp.selection(), [shapes[0].id.clone()]);
    }

    #[test]
    fn test_release_always_returns_to_idle() {
        let shapes = vec![square(0.0, 0.0, 100.0), square(200.0, 0.0, 100.0)];
        let mut vp = viewport();
        select_both(&mut vp, &shapes);

        press(&mut vp, &shapes, 50.0, 50.0);
        drag_to(&mut vp, &shapes, 5000.0, -4000.0); // way outside the viewport
        release(&mut vp, &shapes);
        assert!(matches!(vp.state(), InteractionState::Idle));

        // Focus loss mid-gesture clears too.
        press(&mut vp, &shapes, 50.0, 50.0);
        vp.apply(GestureIntent::Cancel, &shapes);
        assert!(matches!(vp.state(), InteractionState::Idle));
        assert_eq!(vp.selection().len(), 2);
    }

    #[test]
    fn test_temporary_select_is_not_retroactive() {
        let shapes: Vec<Shape> = Vec::new();
        let mut vp = viewport();

        press(&mut vp, &shapes, 100.0, 100.0);
        assert!(matches!(vp.state(), InteractionState::Panning { .. }));

        // The modifier lands mid-gesture: the pan keeps panning.
        vp.apply(GestureIntent::SetTemporarySelect(true), &shapes);
        drag_to(&mut vp, &shapes, 120.0, 100.0);
        assert!(matches!(vp.state(), InteractionState::Panning { .. }));
        release(&mut vp, &shapes);

        // The next press sees the forced mode.
        press(&mut vp, &shapes, 100.0, 100.0);
        assert!(matches!(vp.state(), InteractionState::RubberBand { .. }));
        release(&mut vp, &shapes);

        vp.apply(GestureIntent::SetTemporarySelect(false), &shapes);
        press(&mut vp, &shapes, 100.0, 100.0);
        assert!(matches!(vp.state(), InteractionState::Panning { .. }));
    }

    #[test]
    fn test_zoom_intent_is_independent_of_gesture_state() {
        let shapes: Vec<Shape> = Vec::new();
        let mut vp = viewport();
        let pivot = Point::new(400.0, 300.0);
        let before = vp.view_state().to_logical(pivot);

        vp.apply(
            GestureIntent::Zoom {
                pivot,
                factor: 2.0,
            },
            &shapes,
        );
        let view = vp.view_state();
        assert!((view.zoom - 2.0).abs() < f64::EPSILON);
        let after = view.to_logical(pivot);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
        assert!(matches!(vp.state(), InteractionState::Idle));
    }

    #[test]
    fn test_context_request_carries_both_spaces() {
        let shapes: Vec<Shape> = Vec::new();
        let mut vp = viewport();
        vp.set_view_state(ViewState {
            offset: Vec2::new(100.0, 0.0),
            zoom: 2.0,
        });
        vp.drain_events();

        vp.apply(
            GestureIntent::Context {
                position: Point::new(300.0, 200.0),
            },
            &shapes,
        );
        assert_eq!(
            vp.drain_events(),
            vec![CanvasEvent::ContextRequested {
                logical: Point::new(100.0, 100.0),
                screen: Point::new(300.0, 200.0),
            }]
        );
    }

    #[test]
    fn test_stale_ids_are_skipped() {
        let shapes = vec![square(0.0, 0.0, 100.0), square(200.0, 0.0, 100.0)];
        let mut vp = viewport();
        select_both(&mut vp, &shapes);
        press(&mut vp, &shapes, 50.0, 50.0);

        // One shape vanished mid-drag.
        let remaining = vec![shapes[0].clone()];
        drag_to(&mut vp, &remaining, 70.0, 50.0);
        let events = vp.drain_events();
        match &events[0] {
            CanvasEvent::ShapesMoved { moves, .. } => {
                assert_eq!(moves.len(), 1);
                assert_eq!(moves[0].0, shapes[0].id);
            }
            other => panic!("expected batch move, got {other:?}"),
        }
    }

    #[test]
    fn test_prune_selection() {
        let shapes = vec![square(0.0, 0.0, 100.0), square(200.0, 0.0, 100.0)];
        let mut vp = viewport();
        select_both(&mut vp, &shapes);

        let remaining = vec![shapes[1].clone()];
        vp.prune_selection(&remaining);
        assert_eq!(vp.selection(), [shapes[1].id.clone()]);
        assert_eq!(
            vp.drain_events(),
            vec![CanvasEvent::SelectionChanged(vec![shapes[1].id.clone()])]
        );
    }

    #[test]
    fn test_fit_to_content_empty_and_idempotent() {
        let mut vp = viewport();
        vp.fit_to_content(&[]);
        let view = vp.view_state();
        assert!((view.zoom - 1.0).abs() < f64::EPSILON);
        let center = vp.viewport_center_logical();
        assert!(center.x.abs() < 1e-10 && center.y.abs() < 1e-10);

        let shapes = vec![square(0.0, 0.0, 100.0), square(900.0, 700.0, 100.0)];
        vp.fit_to_content(&shapes);
        let first = vp.view_state();
        vp.fit_to_content(&shapes);
        assert_eq!(vp.view_state(), first);
    }

    #[test]
    fn test_view_changes_are_debounced() {
        let shapes: Vec<Shape> = Vec::new();
        let mut vp = viewport();

        press(&mut vp, &shapes, 0.0, 0.0);
        drag_to(&mut vp, &shapes, 50.0, 0.0);
        drag_to(&mut vp, &shapes, 90.0, 0.0);
        release(&mut vp, &shapes);

        // Nothing fires while changes keep arriving.
        assert!(vp.drain_events().is_empty());

        vp.poll_at(Instant::now() + Duration::from_millis(400));
        let events = vp.drain_events();
        assert_eq!(events.len(), 1);
        match &events[0] {
            CanvasEvent::ViewChanged(view) => assert_eq!(view.offset, Vec2::new(90.0, 0.0)),
            other => panic!("expected view change, got {other:?}"),
        }

        // At most once per quiet period.
        vp.poll_at(Instant::now() + Duration::from_millis(800));
        assert!(vp.drain_events().is_empty());
    }

    #[test]
    fn test_text_edit_flow() {
        let text = Shape::new(ShapeKind::Text, 100.0, 100.0);
        let plain = square(300.0, 300.0, 50.0);
        let shapes = vec![text.clone(), plain];

        let mut vp = viewport();
        vp.apply(
            GestureIntent::EditText {
                position: Point::new(120.0, 110.0),
            },
            &shapes,
        );
        assert_eq!(
            vp.drain_events(),
            vec![CanvasEvent::TextEditRequested {
                id: text.id.clone()
            }]
        );

        // Double-press on a non-text shape requests nothing.
        vp.apply(
            GestureIntent::EditText {
                position: Point::new(325.0, 325.0),
            },
            &shapes,
        );
        assert!(vp.drain_events().is_empty());

        vp.apply_text_edit(&text.id, "hello".to_string(), &shapes);
        assert_eq!(
            vp.drain_events(),
            vec![CanvasEvent::TextEdited {
                id: text.id,
                content: "hello".to_string(),
            }]
        );
    }

    #[test]
    fn test_set_view_state_clamps_zoom() {
        let mut vp = viewport();
        vp.set_view_state(ViewState {
            offset: Vec2::ZERO,
            zoom: 80.0,
        });
        assert!((vp.view_state().zoom - MAX_ZOOM).abs() < f64::EPSILON);
    }
}
