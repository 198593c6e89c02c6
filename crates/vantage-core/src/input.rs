//! Gesture normalization for mouse/wheel/touch/keyboard events.
//!
//! Raw device events come in as [`InputEvent`] and leave as
//! transform-agnostic [`GestureIntent`] values in screen coordinates; the
//! interaction layer converts to logical coordinates itself so every
//! consumer shares one view transform.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Auxiliary,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Whether the selection-extend modifier is held.
    pub fn extend(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Whether the wheel-zoom modifier is held.
    pub fn zoom(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Raw device event, unified across mouse and touch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown { position: Point, button: PointerButton },
    PointerMove { position: Point },
    PointerUp { position: Point, button: PointerButton },
    Wheel { position: Point, delta: Vec2 },
    TouchStart { id: u64, position: Point },
    TouchMove { id: u64, position: Point },
    TouchEnd { id: u64 },
    KeyDown { key: String },
    KeyUp { key: String },
    ModifiersChanged(Modifiers),
    FocusLost,
}

/// Normalized gesture intent in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureIntent {
    /// Primary press at a screen position.
    Press { position: Point, modifiers: Modifiers },
    /// Pointer motion while tracking a gesture (or hovering).
    Move { position: Point },
    /// Primary release.
    Release { position: Point },
    /// Zoom by `factor` keeping `pivot` fixed on screen.
    Zoom { pivot: Point, factor: f64 },
    /// Screen-space pan request (wheel or two-finger drag).
    Scroll { delta: Vec2 },
    /// Secondary-action site for an external context menu.
    Context { position: Point },
    /// The temporary select-mode key changed state.
    SetTemporarySelect(bool),
    /// Abort any in-progress gesture.
    Cancel,
    /// Double-press requesting text editing at a position.
    EditText { position: Point },
}

/// Double-press detection thresholds.
const DOUBLE_PRESS_TIME_MS: u128 = 500;
const DOUBLE_PRESS_DISTANCE: f64 = 5.0;

/// Exponential wheel-to-zoom rate.
const WHEEL_ZOOM_RATE: f64 = 0.0015;

/// Key forcing select mode while held.
const TEMPORARY_SELECT_KEY: &str = "Shift";

/// Translates raw device events into gesture intents.
///
/// Tracks just enough state to do so: modifier keys, active touches, and
/// double-press timing. Everything about *what the gesture means* belongs
/// to the interaction layer.
#[derive(Debug, Clone, Default)]
pub struct GestureInput {
    modifiers: Modifiers,
    /// Active touch points by device id.
    touches: HashMap<u64, Point>,
    /// Set while a pinch is in progress; suppresses single-touch gestures
    /// until all touches lift.
    pinch_active: bool,
    last_press_time: Option<Instant>,
    last_press_position: Option<Point>,
}

impl GestureInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current modifier state.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Process one raw event, producing zero or more intents in order.
    pub fn process(&mut self, event: InputEvent) -> Vec<GestureIntent> {
        match event {
            InputEvent::PointerDown { position, button } => self.pointer_down(position, button),
            InputEvent::PointerMove { position } => vec![GestureIntent::Move { position }],
            InputEvent::PointerUp { position, button } => match button {
                PointerButton::Primary => vec![GestureIntent::Release { position }],
                _ => Vec::new(),
            },
            InputEvent::Wheel { position, delta } => self.wheel(position, delta),
            InputEvent::TouchStart { id, position } => self.touch_start(id, position),
            InputEvent::TouchMove { id, position } => self.touch_move(id, position),
            InputEvent::TouchEnd { id } => self.touch_end(id),
            InputEvent::KeyDown { key } => self.key_down(&key),
            InputEvent::KeyUp { key } => self.key_up(&key),
            InputEvent::ModifiersChanged(modifiers) => self.set_modifiers(modifiers),
            InputEvent::FocusLost => {
                self.touches.clear();
                self.pinch_active = false;
                vec![GestureIntent::Cancel]
            }
        }
    }

    fn pointer_down(&mut self, position: Point, button: PointerButton) -> Vec<GestureIntent> {
        match button {
            PointerButton::Secondary => return vec![GestureIntent::Context { position }],
            PointerButton::Auxiliary => return Vec::new(),
            PointerButton::Primary => {}
        }

        if self.is_double_press(position) {
            self.last_press_time = None;
            self.last_press_position = None;
            return vec![GestureIntent::EditText { position }];
        }
        self.last_press_time = Some(Instant::now());
        self.last_press_position = Some(position);

        vec![GestureIntent::Press {
            position,
            modifiers: self.modifiers,
        }]
    }

    fn is_double_press(&self, position: Point) -> bool {
        let (Some(time), Some(last)) = (self.last_press_time, self.last_press_position) else {
            return false;
        };
        time.elapsed().as_millis() < DOUBLE_PRESS_TIME_MS
            && (position - last).hypot() < DOUBLE_PRESS_DISTANCE
    }

    fn wheel(&mut self, position: Point, delta: Vec2) -> Vec<GestureIntent> {
        if self.modifiers.zoom() {
            vec![GestureIntent::Zoom {
                pivot: position,
                factor: (-delta.y * WHEEL_ZOOM_RATE).exp(),
            }]
        } else {
            vec![GestureIntent::Scroll { delta }]
        }
    }

    fn touch_start(&mut self, id: u64, position: Point) -> Vec<GestureIntent> {
        self.touches.insert(id, position);
        match self.touches.len() {
            1 if !self.pinch_active => vec![GestureIntent::Press {
                position,
                modifiers: self.modifiers,
            }],
            2 => {
                // Second finger: abort the single-touch gesture, start pinch.
                self.pinch_active = true;
                vec![GestureIntent::Cancel]
            }
            _ => Vec::new(),
        }
    }

    fn touch_move(&mut self, id: u64, position: Point) -> Vec<GestureIntent> {
        if !self.touches.contains_key(&id) {
            return Vec::new();
        }

        if self.touches.len() == 2 {
            let (old_centroid, old_span) = self.pinch_measure();
            self.touches.insert(id, position);
            let (centroid, span) = self.pinch_measure();

            let mut intents = Vec::new();
            if old_span > f64::EPSILON && span > f64::EPSILON {
                intents.push(GestureIntent::Zoom {
                    pivot: centroid,
                    factor: span / old_span,
                });
            }
            let delta = centroid - old_centroid;
            if delta.hypot() > 0.0 {
                intents.push(GestureIntent::Scroll { delta });
            }
            return intents;
        }

        self.touches.insert(id, position);
        if self.touches.len() == 1 && !self.pinch_active {
            vec![GestureIntent::Move { position }]
        } else {
            Vec::new()
        }
    }

    fn touch_end(&mut self, id: u64) -> Vec<GestureIntent> {
        let Some(position) = self.touches.remove(&id) else {
            return Vec::new();
        };
        if self.touches.is_empty() {
            let was_pinch = std::mem::take(&mut self.pinch_active);
            if was_pinch {
                Vec::new()
            } else {
                vec![GestureIntent::Release { position }]
            }
        } else {
            Vec::new()
        }
    }

    /// Centroid and inter-touch span of the two active touches.
    fn pinch_measure(&self) -> (Point, f64) {
        let mut iter = self.touches.values();
        let (Some(&a), Some(&b)) = (iter.next(), iter.next()) else {
            return (Point::ZERO, 0.0);
        };
        let centroid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        (centroid, (b - a).hypot())
    }

    fn key_down(&mut self, key: &str) -> Vec<GestureIntent> {
        match key {
            TEMPORARY_SELECT_KEY => {
                self.modifiers.shift = true;
                vec![GestureIntent::SetTemporarySelect(true)]
            }
            "Escape" => vec![GestureIntent::Cancel],
            "Control" => {
                self.modifiers.ctrl = true;
                Vec::new()
            }
            "Alt" => {
                self.modifiers.alt = true;
                Vec::new()
            }
            "Meta" => {
                self.modifiers.meta = true;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn key_up(&mut self, key: &str) -> Vec<GestureIntent> {
        match key {
            TEMPORARY_SELECT_KEY => {
                self.modifiers.shift = false;
                vec![GestureIntent::SetTemporarySelect(false)]
            }
            "Control" => {
                self.modifiers.ctrl = false;
                Vec::new()
            }
            "Alt" => {
                self.modifiers.alt = false;
                Vec::new()
            }
            "Meta" => {
                self.modifiers.meta = false;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn set_modifiers(&mut self, modifiers: Modifiers) -> Vec<GestureIntent> {
        let was_select = self.modifiers.shift;
        self.modifiers = modifiers;
        if modifiers.shift != was_select {
            vec![GestureIntent::SetTemporarySelect(modifiers.shift)]
        } else {
            Vec::new()
        }
    }
}
