//! Vantage Core Library
//!
//! Platform-agnostic view transform, hit testing, and interaction state
//! machine for the Vantage infinite canvas. Drawing, persistence, and all
//! window chrome live in external collaborators; this crate maps device
//! input to selection/drag/view mutations and reports them as events.

pub mod hit;
pub mod input;
pub mod interaction;
pub mod notify;
pub mod shape;
pub mod view;

pub use input::{GestureInput, GestureIntent, InputEvent, Modifiers, PointerButton};
pub use interaction::{CanvasEvent, InteractionState, ToolMode, Viewport};
pub use notify::ViewChangeDebouncer;
pub use shape::{Shape, ShapeId, ShapeKind};
pub use view::{MAX_ZOOM, MIN_ZOOM, ViewState};
