//! Vantage Render Library
//!
//! Turns a viewport snapshot into an ordered list of draw commands for an
//! external drawing surface. The dispatcher is a pure function: commands
//! carry logical-space geometry plus the one shared affine, so background
//! and shapes can never disagree with the hit-tested transform.

pub mod background;
pub mod dispatcher;
pub mod surface;

pub use background::BackgroundKind;
pub use dispatcher::{DrawCommand, Frame, FrameCommands, parse_color, render_frame};
pub use surface::{DrawSurface, RecordingSurface, SurfaceError};
