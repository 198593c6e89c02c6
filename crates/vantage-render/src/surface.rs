//! Drawing surface abstraction.
//!
//! The dispatcher stops at command lists; an external surface (GPU scene,
//! canvas element, test recorder) executes them.

use crate::dispatcher::FrameCommands;
use thiserror::Error;

/// Surface errors.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface lost: {0}")]
    Lost(String),
    #[error("submit failed: {0}")]
    Submit(String),
}

/// Result type for surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// A consumer of frame command lists.
pub trait DrawSurface {
    /// Execute one frame. Implementations apply `frame.transform` to every
    /// command's geometry; nothing else may transform coordinates.
    fn submit(&mut self, frame: &FrameCommands) -> SurfaceResult<()>;
}

/// Surface that records submitted frames. Used in tests and as the
/// reference consumer.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub frames: Vec<FrameCommands>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently submitted frame.
    pub fn last(&self) -> Option<&FrameCommands> {
        self.frames.last()
    }
}

impl DrawSurface for RecordingSurface {
    fn submit(&mut self, frame: &FrameCommands) -> SurfaceResult<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}
