//! Rendering engine interface and the per-frame redraw trigger.

use tracing::trace;

use crate::error::ViewerError;

/// A viewport mutation. Every input gesture reduces to a sequence of these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Pan { dx: f64, dy: f64 },
    Zoom { amount: f64 },
    Resize { width: i64, height: i64 },
    Reset,
}

/// The fractal renderer, driven only through these commands.
///
/// Only `create` may fail, and that failure is fatal for the viewer.
pub trait RenderEngine: Sized {
    /// Whatever the engine draws into.
    type Target;

    fn create(target: Self::Target, width: u32, height: u32) -> Result<Self, ViewerError>;
    fn resize(&mut self, width: u32, height: u32);
    fn pan(&mut self, dx: f64, dy: f64);
    fn zoom(&mut self, amount: f64);
    fn reset(&mut self);
    fn draw(&mut self);
}

/// Coalesces mutations into at most one draw per animation frame.
///
/// `dirty` records that state changed since the last draw; `frame_requested`
/// records that the host already has a frame callback queued.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderTrigger {
    dirty: bool,
    frame_requested: bool,
    draws: u64,
}

impl RenderTrigger {
    /// Marks the state changed. Returns `true` when the caller must schedule a
    /// frame callback (none is queued yet).
    #[must_use]
    pub fn invalidate(&mut self) -> bool {
        self.dirty = true;
        if self.frame_requested {
            false
        } else {
            self.frame_requested = true;
            true
        }
    }

    /// Frame boundary: draws once if anything changed since the last draw.
    pub fn on_frame<E: RenderEngine>(&mut self, engine: &mut E) -> bool {
        self.frame_requested = false;
        if !self.dirty {
            return false;
        }
        self.dirty = false;
        self.draws += 1;
        trace!(draws = self.draws, "frame drawn");
        engine.draw();
        true
    }

    /// Total draws issued so far.
    #[cfg(test)]
    pub fn draw_count(&self) -> u64 {
        self.draws
    }
}
