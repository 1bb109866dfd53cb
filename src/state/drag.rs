// Drag session: turns a stream of pointer moves into incremental pans.
use tracing::debug;

/// `Dragging` carries the baseline only once the first move has arrived, so a
/// new session can never reuse coordinates from the previous one.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragSession {
    #[default]
    Idle,
    Dragging { last: Option<(f64, f64)> },
}

impl DragSession {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// Pointer-down. Restarts the baseline even if a session was still open.
    pub fn begin(&mut self) {
        debug!("drag session started");
        *self = Self::Dragging { last: None };
    }

    /// Pointer-move. Returns the pan delta to apply, if any.
    ///
    /// The first move of a session only records the baseline.
    pub fn on_move(&mut self, x: f64, y: f64) -> Option<(f64, f64)> {
        let Self::Dragging { last } = self else {
            return None;
        };
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let delta = last.map(|(lx, ly)| (x - lx, y - ly));
        *last = Some((x, y));
        delta.filter(|&(dx, dy)| dx != 0.0 || dy != 0.0)
    }

    /// Pointer-up, blur or pointer-leave. Returns whether a session was open.
    pub fn end(&mut self) -> bool {
        let was_active = self.is_active();
        if was_active {
            debug!("drag session ended");
        }
        *self = Self::Idle;
        was_active
    }
}
