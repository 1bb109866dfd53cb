//! Pure conversions from raw wheel payloads to viewport mutation parameters.
//!
//! The wheel gesture zooms and also pans toward the cursor so the area under
//! the pointer roughly stays put. That pan is a heuristic, not an exact
//! projective anchor: zooming in needs about twice the outward pan magnitude to
//! look anchored, so the inward case is scaled by
//! [`GestureTuning::zoom_in_pan_multiplier`]. Treat it as a tunable constant.

use crate::config::ViewerConfig;

/// Constants for the wheel gesture, split out of [`ViewerConfig`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureTuning {
    pub wheel_zoom_factor: f64,
    pub wheel_pan_factor: f64,
    pub zoom_in_pan_multiplier: f64,
}

impl Default for GestureTuning {
    fn default() -> Self {
        Self::from(&ViewerConfig::default())
    }
}

impl From<&ViewerConfig> for GestureTuning {
    fn from(cfg: &ViewerConfig) -> Self {
        Self {
            wheel_zoom_factor: cfg.wheel_zoom_factor,
            wheel_pan_factor: cfg.wheel_pan_factor,
            zoom_in_pan_multiplier: cfg.zoom_in_pan_multiplier,
        }
    }
}

impl GestureTuning {
    /// Scrolling up (negative `delta_y`) zooms in.
    pub fn wheel_to_zoom(&self, delta_y: f64) -> f64 {
        -delta_y * self.wheel_zoom_factor
    }

    /// Scales the unit direction by `delta_y`; zooming in gets the extra
    /// multiplier.
    pub fn wheel_to_pan(&self, delta_y: f64, nx: f64, ny: f64) -> (f64, f64) {
        let mut mul = delta_y * self.wheel_pan_factor;
        if delta_y < 0.0 {
            mul *= self.zoom_in_pan_multiplier;
        }
        (nx * mul, ny * mul)
    }
}

/// Unit vector from the viewport center toward the pointer.
///
/// Returns exactly `(0.0, 0.0)` when the pointer sits on the center, so the
/// zoom still applies with no pan contribution.
pub fn wheel_to_pan_direction(
    pointer_x: f64,
    pointer_y: f64,
    viewport_width: f64,
    viewport_height: f64,
) -> (f64, f64) {
    let vx = pointer_x - viewport_width / 2.0;
    let vy = pointer_y - viewport_height / 2.0;
    let len = vx.hypot(vy);
    if len == 0.0 || !len.is_finite() {
        return (0.0, 0.0);
    }
    (vx / len, vy / len)
}
