// Viewport state: the authoritative view over the complex plane.
use tracing::trace;

use crate::config::ViewerConfig;

/// Lower bound of the zoom amount accepted by [`ViewportState::zoom`].
pub const MIN_ZOOM_AMOUNT: f64 = -0.9;
/// Upper bound of the zoom amount accepted by [`ViewportState::zoom`].
pub const MAX_ZOOM_AMOUNT: f64 = 0.9;
/// How far past the initial view zooming out may go, as a scale multiple.
pub const MAX_ZOOM_OUT: f64 = 16.0;

/// Center and scale restored by [`ViewportState::reset`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialView {
    pub center_x: f64,
    pub center_y: f64,
    pub scale: f64,
}

/// The visible region: a center in fractal space, fractal units per device
/// pixel, and the device-pixel size of the surface.
///
/// `scale > 0`, `width >= 1` and `height >= 1` hold after every operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    pub center_x: f64,
    pub center_y: f64,
    pub scale: f64,
    pub width: u32,
    pub height: u32,
    zoom_sensitivity: f64,
    initial: InitialView,
}

impl ViewportState {
    /// Full view of the configured extent, centered on the configured point.
    /// Non-positive dimensions are clamped to 1.
    pub fn initialize(width: i64, height: i64, cfg: &ViewerConfig) -> Self {
        let width = clamp_dim(width);
        let height = clamp_dim(height);
        let scale = (cfg.initial_extent / width as f64).max(cfg.initial_extent / height as f64);
        let initial = InitialView {
            center_x: cfg.initial_center.0,
            center_y: cfg.initial_center.1,
            scale,
        };
        Self {
            center_x: initial.center_x,
            center_y: initial.center_y,
            scale,
            width,
            height,
            zoom_sensitivity: cfg.zoom_sensitivity.clamp(f64::MIN_POSITIVE, 1.0),
            initial,
        }
    }

    pub fn initial_view(&self) -> InitialView {
        self.initial
    }

    /// Each mutation returns whether it changed anything.
    pub fn resize(&mut self, width: i64, height: i64) -> bool {
        let (width, height) = (clamp_dim(width), clamp_dim(height));
        if (width, height) == (self.width, self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        trace!(width = self.width, height = self.height, "viewport resized");
        true
    }

    /// Screen-pixel deltas; content follows the pointer.
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        if !dx.is_finite() || !dy.is_finite() {
            return false;
        }
        let x = self.center_x - dx * self.scale;
        let y = self.center_y - dy * self.scale;
        // Overflow at an extreme scale leaves the center where it was.
        if !x.is_finite() || !y.is_finite() || (x, y) == (self.center_x, self.center_y) {
            return false;
        }
        self.center_x = x;
        self.center_y = y;
        true
    }

    /// Positive `amount` zooms in. The factor never drops below `1 - 0.9 * k`.
    /// Zooming out stops at [`MAX_ZOOM_OUT`] times the initial scale.
    pub fn zoom(&mut self, amount: f64) -> bool {
        if !amount.is_finite() {
            return false;
        }
        let factor = 1.0 - amount.clamp(MIN_ZOOM_AMOUNT, MAX_ZOOM_AMOUNT) * self.zoom_sensitivity;
        let next = (self.scale * factor).min(self.max_scale());
        if !(next > 0.0 && next.is_finite()) || next == self.scale {
            return false;
        }
        self.scale = next;
        trace!(scale = self.scale, "viewport zoomed");
        true
    }

    /// Restores center and scale from `initialize`; size is left alone.
    pub fn reset(&mut self) -> bool {
        let before = (self.center_x, self.center_y, self.scale);
        self.center_x = self.initial.center_x;
        self.center_y = self.initial.center_y;
        self.scale = self.initial.scale;
        before != (self.center_x, self.center_y, self.scale)
    }

    pub fn max_scale(&self) -> f64 {
        self.initial.scale * MAX_ZOOM_OUT
    }

    /// Fractal-space point under a device-pixel position.
    pub fn screen_to_fractal(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.center_x + (x - self.width as f64 / 2.0) * self.scale,
            self.center_y + (y - self.height as f64 / 2.0) * self.scale,
        )
    }
}

fn clamp_dim(v: i64) -> u32 {
    v.clamp(1, u32::MAX as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vp(w: i64, h: i64) -> ViewportState {
        ViewportState::initialize(w, h, &ViewerConfig::default())
    }

    #[test]
    fn initial_view_fits_extent() {
        let v = vp(800, 600);
        assert_eq!((v.center_x, v.center_y), (0.0, 0.0));
        assert_eq!(v.scale, 4.0 / 600.0);
        assert!(v.width as f64 * v.scale >= 4.0);
        assert!(v.height as f64 * v.scale >= 4.0);
    }

    #[test]
    fn non_positive_dimensions_clamp_to_one() {
        let mut v = vp(0, -20);
        assert_eq!((v.width, v.height), (1, 1));
        assert!(v.scale > 0.0);
        v.resize(-5, 0);
        assert_eq!((v.width, v.height), (1, 1));
    }

    #[test]
    fn resize_keeps_view() {
        let mut v = vp(800, 600);
        v.pan(10.0, 4.0);
        let before = (v.center_x, v.center_y, v.scale);
        v.resize(1024, 768);
        assert_eq!((v.width, v.height), (1024, 768));
        assert_eq!((v.center_x, v.center_y, v.scale), before);
    }

    #[test]
    fn pan_moves_content_with_pointer() {
        let mut v = vp(800, 600);
        let s = v.scale;
        v.pan(10.0, -5.0);
        assert_eq!(v.center_x, -10.0 * s);
        assert_eq!(v.center_y, 5.0 * s);
    }

    #[test]
    fn zoom_is_monotonic_and_positive() {
        let start = vp(800, 600);
        let mut prev = start.scale;
        for amount in [0.05, 0.2, 0.5, 0.85] {
            let mut v = start.clone();
            v.zoom(amount);
            assert!(v.scale < prev, "amount {amount} did not shrink further");
            prev = v.scale;
        }
        let mut v = start.clone();
        v.zoom(1e9);
        assert_eq!(v.scale, start.scale * (1.0 - 0.9 * 0.5));
        let mut v = start.clone();
        for _ in 0..10_000 {
            v.zoom(1e9);
        }
        assert!(v.scale > 0.0);
    }

    #[test]
    fn zoom_out_grows_scale() {
        let mut v = vp(800, 600);
        let s = v.scale;
        v.zoom(-0.5);
        assert!(v.scale > s);
    }

    #[test]
    fn zoom_out_stops_at_cap() {
        let mut v = vp(800, 600);
        for _ in 0..5000 {
            v.zoom(-0.9);
        }
        assert_eq!(v.scale, v.max_scale());
        assert!(!v.zoom(-0.9));
        assert!(v.zoom(0.5));
    }

    #[test]
    fn mutations_report_no_op() {
        let mut v = vp(800, 600);
        assert!(!v.reset());
        assert!(!v.resize(800, 600));
        assert!(!v.pan(0.0, 0.0));
        assert!(v.pan(1.0, 0.0));
        assert!(v.reset());
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let mut v = vp(800, 600);
        let before = v.clone();
        assert!(!v.pan(f64::NAN, 1.0));
        assert!(!v.pan(1.0, f64::INFINITY));
        assert!(!v.zoom(f64::NAN));
        assert_eq!(v, before);
    }

    #[test]
    fn reset_restores_initial_view_after_any_history() {
        let mut v = vp(800, 600);
        let initial = v.initial_view();
        v.pan(123.0, -77.0);
        v.zoom(0.7);
        v.zoom(-0.3);
        v.pan(-1.5, 9.0);
        v.resize(300, 200);
        v.reset();
        assert_eq!(
            InitialView {
                center_x: v.center_x,
                center_y: v.center_y,
                scale: v.scale
            },
            initial
        );
        assert_eq!((v.width, v.height), (300, 200));
    }

    #[test]
    fn screen_center_maps_to_view_center() {
        let mut v = vp(800, 600);
        v.pan(50.0, 50.0);
        assert_eq!(v.screen_to_fractal(400.0, 300.0), (v.center_x, v.center_y));
    }
}
