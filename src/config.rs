use serde::Deserialize;
use tracing::Level;

use crate::error::ConfigError;

/// Tunables for the viewer. Every field has a default, so an embedded config
/// only needs to name what it overrides.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Fractal-space point shown at the viewport center on start and reset.
    pub initial_center: (f64, f64),
    /// Fractal-space span that must fit in both viewport dimensions initially.
    pub initial_extent: f64,
    /// Sensitivity `k` in `scale *= 1 - clamp(amount) * k`. Must be in `(0, 1]`.
    pub zoom_sensitivity: f64,
    /// Wheel `deltaY` to zoom amount; the sign is inverted when applied.
    pub wheel_zoom_factor: f64,
    /// Base magnitude of the cursor-directed pan per unit of `deltaY`.
    pub wheel_pan_factor: f64,
    /// Extra pan multiplier when zooming in. Empirical anchor correction.
    pub zoom_in_pan_multiplier: f64,
    /// Key that resets the view.
    pub reset_key: String,
    /// Escape-time iteration cap for the canvas engine.
    pub max_iterations: u32,
    /// Minimum level written to the console.
    pub log_level: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            initial_center: (0.0, 0.0),
            initial_extent: 4.0,
            zoom_sensitivity: 0.5,
            wheel_zoom_factor: 0.01,
            wheel_pan_factor: 1.0,
            zoom_in_pan_multiplier: 2.0,
            reset_key: "r".into(),
            max_iterations: 128,
            log_level: "info".into(),
        }
    }
}

impl ViewerConfig {
    /// Parses a (possibly partial) JSON config and validates it.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (cx, cy) = self.initial_center;
        check("initial_center.0", cx, cx.is_finite())?;
        check("initial_center.1", cy, cy.is_finite())?;
        check(
            "initial_extent",
            self.initial_extent,
            self.initial_extent.is_finite() && self.initial_extent > 0.0,
        )?;
        check(
            "zoom_sensitivity",
            self.zoom_sensitivity,
            self.zoom_sensitivity > 0.0 && self.zoom_sensitivity <= 1.0,
        )?;
        check(
            "wheel_zoom_factor",
            self.wheel_zoom_factor,
            self.wheel_zoom_factor.is_finite() && self.wheel_zoom_factor >= 0.0,
        )?;
        check(
            "wheel_pan_factor",
            self.wheel_pan_factor,
            self.wheel_pan_factor.is_finite() && self.wheel_pan_factor >= 0.0,
        )?;
        check(
            "zoom_in_pan_multiplier",
            self.zoom_in_pan_multiplier,
            self.zoom_in_pan_multiplier.is_finite() && self.zoom_in_pan_multiplier >= 0.0,
        )?;
        check(
            "max_iterations",
            self.max_iterations as f64,
            self.max_iterations > 0,
        )?;
        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<Level, ConfigError> {
        self.log_level
            .parse::<Level>()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }
}

fn check(field: &'static str, value: f64, ok: bool) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}
