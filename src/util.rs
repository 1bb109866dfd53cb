// Browser helpers shared by the components.
use web_sys::{Document, Window};

use crate::config::ViewerConfig;
use crate::error::{ConfigError, ViewerError};

/// Id of the optional `<script type="application/json">` holding a config.
pub const CONFIG_ELEMENT_ID: &str = "viewer-config";

pub fn window() -> Result<Window, ViewerError> {
    web_sys::window().ok_or(ViewerError::NoWindow)
}

pub fn device_pixel_ratio(window: &Window) -> f64 {
    let dpr = window.device_pixel_ratio();
    if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 }
}

/// Inner window size in device pixels. Falls back to 800x600 when the browser
/// reports nothing usable.
pub fn window_size(window: &Window) -> (i64, i64) {
    let dpr = device_pixel_ratio(window);
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(600.0);
    to_device(width, height, dpr)
}

fn to_device(css_width: f64, css_height: f64, dpr: f64) -> (i64, i64) {
    let px = |v: f64| if v.is_finite() { (v * dpr).round() as i64 } else { 0 };
    (px(css_width), px(css_height))
}

/// Reads the embedded config, if any. `Ok(None)` when the page has none.
pub fn read_config(document: &Document) -> Result<Option<ViewerConfig>, ConfigError> {
    let Some(el) = document.get_element_by_id(CONFIG_ELEMENT_ID) else {
        return Ok(None);
    };
    let raw = el.text_content().unwrap_or_default();
    if raw.trim().is_empty() {
        return Ok(None);
    }
    ViewerConfig::from_json(&raw).map(Some)
}
