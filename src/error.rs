//! Error types for the viewer.
//!
//! Almost every input condition is handled locally by clamping or ignoring the
//! gesture; the only fatal condition is failing to construct the rendering
//! engine.

use thiserror::Error;

/// Errors surfaced while bringing the viewer up in the browser.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewerError {
    /// The rendering engine could not be created. Fatal, never retried.
    #[error("rendering engine initialisation failed: {0}")]
    EngineInit(String),

    /// No global `window` (e.g. running outside a browser main thread).
    #[error("no global window available")]
    NoWindow,

    /// The canvas node ref was not attached to a `<canvas>` element.
    #[error("canvas element is not mounted")]
    NoCanvas,

    /// A browser API call failed.
    #[error("browser call failed: {0}")]
    Js(String),
}

impl From<wasm_bindgen::JsValue> for ViewerError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// Errors from loading or validating [`crate::config::ViewerConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The embedded JSON could not be parsed.
    #[error("invalid viewer config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A numeric field was out of its valid range.
    #[error("config field `{field}` is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    /// `log_level` did not name a tracing level.
    #[error("unknown log level `{0}`")]
    LogLevel(String),
}
