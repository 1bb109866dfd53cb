//! CPU escape-time Mandelbrot renderer drawing into a 2D canvas.

use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::render::RenderEngine;
use crate::state::ViewportState;

/// What the canvas engine is created from.
pub struct CanvasTarget {
    pub canvas: HtmlCanvasElement,
    pub config: ViewerConfig,
}

/// Keeps its own copy of the viewport, updated by the same commands as the
/// dispatcher's, and renders it on `draw`.
pub struct CanvasEngine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    view: ViewportState,
    max_iterations: u32,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for CanvasEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasEngine")
            .field("view", &self.view)
            .field("max_iterations", &self.max_iterations)
            .finish_non_exhaustive()
    }
}

impl RenderEngine for CanvasEngine {
    type Target = CanvasTarget;

    fn create(target: CanvasTarget, width: u32, height: u32) -> Result<Self, ViewerError> {
        let CanvasTarget { canvas, config } = target;
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| ViewerError::EngineInit(format!("get_context failed: {e:?}")))?
            .ok_or_else(|| ViewerError::EngineInit("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| ViewerError::EngineInit("context is not a 2d context".into()))?;
        canvas.set_width(width);
        canvas.set_height(height);
        Ok(Self {
            canvas,
            ctx,
            view: ViewportState::initialize(width.into(), height.into(), &config),
            max_iterations: config.max_iterations,
            pixels: Vec::new(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        // Assigning the canvas size clears it, so only do it on a real change.
        if self.view.resize(width.into(), height.into()) {
            self.canvas.set_width(self.view.width);
            self.canvas.set_height(self.view.height);
        }
    }

    fn pan(&mut self, dx: f64, dy: f64) {
        self.view.pan(dx, dy);
    }

    fn zoom(&mut self, amount: f64) {
        self.view.zoom(amount);
    }

    fn reset(&mut self) {
        self.view.reset();
    }

    fn draw(&mut self) {
        let (w, h) = (self.view.width, self.view.height);
        render_rgba(&self.view, self.max_iterations, &mut self.pixels);
        let data = Clamped(self.pixels.as_slice());
        let image = match ImageData::new_with_u8_clamped_array_and_sh(data, w, h) {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!("image data rejected: {e:?}");
                return;
            }
        };
        if let Err(e) = self.ctx.put_image_data(&image, 0.0, 0.0) {
            tracing::warn!("put_image_data failed: {e:?}");
        }
    }
}

/// Fills `buf` with RGBA pixels for the whole view.
pub fn render_rgba(view: &ViewportState, max_iterations: u32, buf: &mut Vec<u8>) {
    let (w, h) = (view.width as usize, view.height as usize);
    buf.clear();
    buf.resize(w * h * 4, 255);
    for py in 0..h {
        for px in 0..w {
            let (cr, ci) = view.screen_to_fractal(px as f64 + 0.5, py as f64 + 0.5);
            let rgb = shade(escape_time(cr, ci, max_iterations), max_iterations);
            let i = (py * w + px) * 4;
            buf[i..i + 3].copy_from_slice(&rgb);
        }
    }
}

/// Smoothed iteration count at which `c` escapes, or `None` if it stays bounded.
pub fn escape_time(cr: f64, ci: f64, max_iterations: u32) -> Option<f64> {
    let (mut zr, mut zi) = (0.0f64, 0.0f64);
    for n in 0..max_iterations {
        let (zr2, zi2) = (zr * zr, zi * zi);
        if zr2 + zi2 > 256.0 {
            let log_zn = (zr2 + zi2).ln() / 2.0;
            let nu = (log_zn / std::f64::consts::LN_2).ln() / std::f64::consts::LN_2;
            return Some(n as f64 + 1.0 - nu);
        }
        zi = 2.0 * zr * zi + ci;
        zr = zr2 - zi2 + cr;
    }
    None
}

fn shade(escape: Option<f64>, max_iterations: u32) -> [u8; 3] {
    let Some(n) = escape else {
        return [0, 0, 0];
    };
    let t = (n / max_iterations as f64).clamp(0.0, 1.0);
    // Bernstein polynomial palette.
    let r = 9.0 * (1.0 - t) * t * t * t;
    let g = 15.0 * (1.0 - t) * (1.0 - t) * t * t;
    let b = 8.5 * (1.0 - t) * (1.0 - t) * (1.0 - t) * t;
    [to_byte(r), to_byte(g), to_byte(b)]
}

fn to_byte(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
