//! Input dispatcher: maps browser input to viewport commands and applies them.
//!
//! Everything here is platform independent; `components::app` converts DOM
//! events into [`InputEvent`]s and acts on the returned [`Dispatch`].

use tracing::debug;

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::gesture::{GestureTuning, wheel_to_pan_direction};
use crate::render::{Command, RenderEngine, RenderTrigger};
use crate::state::{DragSession, ViewportState};

/// Input payloads in device pixels. A wheel without a usable `delta_y` is
/// `None` and produces no change.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Resize { width: i64, height: i64 },
    Wheel { delta_y: Option<f64>, x: f64, y: f64 },
    KeyPress { key: String },
    MouseDown,
    MouseUp,
    MouseMove { x: f64, y: f64 },
    /// Window blur or the pointer leaving the tracked area.
    PointerLost,
}

/// Whether the host should attach or detach its move listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTracking {
    Start,
    Stop,
}

/// What the host must do after an event was handled.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dispatch {
    pub commands: Vec<Command>,
    pub prevent_default: bool,
    pub tracking: Option<MoveTracking>,
    /// An animation frame has to be requested.
    pub schedule_frame: bool,
}

/// Owns the viewport, drag session, render trigger and engine.
#[derive(Debug)]
pub struct Viewer<E> {
    viewport: ViewportState,
    drag: DragSession,
    trigger: RenderTrigger,
    tuning: GestureTuning,
    reset_key: String,
    engine: E,
}

impl<E: RenderEngine> Viewer<E> {
    /// Creates the engine and the initial view. Engine failure is fatal.
    ///
    /// The first frame is already pending when this returns; the host must
    /// schedule it.
    pub fn start(
        target: E::Target,
        width: i64,
        height: i64,
        cfg: &ViewerConfig,
    ) -> Result<(Self, bool), ViewerError> {
        let viewport = ViewportState::initialize(width, height, cfg);
        let engine = E::create(target, viewport.width, viewport.height)?;
        let mut viewer = Self {
            viewport,
            drag: DragSession::default(),
            trigger: RenderTrigger::default(),
            tuning: GestureTuning::from(cfg),
            reset_key: cfg.reset_key.clone(),
            engine,
        };
        let schedule = viewer.trigger.invalidate();
        Ok((viewer, schedule))
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    #[cfg(test)]
    pub fn drag(&self) -> &DragSession {
        &self.drag
    }

    #[cfg(test)]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Translates one event into commands and applies them in order.
    ///
    /// Every command reaches the engine; only those that changed the
    /// viewport mark the view dirty.
    pub fn handle(&mut self, event: InputEvent) -> Dispatch {
        let mut out = self.translate(event);
        let mut changed = false;
        for cmd in &out.commands {
            changed |= self.apply(*cmd);
        }
        if changed {
            out.schedule_frame = self.trigger.invalidate();
        }
        out
    }

    /// Animation frame boundary. Returns whether a draw happened.
    pub fn on_frame(&mut self) -> bool {
        self.trigger.on_frame(&mut self.engine)
    }

    fn translate(&mut self, event: InputEvent) -> Dispatch {
        let mut out = Dispatch::default();
        match event {
            InputEvent::Resize { width, height } => {
                out.commands.push(Command::Resize { width, height });
            }
            InputEvent::Wheel { delta_y, x, y } => {
                out.prevent_default = true;
                let Some(delta_y) = delta_y.filter(|d| d.is_finite() && *d != 0.0) else {
                    return out;
                };
                let (nx, ny) = if x.is_finite() && y.is_finite() {
                    wheel_to_pan_direction(
                        x,
                        y,
                        self.viewport.width as f64,
                        self.viewport.height as f64,
                    )
                } else {
                    (0.0, 0.0)
                };
                let amount = self.tuning.wheel_to_zoom(delta_y);
                out.commands.push(Command::Zoom { amount });
                let (dx, dy) = self.tuning.wheel_to_pan(delta_y, nx, ny);
                if dx != 0.0 || dy != 0.0 {
                    out.commands.push(Command::Pan { dx, dy });
                }
            }
            InputEvent::KeyPress { key } => {
                if key.eq_ignore_ascii_case(&self.reset_key) {
                    out.prevent_default = true;
                    out.commands.push(Command::Reset);
                }
            }
            InputEvent::MouseDown => {
                self.drag.begin();
                out.tracking = Some(MoveTracking::Start);
            }
            InputEvent::MouseMove { x, y } => {
                if let Some((dx, dy)) = self.drag.on_move(x, y) {
                    out.commands.push(Command::Pan { dx, dy });
                }
            }
            InputEvent::MouseUp | InputEvent::PointerLost => {
                if self.drag.end() {
                    out.tracking = Some(MoveTracking::Stop);
                }
            }
        }
        out
    }

    fn apply(&mut self, cmd: Command) -> bool {
        debug!(?cmd, "apply");
        match cmd {
            Command::Pan { dx, dy } => {
                let changed = self.viewport.pan(dx, dy);
                self.engine.pan(dx, dy);
                changed
            }
            Command::Zoom { amount } => {
                let changed = self.viewport.zoom(amount);
                self.engine.zoom(amount);
                changed
            }
            Command::Resize { width, height } => {
                let changed = self.viewport.resize(width, height);
                self.engine.resize(self.viewport.width, self.viewport.height);
                changed
            }
            Command::Reset => {
                let changed = self.viewport.reset();
                self.engine.reset();
                changed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::RecordingEngine;
    use pretty_assertions::assert_eq;

    fn viewer(w: i64, h: i64) -> Viewer<RecordingEngine> {
        let (mut v, scheduled) =
            Viewer::<RecordingEngine>::start(true, w, h, &ViewerConfig::default()).unwrap();
        assert!(scheduled);
        assert!(v.on_frame());
        v
    }

    fn wheel(delta_y: f64, x: f64, y: f64) -> InputEvent {
        InputEvent::Wheel {
            delta_y: Some(delta_y),
            x,
            y,
        }
    }

    #[test]
    fn start_fails_when_engine_cannot_be_created() {
        let err = Viewer::<RecordingEngine>::start(false, 800, 600, &ViewerConfig::default())
            .unwrap_err();
        assert!(matches!(err, ViewerError::EngineInit(_)));
    }

    #[test]
    fn first_frame_draws_once() {
        let v = viewer(800, 600);
        assert_eq!(v.engine().draws, 1);
        assert_eq!(v.engine().size, (800, 600));
    }

    #[test]
    fn wheel_toward_right_of_center_zooms_in_and_shifts_right() {
        let mut v = viewer(800, 600);
        let initial_scale = v.viewport().scale;
        let out = v.handle(wheel(-100.0, 600.0, 300.0));
        assert!(out.prevent_default);
        assert!(out.schedule_frame);
        assert_eq!(
            out.commands,
            vec![
                Command::Zoom {
                    amount: GestureTuning::default().wheel_to_zoom(-100.0)
                },
                Command::Pan { dx: -200.0, dy: 0.0 }
            ]
        );
        assert!(v.viewport().scale < initial_scale);
        assert!(v.viewport().center_x > 0.0);
        assert_eq!(v.viewport().center_y, 0.0);
    }

    #[test]
    fn wheel_at_center_only_zooms() {
        let mut v = viewer(800, 600);
        let out = v.handle(wheel(50.0, 400.0, 300.0));
        assert_eq!(
            out.commands,
            vec![Command::Zoom {
                amount: GestureTuning::default().wheel_to_zoom(50.0)
            }]
        );
        assert_eq!((v.viewport().center_x, v.viewport().center_y), (0.0, 0.0));
    }

    #[test]
    fn malformed_wheel_changes_nothing() {
        let mut v = viewer(800, 600);
        let before = v.viewport().clone();
        for delta_y in [None, Some(f64::NAN), Some(0.0)] {
            let out = v.handle(InputEvent::Wheel {
                delta_y,
                x: 10.0,
                y: 10.0,
            });
            assert!(out.commands.is_empty());
            assert!(!out.schedule_frame);
        }
        assert_eq!(v.viewport(), &before);
        assert!(!v.on_frame());
    }

    #[test]
    fn five_wheel_burst_draws_once_with_final_state() {
        let mut v = viewer(800, 600);
        let mut expected = v.viewport().clone();
        let tuning = GestureTuning::default();
        let mut scheduled = 0;
        for _ in 0..5 {
            let (nx, ny) = wheel_to_pan_direction(700.0, 100.0, 800.0, 600.0);
            expected.zoom(tuning.wheel_to_zoom(-40.0));
            let (dx, dy) = tuning.wheel_to_pan(-40.0, nx, ny);
            expected.pan(dx, dy);
            if v.handle(wheel(-40.0, 700.0, 100.0)).schedule_frame {
                scheduled += 1;
            }
        }
        assert_eq!(scheduled, 1);
        assert!(v.on_frame());
        assert!(!v.on_frame());
        assert_eq!(v.engine().draws, 2);
        assert_eq!(v.viewport(), &expected);
    }

    #[test]
    fn drag_pans_by_pointer_deltas() {
        let mut v = viewer(800, 600);
        let scale = v.viewport().scale;
        let down = v.handle(InputEvent::MouseDown);
        assert_eq!(down.tracking, Some(MoveTracking::Start));
        assert!(down.commands.is_empty());
        let first = v.handle(InputEvent::MouseMove { x: 10.0, y: 10.0 });
        assert!(first.commands.is_empty());
        let second = v.handle(InputEvent::MouseMove { x: 15.0, y: 12.0 });
        assert_eq!(second.commands, vec![Command::Pan { dx: 5.0, dy: 2.0 }]);
        assert_eq!(v.viewport().center_x, -5.0 * scale);
        assert_eq!(v.viewport().center_y, -2.0 * scale);
        let up = v.handle(InputEvent::MouseUp);
        assert_eq!(up.tracking, Some(MoveTracking::Stop));
        assert!(!v.drag().is_active());
    }

    #[test]
    fn pointer_lost_cancels_drag() {
        let mut v = viewer(800, 600);
        v.handle(InputEvent::MouseDown);
        v.handle(InputEvent::MouseMove { x: 1.0, y: 1.0 });
        let out = v.handle(InputEvent::PointerLost);
        assert_eq!(out.tracking, Some(MoveTracking::Stop));
        let moved = v.handle(InputEvent::MouseMove { x: 50.0, y: 50.0 });
        assert!(moved.commands.is_empty());
        // Nothing open, nothing to detach.
        assert_eq!(v.handle(InputEvent::MouseUp).tracking, None);
    }

    #[test]
    fn reset_key_restores_view_and_suppresses_default() {
        let mut v = viewer(800, 600);
        let initial = v.viewport().initial_view();
        v.handle(wheel(-120.0, 10.0, 20.0));
        v.handle(InputEvent::MouseDown);
        v.handle(InputEvent::MouseMove { x: 0.0, y: 0.0 });
        v.handle(InputEvent::MouseMove { x: 30.0, y: -40.0 });
        let other = v.handle(InputEvent::KeyPress { key: "x".into() });
        assert!(!other.prevent_default);
        let out = v.handle(InputEvent::KeyPress { key: "r".into() });
        assert!(out.prevent_default);
        assert_eq!(v.viewport().scale, initial.scale);
        assert_eq!(
            (v.viewport().center_x, v.viewport().center_y),
            (initial.center_x, initial.center_y)
        );
        assert_eq!(v.engine().calls.last(), Some(&Command::Reset));
    }

    #[test]
    fn reset_key_ignores_case() {
        let mut v = viewer(800, 600);
        v.handle(wheel(-120.0, 10.0, 20.0));
        let out = v.handle(InputEvent::KeyPress { key: "R".into() });
        assert!(out.prevent_default);
        assert_eq!(out.commands, vec![Command::Reset]);
        assert_eq!(v.viewport().scale, v.viewport().initial_view().scale);
    }

    #[test]
    fn zoom_out_at_limit_schedules_no_frame() {
        let mut v = viewer(800, 600);
        let max = v.viewport().max_scale();
        for _ in 0..2000 {
            v.handle(wheel(1000.0, 400.0, 300.0));
            v.on_frame();
        }
        assert_eq!(v.viewport().scale, max);
        let draws = v.engine().draws;
        let out = v.handle(wheel(1000.0, 400.0, 300.0));
        assert!(out.prevent_default);
        assert!(!out.schedule_frame);
        assert!(!v.on_frame());
        assert_eq!(v.engine().draws, draws);
        assert_eq!(v.engine().calls.last(), out.commands.last());
    }

    #[test]
    fn reset_at_initial_view_does_not_redraw() {
        let mut v = viewer(800, 600);
        let out = v.handle(InputEvent::KeyPress { key: "r".into() });
        assert!(out.prevent_default);
        assert!(!out.schedule_frame);
        assert_eq!(v.engine().calls, vec![Command::Reset]);
    }

    #[test]
    fn resize_is_clamped_and_forwarded() {
        let mut v = viewer(800, 600);
        let out = v.handle(InputEvent::Resize {
            width: 0,
            height: -3,
        });
        assert!(out.schedule_frame);
        assert_eq!((v.viewport().width, v.viewport().height), (1, 1));
        assert_eq!(v.engine().size, (1, 1));
        assert!(v.on_frame());
    }

    #[test]
    fn commands_reach_engine_in_arrival_order() {
        let mut v = viewer(800, 600);
        v.handle(InputEvent::Resize {
            width: 640,
            height: 480,
        });
        v.handle(wheel(10.0, 320.0, 240.0));
        v.handle(InputEvent::KeyPress { key: "r".into() });
        assert_eq!(
            v.engine().calls,
            vec![
                Command::Resize {
                    width: 640,
                    height: 480
                },
                Command::Zoom {
                    amount: GestureTuning::default().wheel_to_zoom(10.0)
                },
                Command::Reset,
            ]
        );
    }
}
