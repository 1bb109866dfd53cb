use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Event, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window};
use yew::prelude::*;

use super::help_overlay::HelpOverlay;
use crate::config::ViewerConfig;
use crate::dispatch::{InputEvent, MoveTracking, Viewer};
use crate::engine::{CanvasEngine, CanvasTarget};
use crate::error::ViewerError;
use crate::{logging, util};

/// A DOM listener that unregisters itself when dropped.
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn new<E, F>(target: &EventTarget, event: &'static str, mut f: F) -> Result<Self, ViewerError>
    where
        E: JsCast + 'static,
        F: FnMut(E) + 'static,
    {
        let callback = Closure::wrap(Box::new(move |e: Event| {
            if let Ok(e) = e.dyn_into::<E>() {
                f(e);
            }
        }) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(
            event,
            callback.as_ref().unchecked_ref::<js_sys::Function>(),
        )?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback(
            self.event,
            self.callback.as_ref().unchecked_ref::<js_sys::Function>(),
        );
    }
}

/// Browser-side owner of the viewer. Callbacks hold `Weak` references only.
struct Host {
    window: Window,
    viewer: RefCell<Viewer<CanvasEngine>>,
    frame: RefCell<Option<Closure<dyn FnMut()>>>,
    raf_id: Cell<Option<i32>>,
    dpr: Cell<f64>,
    moves: RefCell<Option<Listener>>,
}

impl Host {
    /// Wraps a started viewer and installs the frame callback.
    fn new(window: Window, viewer: Viewer<CanvasEngine>) -> Rc<Self> {
        let host = Rc::new(Self {
            dpr: Cell::new(util::device_pixel_ratio(&window)),
            window,
            viewer: RefCell::new(viewer),
            frame: RefCell::new(None),
            raf_id: Cell::new(None),
            moves: RefCell::new(None),
        });
        let weak = Rc::downgrade(&host);
        *host.frame.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            if let Some(host) = weak.upgrade() {
                host.raf_id.set(None);
                host.viewer.borrow_mut().on_frame();
            }
        }) as Box<dyn FnMut()>));
        host
    }

    fn request_frame(&self) {
        let requested = {
            let frame = self.frame.borrow();
            frame.as_ref().map(|cb| {
                self.window
                    .request_animation_frame(cb.as_ref().unchecked_ref::<js_sys::Function>())
            })
        };
        self.settle_frame(requested);
    }

    fn settle_frame(&self, requested: Option<Result<i32, JsValue>>) {
        match requested {
            Some(Ok(id)) => self.raf_id.set(Some(id)),
            Some(Err(e)) => {
                // No frame will come; draw now so the last state still shows.
                tracing::warn!("requestAnimationFrame failed: {e:?}");
                self.viewer.borrow_mut().on_frame();
            }
            None => {}
        }
    }

    fn device(&self, x: i32, y: i32) -> (f64, f64) {
        let dpr = self.dpr.get();
        (x as f64 * dpr, y as f64 * dpr)
    }
}

fn dispatch(host: &Rc<Host>, event: InputEvent) -> bool {
    let out = host.viewer.borrow_mut().handle(event);
    if out.schedule_frame {
        host.request_frame();
    }
    match out.tracking {
        Some(MoveTracking::Start) => track_moves(host),
        Some(MoveTracking::Stop) => {
            host.moves.borrow_mut().take();
        }
        None => {}
    }
    out.prevent_default
}

fn track_moves(host: &Rc<Host>) {
    let weak = Rc::downgrade(host);
    let target: &EventTarget = host.window.as_ref();
    let listener = Listener::new(target, "mousemove", move |e: MouseEvent| {
        if let Some(host) = weak.upgrade() {
            let (x, y) = host.device(e.client_x(), e.client_y());
            dispatch(&host, InputEvent::MouseMove { x, y });
        }
    });
    match listener {
        Ok(l) => *host.moves.borrow_mut() = Some(l),
        Err(e) => tracing::warn!(%e, "could not track pointer moves"),
    }
}

/// Registers `f` for `event` on `target`, routing through a weak host handle.
fn on<E, F>(
    host: &Rc<Host>,
    target: &EventTarget,
    event: &'static str,
    f: F,
) -> Result<Listener, ViewerError>
where
    E: JsCast + 'static,
    F: Fn(&Rc<Host>, E) + 'static,
{
    let weak: Weak<Host> = Rc::downgrade(host);
    Listener::new(target, event, move |e: E| {
        if let Some(host) = weak.upgrade() {
            f(&host, e);
        }
    })
}

/// Everything `mount` set up; dropping it tears the viewer down.
struct Mounted {
    host: Rc<Host>,
    _listeners: Vec<Listener>,
}

impl Drop for Mounted {
    fn drop(&mut self) {
        if let Some(id) = self.host.raf_id.take() {
            let _ = self.host.window.cancel_animation_frame(id);
        }
        self.host.moves.borrow_mut().take();
        self.host.frame.borrow_mut().take();
    }
}

fn load_config(window: &Window) -> ViewerConfig {
    let loaded = window.document().map(|doc| util::read_config(&doc));
    match loaded {
        Some(Ok(Some(cfg))) => {
            logging::init(cfg.level().unwrap_or(tracing::Level::INFO));
            cfg
        }
        Some(Err(e)) => {
            let cfg = ViewerConfig::default();
            logging::init(cfg.level().unwrap_or(tracing::Level::INFO));
            tracing::warn!(%e, "ignoring embedded config, using defaults");
            cfg
        }
        _ => {
            let cfg = ViewerConfig::default();
            logging::init(cfg.level().unwrap_or(tracing::Level::INFO));
            cfg
        }
    }
}

fn mount(canvas_ref: &NodeRef) -> Result<Mounted, ViewerError> {
    let canvas: HtmlCanvasElement = canvas_ref.cast().ok_or(ViewerError::NoCanvas)?;
    mount_on(canvas)
}

fn mount_on(canvas: HtmlCanvasElement) -> Result<Mounted, ViewerError> {
    let window = util::window()?;
    let config = load_config(&window);
    let (width, height) = util::window_size(&window);
    let (viewer, first_frame) = Viewer::<CanvasEngine>::start(
        CanvasTarget {
            canvas: canvas.clone(),
            config: config.clone(),
        },
        width,
        height,
        &config,
    )?;
    let initial = viewer.viewport().initial_view();
    tracing::info!(width, height, scale = initial.scale, "viewer started");

    let host = Host::new(window.clone(), viewer);
    if first_frame {
        host.request_frame();
    }

    let win: &EventTarget = window.as_ref();
    let surface: &EventTarget = canvas.as_ref();
    let mut listeners = vec![
        on(&host, win, "resize", |host, _e: Event| {
            host.dpr.set(util::device_pixel_ratio(&host.window));
            let (width, height) = util::window_size(&host.window);
            dispatch(host, InputEvent::Resize { width, height });
        })?,
        on(&host, surface, "wheel", |host, e: WheelEvent| {
            let (x, y) = host.device(e.client_x(), e.client_y());
            let delta_y = Some(e.delta_y()).filter(|d| d.is_finite());
            if dispatch(host, InputEvent::Wheel { delta_y, x, y }) {
                e.prevent_default();
            }
        })?,
        on(&host, win, "keypress", |host, e: KeyboardEvent| {
            if dispatch(host, InputEvent::KeyPress { key: e.key() }) {
                e.prevent_default();
            }
        })?,
        on(&host, win, "mousedown", |host, _e: MouseEvent| {
            dispatch(host, InputEvent::MouseDown);
        })?,
        on(&host, win, "mouseup", |host, _e: MouseEvent| {
            dispatch(host, InputEvent::MouseUp);
        })?,
        on(&host, win, "blur", |host, _e: Event| {
            dispatch(host, InputEvent::PointerLost);
        })?,
    ];
    if let Some(root) = window.document().and_then(|d| d.document_element()) {
        let root: &EventTarget = root.as_ref();
        listeners.push(on(&host, root, "mouseleave", |host, _e: MouseEvent| {
            dispatch(host, InputEvent::PointerLost);
        })?);
    }

    Ok(Mounted {
        host,
        _listeners: listeners,
    })
}

#[function_component(App)]
pub fn app() -> Html {
    let canvas_ref = use_node_ref();
    let fatal = use_state(|| None::<String>);
    let show_help = use_state(|| true);

    {
        let canvas_ref = canvas_ref.clone();
        let fatal = fatal.clone();
        use_effect_with((), move |_| {
            let mounted = match mount(&canvas_ref) {
                Ok(m) => Some(m),
                Err(e) => {
                    logging::init(tracing::Level::INFO);
                    tracing::error!(%e, "fractal viewer could not start");
                    fatal.set(Some(e.to_string()));
                    None
                }
            };
            move || drop(mounted)
        });
    }

    let hide_help = {
        let show_help = show_help.clone();
        Callback::from(move |_| show_help.set(false))
    };

    html! {
        <div style="position:relative; width:100vw; height:100vh; overflow:hidden; background:#000;">
            <canvas ref={canvas_ref} style="display:block; width:100vw; height:100vh;" />
            if let Some(msg) = &*fatal {
                <div style="position:absolute; top:50%; left:50%; transform:translate(-50%, -50%); background:rgba(40,0,0,0.9); border:1px solid #f85149; color:#f0f6fc; padding:20px 28px; border-radius:10px; font-family:sans-serif;">
                    <h3 style="margin:0 0 8px 0;">{"Viewer unavailable"}</h3>
                    <div style="font-size:13px; opacity:0.85;">{ msg.clone() }</div>
                </div>
            } else {
                <HelpOverlay show={*show_help} on_close={hide_help} />
            }
        </div>
    }
}
