mod components;
mod config;
mod dispatch;
mod engine;
mod error;
mod gesture;
mod logging;
mod render;
mod state;
mod util;

use components::App;

fn main() {
    console_error_panic_hook::set_once();
    yew::Renderer::<App>::new().render();
}
