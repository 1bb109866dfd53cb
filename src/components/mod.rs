pub mod app;
pub mod help_overlay;

pub use app::App;
