pub mod drag;
pub mod viewport;

pub use drag::DragSession;
pub use viewport::ViewportState;
