//! winit host for a native surface: owns the window and the event loop and
//! feeds a [`nativeview_core::ViewSession`].

mod app;
pub mod events;

pub use app::run_viewer;
pub use events::{button_code, PointerTracker};
