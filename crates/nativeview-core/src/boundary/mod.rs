mod attach;
mod entry_points;
mod library;
mod recording;

pub use attach::{surface_kind, SurfaceInfo, ATTACH_SURFACE_SYMBOL};
pub use entry_points::{EntryPoints, ENTRY_POINT_SYMBOLS};
pub use library::LibraryBackend;
pub use recording::{RecordedCall, RecordedSurface, RecordingBackend};

use std::sync::Arc;

/// The narrow, synchronous call interface into the opaque renderer.
///
/// Every method maps to exactly one exported backend function. Arguments are
/// primitive and passed through untouched; there is no return path. Callers
/// are expected to serialize access (see [`crate::translator::EventTranslator`]).
pub trait NativeBackend: Send + Sync {
    /// Hand over the drawable and pixel format. Issued once, right before
    /// `init`; not one of the lifecycle calls. Backends without the optional
    /// export ignore it.
    fn attach_surface(&self, _info: &SurfaceInfo) {}

    fn init(&self);

    fn display(&self);

    fn reshape(&self, x: i32, y: i32, width: i32, height: i32);

    fn dispose(&self);

    fn mouse_click(&self, x: i32, y: i32, button: i32, click_count: i32);

    fn mouse_move(&self, x: i32, y: i32);

    fn mouse_drag(&self, x: i32, y: i32, button: i32);

    fn mouse_press(&self, x: i32, y: i32, button: i32);

    fn mouse_release(&self, x: i32, y: i32, button: i32);

    fn mouse_enter(&self, x: i32, y: i32);

    fn mouse_exit(&self, x: i32, y: i32);

    fn mouse_wheel(&self, delta: f64);
}

pub type BackendRef = Arc<dyn NativeBackend>;

/// A boundary call as a value. Used for recording and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryCall {
    Init,
    Display,
    Reshape { x: i32, y: i32, width: i32, height: i32 },
    Dispose,
    MouseClick { x: i32, y: i32, button: i32, click_count: i32 },
    MouseMove { x: i32, y: i32 },
    MouseDrag { x: i32, y: i32, button: i32 },
    MousePress { x: i32, y: i32, button: i32 },
    MouseRelease { x: i32, y: i32, button: i32 },
    MouseEnter { x: i32, y: i32 },
    MouseExit { x: i32, y: i32 },
    MouseWheel { delta: f64 },
}

impl BoundaryCall {
    /// Exported symbol that services this call.
    pub fn symbol(&self) -> &'static str {
        use entry_points::symbols::*;
        match self {
            Self::Init => INIT,
            Self::Display => DISPLAY,
            Self::Reshape { .. } => RESHAPE,
            Self::Dispose => DISPOSE,
            Self::MouseClick { .. } => MOUSE_CLICK,
            Self::MouseMove { .. } => MOUSE_MOVE,
            Self::MouseDrag { .. } => MOUSE_DRAG,
            Self::MousePress { .. } => MOUSE_PRESS,
            Self::MouseRelease { .. } => MOUSE_RELEASE,
            Self::MouseEnter { .. } => MOUSE_ENTER,
            Self::MouseExit { .. } => MOUSE_EXIT,
            Self::MouseWheel { .. } => MOUSE_WHEEL,
        }
    }

    /// Replays this call against a backend.
    pub fn apply(&self, backend: &dyn NativeBackend) {
        match *self {
            Self::Init => backend.init(),
            Self::Display => backend.display(),
            Self::Reshape { x, y, width, height } => backend.reshape(x, y, width, height),
            Self::Dispose => backend.dispose(),
            Self::MouseClick { x, y, button, click_count } => {
                backend.mouse_click(x, y, button, click_count)
            }
            Self::MouseMove { x, y } => backend.mouse_move(x, y),
            Self::MouseDrag { x, y, button } => backend.mouse_drag(x, y, button),
            Self::MousePress { x, y, button } => backend.mouse_press(x, y, button),
            Self::MouseRelease { x, y, button } => backend.mouse_release(x, y, button),
            Self::MouseEnter { x, y } => backend.mouse_enter(x, y),
            Self::MouseExit { x, y } => backend.mouse_exit(x, y),
            Self::MouseWheel { delta } => backend.mouse_wheel(delta),
        }
    }
}
