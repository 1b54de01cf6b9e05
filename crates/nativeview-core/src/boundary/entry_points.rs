use libloading::Library;

use super::attach::{SurfaceInfo, ATTACH_SURFACE_SYMBOL};

/// Exported C symbol names. A backend library must export all of them.
pub mod symbols {
    pub const INIT: &str = "nv_gl_init";
    pub const DISPLAY: &str = "nv_gl_display";
    pub const RESHAPE: &str = "nv_gl_reshape";
    pub const DISPOSE: &str = "nv_gl_dispose";
    pub const MOUSE_CLICK: &str = "nv_mouse_click_event";
    pub const MOUSE_MOVE: &str = "nv_mouse_move_event";
    pub const MOUSE_DRAG: &str = "nv_mouse_drag_event";
    pub const MOUSE_PRESS: &str = "nv_mouse_press_event";
    pub const MOUSE_RELEASE: &str = "nv_mouse_release_event";
    pub const MOUSE_ENTER: &str = "nv_mouse_enter_event";
    pub const MOUSE_EXIT: &str = "nv_mouse_exit_event";
    pub const MOUSE_WHEEL: &str = "nv_mouse_wheel_event";
}

pub const ENTRY_POINT_SYMBOLS: [&str; 12] = [
    symbols::INIT,
    symbols::DISPLAY,
    symbols::RESHAPE,
    symbols::DISPOSE,
    symbols::MOUSE_CLICK,
    symbols::MOUSE_MOVE,
    symbols::MOUSE_DRAG,
    symbols::MOUSE_PRESS,
    symbols::MOUSE_RELEASE,
    symbols::MOUSE_ENTER,
    symbols::MOUSE_EXIT,
    symbols::MOUSE_WHEEL,
];

pub(crate) type VoidFn = unsafe extern "C" fn();
pub(crate) type RectFn = unsafe extern "C" fn(i32, i32, i32, i32);
pub(crate) type PointFn = unsafe extern "C" fn(i32, i32);
pub(crate) type ButtonFn = unsafe extern "C" fn(i32, i32, i32);
pub(crate) type WheelFn = unsafe extern "C" fn(f64);
pub(crate) type AttachFn = unsafe extern "C" fn(*const SurfaceInfo);

/// Function pointers resolved from a backend library.
///
/// Only valid while the owning [`Library`] is loaded; [`super::LibraryBackend`]
/// keeps both together.
#[derive(Clone, Copy)]
pub struct EntryPoints {
    pub(crate) init: VoidFn,
    pub(crate) display: VoidFn,
    pub(crate) reshape: RectFn,
    pub(crate) dispose: VoidFn,
    pub(crate) mouse_click: RectFn,
    pub(crate) mouse_move: PointFn,
    pub(crate) mouse_drag: ButtonFn,
    pub(crate) mouse_press: ButtonFn,
    pub(crate) mouse_release: ButtonFn,
    pub(crate) mouse_enter: PointFn,
    pub(crate) mouse_exit: PointFn,
    pub(crate) mouse_wheel: WheelFn,
    pub(crate) attach_surface: Option<AttachFn>,
}

impl std::fmt::Debug for EntryPoints {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryPoints")
            .field("symbols", &ENTRY_POINT_SYMBOLS.len())
            .field("attach_surface", &self.attach_surface.is_some())
            .finish()
    }
}

impl EntryPoints {
    /// Resolve the full table. On failure returns the first missing symbol.
    ///
    /// [`ATTACH_SURFACE_SYMBOL`] is optional and never fails the lookup.
    ///
    /// # Safety
    /// The library must export every symbol with the C signature declared
    /// above. Nothing here can verify that.
    pub(crate) unsafe fn resolve(lib: &Library) -> Result<Self, &'static str> {
        // Safety: forwarded to the caller's contract on exported signatures.
        unsafe {
            Ok(Self {
                init: symbol(lib, symbols::INIT)?,
                display: symbol(lib, symbols::DISPLAY)?,
                reshape: symbol(lib, symbols::RESHAPE)?,
                dispose: symbol(lib, symbols::DISPOSE)?,
                mouse_click: symbol(lib, symbols::MOUSE_CLICK)?,
                mouse_move: symbol(lib, symbols::MOUSE_MOVE)?,
                mouse_drag: symbol(lib, symbols::MOUSE_DRAG)?,
                mouse_press: symbol(lib, symbols::MOUSE_PRESS)?,
                mouse_release: symbol(lib, symbols::MOUSE_RELEASE)?,
                mouse_enter: symbol(lib, symbols::MOUSE_ENTER)?,
                mouse_exit: symbol(lib, symbols::MOUSE_EXIT)?,
                mouse_wheel: symbol(lib, symbols::MOUSE_WHEEL)?,
                attach_surface: symbol(lib, ATTACH_SURFACE_SYMBOL).ok(),
            })
        }
    }
}

unsafe fn symbol<T: Copy>(lib: &Library, name: &'static str) -> Result<T, &'static str> {
    let mut bytes = Vec::with_capacity(name.len() + 1);
    bytes.extend_from_slice(name.as_bytes());
    bytes.push(0);

    let sym = unsafe { lib.get::<T>(&bytes).map_err(|_| name)? };
    let f: T = *sym;

    // End the borrow of `lib` before handing the pointer out.
    drop(sym);

    Ok(f)
}
