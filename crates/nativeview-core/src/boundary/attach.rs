use std::ffi::c_void;
use std::ptr;

use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use crate::surface::{HostSurface, SurfaceDescriptor};

/// Optional export: receives the drawable right before `nv_gl_init`.
pub const ATTACH_SURFACE_SYMBOL: &str = "nv_gl_attach_surface";

/// Values of [`SurfaceInfo::kind`].
pub mod surface_kind {
    /// No native window; pointers are null and `window_id` is 0.
    pub const NONE: i32 = 0;
    /// `window` is the `HWND`.
    pub const WIN32: i32 = 1;
    /// `window_id` is the X11 `Window`, `display` the `Display*`.
    pub const XLIB: i32 = 2;
    /// `window_id` is the `xcb_window_t`, `display` the `xcb_connection_t*`.
    pub const XCB: i32 = 3;
    /// `window` is the `wl_surface*`, `display` the `wl_display*`.
    pub const WAYLAND: i32 = 4;
    /// `window` is the `NSView*`.
    pub const APPKIT: i32 = 5;
}

/// Drawable handed to the backend through `nv_gl_attach_surface`.
///
/// C layout:
/// ```c
/// typedef struct {
///     int32_t  kind;
///     void*    window;
///     uint64_t window_id;
///     void*    display;
///     int32_t  width, height;
///     int32_t  depth_bits, color_bits, double_buffered;
/// } nv_surface_info;
/// ```
/// The backend creates its context on this window with the given pixel
/// format. Pointers stay valid until `nv_gl_dispose` returns.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SurfaceInfo {
    pub kind: i32,
    pub window: *mut c_void,
    pub window_id: u64,
    pub display: *mut c_void,
    pub width: i32,
    pub height: i32,
    pub depth_bits: i32,
    pub color_bits: i32,
    pub double_buffered: i32,
}

impl SurfaceInfo {
    /// Pixel format and size from `descriptor`, handles from `host`.
    ///
    /// Window systems without a mapping here yield [`surface_kind::NONE`].
    pub fn describe(descriptor: &SurfaceDescriptor, host: Option<&HostSurface>) -> Self {
        let mut info = Self {
            kind: surface_kind::NONE,
            window: ptr::null_mut(),
            window_id: 0,
            display: ptr::null_mut(),
            width: i32::try_from(descriptor.width()).unwrap_or(i32::MAX),
            height: i32::try_from(descriptor.height()).unwrap_or(i32::MAX),
            depth_bits: i32::from(descriptor.depth_bits()),
            color_bits: i32::from(descriptor.color_bits()),
            double_buffered: i32::from(descriptor.double_buffered()),
        };

        let Some(host) = host else {
            return info;
        };

        match host.window() {
            RawWindowHandle::Win32(h) => {
                info.kind = surface_kind::WIN32;
                info.window = h.hwnd.get() as *mut c_void;
            }
            RawWindowHandle::Xlib(h) => {
                info.kind = surface_kind::XLIB;
                info.window_id = u64::from(h.window);
            }
            RawWindowHandle::Xcb(h) => {
                info.kind = surface_kind::XCB;
                info.window_id = u64::from(h.window.get());
            }
            RawWindowHandle::Wayland(h) => {
                info.kind = surface_kind::WAYLAND;
                info.window = h.surface.as_ptr();
            }
            RawWindowHandle::AppKit(h) => {
                info.kind = surface_kind::APPKIT;
                info.window = h.ns_view.as_ptr();
            }
            _ => return info,
        }

        info.display = match host.display() {
            RawDisplayHandle::Xlib(d) => d.display.map_or(ptr::null_mut(), |p| p.as_ptr()),
            RawDisplayHandle::Xcb(d) => d.connection.map_or(ptr::null_mut(), |p| p.as_ptr()),
            RawDisplayHandle::Wayland(d) => d.display.as_ptr(),
            _ => ptr::null_mut(),
        };

        info
    }

    #[inline]
    pub fn has_window(&self) -> bool {
        self.kind != surface_kind::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raw_window_handle::{
        WaylandDisplayHandle, WaylandWindowHandle, XlibDisplayHandle, XlibWindowHandle,
    };
    use std::ptr::NonNull;

    #[test]
    fn without_host_only_the_pixel_format_is_set() {
        let d = SurfaceDescriptor::new(640, 480, 16, 10, false);
        let info = SurfaceInfo::describe(&d, None);

        assert!(!info.has_window());
        assert!(info.window.is_null() && info.display.is_null());
        assert_eq!((info.width, info.height), (640, 480));
        assert_eq!((info.depth_bits, info.color_bits, info.double_buffered), (16, 10, 0));
    }

    #[test]
    fn xlib_window_is_passed_by_id() {
        let mut display_ptr = 0u8;
        let display = XlibDisplayHandle::new(
            Some(NonNull::from(&mut display_ptr).cast::<c_void>()),
            0,
        );
        let host = HostSurface::new(
            RawWindowHandle::Xlib(XlibWindowHandle::new(0x2a00007)),
            RawDisplayHandle::Xlib(display),
        );

        let info = SurfaceInfo::describe(&SurfaceDescriptor::default(), Some(&host));

        assert_eq!(info.kind, surface_kind::XLIB);
        assert_eq!(info.window_id, 0x2a00007);
        assert!(info.window.is_null());
        assert_eq!(info.display.cast::<u8>(), &mut display_ptr as *mut u8);
        assert_eq!(info.double_buffered, 1);
    }

    #[test]
    fn wayland_surface_and_display_are_pointers() {
        let (mut surface, mut display) = (1u8, 2u8);
        let host = HostSurface::new(
            RawWindowHandle::Wayland(WaylandWindowHandle::new(
                NonNull::from(&mut surface).cast::<c_void>(),
            )),
            RawDisplayHandle::Wayland(WaylandDisplayHandle::new(
                NonNull::from(&mut display).cast::<c_void>(),
            )),
        );

        let info = SurfaceInfo::describe(&SurfaceDescriptor::default(), Some(&host));

        assert_eq!(info.kind, surface_kind::WAYLAND);
        assert_eq!(info.window.cast::<u8>(), &mut surface as *mut u8);
        assert_eq!(info.display.cast::<u8>(), &mut display as *mut u8);
    }
}
