//! Reference backend exporting the `nv_*` entry points.
//!
//! Does no real rendering: it tracks viewport, pointer and zoom state the way
//! an interactive viewer would, and logs what it receives. Useful for running
//! the viewer end to end without a graphics stack.

use std::ffi::c_void;

use log::{debug, info, trace};
use parking_lot::{const_mutex, Mutex};

/// Button indices used internally: 0 rotate, 1 zoom, 2 pan.
const ROTATE: usize = 0;
const ZOOM: usize = 1;
const PAN: usize = 2;

/// Layout of `nativeview_core::boundary::SurfaceInfo`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct NvSurfaceInfo {
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

/// Pixel format we would create the GL context with.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PixelFormat {
    window_kind: i32,
    depth_bits: i32,
    color_bits: i32,
    double_buffered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct SampleRenderer {
    format: Option<PixelFormat>,
    initialized: bool,
    viewport: (i32, i32, i32, i32),
    cursor: (i32, i32),
    inside: bool,
    buttons_down: [bool; 3],
    frames: u64,
    zoom: f64,
    pan: (i32, i32),
}

impl SampleRenderer {
    const fn new() -> Self {
        Self {
            format: None,
            initialized: false,
            viewport: (0, 0, 0, 0),
            cursor: (0, 0),
            inside: false,
            buttons_down: [false; 3],
            frames: 0,
            zoom: 1.0,
            pan: (0, 0),
        }
    }

    fn drag_to(&mut self, x: i32, y: i32) {
        let (dx, dy) = (x - self.cursor.0, y - self.cursor.1);
        if self.buttons_down[PAN] {
            self.pan = (self.pan.0 + dx, self.pan.1 + dy);
        }
        if self.buttons_down[ZOOM] {
            self.zoom = (self.zoom * (1.0 + f64::from(dy) * 0.01)).clamp(0.05, 50.0);
        }
        self.cursor = (x, y);
    }
}

static RENDERER: Mutex<SampleRenderer> = const_mutex(SampleRenderer::new());

/// Host button number to internal index: left rotates, right zooms, middle pans.
fn slot(button: i32) -> Option<usize> {
    match button {
        1 => Some(ROTATE),
        2 => Some(PAN),
        3 => Some(ZOOM),
        _ => None,
    }
}

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// # Safety
/// `info` is null or points to a valid `NvSurfaceInfo` for the call.
#[no_mangle]
pub unsafe extern "C" fn nv_gl_attach_surface(info: *const NvSurfaceInfo) {
    init_logging();

    // Safety: guaranteed by the caller.
    let Some(info) = (unsafe { info.as_ref() }) else {
        return;
    };

    let format = PixelFormat {
        window_kind: info.kind,
        depth_bits: info.depth_bits,
        color_bits: info.color_bits,
        double_buffered: info.double_buffered != 0,
    };
    info!(
        "sample: attach kind={} {}x{} depth={} color={} double={}",
        info.kind, info.width, info.height, format.depth_bits, format.color_bits, format.double_buffered
    );
    RENDERER.lock().format = Some(format);
}

#[no_mangle]
pub extern "C" fn nv_gl_init() {
    init_logging();

    let mut r = RENDERER.lock();
    let format = r.format;
    *r = SampleRenderer::new();
    r.format = format;
    r.initialized = true;
    info!("sample: init");
}

#[no_mangle]
pub extern "C" fn nv_gl_display() {
    let mut r = RENDERER.lock();
    if !r.initialized {
        return;
    }
    r.frames += 1;
    if r.frames % 600 == 0 {
        debug!("sample: {} frames, zoom {:.2}, pan {:?}", r.frames, r.zoom, r.pan);
    }
}

#[no_mangle]
pub extern "C" fn nv_gl_reshape(x: i32, y: i32, width: i32, height: i32) {
    RENDERER.lock().viewport = (x, y, width.max(1), height.max(1));
    debug!("sample: viewport {x},{y} {width}x{height}");
}

#[no_mangle]
pub extern "C" fn nv_gl_dispose() {
    let frames = {
        let mut r = RENDERER.lock();
        r.initialized = false;
        r.frames
    };
    info!("sample: dispose after {frames} frames");
}

#[no_mangle]
pub extern "C" fn nv_mouse_click_event(x: i32, y: i32, button: i32, click_count: i32) {
    let mut r = RENDERER.lock();
    r.cursor = (x, y);
    // Double left click resets the view.
    if button == 1 && click_count >= 2 {
        r.zoom = 1.0;
        r.pan = (0, 0);
        debug!("sample: view reset");
    }
}

#[no_mangle]
pub extern "C" fn nv_mouse_move_event(x: i32, y: i32) {
    RENDERER.lock().cursor = (x, y);
}

#[no_mangle]
pub extern "C" fn nv_mouse_drag_event(x: i32, y: i32, button: i32) {
    trace!("sample: drag {x},{y} button {button}");
    RENDERER.lock().drag_to(x, y);
}

#[no_mangle]
pub extern "C" fn nv_mouse_press_event(x: i32, y: i32, button: i32) {
    let mut r = RENDERER.lock();
    r.cursor = (x, y);
    if let Some(s) = slot(button) {
        r.buttons_down[s] = true;
    }
}

#[no_mangle]
pub extern "C" fn nv_mouse_release_event(x: i32, y: i32, button: i32) {
    let mut r = RENDERER.lock();
    r.cursor = (x, y);
    if let Some(s) = slot(button) {
        r.buttons_down[s] = false;
    }
}

#[no_mangle]
pub extern "C" fn nv_mouse_enter_event(x: i32, y: i32) {
    let mut r = RENDERER.lock();
    r.cursor = (x, y);
    r.inside = true;
}

#[no_mangle]
pub extern "C" fn nv_mouse_exit_event(x: i32, y: i32) {
    let mut r = RENDERER.lock();
    r.cursor = (x, y);
    r.inside = false;
    r.buttons_down = [false; 3];
}

#[no_mangle]
pub extern "C" fn nv_mouse_wheel_event(delta: f64) {
    let mut r = RENDERER.lock();
    // Negative delta is away from the user: zoom in.
    r.zoom = (r.zoom * 1.1f64.powf(-delta)).clamp(0.05, 50.0);
}

/// Frames rendered since the last `nv_gl_init`. Diagnostics only.
#[no_mangle]
pub extern "C" fn nv_sample_frames() -> u64 {
    RENDERER.lock().frames
}

/// Depth bits of the attached surface, -1 if none was attached.
#[no_mangle]
pub extern "C" fn nv_sample_depth_bits() -> i32 {
    RENDERER.lock().format.map_or(-1, |f| f.depth_bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    // The renderer is process-global; keep every assertion in one test.
    #[test]
    fn entry_points_drive_renderer_state() {
        let info = NvSurfaceInfo {
            kind: 0,
            window: std::ptr::null_mut(),
            window_id: 0,
            display: std::ptr::null_mut(),
            width: 640,
            height: 480,
            depth_bits: 16,
            color_bits: 8,
            double_buffered: 1,
        };
        // Safety: `info` lives across the call.
        unsafe { nv_gl_attach_surface(&info) };
        nv_gl_init();
        assert_eq!(nv_sample_depth_bits(), 16);
        nv_gl_reshape(0, 0, 640, 0);
        nv_gl_display();
        nv_gl_display();

        nv_mouse_enter_event(10, 10);
        nv_mouse_press_event(10, 10, 2);
        nv_mouse_drag_event(15, 12, 2);
        nv_mouse_release_event(15, 12, 2);
        nv_mouse_wheel_event(-1.0);

        let r = *RENDERER.lock();
        assert!(r.initialized && r.inside);
        assert_eq!(r.viewport, (0, 0, 640, 1));
        assert_eq!(r.frames, 2);
        assert_eq!(r.pan, (5, 2));
        assert!(r.zoom > 1.0);
        assert_eq!(r.buttons_down, [false; 3]);

        nv_mouse_click_event(15, 12, 1, 2);
        let r = *RENDERER.lock();
        assert_eq!((r.zoom, r.pan), (1.0, (0, 0)));

        nv_gl_dispose();
        nv_gl_display();
        assert_eq!(nv_sample_frames(), 2);
        assert_eq!(r.format.map(|f| f.double_buffered), Some(true));
    }

    #[test]
    fn button_slots() {
        assert_eq!(slot(1), Some(ROTATE));
        assert_eq!(slot(2), Some(PAN));
        assert_eq!(slot(3), Some(ZOOM));
        assert_eq!(slot(7), None);
    }
}
