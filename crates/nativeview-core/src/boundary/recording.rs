use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::{BoundaryCall, NativeBackend, SurfaceInfo};

#[derive(Debug, Clone, Copy)]
pub struct RecordedCall {
    pub call: BoundaryCall,
    pub at: Instant,
}

/// What a [`RecordingBackend`] kept of an attach call. Handles are reduced
/// to presence flags so the record stays `Send`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedSurface {
    pub kind: i32,
    pub has_window: bool,
    pub has_display: bool,
    pub width: i32,
    pub height: i32,
    pub depth_bits: i32,
    pub color_bits: i32,
    pub double_buffered: bool,
}

impl From<&SurfaceInfo> for RecordedSurface {
    fn from(info: &SurfaceInfo) -> Self {
        Self {
            kind: info.kind,
            has_window: !info.window.is_null() || info.window_id != 0,
            has_display: !info.display.is_null(),
            width: info.width,
            height: info.height,
            depth_bits: info.depth_bits,
            color_bits: info.color_bits,
            double_buffered: info.double_buffered != 0,
        }
    }
}

/// In-process backend that records every call it receives, in order.
///
/// Stands in for a real library in tests and dry runs. An optional display
/// delay simulates a slow frame so shutdown ordering can be observed.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<RecordedCall>>,
    surfaces: Mutex<Vec<RecordedSurface>>,
    display_delay: Option<Duration>,
}

impl RecordingBackend {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_display_delay(delay: Duration) -> Self {
        Self {
            display_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<BoundaryCall> {
        self.calls.lock().iter().map(|r| r.call).collect()
    }

    /// Attach calls received, oldest first.
    pub fn surfaces(&self) -> Vec<RecordedSurface> {
        self.surfaces.lock().clone()
    }

    pub fn records(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&BoundaryCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|r| pred(&r.call)).count()
    }

    #[inline]
    pub fn display_count(&self) -> usize {
        self.count(|c| matches!(c, BoundaryCall::Display))
    }

    /// Calls other than `display`, in arrival order.
    pub fn non_display_calls(&self) -> Vec<BoundaryCall> {
        self.calls
            .lock()
            .iter()
            .map(|r| r.call)
            .filter(|c| !matches!(c, BoundaryCall::Display))
            .collect()
    }

    fn record(&self, call: BoundaryCall) {
        self.calls.lock().push(RecordedCall {
            call,
            at: Instant::now(),
        });
    }
}

impl NativeBackend for RecordingBackend {
    fn attach_surface(&self, info: &SurfaceInfo) {
        self.surfaces.lock().push(RecordedSurface::from(info));
    }

    fn init(&self) {
        self.record(BoundaryCall::Init);
    }

    fn display(&self) {
        if let Some(delay) = self.display_delay {
            thread::sleep(delay);
        }
        self.record(BoundaryCall::Display);
    }

    fn reshape(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(BoundaryCall::Reshape { x, y, width, height });
    }

    fn dispose(&self) {
        self.record(BoundaryCall::Dispose);
    }

    fn mouse_click(&self, x: i32, y: i32, button: i32, click_count: i32) {
        self.record(BoundaryCall::MouseClick { x, y, button, click_count });
    }

    fn mouse_move(&self, x: i32, y: i32) {
        self.record(BoundaryCall::MouseMove { x, y });
    }

    fn mouse_drag(&self, x: i32, y: i32, button: i32) {
        self.record(BoundaryCall::MouseDrag { x, y, button });
    }

    fn mouse_press(&self, x: i32, y: i32, button: i32) {
        self.record(BoundaryCall::MousePress { x, y, button });
    }

    fn mouse_release(&self, x: i32, y: i32, button: i32) {
        self.record(BoundaryCall::MouseRelease { x, y, button });
    }

    fn mouse_enter(&self, x: i32, y: i32) {
        self.record(BoundaryCall::MouseEnter { x, y });
    }

    fn mouse_exit(&self, x: i32, y: i32) {
        self.record(BoundaryCall::MouseExit { x, y });
    }

    fn mouse_wheel(&self, delta: f64) {
        self.record(BoundaryCall::MouseWheel { delta });
    }
}
