use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, info, trace, warn};
use parking_lot::Mutex;

use crate::boundary::{BackendRef, BoundaryCall, NativeBackend, SurfaceInfo};
use crate::input::InputEvent;
use crate::surface::{HostSurface, SurfaceDescriptor, SurfaceLifecycleState};

/// Smallest extent forwarded by `reshape`.
pub const MIN_EXTENT: i32 = 1;

/// Clamp a surface extent so the backend never sees zero or a negative size.
#[inline]
pub fn clamp_extent(v: i32) -> i32 {
    v.max(MIN_EXTENT)
}

/// Forwards surface lifecycle and pointer events to the backend.
///
/// Owns the surface lifecycle state. Every forwarding call takes the state
/// lock, checks the state, calls the backend and releases, so calls from the
/// UI thread and the frame driver are serialized and none can slip past
/// `dispose`.
///
/// Policies:
/// - calls before `activate` or after `dispose` are dropped and never reach
///   the backend;
/// - a repeated `dispose` is a silent no-op;
/// - `reshape` clamps width and height to [`MIN_EXTENT`].
pub struct EventTranslator {
    descriptor: SurfaceDescriptor,
    backend: BackendRef,
    state: Mutex<SurfaceLifecycleState>,
    forwarded: AtomicU64,
    rejected: AtomicU64,
}

impl EventTranslator {
    /// First construction phase. Nothing crosses the boundary yet.
    pub fn create(descriptor: SurfaceDescriptor, backend: BackendRef) -> Self {
        Self {
            descriptor,
            backend,
            state: Mutex::new(SurfaceLifecycleState::Uninitialized),
            forwarded: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn descriptor(&self) -> &SurfaceDescriptor {
        &self.descriptor
    }

    #[inline]
    pub fn state(&self) -> SurfaceLifecycleState {
        *self.state.lock()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state() == SurfaceLifecycleState::Active
    }

    #[inline]
    pub fn forwarded_calls(&self) -> u64 {
        self.forwarded.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected_calls(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Second construction phase without a native window.
    #[inline]
    pub fn activate(&self) -> bool {
        self.activate_on(None)
    }

    /// Second construction phase: attach the drawable, then forward `init`.
    ///
    /// The backend receives the descriptor's pixel format and, with `host`,
    /// the window to draw into. Returns `true` only for the call that
    /// performed the transition.
    pub fn activate_on(&self, host: Option<&HostSurface>) -> bool {
        let mut state = self.state.lock();
        match *state {
            SurfaceLifecycleState::Uninitialized => {
                let info = SurfaceInfo::describe(&self.descriptor, host);
                if host.is_some() && !info.has_window() {
                    warn!("translator: unsupported window system, backend gets no window");
                }
                info!(
                    "translator: init surface {}x{} depth={} color={} double_buffered={} window_kind={}",
                    self.descriptor.width(),
                    self.descriptor.height(),
                    self.descriptor.depth_bits(),
                    self.descriptor.color_bits(),
                    self.descriptor.double_buffered(),
                    info.kind
                );

                self.backend.attach_surface(&info);
                self.backend.init();
                self.forwarded.fetch_add(1, Ordering::Relaxed);
                *state = SurfaceLifecycleState::Active;
                true
            }
            other => {
                self.reject(BoundaryCall::Init, other);
                false
            }
        }
    }

    pub fn display(&self) -> bool {
        self.forward_call(BoundaryCall::Display)
    }

    /// Forward a geometry change. Width and height are clamped, `x`/`y` are not.
    pub fn reshape(&self, x: i32, y: i32, width: i32, height: i32) -> bool {
        let (w, h) = (clamp_extent(width), clamp_extent(height));
        if (w, h) != (width, height) {
            debug!("translator: reshape {width}x{height} clamped to {w}x{h}");
        }
        self.forward_call(BoundaryCall::Reshape {
            x,
            y,
            width: w,
            height: h,
        })
    }

    #[inline]
    pub fn forward(&self, event: InputEvent) -> bool {
        self.forward_call(event.to_call())
    }

    /// Forward `dispose`. Returns `true` only for the call that disposed.
    ///
    /// Disposing a surface that never became active skips the boundary: the
    /// backend never saw `init`.
    pub fn dispose(&self) -> bool {
        let mut state = self.state.lock();
        match *state {
            SurfaceLifecycleState::Active => {
                info!("translator: dispose surface");
                self.backend.dispose();
                self.forwarded.fetch_add(1, Ordering::Relaxed);
                *state = SurfaceLifecycleState::Disposed;
                true
            }
            SurfaceLifecycleState::Uninitialized => {
                debug!("translator: dispose before init, nothing forwarded");
                *state = SurfaceLifecycleState::Disposed;
                true
            }
            SurfaceLifecycleState::Disposed => {
                self.reject(BoundaryCall::Dispose, SurfaceLifecycleState::Disposed);
                false
            }
        }
    }

    fn forward_call(&self, call: BoundaryCall) -> bool {
        let state = self.state.lock();
        if *state != SurfaceLifecycleState::Active {
            self.reject(call, *state);
            return false;
        }

        let backend: &dyn NativeBackend = self.backend.as_ref();
        call.apply(backend);
        self.forwarded.fetch_add(1, Ordering::Relaxed);
        true
    }

    fn reject(&self, call: BoundaryCall, state: SurfaceLifecycleState) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
        if matches!(call, BoundaryCall::Display) {
            trace!("translator: drop {} while {state}", call.symbol());
        } else {
            debug!("translator: drop {} while {state}", call.symbol());
        }
    }
}

impl std::fmt::Debug for EventTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTranslator")
            .field("descriptor", &self.descriptor)
            .field("state", &self.state())
            .field("forwarded", &self.forwarded_calls())
            .field("rejected", &self.rejected_calls())
            .finish_non_exhaustive()
    }
}
