use std::time::{Duration, Instant};

use log::{debug, error, info, warn};
use nativeview_core::{
    BackendRef, BindingError, BindingResult, HostSurface, InputEvent, ShutdownToken, ViewSession,
    ViewerConfig,
};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::events::PointerTracker;

/// How often the loop wakes to poll the shutdown token when idle.
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

struct ViewerApp {
    config: ViewerConfig,
    backend: BackendRef,
    shutdown: ShutdownToken,

    // Declared before `window`: the surface is disposed before the window
    // it draws into is destroyed.
    session: Option<ViewSession>,
    window: Option<Window>,
    window_id: Option<WindowId>,
    pointer: PointerTracker,
    pending: Vec<InputEvent>,

    closed: bool,
    failure: Option<BindingError>,
}

impl ViewerApp {
    fn new(config: ViewerConfig, backend: BackendRef, shutdown: ShutdownToken) -> Self {
        let pointer = PointerTracker::new(
            config.input.double_click_interval(),
            config.input.pixels_per_line,
        );
        Self {
            config,
            backend,
            shutdown,
            session: None,
            window: None,
            window_id: None,
            pointer,
            pending: Vec::new(),
            closed: false,
            failure: None,
        }
    }

    fn start_session(&mut self, window: &Window) -> BindingResult<ViewSession> {
        let size = window.inner_size();
        let descriptor = self.config.surface_descriptor(size.width, size.height);
        debug!("viewer: surface {descriptor:?}");

        let host = host_surface(window);
        if host.is_none() {
            warn!("viewer: window exposes no native handles, backend gets none");
        }

        let mut session =
            ViewSession::new(descriptor, self.backend.clone(), self.config.frame_rate());
        session.activate_on(host.as_ref())?;
        Ok(session)
    }

    /// Stop frames, dispose the surface, leave the loop. Runs once.
    fn close(&mut self, el: &ActiveEventLoop) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Some(mut session) = self.session.take() {
            if let Some(stats) = session.shutdown() {
                info!(
                    "viewer: {} frames in {:.1}s (last fps {:.1})",
                    stats.forwarded,
                    stats.elapsed.as_secs_f32(),
                    stats.fps
                );
            }
        }
        el.exit();
    }

    fn fail(&mut self, el: &ActiveEventLoop, err: BindingError) {
        error!("viewer: {err}");
        self.failure = Some(err);
        self.close(el);
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, el: &ActiveEventLoop) {
        if self.window.is_some() || self.closed {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        let window = match el.create_window(attrs) {
            Ok(w) => w,
            Err(e) => {
                self.fail(el, BindingError::Window(e.to_string()));
                return;
            }
        };

        match self.start_session(&window) {
            Ok(session) => self.session = Some(session),
            Err(e) => {
                self.fail(el, e);
                return;
            }
        }

        info!("viewer: window '{}' ready", self.config.title);
        self.window_id = Some(window.id());
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(&mut self, el: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if Some(id) != self.window_id || self.closed {
            return;
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.close(el);
                return;
            }
            WindowEvent::KeyboardInput { event: key, .. }
                if key.state.is_pressed()
                    && key.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                self.close(el);
                return;
            }
            _ => {}
        }

        let Some(session) = self.session.as_ref() else { return; };

        match &event {
            WindowEvent::Resized(size) => {
                session.resize(size.width, size.height);
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => session.redraw(),
            _ => {
                self.pointer.translate(&event, Instant::now(), &mut self.pending);
                for ev in self.pending.drain(..) {
                    session.input(ev);
                }
            }
        }
    }

    fn about_to_wait(&mut self, el: &ActiveEventLoop) {
        // Ctrl+C takes the same path as closing the window.
        if self.shutdown.is_requested() {
            debug!("viewer: shutdown requested");
            self.close(el);
            return;
        }
        el.set_control_flow(ControlFlow::WaitUntil(Instant::now() + SHUTDOWN_POLL));
    }

    fn exiting(&mut self, el: &ActiveEventLoop) {
        self.close(el);
    }
}

fn host_surface(window: &Window) -> Option<HostSurface> {
    let w = window.window_handle().ok()?.as_raw();
    let d = window.display_handle().ok()?.as_raw();
    Some(HostSurface::new(w, d))
}

/// Open a window over `backend` and run until closed.
///
/// Frames are driven by the session's own thread; the loop only forwards
/// window and pointer events and polls `shutdown`.
pub fn run_viewer(
    config: ViewerConfig,
    backend: BackendRef,
    shutdown: ShutdownToken,
) -> BindingResult<()> {
    let event_loop = EventLoop::new().map_err(|e| BindingError::Window(e.to_string()))?;
    let mut app = ViewerApp::new(config, backend, shutdown);

    event_loop
        .run_app(&mut app)
        .map_err(|e| BindingError::Window(e.to_string()))?;

    match app.failure.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
