use std::sync::Arc;

use log::{info, warn};

use crate::boundary::BackendRef;
use crate::error::BindingResult;
use crate::frame_driver::{FrameDriver, FrameRate, FrameStats};
use crate::input::InputEvent;
use crate::surface::{HostSurface, SurfaceDescriptor, SurfaceLifecycleState};
use crate::translator::EventTranslator;

/// One hosted surface: its translator plus the frame driver feeding it.
///
/// Owns the shutdown protocol: the driver is stopped and joined before
/// `dispose` is forwarded.
pub struct ViewSession {
    translator: Arc<EventTranslator>,
    rate: FrameRate,
    driver: Option<FrameDriver>,
    shut_down: bool,
}

impl ViewSession {
    pub fn new(descriptor: SurfaceDescriptor, backend: BackendRef, rate: FrameRate) -> Self {
        Self {
            translator: Arc::new(EventTranslator::create(descriptor, backend)),
            rate,
            driver: None,
            shut_down: false,
        }
    }

    #[inline]
    pub fn translator(&self) -> &Arc<EventTranslator> {
        &self.translator
    }

    #[inline]
    pub fn state(&self) -> SurfaceLifecycleState {
        self.translator.state()
    }

    #[inline]
    pub fn is_driving(&self) -> bool {
        self.driver.as_ref().is_some_and(FrameDriver::is_running)
    }

    /// [`Self::activate_on`] without a native window.
    #[inline]
    pub fn activate(&mut self) -> BindingResult<()> {
        self.activate_on(None)
    }

    /// Attach and `init`, forward the descriptor's size as the first
    /// `reshape`, then start the frame driver. No frame can precede the
    /// first viewport.
    pub fn activate_on(&mut self, host: Option<&HostSurface>) -> BindingResult<()> {
        if self.translator.activate_on(host) {
            let d = *self.translator.descriptor();
            self.resize(d.width(), d.height());
        }
        if self.driver.is_none() && self.translator.is_active() {
            self.driver = Some(FrameDriver::start(Arc::clone(&self.translator), self.rate)?);
        }
        Ok(())
    }

    /// Surface geometry changed. Sizes beyond `i32::MAX` saturate.
    pub fn resize(&self, width: u32, height: u32) {
        let w = i32::try_from(width).unwrap_or(i32::MAX);
        let h = i32::try_from(height).unwrap_or(i32::MAX);
        self.translator.reshape(0, 0, w, h);
    }

    #[inline]
    pub fn input(&self, event: InputEvent) {
        self.translator.forward(event);
    }

    /// On-demand repaint, outside the driver's schedule.
    #[inline]
    pub fn redraw(&self) {
        self.translator.display();
    }

    /// Stop and join the driver, then dispose. Safe to call repeatedly.
    ///
    /// Returns the driver's stats on the call that actually shut down.
    pub fn shutdown(&mut self) -> Option<FrameStats> {
        if self.shut_down {
            return None;
        }
        self.shut_down = true;

        let stats = self.driver.take().map(FrameDriver::stop);
        if !self.translator.dispose() {
            warn!("session: surface was already disposed");
        }
        info!("session: shut down");

        Some(stats.unwrap_or_default())
    }
}

impl Drop for ViewSession {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

impl std::fmt::Debug for ViewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewSession")
            .field("state", &self.state())
            .field("rate", &self.rate)
            .field("driving", &self.is_driving())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{BoundaryCall, RecordingBackend};

    #[test]
    fn shutdown_is_idempotent_and_disposes_last() {
        let rec = Arc::new(RecordingBackend::new());
        let mut s = ViewSession::new(SurfaceDescriptor::default(), rec.clone(), FrameRate::new(250));
        s.activate().expect("activate");
        assert!(s.is_driving());

        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(s.shutdown().is_some());
        assert!(s.shutdown().is_none());

        let calls = rec.calls();
        assert_eq!(calls.first(), Some(&BoundaryCall::Init));
        assert_eq!(calls.last(), Some(&BoundaryCall::Dispose));
        assert_eq!(rec.count(|c| matches!(c, BoundaryCall::Dispose)), 1);
    }

    #[test]
    fn first_reshape_precedes_any_frame() {
        let rec = Arc::new(RecordingBackend::new());
        let d = SurfaceDescriptor::new(320, 0, 24, 8, true);
        let mut s = ViewSession::new(d, rec.clone(), FrameRate::new(1000));
        s.activate().expect("activate");
        s.activate().expect("repeat is a no-op");

        std::thread::sleep(std::time::Duration::from_millis(10));
        s.shutdown();

        let calls = rec.calls();
        assert_eq!(
            &calls[..2],
            &[
                BoundaryCall::Init,
                BoundaryCall::Reshape { x: 0, y: 0, width: 320, height: 1 },
            ]
        );
        assert_eq!(rec.count(|c| matches!(c, BoundaryCall::Reshape { .. })), 1);
        assert!(rec.display_count() > 0);
    }

    #[test]
    fn drop_runs_shutdown() {
        let rec = Arc::new(RecordingBackend::new());
        {
            let mut s =
                ViewSession::new(SurfaceDescriptor::default(), rec.clone(), FrameRate::new(100));
            s.activate().expect("activate");
        }
        assert_eq!(rec.calls().last(), Some(&BoundaryCall::Dispose));
    }

    #[test]
    fn resize_saturates_huge_sizes() {
        let rec = Arc::new(RecordingBackend::new());
        let mut s = ViewSession::new(SurfaceDescriptor::default(), rec.clone(), FrameRate::new(1));
        s.activate().expect("activate");

        s.resize(u32::MAX, 0);

        assert!(rec.calls().contains(&BoundaryCall::Reshape {
            x: 0,
            y: 0,
            width: i32::MAX,
            height: 1,
        }));
    }
}
