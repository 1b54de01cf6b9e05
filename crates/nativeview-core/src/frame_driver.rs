use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, tick, Receiver, Sender, TryRecvError};
use log::{debug, error, info};

use crate::error::{BindingError, BindingResult};
use crate::surface::SurfaceLifecycleState;
use crate::telemetry::FpsMeter;
use crate::translator::EventTranslator;

/// Target repaint rate, clamped to `1..=1000` Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate(u32);

impl FrameRate {
    pub const DEFAULT: Self = Self(60);

    #[inline]
    pub fn new(hz: u32) -> Self {
        Self(hz.clamp(1, 1000))
    }

    #[inline]
    pub fn hz(&self) -> u32 {
        self.0
    }

    #[inline]
    pub fn period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.0))
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What the driver did over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Ticks received from the timer.
    pub ticks: u64,
    /// `display` calls that reached the backend.
    pub forwarded: u64,
    pub elapsed: Duration,
    /// Last measured fps, 0 if no period closed.
    pub fps: f32,
}

/// Issues `display` at a fixed rate from its own thread.
///
/// `stop` (or drop) stops the ticker and joins the thread. Because every
/// `display` goes through the translator's state lock, a completed join means
/// no `display` is in flight and none will be issued again.
pub struct FrameDriver {
    rate: FrameRate,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<FrameStats>>,
}

impl FrameDriver {
    /// Start ticking. The surface must already be active.
    pub fn start(translator: Arc<EventTranslator>, rate: FrameRate) -> BindingResult<Self> {
        let state = translator.state();
        if state != SurfaceLifecycleState::Active {
            return Err(BindingError::SurfaceNotActive { state });
        }

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = thread::Builder::new()
            .name("nativeview-frame-driver".into())
            .spawn(move || run(translator, rate, stop_rx))
            .map_err(|e| BindingError::FrameDriver(format!("spawn failed: {e}")))?;

        info!("frame driver: started at {} Hz", rate.hz());

        Ok(Self {
            rate,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    #[inline]
    pub fn rate(&self) -> FrameRate {
        self.rate
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop issuing ticks and wait for the thread to exit.
    pub fn stop(mut self) -> FrameStats {
        self.stop_and_join()
    }

    fn stop_and_join(&mut self) -> FrameStats {
        if let Some(tx) = self.stop_tx.take() {
            // A full channel or a gone receiver both mean the thread is stopping.
            let _ = tx.try_send(());
        }

        let Some(handle) = self.handle.take() else {
            return FrameStats::default();
        };

        match handle.join() {
            Ok(stats) => {
                info!(
                    "frame driver: stopped ticks={} forwarded={} elapsed={:.2}s",
                    stats.ticks,
                    stats.forwarded,
                    stats.elapsed.as_secs_f32()
                );
                stats
            }
            Err(_) => {
                error!("frame driver: thread panicked");
                FrameStats::default()
            }
        }
    }
}

impl Drop for FrameDriver {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.stop_and_join();
        }
    }
}

impl std::fmt::Debug for FrameDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDriver")
            .field("rate", &self.rate)
            .field("running", &self.is_running())
            .finish()
    }
}

fn run(translator: Arc<EventTranslator>, rate: FrameRate, stop_rx: Receiver<()>) -> FrameStats {
    let ticker = tick(rate.period());
    let started = Instant::now();
    let mut stats = FrameStats::default();
    let mut meter = FpsMeter::new(log::log_enabled!(log::Level::Debug), Duration::from_secs(1));

    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(ticker) -> _ => {
                // Both channels may be ready at once; stop wins.
                if !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty)) {
                    break;
                }

                stats.ticks += 1;
                if translator.display() {
                    stats.forwarded += 1;
                } else if !translator.is_active() {
                    debug!("frame driver: surface is {}, stopping", translator.state());
                    break;
                }

                if let Some(fps) = meter.frame_tick() {
                    stats.fps = fps;
                }
            }
        }
    }

    stats.elapsed = started.elapsed();
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{BoundaryCall, RecordingBackend};
    use crate::surface::SurfaceDescriptor;

    fn active() -> (Arc<RecordingBackend>, Arc<EventTranslator>) {
        let rec = Arc::new(RecordingBackend::new());
        let t = Arc::new(EventTranslator::create(SurfaceDescriptor::default(), rec.clone()));
        t.activate();
        (rec, t)
    }

    #[test]
    fn rate_is_clamped() {
        assert_eq!(FrameRate::new(0).hz(), 1);
        assert_eq!(FrameRate::new(5000).hz(), 1000);
        assert_eq!(FrameRate::new(50).period(), Duration::from_millis(20));
    }

    #[test]
    fn refuses_to_start_on_inactive_surface() {
        let rec = Arc::new(RecordingBackend::new());
        let t = Arc::new(EventTranslator::create(SurfaceDescriptor::default(), rec.clone()));

        let err = FrameDriver::start(Arc::clone(&t), FrameRate::DEFAULT)
            .err()
            .expect("uninitialized surface");
        assert!(matches!(
            err,
            BindingError::SurfaceNotActive { state: SurfaceLifecycleState::Uninitialized }
        ));
        assert!(rec.calls().is_empty());
    }

    #[test]
    fn no_display_after_stop_returns() {
        let (rec, t) = active();

        let driver = FrameDriver::start(Arc::clone(&t), FrameRate::new(200)).expect("start");
        thread::sleep(Duration::from_millis(60));
        let stats = driver.stop();

        let after_stop = rec.display_count();
        assert!(after_stop > 0, "driver never ticked");
        assert_eq!(after_stop as u64, stats.forwarded);

        thread::sleep(Duration::from_millis(40));
        assert_eq!(rec.display_count(), after_stop);
    }

    #[test]
    fn stop_waits_for_in_flight_display() {
        let rec = Arc::new(RecordingBackend::with_display_delay(Duration::from_millis(30)));
        let t = Arc::new(EventTranslator::create(SurfaceDescriptor::default(), rec.clone()));
        t.activate();

        let driver = FrameDriver::start(Arc::clone(&t), FrameRate::new(100)).expect("start");
        thread::sleep(Duration::from_millis(45));
        let stats = driver.stop();

        // Every started display has been recorded by the time stop returns.
        assert_eq!(rec.display_count() as u64, stats.forwarded);

        t.dispose();
        assert_eq!(rec.calls().last(), Some(&BoundaryCall::Dispose));
    }

    #[test]
    fn exits_on_its_own_once_surface_is_disposed() {
        let (_rec, t) = active();

        let driver = FrameDriver::start(Arc::clone(&t), FrameRate::new(500)).expect("start");
        t.dispose();

        let deadline = Instant::now() + Duration::from_secs(2);
        while driver.is_running() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!driver.is_running());
        drop(driver);
    }
}
