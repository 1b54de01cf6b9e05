use std::time::{Duration, Instant};

use log::debug;

/// Measured frame rate of the driver. Logged once per period when `log_fps`.
#[derive(Debug)]
pub struct FpsMeter {
    pub fps: f32,

    last: Instant,
    frames: u32,
    period: Duration,
    log_fps: bool,
}

impl FpsMeter {
    pub fn new(log_fps: bool, period: Duration) -> Self {
        Self {
            fps: 0.0,
            last: Instant::now(),
            frames: 0,
            period: period.max(Duration::from_millis(250)),
            log_fps,
        }
    }

    /// Count one frame. Returns the fresh fps value when a period closed.
    pub fn frame_tick(&mut self) -> Option<f32> {
        self.frames += 1;
        let elapsed = self.last.elapsed();
        if elapsed < self.period {
            return None;
        }

        let secs = elapsed.as_secs_f32().max(0.0001);
        self.fps = self.frames as f32 / secs;
        if self.log_fps {
            debug!("frame driver: fps={:.1}", self.fps);
        }

        self.frames = 0;
        self.last = Instant::now();
        Some(self.fps)
    }
}
