//! Frame clock.
//!
//! The storm is driven by a monotonically non-decreasing elapsed time and a
//! per-frame delta. [`FrameClock`] produces both from the wall clock, or
//! from explicit deltas via [`FrameClock::tick_with`] for deterministic
//! runs and tests.
//!
//! Elapsed time is the sum of the scaled deltas, so changing the time scale
//! or pausing never makes it jump.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use stormsea::time::FrameClock;
//!
//! let mut clock = FrameClock::new();
//! clock.tick_with(Duration::from_millis(16));
//! clock.tick_with(Duration::from_millis(16));
//! assert_eq!(clock.frame(), 2);
//! assert_eq!(clock.elapsed(), Duration::from_millis(32));
//! ```

use std::time::{Duration, Instant};

/// One frame's timing, as returned by [`FrameClock::tick`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
    /// Total scaled time since the clock started.
    pub elapsed: Duration,
    /// Scaled time since the previous frame.
    pub delta: Duration,
    /// Frames ticked so far, including this one.
    pub frame: u64,
}

/// Elapsed/delta source for the frame loop.
#[derive(Debug)]
pub struct FrameClock {
    last_instant: Instant,
    elapsed: Duration,
    delta: Duration,
    frame: u64,
    paused: bool,
    time_scale: f32,
    fixed_delta: Option<Duration>,
    /// Real time and frames accumulated toward the next fps sample.
    fps_window: Duration,
    fps_frames: u64,
    fps_interval: Duration,
    fps: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_instant: Instant::now(),
            elapsed: Duration::ZERO,
            delta: Duration::ZERO,
            frame: 0,
            paused: false,
            time_scale: 1.0,
            fixed_delta: None,
            fps_window: Duration::ZERO,
            fps_frames: 0,
            fps_interval: Duration::from_millis(500),
            fps: 0.0,
        }
    }

    /// Clock that always advances by `delta`, ignoring the wall clock.
    pub fn fixed(delta: Duration) -> Self {
        let mut clock = Self::new();
        clock.fixed_delta = Some(delta);
        clock
    }

    /// Advance by the wall-clock time since the previous tick.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let raw = now.saturating_duration_since(self.last_instant);
        self.last_instant = now;
        self.tick_with(raw)
    }

    /// Advance by an explicit raw delta.
    ///
    /// The fixed delta, if set, takes precedence over `raw`; the time scale
    /// applies to either. While paused the frame counter still advances but
    /// the delta is zero.
    pub fn tick_with(&mut self, raw: Duration) -> FrameTime {
        self.frame += 1;

        let base = self.fixed_delta.unwrap_or(raw);
        self.delta = if self.paused {
            Duration::ZERO
        } else if self.time_scale == 1.0 {
            base
        } else {
            base.mul_f64(self.time_scale as f64)
        };
        self.elapsed += self.delta;

        self.fps_window += raw;
        self.fps_frames += 1;
        if self.fps_window >= self.fps_interval {
            self.fps = self.fps_frames as f32 / self.fps_window.as_secs_f32();
            self.fps_window = Duration::ZERO;
            self.fps_frames = 0;
        }

        self.frame_time()
    }

    /// Timing of the latest tick.
    #[inline]
    pub fn frame_time(&self) -> FrameTime {
        FrameTime {
            elapsed: self.elapsed,
            delta: self.delta,
            frame: self.frame,
        }
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[inline]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Frames per second of real time, sampled every half second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            // Time spent paused is not a frame delta.
            self.last_instant = Instant::now();
            self.paused = false;
        }
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Set the time scale. Negative and NaN scales clamp to zero.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
    }

    pub fn set_fixed_delta(&mut self, delta: Option<Duration>) {
        self.fixed_delta = delta;
    }

    /// Back to frame zero at elapsed zero. Scale and fixed delta are kept.
    pub fn reset(&mut self) {
        self.last_instant = Instant::now();
        self.elapsed = Duration::ZERO;
        self.delta = Duration::ZERO;
        self.frame = 0;
        self.fps_window = Duration::ZERO;
        self.fps_frames = 0;
        self.fps = 0.0;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
