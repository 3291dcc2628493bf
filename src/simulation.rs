//! Storm builder and frame driver.
//!
//! [`Storm`] owns the water surface, the rain pool and the thunder trigger,
//! and advances all of them once per frame from a single parameter
//! snapshot. It can be driven by an external clock through
//! [`Storm::step`], by its own [`FrameClock`] through [`Storm::tick`], or by
//! the built-in paced loop [`Storm::run`].
//!
//! ```
//! use std::time::Duration;
//! use stormsea::prelude::*;
//!
//! let mut storm = Storm::builder()
//!     .with_surface(SurfaceConfig::default().with_segments(16))
//!     .with_seed(7)
//!     .build()
//!     .unwrap();
//!
//! let report = storm.step(Duration::from_millis(16), Duration::from_millis(16));
//! assert_eq!(report.frame, 1);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::StormConfig;
use crate::error::ConfigError;
use crate::params::ParameterSurface;
use crate::rain::{ParticlePool, RainConfig};
use crate::surface::{SurfaceConfig, WaterSurface};
use crate::thunder::{Backdrop, ThunderConfig, ThunderEvent, ThunderTrigger};
use crate::time::FrameClock;
use crate::uniforms::WaterUniforms;
use crate::wave::WaveParameters;

/// What happened during one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    /// 1-based frame number.
    pub frame: u64,
    pub elapsed: Duration,
    pub delta: Duration,
    /// Thunder transitions applied this tick, in order.
    pub thunder_events: Vec<ThunderEvent>,
    /// Backdrop after this tick.
    pub backdrop: Backdrop,
}

/// Cloneable flag that halts [`Storm::run`].
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop after the current frame.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

/// Longest frame a [`Storm::run`] loop will wait for.
pub const MAX_FRAME_DURATION: Duration = Duration::from_secs(60);

/// Frame rate and length of a [`Storm::run`] loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramePacing {
    /// Frames per second to aim for. Zero or less runs unthrottled.
    pub target_fps: f32,
    /// Stop after this many frames.
    pub max_frames: Option<u64>,
}

impl Default for FramePacing {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            max_frames: None,
        }
    }
}

impl FramePacing {
    pub fn new(target_fps: f32) -> Self {
        Self {
            target_fps,
            max_frames: None,
        }
    }

    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Target time per frame, `None` when unthrottled.
    ///
    /// Rates slow enough to exceed [`MAX_FRAME_DURATION`] are capped to it.
    pub fn frame_duration(&self) -> Option<Duration> {
        if self.target_fps.is_finite() && self.target_fps > 0.0 {
            let secs = (1.0 / self.target_fps as f64).min(MAX_FRAME_DURATION.as_secs_f64());
            Some(Duration::from_secs_f64(secs))
        } else {
            None
        }
    }
}

/// Configures and builds a [`Storm`].
#[derive(Clone, Debug, Default)]
pub struct StormBuilder {
    config: StormConfig,
    params: Option<ParameterSurface>,
    seed: Option<u64>,
}

impl StormBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: StormConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the initial wave parameters.
    pub fn with_water(mut self, water: WaveParameters) -> Self {
        self.config.water = water;
        self
    }

    /// Share an existing parameter handle instead of creating one.
    ///
    /// The handle's current values win over [`with_water`](Self::with_water).
    pub fn with_parameters(mut self, params: ParameterSurface) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_surface(mut self, surface: SurfaceConfig) -> Self {
        self.config.surface = surface;
        self
    }

    pub fn with_rain(mut self, rain: RainConfig) -> Self {
        self.config.rain = rain;
        self
    }

    pub fn with_thunder(mut self, thunder: ThunderConfig) -> Self {
        self.config.thunder = thunder;
        self
    }

    /// Seed the storm's random source for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build with a [`StdRng`], seeded if [`with_seed`](Self::with_seed)
    /// was called and from OS entropy otherwise.
    pub fn build(self) -> Result<Storm, ConfigError> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.build_with_rng(rng)
    }

    /// Build with a caller-supplied random source.
    pub fn build_with_rng<R: Rng>(self, mut rng: R) -> Result<Storm<R>, ConfigError> {
        let config = self.config;
        config.validate()?;

        let params = match self.params {
            Some(params) => params,
            None => ParameterSurface::new(config.water),
        };
        let frame_params = params.snapshot();
        let surface = WaterSurface::new(config.surface)?;
        let rain = ParticlePool::initialize(&config.rain, &mut rng)?;
        let thunder = ThunderTrigger::new(config.thunder.clone());

        log::debug!(
            "storm built: {} water vertices, {} rain drops",
            surface.vertex_count(),
            rain.len()
        );

        Ok(Storm {
            params,
            frame_params,
            surface,
            rain,
            thunder,
            clock: FrameClock::new(),
            rng,
            stop: StopHandle::new(),
            frame: 0,
            elapsed: Duration::ZERO,
        })
    }
}

/// The animated scene state.
#[derive(Debug)]
pub struct Storm<R = StdRng> {
    params: ParameterSurface,
    /// Snapshot used by the latest tick.
    frame_params: WaveParameters,
    surface: WaterSurface,
    rain: ParticlePool,
    thunder: ThunderTrigger,
    clock: FrameClock,
    rng: R,
    stop: StopHandle,
    frame: u64,
    elapsed: Duration,
}

impl Storm {
    pub fn builder() -> StormBuilder {
        StormBuilder::new()
    }
}

impl<R: Rng> Storm<R> {
    /// Advance one frame with time from an external clock.
    ///
    /// `elapsed` should not decrease between calls. The order within a tick
    /// is fixed: snapshot parameters, evaluate the surface, move the rain,
    /// then resolve thunder transitions and roll for an automatic strike.
    pub fn step(&mut self, elapsed: Duration, delta: Duration) -> FrameReport {
        self.frame += 1;
        self.elapsed = elapsed;

        self.frame_params = self.params.snapshot();
        self.surface.update(&self.frame_params, elapsed.as_secs_f32());
        self.rain.advance(delta.as_secs_f32());

        let mut thunder_events = self.thunder.update(elapsed, &mut self.rng);
        if let Some(event) = self.thunder.maybe_strike(elapsed, delta.as_secs_f32(), &mut self.rng) {
            log::debug!("thunder strike at {:?}", elapsed);
            thunder_events.push(event);
        }

        FrameReport {
            frame: self.frame,
            elapsed,
            delta,
            thunder_events,
            backdrop: self.thunder.backdrop(),
        }
    }

    /// Advance one frame using the internal [`FrameClock`].
    pub fn tick(&mut self) -> FrameReport {
        let t = self.clock.tick();
        self.step(t.elapsed, t.delta)
    }

    /// Start a thunder strike at the latest frame time.
    pub fn trigger_thunder(&mut self) -> ThunderEvent {
        self.thunder.trigger(self.elapsed, &mut self.rng)
    }

    /// Run paced frames until stopped or `pacing.max_frames` is reached.
    ///
    /// `on_frame` is called after every tick. Returns the number of frames
    /// run by this call. All state stays valid after it returns, so the
    /// loop can be resumed.
    pub fn run<F>(&mut self, pacing: FramePacing, mut on_frame: F) -> u64
    where
        F: FnMut(&mut Self, &FrameReport),
    {
        log::info!(
            "storm running at {} fps{}",
            pacing.target_fps,
            pacing
                .max_frames
                .map(|n| format!(", {} frames", n))
                .unwrap_or_default()
        );

        let frame_duration = pacing.frame_duration();
        let mut next_frame = Instant::now();
        let mut frames = 0u64;

        while !self.stop.is_stopped() && pacing.max_frames.map_or(true, |max| frames < max) {
            let report = self.tick();
            frames += 1;
            on_frame(self, &report);

            if let Some(frame_duration) = frame_duration {
                next_frame += frame_duration;
                let now = Instant::now();
                if next_frame > now {
                    thread::sleep(next_frame - now);
                } else {
                    // Running behind: don't try to catch up.
                    next_frame = now;
                }
            }
        }

        log::info!(
            "storm stopped after {} frames ({:.1}s simulated)",
            frames,
            self.elapsed.as_secs_f32()
        );
        frames
    }

    /// Handle that stops [`run`](Self::run) from another thread or from the
    /// frame callback.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Shared wave parameters. Clone it to tune from another thread.
    pub fn params(&self) -> &ParameterSurface {
        &self.params
    }

    /// Parameters used by the latest tick.
    pub fn frame_params(&self) -> &WaveParameters {
        &self.frame_params
    }

    /// Uniform block for the latest tick.
    pub fn uniforms(&self) -> WaterUniforms {
        WaterUniforms::new(&self.frame_params, self.elapsed.as_secs_f32())
    }

    pub fn surface(&self) -> &WaterSurface {
        &self.surface
    }

    pub fn rain(&self) -> &ParticlePool {
        &self.rain
    }

    pub fn rain_mut(&mut self) -> &mut ParticlePool {
        &mut self.rain
    }

    pub fn thunder(&self) -> &ThunderTrigger {
        &self.thunder
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut FrameClock {
        &mut self.clock
    }

    /// Frames stepped so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Time of the latest frame.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thunder::ThunderState;
    use rand::rngs::mock::StepRng;

    const FRAME: Duration = Duration::from_millis(50);

    fn small() -> StormBuilder {
        Storm::builder()
            .with_surface(SurfaceConfig::default().with_segments(4))
            .with_seed(1)
    }

    #[test]
    fn test_build_rejects_invalid_rain() {
        let result = small().with_rain(RainConfig::default().with_count(0)).build();
        assert!(matches!(result, Err(ConfigError::EmptyPool)));
    }

    #[test]
    fn test_step_advances_everything() {
        let mut storm = small().build().unwrap();
        let before: Vec<f32> = storm.rain().particles().iter().map(|p| p.y).collect();

        let report = storm.step(FRAME, FRAME);
        assert_eq!(report.frame, 1);
        assert_eq!(storm.surface().time(), 0.05);
        for (p, y) in storm.rain().particles().iter().zip(before) {
            let expected = if y - 0.05 < 0.0 { storm.rain().ceiling() } else { y - 0.05 };
            assert_eq!(p.y, expected);
        }
        assert!(report.thunder_events.is_empty());
        assert_eq!(report.backdrop, Backdrop::Dark);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let a = small().build().unwrap();
        let b = small().build().unwrap();
        assert_eq!(a.rain().particles(), b.rain().particles());
    }

    #[test]
    fn test_parameter_change_applies_next_tick() {
        let mut storm = small().build().unwrap();
        storm.step(FRAME, FRAME);
        let panel = storm.params().clone();
        panel.update(|p| p.big_wave_elevation = 0.0);
        assert_eq!(storm.frame_params().big_wave_elevation, 0.2);
        storm.step(FRAME * 2, FRAME);
        assert_eq!(storm.frame_params().big_wave_elevation, 0.0);
        assert_eq!(storm.uniforms().big_wave_elevation, 0.0);
    }

    #[test]
    fn test_manual_thunder_sequence() {
        // StepRng(0, 0) always rolls 0.0: second flash always happens
        let mut storm = small().build_with_rng(StepRng::new(0, 0)).unwrap();
        storm.step(Duration::from_secs(1), FRAME);
        let strike = storm.trigger_thunder();
        assert_eq!(strike.state, ThunderState::FlashOn);
        assert_eq!(strike.at, Duration::from_secs(1));

        let mut states = Vec::new();
        let mut t = Duration::from_secs(1);
        for _ in 0..20 {
            t += FRAME;
            states.extend(storm.step(t, FRAME).thunder_events.iter().map(|e| e.state));
        }
        assert_eq!(
            states,
            [ThunderState::FlashOff, ThunderState::FlashOn2, ThunderState::FlashOff2]
        );
        assert!(!storm.thunder().is_active());
    }

    #[test]
    fn test_auto_strike() {
        let thunder = ThunderConfig {
            strikes_per_minute: 6000.0,
            ..Default::default()
        };
        let mut storm = small().with_thunder(thunder).build().unwrap();
        let mut struck = false;
        for i in 1..=20 {
            let report = storm.step(FRAME * i, FRAME);
            struck |= report.thunder_events.iter().any(|e| e.state == ThunderState::FlashOn);
        }
        assert!(struck);
    }

    #[test]
    fn test_run_stops_at_frame_limit() {
        let mut storm = small().build().unwrap();
        let mut seen = 0;
        let frames = storm.run(FramePacing::new(0.0).with_max_frames(5), |_, report| {
            seen = report.frame;
        });
        assert_eq!(frames, 5);
        assert_eq!(seen, 5);
        assert_eq!(storm.frame(), 5);
    }

    #[test]
    fn test_run_stops_from_callback() {
        let mut storm = small().build().unwrap();
        let stop = storm.stop_handle();
        let frames = storm.run(FramePacing::new(1000.0), |_, report| {
            if report.frame == 3 {
                stop.stop();
            }
        });
        assert_eq!(frames, 3);
    }

    #[test]
    fn test_run_stops_from_other_thread() {
        let mut storm = small().build().unwrap();
        let stop = storm.stop_handle();
        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            stop.stop();
        });
        let frames = storm.run(FramePacing::new(200.0), |_, _| {});
        stopper.join().unwrap();
        assert!(frames >= 1);
        assert!(storm.stop_handle().is_stopped());
    }

    #[test]
    fn test_pacing() {
        assert_eq!(FramePacing::new(0.0).frame_duration(), None);
        assert_eq!(FramePacing::new(50.0).frame_duration(), Some(Duration::from_millis(20)));
        assert_eq!(FramePacing::new(f32::NAN).frame_duration(), None);
    }

    #[test]
    fn test_slow_pacing_is_capped() {
        assert_eq!(FramePacing::new(1e-20).frame_duration(), Some(MAX_FRAME_DURATION));
        assert_eq!(FramePacing::new(f32::MIN_POSITIVE).frame_duration(), Some(MAX_FRAME_DURATION));
        assert_eq!(FramePacing::new(0.5).frame_duration(), Some(Duration::from_secs(2)));
    }
}
