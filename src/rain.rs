//! Looping rain particles.
//!
//! A fixed pool of drops falls by a constant step every tick. A drop that
//! drops below the floor (`y < 0`) reappears at the ceiling at once: there is
//! no smooth modulo wrap, the abrupt respawn is the intended look. Horizontal
//! positions are chosen once at spawn and never change.
//!
//! The pool never grows, shrinks or reallocates after [`ParticlePool::initialize`],
//! so its buffer can be uploaded as-is every frame.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use stormsea::rain::{ParticlePool, RainConfig};
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let mut pool = ParticlePool::initialize(&RainConfig::default(), &mut rng).unwrap();
//! pool.tick(0.05);
//! assert!(pool.take_dirty());
//! ```

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One rain drop. `x` and `z` are fixed at spawn; `y` falls every tick.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct RainParticle {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RainParticle {
    /// Position in pool-local space.
    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Instance-rate vertex buffer layout: one `vec3<f32>` at location 0.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<RainParticle>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Inclusive `[min, max]` range for random spawn values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnRange {
    pub min: f32,
    pub max: f32,
}

impl SpawnRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min.is_finite() && self.max.is_finite() && self.min < self.max {
            Ok(())
        } else {
            Err(ConfigError::InvalidRange {
                name,
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Uniform sample, optionally rounded to `precision` decimals.
    ///
    /// Rounding can push a value past a bound that is not itself a round
    /// number, so the result is clamped back into the range.
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R, precision: Option<u32>) -> f32 {
        let v = self.min + rng.gen::<f32>() * (self.max - self.min);
        match precision {
            Some(digits) => {
                let scale = 10f32.powi(digits as i32);
                ((v * scale).round() / scale).clamp(self.min, self.max)
            }
            None => v,
        }
    }
}

/// Most decimal places a spawn value can be rounded to. `f32` carries about
/// seven significant digits; past that the rounding scale overflows.
pub const MAX_PRECISION: u32 = 7;

/// How far drops fall per tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum FallStep {
    /// Fixed distance every tick, whatever the frame time. Fall speed then
    /// follows the display refresh rate.
    PerFrame(f32),
    /// Distance per second, scaled by the frame delta.
    PerSecond(f32),
}

impl FallStep {
    /// Distance to fall this tick.
    #[inline]
    pub fn distance(&self, frame_delta: f32) -> f32 {
        match *self {
            FallStep::PerFrame(step) => step,
            FallStep::PerSecond(speed) => speed * frame_delta,
        }
    }

    fn rate(&self) -> f32 {
        match *self {
            FallStep::PerFrame(v) | FallStep::PerSecond(v) => v,
        }
    }
}

/// Rain pool configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainConfig {
    /// Number of drops. Fixed for the life of the pool.
    pub count: usize,
    /// Spawn range for both `x` and `z`.
    pub xz_range: SpawnRange,
    /// Spawn range for the initial `y`.
    pub y_range: SpawnRange,
    /// Height a drop reappears at after passing the floor. `None` means
    /// `y_range.max`.
    pub ceiling: Option<f32>,
    pub fall: FallStep,
    /// Decimal places kept on spawn values. `None` keeps full precision.
    pub precision: Option<u32>,
    /// World-space offset of the whole pool, applied by [`ParticlePool::world_positions`].
    pub origin: Vec3,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            count: 100,
            xz_range: SpawnRange::new(0.1, 2.0),
            y_range: SpawnRange::new(0.2, 4.0),
            ceiling: None,
            fall: FallStep::PerFrame(0.05),
            precision: Some(2),
            origin: Vec3::new(-1.0, 0.0, -1.0),
        }
    }
}

impl RainConfig {
    /// Set the number of drops.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Set the spawn ranges.
    pub fn with_ranges(mut self, xz: SpawnRange, y: SpawnRange) -> Self {
        self.xz_range = xz;
        self.y_range = y;
        self
    }

    /// Set the fall step.
    pub fn with_fall(mut self, fall: FallStep) -> Self {
        self.fall = fall;
        self
    }

    /// Set an explicit respawn ceiling.
    pub fn with_ceiling(mut self, ceiling: f32) -> Self {
        self.ceiling = Some(ceiling);
        self
    }

    /// The effective respawn height.
    pub fn ceiling(&self) -> f32 {
        self.ceiling.unwrap_or(self.y_range.max)
    }

    /// Reject configurations that would put NaN or an empty pool into the
    /// per-frame path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::EmptyPool);
        }
        self.xz_range.validate("xz")?;
        self.y_range.validate("y")?;
        let ceiling = self.ceiling();
        if !(ceiling.is_finite() && ceiling > 0.0) {
            return Err(ConfigError::InvalidCeiling(ceiling));
        }
        let rate = self.fall.rate();
        if !(rate.is_finite() && rate > 0.0) {
            return Err(ConfigError::InvalidStep(rate));
        }
        if let Some(digits) = self.precision {
            if digits > MAX_PRECISION {
                return Err(ConfigError::InvalidPrecision(digits));
            }
        }
        if !self.origin.is_finite() {
            return Err(ConfigError::NonFinite("origin"));
        }
        Ok(())
    }
}

/// Fixed-size pool of rain drops.
#[derive(Clone, Debug)]
pub struct ParticlePool {
    particles: Vec<RainParticle>,
    ceiling: f32,
    fall: FallStep,
    origin: Vec3,
    dirty: bool,
}

impl ParticlePool {
    /// Allocate and randomize the pool.
    ///
    /// `x` and `z` are drawn independently from `xz_range`, `y` from
    /// `y_range`. Fails fast on an invalid configuration.
    pub fn initialize<R: Rng + ?Sized>(config: &RainConfig, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;

        let particles: Vec<RainParticle> = (0..config.count)
            .map(|_| RainParticle {
                x: config.xz_range.sample(rng, config.precision),
                y: config.y_range.sample(rng, config.precision),
                z: config.xz_range.sample(rng, config.precision),
            })
            .collect();

        log::debug!(
            "rain pool: {} drops, xz [{}, {}], y [{}, {}], ceiling {}",
            particles.len(),
            config.xz_range.min,
            config.xz_range.max,
            config.y_range.min,
            config.y_range.max,
            config.ceiling()
        );

        Ok(Self {
            particles,
            ceiling: config.ceiling(),
            fall: config.fall,
            origin: config.origin,
            dirty: true,
        })
    }

    /// Move every drop down by `step`; drops below the floor jump to the ceiling.
    ///
    /// A NaN height also respawns at the ceiling, so a bad step spoils one
    /// frame at most. The buffer is marked dirty afterwards.
    pub fn tick(&mut self, step: f32) {
        let ceiling = self.ceiling;
        for p in &mut self.particles {
            let y = p.y - step;
            p.y = if y >= 0.0 { y } else { ceiling };
        }
        self.dirty = true;
    }

    /// Tick using the configured [`FallStep`].
    pub fn advance(&mut self, frame_delta: f32) {
        self.tick(self.fall.distance(frame_delta));
    }

    /// Number of drops.
    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Drops in index order.
    #[inline]
    pub fn particles(&self) -> &[RainParticle] {
        &self.particles
    }

    /// Mutable access for hosts that place drops themselves.
    ///
    /// Length cannot change through a slice, so the pool stays fixed-size.
    pub fn particles_mut(&mut self) -> &mut [RainParticle] {
        self.dirty = true;
        &mut self.particles
    }

    /// Respawn height.
    #[inline]
    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }

    /// World-space positions (`origin` applied).
    pub fn world_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.particles.iter().map(move |p| p.position() + self.origin)
    }

    /// Raw bytes for a GPU position buffer, 12 bytes per drop.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.particles)
    }

    /// Whether positions changed since the renderer last looked.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read and clear the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}
