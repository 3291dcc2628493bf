//! # stormsea - procedural storm-at-sea animation core
//!
//! Frame-by-frame data for an animated ocean in a rainstorm: a water surface
//! displaced by waves and colored by height, a looping field of rain drops,
//! and thunder flashes. Windowing, cameras, audio and the GPU device belong
//! to the host; this crate produces the numbers they consume.
//!
//! ## Quick Start
//!
//! ```
//! use std::time::Duration;
//! use stormsea::prelude::*;
//!
//! let mut storm = Storm::builder()
//!     .with_surface(SurfaceConfig::default().with_segments(32))
//!     .with_rain(RainConfig::default().with_count(200))
//!     .with_seed(42)
//!     .build()
//!     .unwrap();
//!
//! // Tune from a debug panel, possibly on another thread
//! storm.params().set("big_wave_elevation", 0.3f32).unwrap();
//!
//! let frame = Duration::from_millis(16);
//! let report = storm.step(frame, frame);
//!
//! let vertices = storm.surface().vertices();      // upload as vertex buffer
//! let drops = storm.rain().as_bytes();            // upload as instance buffer
//! let uniforms = storm.uniforms();                // or animate on the GPU
//! # let _ = (report, vertices, drops, uniforms);
//! ```
//!
//! ## Core Pieces
//!
//! | Module | What it does |
//! |--------|--------------|
//! | [`wave`] | Elevation and color of the water at `(x, z, t)` |
//! | [`noise`] | Seed-free classic 3D Perlin noise |
//! | [`surface`] | The vertex grid the wave field is evaluated on |
//! | [`rain`] | Fixed-size pool of falling, respawning drops |
//! | [`thunder`] | Timed flash sequence with backdrop and audio cues |
//! | [`params`] | Shared, live-tunable wave parameters |
//! | [`simulation`] | [`Storm`]: owns everything and drives frames |
//! | [`uniforms`], [`shader`] | GPU layouts and the WGSL water shader |
//! | [`config`] | JSON configuration files |
//!
//! ## Determinism
//!
//! The wave field and noise are pure functions. Randomness (rain spawn
//! positions, thunder rolls) comes from a `rand::Rng` the caller can seed,
//! so a seeded [`Storm`] replays identically given the same frame times.

pub mod config;
pub mod error;
pub mod noise;
pub mod params;
pub mod rain;
pub mod shader;
pub mod shader_utils;
pub mod simulation;
pub mod surface;
pub mod thunder;
pub mod time;
pub mod uniforms;
pub mod wave;

pub use bytemuck;
pub use config::StormConfig;
pub use error::{ConfigError, ParameterError};
pub use glam::{Vec2, Vec3};
pub use params::ParameterSurface;
pub use rain::{FallStep, ParticlePool, RainConfig, RainParticle, SpawnRange};
pub use simulation::{FramePacing, FrameReport, StopHandle, Storm, StormBuilder};
pub use surface::{SurfaceConfig, WaterSurface, WaterVertex};
pub use thunder::{AudioCue, Backdrop, ThunderConfig, ThunderEvent, ThunderState, ThunderTrigger};
pub use uniforms::{CameraUniforms, UniformValue, WaterUniforms};
pub use wave::{WaveField, WaveParameters};

/// Convenient re-exports for common usage.
///
/// ```
/// use stormsea::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::StormConfig;
    pub use crate::params::ParameterSurface;
    pub use crate::rain::{FallStep, RainConfig, SpawnRange};
    pub use crate::simulation::{FramePacing, FrameReport, Storm};
    pub use crate::surface::SurfaceConfig;
    pub use crate::thunder::{Backdrop, ThunderConfig, ThunderState};
    pub use crate::time::FrameClock;
    pub use crate::wave::{WaveField, WaveParameters};
    pub use crate::{Vec2, Vec3};
}
