//! Procedural water surface: elevation and color per vertex.
//!
//! The field is the sum of one large standing sine wave and a configurable
//! number of Perlin noise octaves. The color is a linear mix between a deep
//! and a surface color, driven by the normalized elevation.
//!
//! Everything here is a pure function of [`WaveParameters`] and the
//! `(x, z, t)` input, so it can be called for every vertex of a large grid
//! in any order and from any thread.
//!
//! # Example
//!
//! ```
//! use stormsea::wave::{WaveField, WaveParameters};
//!
//! let field = WaveField::new(WaveParameters::default());
//! let sample = field.sample(0.25, -0.5, 1.0);
//! assert!(sample.elevation.is_finite());
//! ```

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::noise::perlin3;

/// Tunable wave and color parameters.
///
/// Created once (from defaults or a config file), then mutated in place by
/// whatever drives the debug panel. Per-frame code works on a copy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParameters {
    /// Angular speed of the large wave (radians per second).
    pub big_wave_speed: f32,
    /// Amplitude of the large wave.
    pub big_wave_elevation: f32,
    /// Spatial frequency of the large wave along x and z.
    pub big_wave_frequency: Vec2,
    /// Amplitude of each noise octave (divided by the octave index).
    pub small_wave_elevation: f32,
    /// Base spatial frequency of the noise octaves.
    pub small_wave_frequency: f32,
    /// How fast the noise field evolves over time.
    pub small_wave_speed: f32,
    /// Number of noise octaves. Zero disables the small waves.
    pub noise_iterations: u32,
    /// Color at the bottom of the mix (RGB, 0-1).
    #[serde(with = "crate::config::hex_color")]
    pub depth_color: Vec3,
    /// Color at the top of the mix (RGB, 0-1).
    #[serde(with = "crate::config::hex_color")]
    pub surface_color: Vec3,
    /// Added to the elevation before scaling into the mix factor.
    pub color_offset: f32,
    /// Scales the offset elevation into the mix factor.
    pub color_multiplier: f32,
}

impl Default for WaveParameters {
    fn default() -> Self {
        Self {
            big_wave_speed: 0.75,
            big_wave_elevation: 0.2,
            big_wave_frequency: Vec2::new(4.0, 1.5),
            small_wave_elevation: 0.15,
            small_wave_frequency: 3.0,
            small_wave_speed: 0.2,
            noise_iterations: 4,
            depth_color: rgb8(0x18, 0x66, 0x91),
            surface_color: rgb8(0x9b, 0xd8, 0xff),
            color_offset: 0.08,
            color_multiplier: 5.0,
        }
    }
}

impl WaveParameters {
    /// Parameters with only the large wave: all noise terms zeroed.
    pub fn calm() -> Self {
        Self {
            small_wave_elevation: 0.0,
            small_wave_frequency: 0.0,
            small_wave_speed: 0.0,
            noise_iterations: 0,
            ..Self::default()
        }
    }

    /// Check that every float is finite.
    ///
    /// Only called on construction and load. Values pushed at runtime through
    /// a [`ParameterSurface`](crate::params::ParameterSurface) are trusted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scalars = [
            ("big_wave_speed", self.big_wave_speed),
            ("big_wave_elevation", self.big_wave_elevation),
            ("big_wave_frequency.x", self.big_wave_frequency.x),
            ("big_wave_frequency.z", self.big_wave_frequency.y),
            ("small_wave_elevation", self.small_wave_elevation),
            ("small_wave_frequency", self.small_wave_frequency),
            ("small_wave_speed", self.small_wave_speed),
            ("color_offset", self.color_offset),
            ("color_multiplier", self.color_multiplier),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
        }
        if !self.depth_color.is_finite() {
            return Err(ConfigError::NonFinite("depth_color"));
        }
        if !self.surface_color.is_finite() {
            return Err(ConfigError::NonFinite("surface_color"));
        }
        Ok(())
    }

    // ========== Builder helpers ==========

    /// Set the large wave speed, amplitude and frequency.
    pub fn with_big_waves(mut self, speed: f32, elevation: f32, frequency: Vec2) -> Self {
        self.big_wave_speed = speed;
        self.big_wave_elevation = elevation;
        self.big_wave_frequency = frequency;
        self
    }

    /// Set the noise octave amplitude, frequency, speed and count.
    pub fn with_small_waves(mut self, elevation: f32, frequency: f32, speed: f32, iterations: u32) -> Self {
        self.small_wave_elevation = elevation;
        self.small_wave_frequency = frequency;
        self.small_wave_speed = speed;
        self.noise_iterations = iterations;
        self
    }

    /// Set the two endpoint colors.
    pub fn with_colors(mut self, depth: Vec3, surface: Vec3) -> Self {
        self.depth_color = depth;
        self.surface_color = surface;
        self
    }

    /// Set how elevation maps onto the color mix.
    pub fn with_color_mapping(mut self, offset: f32, multiplier: f32) -> Self {
        self.color_offset = offset;
        self.color_multiplier = multiplier;
        self
    }
}

/// Convert 8-bit RGB to a 0-1 color.
#[inline]
pub fn rgb8(r: u8, g: u8, b: u8) -> Vec3 {
    Vec3::new(r as f32, g as f32, b as f32) / 255.0
}

/// Parse a `#rrggbb` (or `rrggbb`) hex color.
pub fn rgb_from_hex(s: &str) -> Result<Vec3, ConfigError> {
    let digits = s.strip_prefix('#').unwrap_or(s);
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(ConfigError::InvalidColor(s.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ConfigError::InvalidColor(s.to_string()))
    };
    Ok(rgb8(channel(0)?, channel(2)?, channel(4)?))
}

/// Format a 0-1 color as `#rrggbb`, clamping out-of-range channels.
pub fn rgb_to_hex(c: Vec3) -> String {
    let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02x}{:02x}{:02x}", q(c.x), q(c.y), q(c.z))
}

/// Output of one field evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexSample {
    pub elevation: f32,
    pub color: Vec3,
}

/// Large-scale standing wave term.
#[inline]
pub fn big_wave(x: f32, z: f32, t: f32, params: &WaveParameters) -> f32 {
    let phase = t * params.big_wave_speed;
    (x * params.big_wave_frequency.x + phase).sin()
        * (z * params.big_wave_frequency.y + phase).sin()
        * params.big_wave_elevation
}

/// Sum of the noise octaves.
///
/// Octave `i` (starting at 1) samples the noise at `i` times the base
/// frequency and contributes `1 / i` of the amplitude. The time axis is
/// shared by all octaves.
#[inline]
pub fn small_waves(x: f32, z: f32, t: f32, params: &WaveParameters) -> f32 {
    let mut sum = 0.0;
    let time = t * params.small_wave_speed;
    for i in 1..=params.noise_iterations {
        let octave = i as f32;
        let freq = params.small_wave_frequency * octave;
        sum += perlin3(Vec3::new(x * freq, z * freq, time)) * params.small_wave_elevation / octave;
    }
    sum
}

/// Elevation of the surface at grid position `(x, z)` and time `t` seconds.
#[inline]
pub fn elevation_at(x: f32, z: f32, t: f32, params: &WaveParameters) -> f32 {
    big_wave(x, z, t, params) + small_waves(x, z, t, params)
}

/// Normalized [0, 1] mix factor for an elevation.
///
/// NaN elevations stay NaN; the frame renders wrong but nothing panics.
#[inline]
pub fn mix_factor(elevation: f32, params: &WaveParameters) -> f32 {
    ((elevation + params.color_offset) * params.color_multiplier).clamp(0.0, 1.0)
}

/// Interpolate from `depth_color` (mix 0) to `surface_color` (mix 1).
#[inline]
pub fn color_for_mix(mix: f32, params: &WaveParameters) -> Vec3 {
    params.depth_color.lerp(params.surface_color, mix)
}

/// Color of the surface at a given elevation.
#[inline]
pub fn color_at(elevation: f32, params: &WaveParameters) -> Vec3 {
    color_for_mix(mix_factor(elevation, params), params)
}

/// A wave field bound to one parameter snapshot.
#[derive(Clone, Copy, Debug)]
pub struct WaveField {
    params: WaveParameters,
}

impl WaveField {
    /// Bind a snapshot of the parameters.
    pub fn new(params: WaveParameters) -> Self {
        Self { params }
    }

    /// The bound parameters.
    pub fn params(&self) -> &WaveParameters {
        &self.params
    }

    /// Elevation at `(x, z)`, time `t`.
    #[inline]
    pub fn elevation(&self, x: f32, z: f32, t: f32) -> f32 {
        elevation_at(x, z, t, &self.params)
    }

    /// Color for an elevation.
    #[inline]
    pub fn color(&self, elevation: f32) -> Vec3 {
        color_at(elevation, &self.params)
    }

    /// Elevation and color in one call.
    #[inline]
    pub fn sample(&self, x: f32, z: f32, t: f32) -> VertexSample {
        let elevation = self.elevation(x, z, t);
        VertexSample {
            elevation,
            color: self.color(elevation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec3_near(a: Vec3, b: Vec3) {
        assert!((a - b).abs().max_element() < 1e-6, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_defaults() {
        let p = WaveParameters::default();
        assert_eq!(p.big_wave_elevation, 0.2);
        assert_eq!(p.big_wave_frequency, Vec2::new(4.0, 1.5));
        assert_eq!(p.noise_iterations, 4);
        assert_eq!(rgb_to_hex(p.depth_color), "#186691");
        assert_eq!(rgb_to_hex(p.surface_color), "#9bd8ff");
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_origin_is_flat_at_time_zero() {
        let p = WaveParameters::calm();
        assert_eq!(elevation_at(0.0, 0.0, 0.0, &p), 0.0);
    }

    #[test]
    fn test_zero_iterations_is_big_wave_only() {
        let p = WaveParameters::default().with_small_waves(0.15, 3.0, 0.2, 0);
        for &(x, z, t) in &[(0.3, -0.7, 0.0), (-1.0, 1.0, 2.5), (0.9, 0.1, 100.0)] {
            let expected = (x * 4.0 + t * 0.75f32).sin() * (z * 1.5 + t * 0.75f32).sin() * 0.2;
            let got = elevation_at(x, z, t, &p);
            assert!((got - expected).abs() < 1e-6, "({}, {}, {}): {} vs {}", x, z, t, got, expected);
        }
    }

    #[test]
    fn test_octaves_add_detail() {
        let calm = WaveParameters::calm();
        let rough = WaveParameters::default();
        let (x, z, t) = (0.37, -0.21, 1.3);
        assert_ne!(elevation_at(x, z, t, &calm), elevation_at(x, z, t, &rough));
    }

    #[test]
    fn test_elevation_finite_over_grid() {
        let p = WaveParameters::default();
        for i in 0..=20 {
            for j in 0..=20 {
                let x = -1.0 + i as f32 * 0.1;
                let z = -1.0 + j as f32 * 0.1;
                assert!(elevation_at(x, z, 12.34, &p).is_finite());
            }
        }
    }

    #[test]
    fn test_negative_speeds_and_frequencies() {
        let p = WaveParameters::default()
            .with_big_waves(-0.75, 0.2, Vec2::new(-4.0, -1.5))
            .with_small_waves(0.15, -3.0, -0.2, 3);
        let e = elevation_at(0.4, 0.6, 5.0, &p);
        assert!(e.is_finite());
    }

    #[test]
    fn test_mix_endpoints() {
        let p = WaveParameters::default();
        assert_eq!(color_for_mix(0.0, &p), p.depth_color);
        assert_vec3_near(color_for_mix(1.0, &p), p.surface_color);
    }

    #[test]
    fn test_mix_is_clamped() {
        let p = WaveParameters::default();
        assert_eq!(mix_factor(-10.0, &p), 0.0);
        assert_eq!(mix_factor(10.0, &p), 1.0);
        assert_vec3_near(color_at(10.0, &p), p.surface_color);
        assert_eq!(color_at(-10.0, &p), p.depth_color);
    }

    #[test]
    fn test_color_monotonic_in_mix() {
        let p = WaveParameters::default();
        let mut prev = color_for_mix(0.0, &p);
        for i in 1..=50 {
            let c = color_for_mix(i as f32 / 50.0, &p);
            // Every channel of surface_color is brighter than depth_color
            assert!(c.x >= prev.x && c.y >= prev.y && c.z >= prev.z);
            prev = c;
        }
    }

    #[test]
    fn test_zero_multiplier_is_flat_depth_color() {
        let p = WaveParameters::default().with_color_mapping(0.08, 0.0);
        for e in [-1.0, -0.1, 0.0, 0.3, 2.0] {
            assert_eq!(color_at(e, &p), p.depth_color);
        }
    }

    #[test]
    fn test_pure_function() {
        let field = WaveField::new(WaveParameters::default());
        let a = field.sample(0.123, 0.456, 7.89);
        let b = field.sample(0.123, 0.456, 7.89);
        assert_eq!(a, b);
    }

    #[test]
    fn test_nan_parameter_does_not_panic() {
        let mut p = WaveParameters::default();
        p.big_wave_elevation = f32::NAN;
        let e = elevation_at(0.5, 0.5, 1.0, &p);
        assert!(e.is_nan());
        let _ = color_at(e, &p);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_hex_parsing() {
        assert_eq!(rgb_from_hex("#ffffff").unwrap(), Vec3::ONE);
        assert_eq!(rgb_from_hex("000000").unwrap(), Vec3::ZERO);
        assert!(rgb_from_hex("#12345").is_err());
        assert!(rgb_from_hex("#gg0000").is_err());
    }
}
