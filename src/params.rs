//! Shared, live-tunable wave parameters.
//!
//! A debug panel (or any other thread) writes through a cloned
//! [`ParameterSurface`] while the frame loop takes one [`snapshot`] per tick.
//! Writes that land mid-tick become visible on the next tick; a tick never
//! observes a half-written record.
//!
//! ```
//! use stormsea::params::ParameterSurface;
//! use stormsea::wave::WaveParameters;
//!
//! let params = ParameterSurface::new(WaveParameters::default());
//! let panel = params.clone();
//! panel.set("big_wave_elevation", 0.4f32).unwrap();
//! assert_eq!(params.snapshot().big_wave_elevation, 0.4);
//! ```
//!
//! [`snapshot`]: ParameterSurface::snapshot

use std::sync::{Arc, PoisonError, RwLock};

use crate::error::ParameterError;
use crate::uniforms::UniformValue;
use crate::wave::WaveParameters;

/// Slider bounds for one named parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterRange {
    pub name: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

const fn range(name: &'static str, min: f32, max: f32, step: f32) -> ParameterRange {
    ParameterRange { name, min, max, step }
}

/// Tuning ranges for the scalar parameters, in panel order.
///
/// These are UI hints only. Values outside them are accepted by
/// [`ParameterSurface::set`].
pub const PARAMETER_RANGES: &[ParameterRange] = &[
    range("big_wave_elevation", 0.0, 1.0, 0.001),
    range("big_wave_frequency_x", 0.0, 10.0, 0.001),
    range("big_wave_frequency_z", 0.0, 10.0, 0.001),
    range("big_wave_speed", 0.0, 4.0, 0.001),
    range("color_offset", 0.0, 1.0, 0.001),
    range("color_multiplier", 0.0, 10.0, 0.001),
    range("small_wave_elevation", 0.0, 1.0, 0.001),
    range("small_wave_frequency", 0.0, 30.0, 0.001),
    range("small_wave_speed", 0.0, 4.0, 0.001),
    range("noise_iterations", 0.0, 5.0, 1.0),
];

/// Names accepted by [`ParameterSurface::set`] and [`ParameterSurface::get`].
pub const PARAMETER_NAMES: &[&str] = &[
    "big_wave_speed",
    "big_wave_elevation",
    "big_wave_frequency",
    "big_wave_frequency_x",
    "big_wave_frequency_z",
    "small_wave_elevation",
    "small_wave_frequency",
    "small_wave_speed",
    "noise_iterations",
    "depth_color",
    "surface_color",
    "color_offset",
    "color_multiplier",
];

/// Look up the panel range for a parameter.
pub fn range_of(name: &str) -> Option<&'static ParameterRange> {
    PARAMETER_RANGES.iter().find(|r| r.name == name)
}

/// Cloneable handle over one shared [`WaveParameters`] record.
#[derive(Clone, Debug, Default)]
pub struct ParameterSurface {
    inner: Arc<RwLock<WaveParameters>>,
}

impl ParameterSurface {
    pub fn new(params: WaveParameters) -> Self {
        Self {
            inner: Arc::new(RwLock::new(params)),
        }
    }

    /// Copy of the current record. Take one per tick.
    pub fn snapshot(&self) -> WaveParameters {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate the record in place.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut WaveParameters),
    {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }

    /// Replace the whole record.
    pub fn replace(&self, params: WaveParameters) {
        self.update(|p| *p = params);
    }

    /// Set a field by name.
    ///
    /// The value must have the field's type, except that `noise_iterations`
    /// also accepts an `f32` (as a slider would send), rounded and clamped
    /// to its slider range. Other values are not range-checked.
    pub fn set(&self, name: &str, value: impl Into<UniformValue>) -> Result<(), ParameterError> {
        let value = value.into();
        let mut result = Ok(());
        self.update(|p| result = set_field(p, name, value));
        if result.is_ok() {
            log::trace!("parameter {} = {:?}", name, value);
        }
        result
    }

    /// Read a field by name.
    pub fn get(&self, name: &str) -> Result<UniformValue, ParameterError> {
        get_field(&self.snapshot(), name)
    }

    /// All addressable parameter names.
    pub fn names(&self) -> &'static [&'static str] {
        PARAMETER_NAMES
    }
}

fn mismatch(name: &'static str, expected: &'static str) -> ParameterError {
    ParameterError::TypeMismatch { name, expected }
}

fn iterations_from_slider(v: f32) -> u32 {
    let max = range_of("noise_iterations").map_or(5.0, |r| r.max);
    v.max(0.0).min(max).round() as u32
}

fn set_field(p: &mut WaveParameters, name: &str, value: UniformValue) -> Result<(), ParameterError> {
    use UniformValue as V;

    match (name, value) {
        ("big_wave_speed", V::F32(v)) => p.big_wave_speed = v,
        ("big_wave_elevation", V::F32(v)) => p.big_wave_elevation = v,
        ("big_wave_frequency", V::Vec2(v)) => p.big_wave_frequency = v,
        ("big_wave_frequency_x", V::F32(v)) => p.big_wave_frequency.x = v,
        ("big_wave_frequency_z", V::F32(v)) => p.big_wave_frequency.y = v,
        ("small_wave_elevation", V::F32(v)) => p.small_wave_elevation = v,
        ("small_wave_frequency", V::F32(v)) => p.small_wave_frequency = v,
        ("small_wave_speed", V::F32(v)) => p.small_wave_speed = v,
        ("noise_iterations", V::U32(v)) => p.noise_iterations = v,
        ("noise_iterations", V::F32(v)) => p.noise_iterations = iterations_from_slider(v),
        ("depth_color", V::Vec3(v)) => p.depth_color = v,
        ("surface_color", V::Vec3(v)) => p.surface_color = v,
        ("color_offset", V::F32(v)) => p.color_offset = v,
        ("color_multiplier", V::F32(v)) => p.color_multiplier = v,

        ("big_wave_frequency", _) => return Err(mismatch("big_wave_frequency", "vec2<f32>")),
        ("noise_iterations", _) => return Err(mismatch("noise_iterations", "u32")),
        ("depth_color", _) => return Err(mismatch("depth_color", "vec3<f32>")),
        ("surface_color", _) => return Err(mismatch("surface_color", "vec3<f32>")),
        (other, _) => {
            return match PARAMETER_NAMES.iter().find(|n| **n == other) {
                Some(n) => Err(mismatch(*n, "f32")),
                None => Err(ParameterError::Unknown(other.to_string())),
            }
        }
    }
    Ok(())
}

fn get_field(p: &WaveParameters, name: &str) -> Result<UniformValue, ParameterError> {
    let value: UniformValue = match name {
        "big_wave_speed" => p.big_wave_speed.into(),
        "big_wave_elevation" => p.big_wave_elevation.into(),
        "big_wave_frequency" => p.big_wave_frequency.into(),
        "big_wave_frequency_x" => p.big_wave_frequency.x.into(),
        "big_wave_frequency_z" => p.big_wave_frequency.y.into(),
        "small_wave_elevation" => p.small_wave_elevation.into(),
        "small_wave_frequency" => p.small_wave_frequency.into(),
        "small_wave_speed" => p.small_wave_speed.into(),
        "noise_iterations" => p.noise_iterations.into(),
        "depth_color" => p.depth_color.into(),
        "surface_color" => p.surface_color.into(),
        "color_offset" => p.color_offset.into(),
        "color_multiplier" => p.color_multiplier.into(),
        other => return Err(ParameterError::Unknown(other.to_string())),
    };
    Ok(value)
}
