//! Uniform data shared with the water shader.
//!
//! [`WaterUniforms`] is the per-frame block uploaded to `@group(0)
//! @binding(0)`. Its field order is chosen so the Rust layout and the WGSL
//! std140 layout agree without hidden padding:
//!
//! ```text
//! offset  field
//!      0  big_wave_frequency  vec2<f32>
//!      8  time                f32
//!     12  big_wave_speed      f32
//!     16  depth_color         vec3<f32>
//!     28  big_wave_elevation  f32
//!     32  surface_color       vec3<f32>
//!     44  small_wave_elevation f32
//!     48  small_wave_frequency f32
//!     52  small_wave_speed    f32
//!     56  noise_iterations    u32
//!     60  color_offset        f32
//!     64  color_multiplier    f32
//!     68  _padding            3 x f32
//! ```
//!
//! [`UniformValue`] is the dynamically typed payload used when a debug panel
//! addresses a parameter by name.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

use crate::wave::WaveParameters;

/// A single named-parameter value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    F32(f32),
    U32(u32),
    Vec2(Vec2),
    Vec3(Vec3),
}

impl UniformValue {
    /// WGSL type name for this value.
    pub fn wgsl_type(&self) -> &'static str {
        match self {
            UniformValue::F32(_) => "f32",
            UniformValue::U32(_) => "u32",
            UniformValue::Vec2(_) => "vec2<f32>",
            UniformValue::Vec3(_) => "vec3<f32>",
        }
    }

    /// Byte size of this value (without trailing padding).
    pub fn byte_size(&self) -> usize {
        match self {
            UniformValue::F32(_) | UniformValue::U32(_) => 4,
            UniformValue::Vec2(_) => 8,
            UniformValue::Vec3(_) => 12,
        }
    }

    /// Append the little-endian encoding of this value.
    pub fn write_bytes(&self, buf: &mut Vec<u8>) {
        match self {
            UniformValue::F32(v) => buf.extend_from_slice(&v.to_le_bytes()),
            UniformValue::U32(v) => buf.extend_from_slice(&v.to_le_bytes()),
            UniformValue::Vec2(v) => {
                for c in v.to_array() {
                    buf.extend_from_slice(&c.to_le_bytes());
                }
            }
            UniformValue::Vec3(v) => {
                for c in v.to_array() {
                    buf.extend_from_slice(&c.to_le_bytes());
                }
            }
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::F32(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        UniformValue::U32(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v)
    }
}

/// Per-frame water uniform block. See the module docs for the layout.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct WaterUniforms {
    pub big_wave_frequency: [f32; 2],
    pub time: f32,
    pub big_wave_speed: f32,
    pub depth_color: [f32; 3],
    pub big_wave_elevation: f32,
    pub surface_color: [f32; 3],
    pub small_wave_elevation: f32,
    pub small_wave_frequency: f32,
    pub small_wave_speed: f32,
    pub noise_iterations: u32,
    pub color_offset: f32,
    pub color_multiplier: f32,
    pub _padding: [f32; 3],
}

impl WaterUniforms {
    pub fn new(params: &WaveParameters, time: f32) -> Self {
        Self {
            big_wave_frequency: params.big_wave_frequency.to_array(),
            time,
            big_wave_speed: params.big_wave_speed,
            depth_color: params.depth_color.to_array(),
            big_wave_elevation: params.big_wave_elevation,
            surface_color: params.surface_color.to_array(),
            small_wave_elevation: params.small_wave_elevation,
            small_wave_frequency: params.small_wave_frequency,
            small_wave_speed: params.small_wave_speed,
            noise_iterations: params.noise_iterations,
            color_offset: params.color_offset,
            color_multiplier: params.color_multiplier,
            _padding: [0.0; 3],
        }
    }

    /// WGSL declaration of the matching struct.
    pub const WGSL: &'static str = r#"struct WaterUniforms {
    big_wave_frequency: vec2<f32>,
    time: f32,
    big_wave_speed: f32,
    depth_color: vec3<f32>,
    big_wave_elevation: f32,
    surface_color: vec3<f32>,
    small_wave_elevation: f32,
    small_wave_frequency: f32,
    small_wave_speed: f32,
    noise_iterations: u32,
    color_offset: f32,
    color_multiplier: f32,
    _pad0: f32,
    _pad1: f32,
    _pad2: f32,
};
"#;
}

/// Camera block at `@group(0) @binding(1)`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraUniforms {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniforms {
    pub fn new(view_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
        }
    }

    /// Perspective camera looking at the water from above one corner,
    /// the same framing as the demo scene.
    pub fn looking_at_water(aspect: f32) -> Self {
        let view = Mat4::look_at_rh(Vec3::new(1.0, 1.0, 1.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(75f32.to_radians(), aspect, 0.1, 100.0);
        Self::new(proj * view)
    }

    pub const WGSL: &'static str = r#"struct CameraUniforms {
    view_proj: mat4x4<f32>,
};
"#;
}

impl Default for CameraUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}
