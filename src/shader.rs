//! WGSL generation for the water surface.
//!
//! The generated module evaluates the same wave field as
//! [`crate::wave`] in the vertex stage, so a renderer can upload the flat
//! grid once and animate it purely through [`WaterUniforms`]. Bindings:
//!
//! - `@group(0) @binding(0)`: [`WaterUniforms`]
//! - `@group(0) @binding(1)`: [`CameraUniforms`]
//!
//! Vertex input `@location(0)` is the undisplaced grid position (its y is
//! ignored). Renderers that upload CPU-displaced [`WaterVertex`] data
//! instead can use [`passthrough_shader`].
//!
//! [`WaterVertex`]: crate::surface::WaterVertex

use crate::shader_utils::PERLIN_WGSL;
use crate::uniforms::{CameraUniforms, WaterUniforms};

const BINDINGS_WGSL: &str = r#"
@group(0) @binding(0)
var<uniform> water: WaterUniforms;

@group(0) @binding(1)
var<uniform> camera: CameraUniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
};
"#;

const FIELD_WGSL: &str = r#"
fn big_wave(pos: vec2<f32>) -> f32 {
    let phase = water.time * water.big_wave_speed;
    return sin(pos.x * water.big_wave_frequency.x + phase)
        * sin(pos.y * water.big_wave_frequency.y + phase)
        * water.big_wave_elevation;
}

fn small_waves(pos: vec2<f32>) -> f32 {
    var sum = 0.0;
    let t = water.time * water.small_wave_speed;
    for (var i = 1u; i <= water.noise_iterations; i++) {
        let octave = f32(i);
        let freq = water.small_wave_frequency * octave;
        sum += perlin3(vec3<f32>(pos * freq, t)) * water.small_wave_elevation / octave;
    }
    return sum;
}

fn elevation_at(pos: vec2<f32>) -> f32 {
    return big_wave(pos) + small_waves(pos);
}

fn color_at(elevation: f32) -> vec3<f32> {
    let m = clamp((elevation + water.color_offset) * water.color_multiplier, 0.0, 1.0);
    return mix(water.depth_color, water.surface_color, vec3<f32>(m));
}
"#;

const WATER_ENTRY_WGSL: &str = r#"
@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
    let elevation = elevation_at(position.xz);
    var out: VertexOutput;
    out.clip_position = camera.view_proj * vec4<f32>(position.x, elevation, position.z, 1.0);
    out.color = color_at(elevation);
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(input.color, 1.0);
}
"#;

const PASSTHROUGH_ENTRY_WGSL: &str = r#"
@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = camera.view_proj * vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(input.color, 1.0);
}
"#;

/// Full water shader: uniforms, noise, wave field and entry points.
pub fn water_shader() -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        WaterUniforms::WGSL,
        CameraUniforms::WGSL,
        BINDINGS_WGSL,
        PERLIN_WGSL,
        FIELD_WGSL,
        WATER_ENTRY_WGSL
    )
}

/// Shader for vertices already displaced and colored on the CPU.
///
/// Keeps the same bind group layout as [`water_shader`] so both can share
/// one pipeline layout.
pub fn passthrough_shader() -> String {
    format!(
        "{}\n{}\n{}\n{}",
        WaterUniforms::WGSL,
        CameraUniforms::WGSL,
        BINDINGS_WGSL,
        PASSTHROUGH_ENTRY_WGSL
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> naga::Module {
        naga::front::wgsl::parse_str(code).unwrap_or_else(|e| panic!("WGSL parse error: {:?}", e))
    }

    /// Validates WGSL code using naga.
    fn validate_wgsl(code: &str) -> Result<(), String> {
        let module = naga::front::wgsl::parse_str(code)
            .map_err(|e| format!("WGSL parse error: {:?}", e))?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| format!("WGSL validation error: {:?}", e))?;

        Ok(())
    }

    fn struct_span(module: &naga::Module, name: &str) -> Option<u32> {
        module.types.iter().find_map(|(_, ty)| match &ty.inner {
            naga::TypeInner::Struct { span, .. } if ty.name.as_deref() == Some(name) => Some(*span),
            _ => None,
        })
    }

    #[test]
    fn test_water_shader_validates() {
        validate_wgsl(&water_shader()).expect("water shader should be valid");
    }

    #[test]
    fn test_passthrough_shader_validates() {
        validate_wgsl(&passthrough_shader()).expect("passthrough shader should be valid");
    }

    #[test]
    fn test_entry_points() {
        let module = parse(&water_shader());
        let names: Vec<_> = module.entry_points.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["vs_main", "fs_main"]);
    }

    #[test]
    fn test_uniform_layout_matches_rust() {
        let module = parse(&water_shader());
        assert_eq!(
            struct_span(&module, "WaterUniforms"),
            Some(std::mem::size_of::<WaterUniforms>() as u32)
        );
        assert_eq!(
            struct_span(&module, "CameraUniforms"),
            Some(std::mem::size_of::<CameraUniforms>() as u32)
        );
    }

    #[test]
    fn test_shader_uses_every_wave_parameter() {
        let shader = water_shader();
        for field in [
            "big_wave_speed",
            "big_wave_elevation",
            "big_wave_frequency",
            "small_wave_elevation",
            "small_wave_frequency",
            "small_wave_speed",
            "noise_iterations",
            "depth_color",
            "surface_color",
            "color_offset",
            "color_multiplier",
        ] {
            assert!(shader.contains(&format!("water.{}", field)), "{} unused", field);
        }
    }
}
