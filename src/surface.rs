//! The water grid.
//!
//! A flat plane in the xz axes, `width x depth` units centered on the
//! origin and split into `segments x segments` quads. Each tick,
//! [`WaterSurface::update`] evaluates the wave field once per vertex from a
//! single parameter snapshot and stores elevations and colors in flat
//! buffers the renderer can upload directly.
//!
//! With the `parallel` feature (default) vertices are evaluated across the
//! rayon thread pool. All threads read the same snapshot, so the result is
//! identical to the sequential path.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::ConfigError;
use crate::wave::{color_at, elevation_at, WaveParameters};

/// Grid size and resolution.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Extent along x.
    pub width: f32,
    /// Extent along z.
    pub depth: f32,
    /// Quads per side. The grid has `(segments + 1)²` vertices.
    pub segments: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 2.0,
            depth: 2.0,
            segments: 512,
        }
    }
}

impl SurfaceConfig {
    pub fn with_segments(mut self, segments: u32) -> Self {
        self.segments = segments;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let size_ok = self.width.is_finite() && self.depth.is_finite() && self.width > 0.0 && self.depth > 0.0;
        if self.segments == 0 || !size_ok {
            return Err(ConfigError::InvalidGrid { segments: self.segments });
        }
        Ok(())
    }

    /// Vertices per row (and per column).
    #[inline]
    pub fn row_len(&self) -> usize {
        self.segments as usize + 1
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.row_len() * self.row_len()
    }
}

/// GPU vertex: displaced position and shading color.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct WaterVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl WaterVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<WaterVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Per-vertex elevation and color buffers over a fixed grid.
#[derive(Clone, Debug)]
pub struct WaterSurface {
    config: SurfaceConfig,
    /// Undisplaced (x, z) of every vertex, row-major from -z to +z.
    grid: Vec<Vec2>,
    elevations: Vec<f32>,
    colors: Vec<Vec3>,
    time: f32,
    /// Set while the latest update produced NaN/inf, so the warning fires once.
    degraded: bool,
}

impl WaterSurface {
    /// Build the grid. All elevations start at zero.
    pub fn new(config: SurfaceConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let n = config.row_len();
        let step_x = config.width / config.segments as f32;
        let step_z = config.depth / config.segments as f32;
        let half = Vec2::new(config.width, config.depth) * 0.5;

        let mut grid = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                grid.push(Vec2::new(col as f32 * step_x, row as f32 * step_z) - half);
            }
        }

        log::debug!(
            "water surface: {}x{} units, {} segments, {} vertices",
            config.width,
            config.depth,
            config.segments,
            grid.len()
        );

        let count = grid.len();
        Ok(Self {
            config,
            grid,
            elevations: vec![0.0; count],
            colors: vec![Vec3::ZERO; count],
            time: 0.0,
            degraded: false,
        })
    }

    /// Re-evaluate every vertex at time `t` from one parameter snapshot.
    pub fn update(&mut self, params: &WaveParameters, t: f32) {
        let grid = &self.grid;

        #[cfg(feature = "parallel")]
        self.elevations
            .par_iter_mut()
            .zip(self.colors.par_iter_mut())
            .zip(grid.par_iter())
            .for_each(|((elevation, color), p)| {
                *elevation = elevation_at(p.x, p.y, t, params);
                *color = color_at(*elevation, params);
            });

        #[cfg(not(feature = "parallel"))]
        for ((elevation, color), p) in self.elevations.iter_mut().zip(self.colors.iter_mut()).zip(grid.iter()) {
            *elevation = elevation_at(p.x, p.y, t, params);
            *color = color_at(*elevation, params);
        }

        self.time = t;

        let finite = self.elevations.iter().all(|e| e.is_finite());
        if !finite && !self.degraded {
            log::warn!("water surface produced non-finite elevations at t={:.3}; check wave parameters", t);
        }
        self.degraded = !finite;
    }

    #[inline]
    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Time of the last update.
    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.grid.len()
    }

    /// Undisplaced grid positions as (x, z).
    #[inline]
    pub fn grid(&self) -> &[Vec2] {
        &self.grid
    }

    #[inline]
    pub fn elevations(&self) -> &[f32] {
        &self.elevations
    }

    #[inline]
    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    /// Whether the last update produced any NaN or infinite elevation.
    #[inline]
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Displaced positions, elevation on y.
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.grid
            .iter()
            .zip(&self.elevations)
            .map(|(p, &e)| Vec3::new(p.x, e, p.y))
    }

    /// Interleaved vertex data ready for upload.
    pub fn vertices(&self) -> Vec<WaterVertex> {
        self.positions()
            .zip(&self.colors)
            .map(|(p, c)| WaterVertex {
                position: p.to_array(),
                color: c.to_array(),
            })
            .collect()
    }

    /// Triangle list, two triangles per quad, counter-clockwise seen from +y.
    ///
    /// Only depends on the grid, so callers upload it once.
    pub fn indices(&self) -> Vec<u32> {
        let n = self.config.row_len() as u32;
        let segments = self.config.segments;
        let mut indices = Vec::with_capacity(segments as usize * segments as usize * 6);
        for row in 0..segments {
            for col in 0..segments {
                let a = row * n + col;
                let b = a + 1;
                let c = a + n;
                let d = c + 1;
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wave::WaveField;

    fn small() -> WaterSurface {
        WaterSurface::new(SurfaceConfig::default().with_segments(8)).unwrap()
    }

    #[test]
    fn test_grid_layout() {
        let surface = small();
        assert_eq!(surface.vertex_count(), 81);
        assert_eq!(surface.grid()[0], Vec2::new(-1.0, -1.0));
        assert_eq!(surface.grid()[80], Vec2::new(1.0, 1.0));
        assert_eq!(surface.grid()[40], Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_default_resolution() {
        assert_eq!(SurfaceConfig::default().vertex_count(), 513 * 513);
    }

    #[test]
    fn test_rejects_zero_segments() {
        let config = SurfaceConfig::default().with_segments(0);
        assert!(matches!(WaterSurface::new(config), Err(ConfigError::InvalidGrid { .. })));
    }

    #[test]
    fn test_update_matches_field() {
        let mut surface = small();
        let params = WaveParameters::default();
        surface.update(&params, 2.5);
        let field = WaveField::new(params);
        for (i, p) in surface.grid().iter().enumerate() {
            let sample = field.sample(p.x, p.y, 2.5);
            assert_eq!(surface.elevations()[i], sample.elevation);
            assert_eq!(surface.colors()[i], sample.color);
        }
        assert_eq!(surface.time(), 2.5);
    }

    #[test]
    fn test_calm_surface_at_time_zero_is_flat_at_center() {
        let mut surface = small();
        surface.update(&WaveParameters::calm(), 0.0);
        assert_eq!(surface.elevations()[40], 0.0);
    }

    #[test]
    fn test_nan_marks_degraded_without_panicking() {
        let mut surface = small();
        let mut params = WaveParameters::default();
        params.small_wave_elevation = f32::NAN;
        surface.update(&params, 1.0);
        assert!(surface.is_degraded());
        surface.update(&WaveParameters::default(), 1.0);
        assert!(!surface.is_degraded());
    }

    #[test]
    fn test_indices() {
        let surface = small();
        let indices = surface.indices();
        assert_eq!(indices.len(), 8 * 8 * 6);
        assert_eq!(&indices[..6], &[0, 9, 1, 1, 9, 10]);
        assert!(indices.iter().all(|&i| (i as usize) < surface.vertex_count()));
    }

    #[test]
    fn test_vertices_follow_elevation() {
        let mut surface = small();
        surface.update(&WaveParameters::default(), 0.7);
        let vertices = surface.vertices();
        assert_eq!(vertices.len(), 81);
        assert_eq!(vertices[5].position[1], surface.elevations()[5]);
        assert_eq!(std::mem::size_of::<WaterVertex>(), 24);
        assert_eq!(WaterVertex::desc().array_stride, 24);
    }
}
