//! Benchmarks for the per-frame CPU work.
//!
//! Run with: `cargo bench`
//! Compare against the sequential path with:
//! `cargo bench --no-default-features`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

use stormsea::noise::perlin3;
use stormsea::rain::{ParticlePool, RainConfig};
use stormsea::shader::water_shader;
use stormsea::surface::{SurfaceConfig, WaterSurface};
use stormsea::wave::{elevation_at, WaveParameters};

fn bench_noise(c: &mut Criterion) {
    c.bench_function("perlin3", |b| {
        let mut t = 0.0f32;
        b.iter(|| {
            t += 0.001;
            black_box(perlin3(Vec3::new(0.37, -1.2, t)))
        })
    });
}

fn bench_elevation(c: &mut Criterion) {
    let mut group = c.benchmark_group("elevation_at");
    for iterations in [0u32, 1, 4, 8] {
        let params = WaveParameters::default().with_small_waves(0.15, 3.0, 0.2, iterations);
        group.bench_with_input(BenchmarkId::from_parameter(iterations), &params, |b, params| {
            b.iter(|| black_box(elevation_at(black_box(0.25), black_box(-0.5), 1.0, params)))
        });
    }
    group.finish();
}

fn bench_surface_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("surface_update");
    group.sample_size(20);
    let params = WaveParameters::default();
    for segments in [64u32, 128, 512] {
        let mut surface = WaterSurface::new(SurfaceConfig::default().with_segments(segments))
            .expect("valid grid");
        let mut t = 0.0f32;
        group.bench_function(BenchmarkId::from_parameter(segments), |b| {
            b.iter(|| {
                t += 1.0 / 60.0;
                surface.update(&params, t);
                black_box(surface.elevations()[0])
            })
        });
    }
    group.finish();
}

fn bench_rain_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("rain_tick");
    for count in [100usize, 10_000, 100_000] {
        let mut rng = StdRng::seed_from_u64(0);
        let mut pool = ParticlePool::initialize(&RainConfig::default().with_count(count), &mut rng)
            .expect("valid rain config");
        group.bench_function(BenchmarkId::from_parameter(count), |b| {
            b.iter(|| {
                pool.tick(0.05);
                black_box(pool.as_bytes().len())
            })
        });
    }
    group.finish();
}

fn bench_shader_gen(c: &mut Criterion) {
    c.bench_function("water_shader", |b| b.iter(|| black_box(water_shader())));
}

criterion_group!(
    benches,
    bench_noise,
    bench_elevation,
    bench_surface_update,
    bench_rain_tick,
    bench_shader_gen,
);
criterion_main!(benches);
