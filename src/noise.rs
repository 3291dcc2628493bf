//! Classic 3D Perlin gradient noise.
//!
//! The permutation is the polynomial `(34x² + x) mod 289`, so there is no
//! seed and no table: the same input always gives the same output, from
//! any thread. The GPU twin of this function lives in
//! [`shader_utils::PERLIN_WGSL`](crate::shader_utils::PERLIN_WGSL) and
//! follows the same steps line for line.
//!
//! Output is roughly in `[-1, 1]` and exactly `0.0` at integer lattice points.

use glam::{Vec2, Vec3, Vec4};

#[inline]
fn mod289(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn permute(x: Vec4) -> Vec4 {
    let y = (x * 34.0 + Vec4::ONE) * x;
    y - (y * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn taylor_inv_sqrt(r: Vec4) -> Vec4 {
    Vec4::splat(1.792_842_9) - 0.853_734_7 * r
}

/// Quintic smoothstep `6t⁵ - 15t⁴ + 10t³`.
#[inline]
fn fade(t: Vec3) -> Vec3 {
    t * t * t * (t * (t * 6.0 - Vec3::splat(15.0)) + Vec3::splat(10.0))
}

// GLSL-style fract: always in [0, 1), also for negative input.
#[inline]
fn fract(x: Vec4) -> Vec4 {
    x - x.floor()
}

// GLSL-style step(edge, x): 0.0 where x < edge, else 1.0.
#[inline]
fn step(edge: Vec4, x: Vec4) -> Vec4 {
    Vec4::select(x.cmplt(edge), Vec4::ZERO, Vec4::ONE)
}

/// Gradient components for the four corners hashed into `ixy`.
#[inline]
fn gradients(ixy: Vec4) -> (Vec4, Vec4, Vec4) {
    let gx = ixy * (1.0 / 7.0);
    let mut gy = fract(gx.floor() * (1.0 / 7.0)) - Vec4::splat(0.5);
    let mut gx = fract(gx);
    let gz = Vec4::splat(0.5) - gx.abs() - gy.abs();
    let sz = step(gz, Vec4::ZERO);
    gx -= sz * (step(Vec4::ZERO, gx) - Vec4::splat(0.5));
    gy -= sz * (step(Vec4::ZERO, gy) - Vec4::splat(0.5));
    (gx, gy, gz)
}

/// Sample 3D Perlin noise at `p`.
///
/// Deterministic, allocation-free and continuous everywhere, including
/// across lattice cell boundaries. Negative coordinates are fine.
pub fn perlin3(p: Vec3) -> f32 {
    let cell = p.floor();
    let pi0 = mod289(cell);
    let pi1 = mod289(cell + Vec3::ONE);
    let pf0 = p - cell;
    let pf1 = pf0 - Vec3::ONE;

    let ix = Vec4::new(pi0.x, pi1.x, pi0.x, pi1.x);
    let iy = Vec4::new(pi0.y, pi0.y, pi1.y, pi1.y);

    let ixy = permute(permute(ix) + iy);
    let ixy0 = permute(ixy + Vec4::splat(pi0.z));
    let ixy1 = permute(ixy + Vec4::splat(pi1.z));

    let (gx0, gy0, gz0) = gradients(ixy0);
    let (gx1, gy1, gz1) = gradients(ixy1);

    // Corner order in each Vec4 lane: (x0 y0), (x1 y0), (x0 y1), (x1 y1)
    let mut g000 = Vec3::new(gx0.x, gy0.x, gz0.x);
    let mut g100 = Vec3::new(gx0.y, gy0.y, gz0.y);
    let mut g010 = Vec3::new(gx0.z, gy0.z, gz0.z);
    let mut g110 = Vec3::new(gx0.w, gy0.w, gz0.w);
    let mut g001 = Vec3::new(gx1.x, gy1.x, gz1.x);
    let mut g101 = Vec3::new(gx1.y, gy1.y, gz1.y);
    let mut g011 = Vec3::new(gx1.z, gy1.z, gz1.z);
    let mut g111 = Vec3::new(gx1.w, gy1.w, gz1.w);

    let norm0 = taylor_inv_sqrt(Vec4::new(
        g000.length_squared(),
        g010.length_squared(),
        g100.length_squared(),
        g110.length_squared(),
    ));
    g000 *= norm0.x;
    g010 *= norm0.y;
    g100 *= norm0.z;
    g110 *= norm0.w;

    let norm1 = taylor_inv_sqrt(Vec4::new(
        g001.length_squared(),
        g011.length_squared(),
        g101.length_squared(),
        g111.length_squared(),
    ));
    g001 *= norm1.x;
    g011 *= norm1.y;
    g101 *= norm1.z;
    g111 *= norm1.w;

    let n000 = g000.dot(pf0);
    let n100 = g100.dot(Vec3::new(pf1.x, pf0.y, pf0.z));
    let n010 = g010.dot(Vec3::new(pf0.x, pf1.y, pf0.z));
    let n110 = g110.dot(Vec3::new(pf1.x, pf1.y, pf0.z));
    let n001 = g001.dot(Vec3::new(pf0.x, pf0.y, pf1.z));
    let n101 = g101.dot(Vec3::new(pf1.x, pf0.y, pf1.z));
    let n011 = g011.dot(Vec3::new(pf0.x, pf1.y, pf1.z));
    let n111 = g111.dot(pf1);

    let f = fade(pf0);
    let n_z = Vec4::new(n000, n100, n010, n110).lerp(Vec4::new(n001, n101, n011, n111), f.z);
    let n_yz = Vec2::new(n_z.x, n_z.y).lerp(Vec2::new(n_z.z, n_z.w), f.y);
    let n_xyz = n_yz.x + (n_yz.y - n_yz.x) * f.x;

    2.2 * n_xyz
}
