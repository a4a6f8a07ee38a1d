//! CPU reference for the per-pixel field evaluation in `field.wgsl`.
//!
//! The GPU never calls into this module; it exists so the colour pipeline can
//! be inspected and tested on the host with the same constants the shader
//! hard-codes.

use crate::constants::*;
use crate::noise::snoise;
use crate::state::FieldUniforms;
use glam::{Vec2, Vec3, Vec4};

/// Intermediate values of one evaluation.
#[derive(Clone, Copy, Debug)]
pub struct FieldSample {
    /// Aspect-corrected position.
    pub st: Vec2,
    pub mouse_effect: f32,
    /// First warp layer.
    pub q: Vec2,
    /// Second warp layer.
    pub r: Vec2,
    /// Final scalar field.
    pub f: f32,
    /// Palette composite before grain.
    pub color: Vec3,
}

/// GLSL `smoothstep`, including the reversed-edge form used for the pointer falloff.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Evaluates the field at `frag`, a pixel-centre coordinate with the origin at
/// the bottom-left of the surface.
pub fn sample(frag: Vec2, u: &FieldUniforms) -> FieldSample {
    let resolution = Vec2::from(u.resolution);
    let aspect = resolution.x / resolution.y;
    let mut st = frag / resolution;
    st.x *= aspect;

    let mouse = Vec2::from(u.pointer) * aspect;
    let dist = st.distance(mouse);
    let mouse_effect = smoothstep(POINTER_FALLOFF_RADIUS, 0.0, dist) * POINTER_EFFECT_STRENGTH;

    let time = u.field_time();

    let q = Vec2::new(
        snoise(st + Vec2::splat(time * WARP_Q_TIME_RATE)),
        snoise(st + Vec2::splat(WARP_Q_OFFSET)),
    );
    let r = Vec2::new(
        snoise(st + q + Vec2::from(WARP_R_PHASE_X) + Vec2::splat(WARP_R_TIME_RATE_X * time)),
        snoise(st + q + Vec2::from(WARP_R_PHASE_Y) + Vec2::splat(WARP_R_TIME_RATE_Y * time)),
    );
    let f = snoise(st + r + Vec2::splat(mouse_effect));

    FieldSample {
        st,
        mouse_effect,
        q,
        r,
        f,
        color: composite(q, r, f),
    }
}

/// Sequential palette blend. Each step lerps over the previous result, so later
/// factors override earlier ones where they saturate.
pub fn composite(q: Vec2, r: Vec2, f: f32) -> Vec3 {
    let [c1, c2, c3, c4] = PALETTE.map(Vec3::from);
    let color = c1.lerp(c2, (f * f * FIELD_SQUARED_GAIN).clamp(0.0, 1.0));
    let color = color.lerp(c3, q.length().clamp(0.0, 1.0));
    color.lerp(c4, r.x.clamp(0.0, 1.0))
}

/// Mean-centred hash grain keyed on position and raw elapsed time.
#[inline]
pub fn grain(st: Vec2, time: f32) -> f32 {
    let s = (st * time).dot(Vec2::new(12.9898, 78.233)).sin() * 43758.545;
    (s - s.floor() - 0.5) * GRAIN_AMPLITUDE
}

/// Final fragment colour, fully opaque.
pub fn shade(frag: Vec2, u: &FieldUniforms) -> Vec4 {
    let s = sample(frag, u);
    let g = grain(s.st, u.time);
    (s.color + Vec3::splat(g)).extend(1.0)
}
