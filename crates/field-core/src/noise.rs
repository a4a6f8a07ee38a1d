use glam::{Vec2, Vec3, Vec4};

// Skew/unskew factors for the 2D simplex grid: (3-√3)/6, (√3-1)/2, -1+2·(3-√3)/6, 1/41
const C: Vec4 = Vec4::new(
    0.211_324_87,
    0.366_025_4,
    -0.577_350_26,
    0.024_390_243,
);

#[inline]
fn mod289_2(x: Vec2) -> Vec2 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn mod289_3(x: Vec3) -> Vec3 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

#[inline]
fn permute(x: Vec3) -> Vec3 {
    mod289_3((x * 34.0 + 1.0) * x)
}

// GLSL fract: always x - floor(x), also for negative inputs
#[inline]
fn fract3(x: Vec3) -> Vec3 {
    x - x.floor()
}

/// 2D simplex noise in roughly [-1, 1].
///
/// Lattice coordinates are wrapped modulo 289 before hashing, so the function
/// stays continuous and finite for arbitrarily large inputs.
pub fn snoise(v: Vec2) -> f32 {
    let i = (v + Vec2::splat(v.dot(Vec2::splat(C.y)))).floor();
    let x0 = v - i + Vec2::splat(i.dot(Vec2::splat(C.x)));

    let i1 = if x0.x > x0.y {
        Vec2::new(1.0, 0.0)
    } else {
        Vec2::new(0.0, 1.0)
    };
    let x1 = x0 + Vec2::splat(C.x) - i1;
    let x2 = x0 + Vec2::splat(C.z);

    let i = mod289_2(i);
    let p = permute(
        permute(Vec3::splat(i.y) + Vec3::new(0.0, i1.y, 1.0))
            + Vec3::splat(i.x)
            + Vec3::new(0.0, i1.x, 1.0),
    );

    let mut m = (Vec3::splat(0.5) - Vec3::new(x0.dot(x0), x1.dot(x1), x2.dot(x2))).max(Vec3::ZERO);
    m *= m;
    m *= m;

    // Gradients from 41 points on a line, mapped onto a diamond
    let x = 2.0 * fract3(p * C.w) - 1.0;
    let h = x.abs() - 0.5;
    let ox = (x + 0.5).floor();
    let a0 = x - ox;

    // Normalise gradients implicitly by scaling m
    m *= Vec3::splat(1.792_842_9) - 0.853_734_7 * (a0 * a0 + h * h);

    let g = Vec3::new(
        a0.x * x0.x + h.x * x0.y,
        a0.y * x1.x + h.y * x1.y,
        a0.z * x2.x + h.z * x2.y,
    );
    130.0 * m.dot(g)
}
