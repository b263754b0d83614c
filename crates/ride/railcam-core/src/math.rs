//! Small vector helpers over `[f32; 3]`.
//!
//! The core stays free of a math crate; adapters convert to their own vector
//! types at the boundary.

/// 3D vector / point (x, y, z).
pub type Vec3 = [f32; 3];

pub const ZERO: Vec3 = [0.0, 0.0, 0.0];

#[inline]
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(a: Vec3, s: f32) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn length_squared(a: Vec3) -> f32 {
    dot(a, a)
}

#[inline]
pub fn length(a: Vec3) -> f32 {
    length_squared(a).sqrt()
}

#[inline]
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    length(sub(a, b))
}

/// Unit vector in the direction of `a`; zero stays zero.
#[inline]
pub fn normalize(a: Vec3) -> Vec3 {
    let len2 = length_squared(a);
    if len2 > 0.0 {
        scale(a, len2.sqrt().recip())
    } else {
        ZERO
    }
}

#[inline]
pub fn is_finite(a: Vec3) -> bool {
    a.iter().all(|c| c.is_finite())
}
