//! Vector geometry helpers shared by the ray caster and SWT pass.

use glam::Vec2;

/// Euclidean magnitude of a 2D vector.
pub fn magnitude(v: Vec2) -> f32 {
    v.length()
}

/// Dot product of two 2D vectors.
pub fn dot(a: Vec2, b: Vec2) -> f32 {
    a.dot(b)
}

/// Angle in radians between two vectors, via `acos` of the normalized dot product.
///
/// Roundoff that pushes `|cos θ|` past 1, and a zero-length input, both clip to
/// the π/2 sentinel rather than 0 or π.
pub fn angle_between(a: Vec2, b: Vec2) -> f32 {
    let denom = magnitude(a) * magnitude(b);
    if denom == 0.0 {
        return std::f32::consts::FRAC_PI_2;
    }
    let cos_theta = dot(a, b) / denom;
    if cos_theta.abs() > 1.0 {
        std::f32::consts::FRAC_PI_2
    } else {
        cos_theta.acos()
    }
}
