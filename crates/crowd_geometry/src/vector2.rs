//! Free functions on 2D vectors that `nalgebra` does not provide directly.

use nalgebra::{Rotation2, Vector2};

/// The scalar (z-component) of the 3D cross product of two 2D vectors lying
/// in the xy-plane.
///
/// Positive when `b` is counterclockwise from `a`.
pub fn cross(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Rotates `v` by 90 degrees counterclockwise.
///
/// Used to express the velocity contribution of an angular velocity `ω` at a
/// lever arm `r` as `ω * perp(r)`, the 2D analogue of `ω × r`.
pub fn perp(v: Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-v.y, v.x)
}

/// Rotates `v` counterclockwise by `theta` radians.
pub fn rotate(v: Vector2<f64>, theta: f64) -> Vector2<f64> {
    Rotation2::new(theta) * v
}

/// Normalizes `v`, falling back to `default` when `v` is (numerically) zero
/// rather than producing `NaN`.
pub fn normalize_or(v: Vector2<f64>, default: Vector2<f64>) -> Vector2<f64> {
    let norm = v.norm();
    if norm > 0.0 { v / norm } else { default }
}
