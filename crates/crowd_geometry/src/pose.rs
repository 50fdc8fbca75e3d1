//! The position and orientation of a rigid body in the plane.

use crate::vector2;
use bytemuck::{Pod, Zeroable};
use nalgebra::{Point2, Vector2};

/// The position and orientation of a rigid body in the plane, measured in
/// world space.
///
/// Angles follow the right-handed, counterclockwise-positive convention used
/// throughout this crate.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Zeroable, Pod)]
pub struct Pose2D {
    pub position: Point2<f64>,
    pub orientation: f64,
}

impl Pose2D {
    pub fn new(position: Point2<f64>, orientation: f64) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn at_origin() -> Self {
        Self::new(Point2::origin(), 0.0)
    }

    /// Maps a point given in the body's local frame to world space.
    pub fn to_world_point(&self, local_point: Vector2<f64>) -> Point2<f64> {
        self.position + vector2::rotate(local_point, self.orientation)
    }

    /// Rotates a direction or offset given in the body's local frame into
    /// world space, without translating it.
    pub fn to_world_vector(&self, local_vector: Vector2<f64>) -> Vector2<f64> {
        vector2::rotate(local_vector, self.orientation)
    }
}

/// The world-space velocity of the material point at `world_point` on a
/// rigid body whose center of mass moves with `velocity` and rotates with
/// `angular_velocity` about `center`.
pub fn point_velocity(
    center: Point2<f64>,
    velocity: Vector2<f64>,
    angular_velocity: f64,
    world_point: Point2<f64>,
) -> Vector2<f64> {
    velocity + angular_velocity * vector2::perp(world_point - center)
}
