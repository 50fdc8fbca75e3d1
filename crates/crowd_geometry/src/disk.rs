//! Disk shapes, positioned in the local frame of their owning body.

use crate::pose::Pose2D;
use bytemuck::{Pod, Zeroable};
use nalgebra::{Point2, Vector2};

/// A disk positioned at a fixed offset in the local frame of its owning
/// agent.
///
/// The world-space center is only meaningful together with the pose of the
/// owning body; a `Disk` on its own carries no world-space information.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Zeroable, Pod)]
pub struct Disk {
    /// Center offset in the owning body's local frame.
    pub local_offset: Vector2<f64>,
    pub radius: f64,
}

impl Disk {
    /// # Panics
    /// If `radius` is not positive.
    pub fn new(local_offset: Vector2<f64>, radius: f64) -> Self {
        assert!(radius > 0.0, "disk radius must be positive");
        Self {
            local_offset,
            radius,
        }
    }

    /// The world-space center of the disk given the pose of its owning body.
    pub fn world_center(&self, pose: &Pose2D) -> Point2<f64> {
        pose.to_world_point(self.local_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn world_center_follows_the_owning_pose() {
        let disk = Disk::new(Vector2::new(1.0, 0.0), 0.2);
        let pose = Pose2D::new(Point2::new(0.0, 0.0), FRAC_PI_2);
        assert_abs_diff_eq!(disk.world_center(&pose), Point2::new(0.0, 1.0), epsilon = 1e-12);
    }
}
