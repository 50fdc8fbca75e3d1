//! Static line segments, used to model wall boundaries.

use bytemuck::{Pod, Zeroable};
use nalgebra::Point2;

/// A line segment between two fixed world-space corners.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Zeroable, Pod)]
pub struct Segment {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
}

impl Segment {
    pub fn new(start: Point2<f64>, end: Point2<f64>) -> Self {
        Self { start, end }
    }

    /// The point on the segment closest to `point`.
    ///
    /// Degenerate (zero-length) segments are handled by clamping, which
    /// collapses to always returning `self.start`.
    pub fn closest_point_to(&self, point: Point2<f64>) -> Point2<f64> {
        let direction = self.end - self.start;
        let length_squared = direction.norm_squared();
        if length_squared <= 0.0 {
            return self.start;
        }
        let t = ((point - self.start).dot(&direction) / length_squared).clamp(0.0, 1.0);
        self.start + direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn closest_point_clamps_to_the_segment() {
        let seg = Segment::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
        assert_abs_diff_eq!(seg.closest_point_to(Point2::new(5.0, 3.0)), Point2::new(5.0, 0.0));
        assert_abs_diff_eq!(seg.closest_point_to(Point2::new(-5.0, 3.0)), Point2::new(0.0, 0.0));
        assert_abs_diff_eq!(seg.closest_point_to(Point2::new(15.0, 3.0)), Point2::new(10.0, 0.0));
    }

    #[test]
    fn degenerate_segment_returns_its_single_point() {
        let seg = Segment::new(Point2::new(1.0, 1.0), Point2::new(1.0, 1.0));
        assert_abs_diff_eq!(seg.closest_point_to(Point2::new(4.0, 4.0)), Point2::new(1.0, 1.0));
    }
}
