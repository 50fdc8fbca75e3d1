//! Polygonal wall obstacles, represented as a chain of static line segments.

use anyhow::ensure;
use crowd_geometry::Segment;
use nalgebra::Point2;

/// Identifier for a [`Wall`], stable for the lifetime of a run.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WallId(pub u64);

/// A polygonal wall obstacle: an ordered chain of at least two corners
/// defining consecutive, static line segments.
#[derive(Clone, Debug)]
pub struct Wall {
    id: WallId,
    material_id: Option<String>,
    corners: Vec<Point2<f64>>,
}

impl Wall {
    /// # Errors
    /// If fewer than two corners are given.
    pub fn new(id: WallId, material_id: Option<String>, corners: Vec<Point2<f64>>) -> anyhow::Result<Self> {
        ensure!(
            corners.len() >= 2,
            "wall {} has only {} corner(s); at least 2 are required",
            id.0,
            corners.len()
        );
        Ok(Self {
            id,
            material_id,
            corners,
        })
    }

    pub fn id(&self) -> WallId {
        self.id
    }

    pub fn material_id(&self) -> Option<&str> {
        self.material_id.as_deref()
    }

    pub fn corners(&self) -> &[Point2<f64>] {
        &self.corners
    }

    /// Whether the wall's last corner re-uses its first, defining a closed
    /// boundary.
    pub fn is_closed(&self) -> bool {
        self.corners.first() == self.corners.last()
    }

    /// Iterates over this wall's segments, paired with the index of the
    /// corner that starts each one (segment `k` joins corner `k` to corner
    /// `k+1`, also used as the `cornerId` component of agent–wall contact
    /// keys).
    pub fn segments(&self) -> impl Iterator<Item = (usize, Segment)> + '_ {
        self.corners
            .windows(2)
            .enumerate()
            .map(|(k, pair)| (k, Segment::new(pair[0], pair[1])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_with_a_single_corner_is_rejected() {
        assert!(Wall::new(WallId(0), None, vec![Point2::origin()]).is_err());
    }

    #[test]
    fn segments_join_consecutive_corners() {
        let wall = Wall::new(
            WallId(0),
            None,
            vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(1.0, 1.0)],
        )
        .unwrap();
        let segments: Vec<_> = wall.segments().collect();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].0, 0);
        assert_eq!(segments[1].0, 1);
    }

    #[test]
    fn reusing_the_first_corner_as_last_defines_a_closed_wall() {
        let wall = Wall::new(
            WallId(0),
            None,
            vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 0.0)],
        )
        .unwrap();
        assert!(wall.is_closed());
    }
}
