//! Disk–disk and disk–segment overlap queries.

use crate::segment::Segment;
use nalgebra::{Point2, Vector2};

/// The tie-break normal used when two participants are found exactly
/// coincident. Any fixed non-zero direction works; what matters is that it
/// is reproducible.
const DEGENERATE_NORMAL: Vector2<f64> = Vector2::new(1.0, 0.0);

/// The geometric description of an overlap between two participants.
///
/// `normal` always points from the first participant toward the second (or,
/// for a disk–segment query, from the segment toward the disk).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ContactGeometry {
    pub penetration: f64,
    pub normal: Vector2<f64>,
    pub point: Point2<f64>,
}

/// Tests two disks for overlap.
///
/// Returns `None` when the disks do not overlap. When the centers coincide,
/// the normal falls back to [`DEGENERATE_NORMAL`] since no direction is
/// distinguished by the geometry.
pub fn disk_disk_contact(
    center_a: Point2<f64>,
    radius_a: f64,
    center_b: Point2<f64>,
    radius_b: f64,
) -> Option<ContactGeometry> {
    let offset = center_b - center_a;
    let distance = offset.norm();
    let penetration = radius_a + radius_b - distance;
    if penetration <= 0.0 {
        return None;
    }
    let normal = if distance > 0.0 {
        offset / distance
    } else {
        DEGENERATE_NORMAL
    };
    // The contact point is taken midway between the two surfaces along the
    // normal, which is the usual convention for reporting a single contact
    // point between overlapping disks.
    let point = center_a + normal * (radius_a - 0.5 * penetration);
    Some(ContactGeometry {
        penetration,
        normal,
        point,
    })
}

/// Tests a disk against a segment for overlap.
///
/// The normal points from the segment toward the disk center.
pub fn disk_segment_contact(
    disk_center: Point2<f64>,
    disk_radius: f64,
    segment: &Segment,
) -> Option<ContactGeometry> {
    let closest = segment.closest_point_to(disk_center);
    let offset = disk_center - closest;
    let distance = offset.norm();
    let penetration = disk_radius - distance;
    if penetration <= 0.0 {
        return None;
    }
    let normal = if distance > 0.0 {
        offset / distance
    } else {
        DEGENERATE_NORMAL
    };
    Some(ContactGeometry {
        penetration,
        normal,
        point: closest,
    })
}
