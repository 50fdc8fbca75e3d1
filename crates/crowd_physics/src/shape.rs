//! A single disk shape belonging to an agent.

use crowd_geometry::Disk;

/// A disk shape in the local frame of its owning agent, together with the id
/// of the material it is made of.
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    pub disk: Disk,
    pub material_id: Option<String>,
}

impl Shape {
    pub fn new(disk: Disk, material_id: Option<String>) -> Self {
        Self { disk, material_id }
    }

    pub fn material_id(&self) -> Option<&str> {
        self.material_id.as_deref()
    }
}
