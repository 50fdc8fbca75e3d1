//! The top-level simulation state: immutable registries plus mutable agent
//! kinematics and contact state (§4.3).

use crate::agent::{Agent, AgentManager};
use crate::broad_phase::UniformGrid;
use crate::contact::ContactBook;
use crate::material::MaterialRegistry;
use crate::wall::Wall;
use anyhow::ensure;

/// Owns every agent, wall, and material declared for a run, plus the mutable
/// state (kinematics and contact book) that a coarse step advances.
pub struct World {
    materials: MaterialRegistry,
    agents: AgentManager,
    walls: Vec<Wall>,
    bounds: (f64, f64),
    contacts: ContactBook,
    grid: UniformGrid,
}

impl World {
    /// # Errors
    /// If the bounding box is non-positive in either dimension, or if no
    /// agent has any shapes with a positive radius (there would be no valid
    /// grid cell size).
    pub fn build(
        materials: MaterialRegistry,
        agents: Vec<Agent>,
        walls: Vec<Wall>,
        lx: f64,
        ly: f64,
    ) -> anyhow::Result<Self> {
        ensure!(lx > 0.0 && ly > 0.0, "bounding box must be positive: Lx={lx}, Ly={ly}");

        let agents = AgentManager::new(agents)?;

        let max_radius = agents
            .iter()
            .flat_map(|agent| agent.shapes().iter())
            .map(|shape| shape.disk.radius)
            .fold(f64::MIN, f64::max);
        ensure!(
            max_radius.is_finite() && max_radius > 0.0,
            "world has no agents with a positive-radius shape"
        );

        let cell_size = 2.0 * max_radius;
        let mut grid = UniformGrid::new(lx, ly, cell_size);
        grid.rasterize_walls(&walls);

        Ok(Self {
            materials,
            agents,
            walls,
            bounds: (lx, ly),
            contacts: ContactBook::new(),
            grid,
        })
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    pub fn agents(&self) -> &AgentManager {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut AgentManager {
        &mut self.agents
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn bounds(&self) -> (f64, f64) {
        self.bounds
    }

    pub fn contacts(&self) -> &ContactBook {
        &self.contacts
    }

    pub fn contacts_mut(&mut self) -> &mut ContactBook {
        &mut self.contacts
    }

    pub fn grid(&self) -> &UniformGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut UniformGrid {
        &mut self.grid
    }
}
