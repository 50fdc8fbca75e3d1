//! Pedestrian agents: rigid bodies composed of five disks.

use crate::shape::Shape;
use anyhow::{Context, ensure};
use crowd_containers::KeyIndexMapper;
use crowd_geometry::{Pose2D, point_velocity};
use nalgebra::{Point2, Vector2};

/// The number of disks every agent is composed of, left-shoulder to
/// right-shoulder. Fixed at the type level so "shape count is 5" can never be
/// violated once an [`Agent`] exists.
pub const SHAPES_PER_AGENT: usize = 5;

/// Identifier for an [`Agent`], stable for the lifetime of a run.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentId(pub u64);

/// A pedestrian agent: a rigid body in the plane made up of five disks.
#[derive(Clone, Debug)]
pub struct Agent {
    id: AgentId,
    mass: f64,
    moment_of_inertia: f64,
    /// Relaxation time τ_t for the floor (viscous) damping term.
    floor_relaxation_time: f64,
    /// Relaxation time τ_r for the rotational damping term.
    angular_relaxation_time: f64,
    pose: Pose2D,
    velocity: Vector2<f64>,
    angular_velocity: f64,
    shapes: [Shape; SHAPES_PER_AGENT],
    force_accumulator: Vector2<f64>,
    torque_accumulator: f64,
}

impl Agent {
    /// # Errors
    /// If `mass`, `moment_of_inertia`, or either relaxation time is not
    /// strictly positive.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: AgentId,
        mass: f64,
        moment_of_inertia: f64,
        floor_relaxation_time: f64,
        angular_relaxation_time: f64,
        pose: Pose2D,
        velocity: Vector2<f64>,
        angular_velocity: f64,
        shapes: [Shape; SHAPES_PER_AGENT],
    ) -> anyhow::Result<Self> {
        ensure!(mass > 0.0, "agent {} has non-positive mass {mass}", id.0);
        ensure!(
            moment_of_inertia > 0.0,
            "agent {} has non-positive moment of inertia {moment_of_inertia}",
            id.0
        );
        ensure!(
            floor_relaxation_time > 0.0,
            "agent {} has non-positive floor relaxation time {floor_relaxation_time}",
            id.0
        );
        ensure!(
            angular_relaxation_time > 0.0,
            "agent {} has non-positive angular relaxation time {angular_relaxation_time}",
            id.0
        );
        Ok(Self {
            id,
            mass,
            moment_of_inertia,
            floor_relaxation_time,
            angular_relaxation_time,
            pose,
            velocity,
            angular_velocity,
            shapes,
            force_accumulator: Vector2::zeros(),
            torque_accumulator: 0.0,
        })
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn moment_of_inertia(&self) -> f64 {
        self.moment_of_inertia
    }

    pub fn floor_relaxation_time(&self) -> f64 {
        self.floor_relaxation_time
    }

    pub fn angular_relaxation_time(&self) -> f64 {
        self.angular_relaxation_time
    }

    pub fn pose(&self) -> &Pose2D {
        &self.pose
    }

    pub fn velocity(&self) -> Vector2<f64> {
        self.velocity
    }

    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    pub fn shapes(&self) -> &[Shape; SHAPES_PER_AGENT] {
        &self.shapes
    }

    /// The world-space center of the shape at `shape_index`.
    ///
    /// # Panics
    /// If `shape_index >= SHAPES_PER_AGENT`.
    pub fn shape_world_center(&self, shape_index: usize) -> Point2<f64> {
        self.shapes[shape_index].disk.world_center(&self.pose)
    }

    /// The world-space velocity of the material point currently located at
    /// `world_point`.
    pub fn point_velocity(&self, world_point: Point2<f64>) -> Vector2<f64> {
        point_velocity(self.pose.position, self.velocity, self.angular_velocity, world_point)
    }

    /// Resets the force and torque accumulators to the given driving force
    /// and torque, ready to accumulate contact contributions on top.
    pub fn reset_accumulators(&mut self, driving_force: Vector2<f64>, driving_torque: f64) {
        self.force_accumulator = driving_force;
        self.torque_accumulator = driving_torque;
    }

    /// Adds to the accumulated force and, given the world-space point of
    /// application, the induced torque about the center of mass.
    pub fn accumulate_force_at(&mut self, force: Vector2<f64>, world_point: Point2<f64>) {
        self.force_accumulator += force;
        let lever_arm = world_point - self.pose.position;
        self.torque_accumulator += crowd_geometry::vector2::cross(lever_arm, force);
    }

    pub fn accumulated_force(&self) -> Vector2<f64> {
        self.force_accumulator
    }

    pub fn accumulated_torque(&self) -> f64 {
        self.torque_accumulator
    }

    /// Advances velocity, angular velocity, position and orientation by one
    /// mechanical sub-step using semi-implicit (symplectic) Euler, per §4.7.
    ///
    /// `contact_force` and `contact_torque` must already be folded into
    /// [`Self::accumulated_force`]/[`Self::accumulated_torque`] by repeated
    /// calls to [`Self::accumulate_force_at`] since the last
    /// [`Self::reset_accumulators`].
    pub fn integrate_substep(&mut self, dt_m: f64) -> anyhow::Result<()> {
        let acceleration =
            self.force_accumulator / self.mass - self.velocity / self.floor_relaxation_time;
        let angular_acceleration = self.torque_accumulator / self.moment_of_inertia
            - self.angular_velocity / self.angular_relaxation_time;

        self.velocity += acceleration * dt_m;
        self.angular_velocity += angular_acceleration * dt_m;
        self.pose.position += self.velocity * dt_m;
        self.pose.orientation += self.angular_velocity * dt_m;

        ensure!(
            self.velocity.iter().all(|c| c.is_finite())
                && self.angular_velocity.is_finite()
                && self.pose.position.iter().all(|c| c.is_finite())
                && self.pose.orientation.is_finite(),
            "agent {} produced a non-finite state after integration",
            self.id.0
        );
        Ok(())
    }
}

/// Owns the dense, index-addressable array of agents, preserving input id
/// order for deterministic iteration.
#[derive(Clone, Debug)]
pub struct AgentManager {
    agents: Vec<Agent>,
    indices_by_id: KeyIndexMapper<AgentId>,
}

impl AgentManager {
    /// # Errors
    /// If two agents share the same id.
    pub fn new(agents: Vec<Agent>) -> anyhow::Result<Self> {
        let mut indices_by_id = KeyIndexMapper::with_capacity(agents.len());
        for agent in &agents {
            indices_by_id
                .try_push_key(agent.id())
                .map_err(|_| anyhow::anyhow!("duplicate agent id {}", agent.id().0))
                .with_context(|| "failed to index agents by id")?;
        }
        Ok(Self {
            agents,
            indices_by_id,
        })
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.indices_by_id.get(id).map(|idx| &self.agents[idx])
    }

    pub fn index_of(&self, id: AgentId) -> Option<usize> {
        self.indices_by_id.get(id)
    }

    pub fn agent_at(&self, index: usize) -> &Agent {
        &self.agents[index]
    }

    pub fn agent_at_mut(&mut self, index: usize) -> &mut Agent {
        &mut self.agents[index]
    }

    /// Iterates over agents in input-id order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents.iter_mut()
    }
}
