//! The two-time-scale integrator: a coarse step `dt` made of `N` mechanical
//! sub-steps at `dt_m`, resolving every contact at each sub-step (§4.7).

use crate::agent::{AgentId, SHAPES_PER_AGENT};
use crate::contact::ContactKey;
use crate::force_model;
use crate::world::World;
use anyhow::ensure;
use crowd_containers::HashMap;
use crowd_geometry::{disk_disk_contact, disk_segment_contact};
use nalgebra::Vector2;

/// The externally supplied driving force and torque for one agent, encoding
/// its desired motion via its relaxation times.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct DrivingInput {
    pub force: Vector2<f64>,
    pub torque: f64,
}

/// The caller-specified coarse and mechanical time steps for one call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepConfig {
    pub dt: f64,
    pub dt_m: f64,
}

impl StepConfig {
    /// Computes the number of sub-steps and the (possibly adjusted) coarse
    /// step duration, per §4.7: `N = round(dt/dt_m)`, with `dt` replaced by
    /// `N * dt_m` when the ratio is not integral.
    ///
    /// # Errors
    /// If `dt_m` is not positive, or `dt < dt_m`.
    fn resolve(&self) -> anyhow::Result<(usize, f64)> {
        ensure!(self.dt_m > 0.0, "dt_m must be positive, got {}", self.dt_m);
        ensure!(
            self.dt >= self.dt_m,
            "dt ({}) must be at least dt_m ({})",
            self.dt,
            self.dt_m
        );
        let n = (self.dt / self.dt_m).round().max(1.0) as usize;
        let adjusted_dt = n as f64 * self.dt_m;
        if (adjusted_dt - self.dt).abs() > 1e-9 * self.dt.max(1.0) {
            crowd_log::warn!(
                "dt ({}) is not an integer multiple of dt_m ({}); using N={} sub-steps, effective dt={}",
                self.dt,
                self.dt_m,
                n,
                adjusted_dt
            );
        }
        Ok((n, adjusted_dt))
    }
}

/// Runs one coarse step, advancing every agent's kinematics and updating the
/// contact book in place.
///
/// `driving` supplies the force and torque for each agent by id; agents
/// absent from the map are driven with zero force and torque.
pub fn run_coarse_step(
    world: &mut World,
    driving: &HashMap<AgentId, DrivingInput>,
    config: StepConfig,
) -> anyhow::Result<()> {
    let (substep_count, adjusted_dt) = config.resolve()?;
    crowd_log::debug!(
        "running coarse step: {} agents, {} walls, N={} sub-steps (dt_m={}, effective dt={})",
        world.agents().len(),
        world.walls().len(),
        substep_count,
        config.dt_m,
        adjusted_dt
    );

    crowd_log::with_timing_info_logging!("coarse step"; {
        for _ in 0..substep_count {
            run_substep(world, driving, config.dt_m)?;
        }
        Ok::<(), anyhow::Error>(())
    })?;

    world.contacts_mut().sweep();
    crowd_log::info!(
        "coarse step complete: {} contacts alive",
        world.contacts().len()
    );
    Ok(())
}

fn run_substep(
    world: &mut World,
    driving: &HashMap<AgentId, DrivingInput>,
    dt_m: f64,
) -> anyhow::Result<()> {
    world.contacts_mut().begin_substep();

    for agent in world.agents_mut().iter_mut() {
        let input = driving.get(&agent.id()).copied().unwrap_or_default();
        agent.reset_accumulators(input.force, input.torque);
    }

    resolve_agent_agent_contacts(world, dt_m);
    resolve_agent_wall_contacts(world, dt_m);

    for agent in world.agents_mut().iter_mut() {
        agent.integrate_substep(dt_m)?;
    }
    Ok(())
}

fn resolve_agent_agent_contacts(world: &mut World, dt_m: f64) {
    let centers: Vec<Vec<_>> = world
        .agents()
        .iter()
        .map(|agent| (0..SHAPES_PER_AGENT).map(|i| agent.shape_world_center(i)).collect())
        .collect();

    let grid = world.grid_mut();
    grid.clear_shapes();
    for (agent_idx, shape_centers) in centers.iter().enumerate() {
        for (shape_idx, &center) in shape_centers.iter().enumerate() {
            grid.insert_shape(agent_idx, shape_idx, center);
        }
    }
    let mut pairs = Vec::new();
    grid.collect_shape_pairs(&mut pairs);

    for ((agent_idx_a, shape_a), (agent_idx_b, shape_b)) in pairs {
        let (id_a, center_a, radius_a, material_a, mass_a) = {
            let agent = world.agents().agent_at(agent_idx_a);
            (
                agent.id(),
                agent.shape_world_center(shape_a),
                agent.shapes()[shape_a].disk.radius,
                agent.shapes()[shape_a].material_id().map(str::to_owned),
                agent.mass(),
            )
        };
        let (id_b, center_b, radius_b, material_b, mass_b) = {
            let agent = world.agents().agent_at(agent_idx_b);
            (
                agent.id(),
                agent.shape_world_center(shape_b),
                agent.shapes()[shape_b].disk.radius,
                agent.shapes()[shape_b].material_id().map(str::to_owned),
                agent.mass(),
            )
        };

        let Some(geometry) = disk_disk_contact(center_a, radius_a, center_b, radius_b) else {
            continue;
        };

        let velocity_a = world.agents().agent_at(agent_idx_a).point_velocity(geometry.point);
        let velocity_b = world.agents().agent_at(agent_idx_b).point_velocity(geometry.point);

        let intrinsic_a = world.materials().shape_intrinsic(material_a.as_deref());
        let intrinsic_b = world.materials().shape_intrinsic(material_b.as_deref());
        let params = world.materials().contact(
            material_a.as_deref().unwrap_or_default(),
            material_b.as_deref().unwrap_or_default(),
        );
        let effective_length = 2.0 * radius_a * radius_b / (radius_a + radius_b);

        let key = ContactKey::agent_agent(id_a, shape_a, id_b, shape_b);
        let record = world.contacts_mut().activate(key);
        let force = force_model::resolve_contact(
            &geometry,
            velocity_a,
            velocity_b,
            intrinsic_a,
            intrinsic_b,
            effective_length,
            params,
            record,
            dt_m,
        );
        warn_if_unstable(mass_a.min(mass_b), force.normal_stiffness, dt_m);

        world
            .agents_mut()
            .agent_at_mut(agent_idx_a)
            .accumulate_force_at(force.force_on_a, geometry.point);
        world
            .agents_mut()
            .agent_at_mut(agent_idx_b)
            .accumulate_force_at(-force.force_on_a, geometry.point);
    }
}

fn resolve_agent_wall_contacts(world: &mut World, dt_m: f64) {
    let mut candidates = Vec::new();
    world.grid().collect_wall_candidates(&mut candidates);

    for ((agent_idx, shape_idx), (wall_idx, segment_idx)) in candidates {
        let (id, center, radius, material_agent, mass) = {
            let agent = world.agents().agent_at(agent_idx);
            (
                agent.id(),
                agent.shape_world_center(shape_idx),
                agent.shapes()[shape_idx].disk.radius,
                agent.shapes()[shape_idx].material_id().map(str::to_owned),
                agent.mass(),
            )
        };
        let (wall_id, material_wall, segment) = {
            let wall = &world.walls()[wall_idx];
            let (_, segment) = wall
                .segments()
                .nth(segment_idx)
                .expect("segment index came from this wall's own rasterization");
            (wall.id(), wall.material_id().map(str::to_owned), segment)
        };

        let Some(geometry) = disk_segment_contact(center, radius, &segment) else {
            continue;
        };

        let velocity = world.agents().agent_at(agent_idx).point_velocity(geometry.point);

        let intrinsic_wall = world.materials().wall_intrinsic(material_wall.as_deref());
        let intrinsic_agent = world.materials().shape_intrinsic(material_agent.as_deref());
        let params = world.materials().contact(
            material_wall.as_deref().unwrap_or_default(),
            material_agent.as_deref().unwrap_or_default(),
        );

        let key = ContactKey::agent_wall(id, shape_idx, wall_id, segment_idx);
        let record = world.contacts_mut().activate(key);
        let force = force_model::resolve_contact(
            &geometry,
            Vector2::zeros(),
            velocity,
            intrinsic_wall,
            intrinsic_agent,
            radius,
            params,
            record,
            dt_m,
        );
        warn_if_unstable(mass, force.normal_stiffness, dt_m);

        world
            .agents_mut()
            .agent_at_mut(agent_idx)
            .accumulate_force_at(-force.force_on_a, geometry.point);
    }
}

/// Warns (but does not fail) when `dt_m` is not well below the contact's
/// natural oscillation period, per the stability note in §9.
fn warn_if_unstable(mass: f64, normal_stiffness: f64, dt_m: f64) {
    if normal_stiffness <= 0.0 {
        return;
    }
    let natural_period = (mass / normal_stiffness).sqrt();
    if dt_m >= natural_period {
        crowd_log::warn!(
            "dt_m ({dt_m}) is not well below sqrt(m/k_n) ({natural_period}); the explicit \
             spring-damper contact model may be unstable"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::material::MaterialRegistry;
    use crate::shape::Shape;
    use crate::wall::{Wall, WallId};
    use crowd_geometry::{Disk, Pose2D};
    use nalgebra::Point2;

    fn agent_at(id: u64, x: f64, y: f64, velocity: Vector2<f64>) -> Agent {
        let shapes = std::array::from_fn(|i| {
            let offset = (i as f64 - 2.0) * 0.2;
            Shape::new(Disk::new(Vector2::new(0.0, offset), 0.2), None)
        });
        Agent::new(
            AgentId(id),
            80.0,
            4.0,
            0.5,
            0.5,
            Pose2D::new(Point2::new(x, y), 0.0),
            velocity,
            0.0,
            shapes,
        )
        .unwrap()
    }

    #[test]
    fn two_agents_head_on_repel_and_slow_down() {
        let mut world = World::build(
            MaterialRegistry::default(),
            vec![
                agent_at(1, 0.0, 0.0, Vector2::new(1.0, 0.0)),
                agent_at(2, 0.35, 0.0, Vector2::new(-1.0, 0.0)),
            ],
            vec![],
            10.0,
            10.0,
        )
        .unwrap();

        let driving = HashMap::default();
        let config = StepConfig { dt: 0.01, dt_m: 1e-4 };
        for _ in 0..20 {
            run_coarse_step(&mut world, &driving, config).unwrap();
        }

        let a = world.agents().get(AgentId(1)).unwrap();
        let b = world.agents().get(AgentId(2)).unwrap();
        assert!(a.velocity().x < 1.0, "agent 1 should have been slowed by the contact");
        assert!(b.velocity().x > -1.0, "agent 2 should have been slowed by the contact");
    }

    #[test]
    fn an_agent_walking_into_a_wall_is_pushed_back_out() {
        let wall = Wall::new(
            WallId(1),
            None,
            vec![Point2::new(-5.0, 1.0), Point2::new(5.0, 1.0)],
        )
        .unwrap();
        let mut world = World::build(
            MaterialRegistry::default(),
            vec![agent_at(1, 0.0, 0.8, Vector2::new(0.0, 1.0))],
            vec![wall],
            10.0,
            10.0,
        )
        .unwrap();

        let driving = HashMap::default();
        let config = StepConfig { dt: 0.01, dt_m: 1e-4 };
        for _ in 0..50 {
            run_coarse_step(&mut world, &driving, config).unwrap();
        }

        let agent = world.agents().get(AgentId(1)).unwrap();
        assert!(
            agent.pose().position.y < 1.0,
            "the agent's torso disk should not have crossed the wall line"
        );
    }

    #[test]
    fn step_config_rejects_a_dt_m_larger_than_dt() {
        let config = StepConfig { dt: 0.01, dt_m: 0.1 };
        assert!(config.resolve().is_err());
    }
}
